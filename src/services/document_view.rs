use crate::models::Document;
use crate::services::tender_filter::ALL;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied to the document list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentSort {
    NameAsc,
    NameDesc,
    ModifiedAsc,
    #[default]
    ModifiedDesc,
    SizeAsc,
    SizeDesc,
}

impl DocumentSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSort::NameAsc => "name-asc",
            DocumentSort::NameDesc => "name-desc",
            DocumentSort::ModifiedAsc => "modified-asc",
            DocumentSort::ModifiedDesc => "modified-desc",
            DocumentSort::SizeAsc => "size-asc",
            DocumentSort::SizeDesc => "size-desc",
        }
    }

    /// Compare two documents under this mode. Equal keys compare `Equal`, so
    /// a stable sort keeps their relative order.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match self {
            DocumentSort::NameAsc => compare_names(&a.name, &b.name),
            DocumentSort::NameDesc => compare_names(&b.name, &a.name),
            DocumentSort::ModifiedAsc => modified_millis(a).cmp(&modified_millis(b)),
            DocumentSort::ModifiedDesc => modified_millis(b).cmp(&modified_millis(a)),
            DocumentSort::SizeAsc => a.file_size().cmp(&b.file_size()),
            DocumentSort::SizeDesc => b.file_size().cmp(&a.file_size()),
        }
    }
}

impl fmt::Display for DocumentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name-asc" => Ok(DocumentSort::NameAsc),
            "name-desc" => Ok(DocumentSort::NameDesc),
            "modified-asc" => Ok(DocumentSort::ModifiedAsc),
            "modified-desc" => Ok(DocumentSort::ModifiedDesc),
            "size-asc" => Ok(DocumentSort::SizeAsc),
            "size-desc" => Ok(DocumentSort::SizeDesc),
            other => Err(format!("Unknown sort mode: {}", other)),
        }
    }
}

/// Case-insensitive name comparison. Names differing only in case put the
/// lowercase form first, like locale collation does.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

/// Milliseconds since the epoch of a backend timestamp, or zero when the
/// field is missing or unreadable.
pub fn timestamp_millis(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
        .unwrap_or(0)
}

fn modified_millis(document: &Document) -> i64 {
    timestamp_millis(document.last_modified())
}

/// Sort in place. The sort is stable.
pub fn sort_documents(documents: &mut [Document], sort: DocumentSort) {
    documents.sort_by(|a, b| sort.compare(a, b));
}

pub fn sorted_documents(documents: &[Document], sort: DocumentSort) -> Vec<Document> {
    let mut sorted = documents.to_vec();
    sort_documents(&mut sorted, sort);
    sorted
}

/// Client-side document filter for the DMS list. `None`, empty and `all`
/// place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFilter {
    pub folder_id: Option<String>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub department: Option<String>,
    pub file_type: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty() && *s != ALL)
}

impl DocumentFilter {
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(folder_id) = active(&self.folder_id) {
            if document.folder_id.as_deref() != Some(folder_id) {
                return false;
            }
        }

        if let Some(search) = active(&self.search) {
            let needle = search.to_lowercase();
            let in_name = document.name.to_lowercase().contains(&needle);
            let in_original = document
                .original_filename
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle));
            if !in_name && !in_original {
                return false;
            }
        }

        if let Some(category_id) = active(&self.category_id) {
            if !document.category_ids.iter().any(|id| id == category_id) {
                return false;
            }
        }

        if let Some(department) = active(&self.department) {
            if document.department.as_deref() != Some(department) {
                return false;
            }
        }

        if let Some(file_type) = active(&self.file_type) {
            if !document.content_type().contains(file_type) {
                return false;
            }
        }

        true
    }
}

pub fn filter_documents(documents: &[Document], filter: &DocumentFilter) -> Vec<Document> {
    documents.iter().filter(|d| filter.matches(d)).cloned().collect()
}

/// Human readable size with one decimal, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Broad file category used to pick an icon in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Word,
    Spreadsheet,
    Presentation,
    Image,
    Archive,
    Other,
}

pub fn file_kind(file_name: &str) -> FileKind {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).unwrap_or_default();
    match extension.as_str() {
        "pdf" => FileKind::Pdf,
        "doc" | "docx" => FileKind::Word,
        "xls" | "xlsx" | "csv" => FileKind::Spreadsheet,
        "ppt" | "pptx" => FileKind::Presentation,
        "jpg" | "jpeg" | "png" | "gif" => FileKind::Image,
        "zip" | "rar" | "7z" => FileKind::Archive,
        _ => FileKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_names_is_case_insensitive() {
        assert_eq!(compare_names("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_names("Gamma", "beta"), Ordering::Greater);
        assert_eq!(compare_names("alpha", "Alpha"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(timestamp_millis(""), 0);
        assert_eq!(timestamp_millis("not a date"), 0);
        assert_eq!(timestamp_millis("1970-01-02"), 86_400_000);
        assert_eq!(timestamp_millis("1970-01-01T00:00:01Z"), 1_000);
        assert_eq!(timestamp_millis("1970-01-01T00:00:01.500"), 1_500);
        assert_eq!(timestamp_millis("1970-01-01T01:00:00+01:00"), 0);
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("size-desc".parse::<DocumentSort>(), Ok(DocumentSort::SizeDesc));
        assert!("size".parse::<DocumentSort>().is_err());
        assert_eq!(DocumentSort::default().to_string(), "modified-desc");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072.0 GB");
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(file_kind("BOQ.XLSX"), FileKind::Spreadsheet);
        assert_eq!(file_kind("rfp.final.pdf"), FileKind::Pdf);
        assert_eq!(file_kind("README"), FileKind::Other);
    }
}
