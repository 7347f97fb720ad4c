use super::nullable;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Processing,
    Active,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Active => "active",
            DocumentStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidentialityLevel {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
}

impl ConfidentialityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidentialityLevel::Public => "public",
            ConfidentialityLevel::Internal => "internal",
            ConfidentialityLevel::Confidential => "confidential",
            ConfidentialityLevel::Restricted => "restricted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSummary {
    pub total_documents: u64,
    pub recent_uploads: u64,
    #[serde(deserialize_with = "nullable")]
    pub storage_used: String,
    pub shared_documents: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub parent_id: Option<String>,
    pub parent_folder_id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub path: String,
    pub document_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub subfolders: Vec<Folder>,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub modified_at: String,
    pub updated_at: Option<String>,
    pub department: Option<String>,
}

impl Folder {
    /// Parent id under either of the names the backend uses.
    pub fn parent(&self) -> Option<&str> {
        non_blank(self.parent_id.as_deref()).or_else(|| non_blank(self.parent_folder_id.as_deref()))
    }

    pub fn last_modified(&self) -> &str {
        non_blank(Some(self.modified_at.as_str()))
            .or_else(|| non_blank(self.updated_at.as_deref()))
            .unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A DMS document. The backend sometimes reports the stored file name and
/// MIME type separately from the display name and file type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub original_filename: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub file_type: String,
    pub mime_type: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub size: u64,
    pub size_bytes: Option<u64>,
    #[serde(deserialize_with = "nullable")]
    pub uploaded_by: String,
    #[serde(deserialize_with = "nullable")]
    pub uploaded_at: String,
    #[serde(deserialize_with = "nullable")]
    pub modified_at: String,
    pub updated_at: Option<String>,
    pub folder_id: Option<String>,
    pub folder_path: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub category_ids: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub tags: Vec<String>,
    pub status: DocumentStatus,
    pub confidentiality_level: ConfidentialityLevel,
    pub description: Option<String>,
    pub version: Option<String>,
    pub department: Option<String>,
}

impl Document {
    /// Name to show in listings, preferring the uploaded file name.
    pub fn display_name(&self) -> &str {
        match self.original_filename.as_deref() {
            Some(original) if !original.is_empty() => original,
            _ => &self.name,
        }
    }

    /// Size in bytes from `size`, or `size_bytes` when `size` is missing.
    pub fn file_size(&self) -> u64 {
        match self.size_bytes {
            Some(bytes) if self.size == 0 => bytes,
            _ => self.size,
        }
    }

    /// Modification timestamp from `modified_at`, falling back to `updated_at`.
    pub fn last_modified(&self) -> &str {
        non_blank(Some(self.modified_at.as_str()))
            .or_else(|| non_blank(self.updated_at.as_deref()))
            .unwrap_or_default()
    }

    /// Content type used for file-type filtering.
    pub fn content_type(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime,
            _ => &self.file_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 255, message = "Folder name must be between 1 and 255 characters"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Folder name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFolderRequest {
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Document name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidentiality_level: Option<ConfidentialityLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantPermissionRequest {
    pub user_id: String,
    pub permission_level: PermissionLevel,
}

/// Query parameters for `/dms/folders`.
#[derive(Debug, Clone, Default)]
pub struct FolderQuery {
    pub parent_id: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
}

/// Query parameters for `/dms/documents`.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub folder_id: Option<String>,
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub status: Option<DocumentStatus>,
}

/// A file to send to `/dms/file-upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub folder_id: String,
    pub tags: Vec<String>,
    pub confidentiality_level: ConfidentialityLevel,
    pub category_id: Option<String>,
}

/// Bytes of a downloaded document together with the headers that describe it.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_with_both_size_and_timestamp_names() {
        let json = r#"{"id":"d1","name":"a.pdf","size":10,"size_bytes":10,
            "modified_at":"2024-01-02T00:00:00Z","updated_at":"2024-01-03T00:00:00Z"}"#;
        let document: Document = serde_json::from_str(json).unwrap();
        assert_eq!(document.file_size(), 10);
        assert_eq!(document.last_modified(), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_document_alternate_field_names_only() {
        let json = r#"{"id":"d2","name":"b.pdf","size_bytes":2048,"updated_at":"2024-01-03T00:00:00Z"}"#;
        let document: Document = serde_json::from_str(json).unwrap();
        assert_eq!(document.size, 0);
        assert_eq!(document.file_size(), 2048);
        assert_eq!(document.last_modified(), "2024-01-03T00:00:00Z");
    }

    #[test]
    fn test_folder_with_both_parent_names() {
        let json = r#"{"id":"f1","name":"Drawings","parent_id":null,"parent_folder_id":"p",
            "modified_at":"","updated_at":"2024-02-01T00:00:00Z"}"#;
        let folder: Folder = serde_json::from_str(json).unwrap();
        assert_eq!(folder.parent(), Some("p"));
        assert_eq!(folder.last_modified(), "2024-02-01T00:00:00Z");
    }
}
