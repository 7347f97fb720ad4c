use super::nullable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tender as shown in listings. `value` is `None` when the scraped amount
/// could not be normalized (for example "Ref Document").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tender {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub authority: String,
    pub organization: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub due_date: String,
    pub status: TenderStatus,
    #[serde(deserialize_with = "nullable")]
    pub category: String,
    #[serde(deserialize_with = "nullable")]
    pub e_published_date: String,
    pub bid_security: f64,
    pub emd: f64,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    pub length: Option<String>,
    pub cost_per_km: Option<f64>,
    pub progress_pct: u8,
    #[serde(deserialize_with = "nullable")]
    pub documents: Vec<TenderDocumentRef>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    #[default]
    Live,
    Analyzed,
    Synopsis,
    Evaluated,
    Won,
    Lost,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Doc,
    Excel,
    #[default]
    Other,
}

impl DocumentKind {
    /// Classify a tender attachment by its file name extension.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if lower.ends_with(".doc") || lower.ends_with(".docx") {
            DocumentKind::Doc
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
            DocumentKind::Excel
        } else {
            DocumentKind::Other
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderDocumentRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub pages: Option<u32>,
    pub is_ai_generated: Option<bool>,
}

/// Tender as returned by the scraping backend. Monetary fields are free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedTender {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub tender_id_str: String,
    #[serde(deserialize_with = "nullable")]
    pub tender_name: String,
    #[serde(deserialize_with = "nullable")]
    pub tender_url: String,
    pub drive_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub city: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub due_date: String,
    pub tdr: Option<String>,
    pub tendering_authority: Option<String>,
    pub tender_no: Option<String>,
    pub state: Option<String>,
    pub emd: Option<String>,
    pub tender_value: Option<String>,
    pub publish_date: Option<String>,
    pub last_date_of_bid_submission: Option<String>,
    pub category: Option<String>,
    pub query_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub files: Vec<ScrapedTenderFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedTenderFile {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(deserialize_with = "nullable")]
    pub file_url: String,
    pub file_description: Option<String>,
    pub file_size: Option<String>,
}

/// One daily scrape run, with tenders grouped by search query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderApiResponse {
    pub id: String,
    pub run_at: String,
    pub date_str: String,
    pub name: String,
    pub contact: String,
    pub no_of_new_tenders: String,
    pub company: String,
    #[serde(deserialize_with = "nullable")]
    pub queries: Vec<TenderQuery>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderQuery {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub query_name: String,
    pub number_of_tenders: String,
    #[serde(deserialize_with = "nullable")]
    pub tenders: Vec<ScrapedTender>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableDate {
    pub date: String,
    pub date_str: String,
    pub run_at: String,
    pub tender_count: u64,
    pub is_latest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[serde(rename = "last_1_day")]
    Last1Day,
    #[serde(rename = "last_5_days")]
    Last5Days,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Last1Day => "last_1_day",
            DateRange::Last5Days => "last_5_days",
            DateRange::Last7Days => "last_7_days",
            DateRange::Last30Days => "last_30_days",
        }
    }
}

/// Server-side filter for `/tenderiq/tenders`.
#[derive(Debug, Clone, Default)]
pub struct FilteredTendersQuery {
    pub date: Option<String>,
    pub date_range: Option<DateRange>,
    pub include_all_dates: bool,
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteredBy {
    pub date: Option<String>,
    pub date_range: Option<String>,
    pub include_all_dates: Option<bool>,
    pub category: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteredTendersResponse {
    pub tenders: Vec<Tender>,
    pub total_count: u64,
    pub filtered_by: FilteredBy,
    pub available_dates: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenderDetailStatus {
    #[default]
    Live,
    Won,
    Lost,
    Submitted,
    #[serde(rename = "under evaluation")]
    UnderEvaluation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenderDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub url: String,
    pub description: Option<String>,
    pub size: Option<String>,
    pub pages: Option<u32>,
    pub is_ai_generated: Option<bool>,
}

/// Detail view of a single tender. Unlike listings, unknown value and EMD
/// stay `None` so the caller can render "Ref Document".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenderDetails {
    pub id: String,
    pub tender_no: Option<String>,
    pub title: String,
    pub authority: String,
    pub value: Option<f64>,
    pub due_date: String,
    pub status: TenderDetailStatus,
    pub category: String,
    pub emd: Option<f64>,
    pub location: String,
    pub length: Option<String>,
    pub cost_per_km: Option<f64>,
    pub e_published_date: String,
    pub documents: Vec<TenderDocument>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderAction {
    ToggleWishlist,
    ToggleFavorite,
    ToggleArchive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderActionRequest {
    pub action: TenderAction,
}
