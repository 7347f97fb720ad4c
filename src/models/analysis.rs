use super::nullable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisState {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Completed | AnalysisState::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisStatus {
    pub tender_id: String,
    pub status: AnalysisState,
    pub progress: Option<f32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAnalysis {
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOnePager {
    #[serde(deserialize_with = "nullable")]
    pub project_overview: String,
    #[serde(deserialize_with = "nullable")]
    pub eligibility_highlights: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub important_dates: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub financial_requirements: Vec<String>,
    pub risk_analysis: RiskAnalysis,
}

/// Results of a finished tender analysis. Sections the analyzer did not
/// produce are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderAnalysis {
    pub one_pager_json: Option<AnalysisOnePager>,
    pub scope_of_work_json: Option<Value>,
    pub data_sheet_json: Option<Value>,
    #[serde(rename = "tenderInfo")]
    pub tender_info: Option<Value>,
}

impl TenderAnalysis {
    pub fn is_empty(&self) -> bool {
        self.one_pager_json.is_none() && self.scope_of_work_json.is_none() && self.data_sheet_json.is_none()
    }
}
