use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("No API token configured (set CEIGALL_API_TOKEN)")]
    MissingToken,
    #[error("Failed to {operation}: {status} {body}")]
    Api { operation: String, status: u16, body: String },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Analysis of tender {tender_id} did not finish after {attempts} status checks")]
    AnalysisTimeout { tender_id: String, attempts: u32 },
    #[error("Analysis of tender {tender_id} failed: {message}")]
    AnalysisFailed { tender_id: String, message: String },
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
