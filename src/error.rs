use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unknown provider: {0}. Use trends, suggest or dataforseo")]
    UnknownProvider(String),

    #[error("Too many requests. Please wait a minute.")]
    RateLimited { reset_in_ms: u64 },

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Upstream(String),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl AnalyzeError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::InvalidInput(_) | AnalyzeError::UnknownProvider(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalyzeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalyzeError::Config(_) | AnalyzeError::Upstream(_) | AnalyzeError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// transport failures from any adapter end up here
impl From<reqwest::Error> for AnalyzeError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzeError::Upstream(format!("Request failed: {}", err))
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match self {
            AnalyzeError::RateLimited { reset_in_ms } => {
                let body = Json(serde_json::json!({
                    "error": message,
                    "resetInMs": reset_in_ms,
                }));
                let mut response = (status, body).into_response();
                // whole seconds, rounded up so clients never retry early
                let retry_secs = reset_in_ms.div_ceil(1000);
                if let Ok(value) = HeaderValue::from_str(&retry_secs.to_string()) {
                    response.headers_mut().insert(RETRY_AFTER, value);
                }
                response
            }
            _ => (status, Json(serde_json::json!({ "error": message }))).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
