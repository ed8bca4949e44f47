use crate::validate::ValidationError;
use reqwest::StatusCode;

/// Everything that can go wrong between the user's input and a rendered
/// quiz. Validation failures never reach the network; API and transport
/// failures surface as dismissible page-level errors; best-effort saves
/// log and swallow these instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed quiz data: {0}")]
    DataShape(String),
}
