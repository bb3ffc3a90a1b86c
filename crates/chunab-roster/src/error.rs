use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("reference file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
