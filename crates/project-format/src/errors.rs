/// Errors from project persistence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found: {id}")]
    NotFound { id: String },

    #[error("invalid project file format: {reason}")]
    InvalidFormat { reason: String },

    #[error("failed to parse project: {0}")]
    Parse(String),

    #[error("project storage failed: {reason}")]
    Storage { reason: String },

    #[error("invalid thumbnail: {reason}")]
    Thumbnail { reason: String },
}
