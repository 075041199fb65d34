use thiserror::Error;

/// Error type returned by the product synchronizer.
///
/// `Upstream` and `Persistence` are kept apart so callers can tell whether
/// the image host may already have been mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested product does not exist.
    #[error("Product not found")]
    NotFound,
    /// Submitted form failed validation.
    #[error("{0}")]
    Form(String),
    /// The remote image service failed.
    #[error("image service error: {0}")]
    Upstream(String),
    /// The product store failed.
    #[error("storage error: {0}")]
    Persistence(String),
}

impl ServiceError {
    /// Machine-readable kind reported next to the message.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Form(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Persistence(_) => "persistence",
        }
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
