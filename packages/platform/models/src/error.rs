/// Failures reported by a review app directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The resource is in a state that conflicts with the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network trouble, rate limiting or a 5xx. Safe to ask again.
    #[error("Transient platform fault: {0}")]
    Transient(String),

    /// Anything that will not get better by asking again.
    #[error("Platform error: {0}")]
    Fatal(String),
}

impl DirectoryError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
