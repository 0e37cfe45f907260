use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by employee operations. The router is the only place
/// that turns these into status codes.
#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("Invalid employee: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No employee found with id: {0}")]
    NotFound(i32),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// A failed persistence round trip, carrying the underlying cause.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    context: String,
    #[source]
    source: BoxError,
}

impl StoreError {
    pub fn new(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Builds an error whose cause is only a message.
    pub fn msg(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(context, message.into())
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Malformed URL or missing employee id.")]
    MalformedId,

    #[error("Route or method not found.")]
    NotFound,
}
