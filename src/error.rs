use std::sync::Arc;

/// Result type for provider and client construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can prevent a provider or a client from being constructed.
///
/// Flag evaluation never returns these. Evaluation failures are reported through
/// [`ResolutionError`](crate::ResolutionError) inside the returned
/// [`ResolutionDetail`](crate::ResolutionDetail).
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The provider was configured without a client, or with an empty SDK key.
    #[error("configuration error: {0}")]
    ConfigurationError(&'static str),

    /// Invalid evaluator URL configuration.
    #[error("invalid evaluator_url configuration")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// Indicates that the poller thread panicked. This should normally never happen.
    #[error("poller thread panicked")]
    PollerThreadPanicked,

    /// An I/O error.
    #[error(transparent)]
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    Io(Arc<std::io::Error>),

    /// Network error.
    #[error(transparent)]
    Network(Arc<reqwest::Error>),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(Arc::new(value.without_url()))
    }
}
