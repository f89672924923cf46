use std::{path::PathBuf, time::Duration};

use crate::{Result, SplitClient};

/// Configuration for [`SplitClient`].
///
/// # Examples
/// ```
/// # use split_openfeature_provider::ClientConfig;
/// let client = ClientConfig::from_sdk_key("sdk-key")
///     .evaluator_url("http://split-evaluator:7548")
///     .to_client()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) sdk_key: String,
    pub(crate) evaluator_url: String,
    pub(crate) split_file: PathBuf,
    pub(crate) request_timeout: Duration,
}

impl ClientConfig {
    /// Create a default Split configuration using the specified SDK key.
    ///
    /// Passing `"localhost"` makes the client serve treatments from a local split file.
    ///
    /// ```
    /// # use split_openfeature_provider::ClientConfig;
    /// ClientConfig::from_sdk_key("sdk-key");
    /// ```
    pub fn from_sdk_key(sdk_key: impl Into<String>) -> Self {
        ClientConfig {
            sdk_key: sdk_key.into(),
            evaluator_url: ClientConfig::DEFAULT_EVALUATOR_URL.to_owned(),
            split_file: default_split_file(),
            request_timeout: ClientConfig::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Default base URL of the Split Evaluator service.
    pub const DEFAULT_EVALUATOR_URL: &'static str = "http://localhost:7548";

    /// Default timeout for a single treatment request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Override base URL of the Split Evaluator service.
    pub fn evaluator_url(mut self, evaluator_url: impl Into<String>) -> Self {
        self.evaluator_url = evaluator_url.into();
        self
    }

    /// Override the split file used in localhost mode. Defaults to `$HOME/.split`.
    pub fn split_file(mut self, split_file: impl Into<PathBuf>) -> Self {
        self.split_file = split_file.into();
        self
    }

    /// Override the timeout of treatment requests sent to the evaluator.
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Create a new [`SplitClient`] using the specified configuration.
    ///
    /// Errors and panics are the same as for [`SplitClient::new`].
    ///
    /// ```
    /// # use split_openfeature_provider::{ClientConfig, SplitClient};
    /// let client: SplitClient = ClientConfig::from_sdk_key("localhost").to_client().unwrap();
    /// ```
    pub fn to_client(self) -> Result<SplitClient> {
        SplitClient::new(self)
    }
}

fn default_split_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".split")
}
