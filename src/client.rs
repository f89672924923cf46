use std::sync::Arc;

use crate::{
    config::ClientConfig,
    evaluator::EvaluatorClient,
    localhost::{self, TreatmentStore},
    poller::{PollerThread, PollerThreadConfig},
    Attributes, Error, Result,
};

/// Treatment returned by Split when a flag is unknown, killed, or cannot be evaluated.
pub const CONTROL_TREATMENT: &str = "control";

/// SDK key that switches [`SplitClient`] to localhost mode.
pub const LOCALHOST_SDK_KEY: &str = "localhost";

/// The capability the provider needs from a Split client: computing a treatment.
///
/// Closures with a matching signature implement this trait, which is handy for tests and for
/// wrapping clients from other crates:
///
/// ```
/// # use split_openfeature_provider::{Attributes, SplitProvider};
/// let provider = SplitProvider::new(
///     |_key: &str, feature: &str, _attributes: Option<Attributes>| match feature {
///         "new-checkout" => "on".to_owned(),
///         _ => "control".to_owned(),
///     },
/// );
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait TreatmentClient {
    /// Returns the treatment of `feature_name` for the subject identified by `key`.
    ///
    /// `attributes` is `None` when the caller supplied no attributes besides the key. Failures are
    /// reported as [`CONTROL_TREATMENT`] or an empty string.
    fn treatment(&self, key: &str, feature_name: &str, attributes: Option<Attributes>) -> String;
}

impl<F> TreatmentClient for F
where
    F: Fn(&str, &str, Option<Attributes>) -> String,
{
    fn treatment(&self, key: &str, feature_name: &str, attributes: Option<Attributes>) -> String {
        self(key, feature_name, attributes)
    }
}

/// The default Split client.
///
/// In localhost mode (SDK key `"localhost"`), treatments are read from a split file. Otherwise,
/// treatments are requested from a Split Evaluator service, authenticating with the SDK key.
///
/// In order to create a client instance, first create [`ClientConfig`].
///
/// In evaluator mode, requests are blocking and must not be issued from within an async runtime:
/// constructing the client or requesting a treatment there panics. Use
/// `tokio::task::spawn_blocking` or a dedicated thread instead.
///
/// # Examples
/// ```
/// # use split_openfeature_provider::ClientConfig;
/// let client = ClientConfig::from_sdk_key("localhost")
///     .split_file("/path/to/.split")
///     .to_client()
///     .unwrap();
/// ```
pub struct SplitClient {
    backend: Backend,
}

enum Backend {
    Localhost {
        split_file: std::path::PathBuf,
        store: Arc<TreatmentStore>,
    },
    Evaluator(EvaluatorClient),
}

impl SplitClient {
    /// Create a new `SplitClient` using the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an error in the following cases:
    /// - [`Error::ConfigurationError`] if the SDK key is empty.
    /// - [`Error::Io`] if the split file exists but cannot be read (localhost mode).
    /// - [`Error::InvalidBaseUrl`] if the evaluator URL is invalid.
    /// - [`Error::Network`] if the HTTP client cannot be initialized.
    ///
    /// # Panics
    ///
    /// In evaluator mode, panics if called from within an async runtime (e.g. tokio), because the
    /// blocking HTTP client starts its own runtime. Create the client outside of async contexts.
    pub fn new(config: ClientConfig) -> Result<SplitClient> {
        if config.sdk_key.is_empty() {
            return Err(Error::ConfigurationError("sdk_key must not be empty"));
        }

        let backend = if config.sdk_key == LOCALHOST_SDK_KEY {
            log::debug!(target: "split",
                        split_file:display = config.split_file.display();
                        "starting client in localhost mode");
            let treatments = localhost::load_split_file(&config.split_file)?;
            Backend::Localhost {
                split_file: config.split_file,
                store: Arc::new(TreatmentStore::new(treatments)),
            }
        } else {
            log::debug!(target: "split",
                        evaluator_url:display = config.evaluator_url;
                        "starting client in evaluator mode");
            Backend::Evaluator(EvaluatorClient::new(
                &config.evaluator_url,
                config.sdk_key,
                config.request_timeout,
            )?)
        };

        Ok(SplitClient { backend })
    }

    /// Returns `true` if the client serves treatments from a split file.
    pub fn is_localhost(&self) -> bool {
        matches!(self.backend, Backend::Localhost { .. })
    }

    /// Start a poller thread that periodically reloads the split file.
    ///
    /// # Errors
    ///
    /// - [`Error::ConfigurationError`] if the client is not in localhost mode.
    /// - [`Error::Io`] if the thread cannot be spawned.
    pub fn start_poller_thread(&self) -> Result<PollerThread> {
        self.start_poller_thread_with_config(PollerThreadConfig::default())
    }

    /// Start a poller thread with the provided configuration.
    ///
    /// See [`SplitClient::start_poller_thread`].
    pub fn start_poller_thread_with_config(
        &self,
        config: PollerThreadConfig,
    ) -> Result<PollerThread> {
        match &self.backend {
            Backend::Localhost { split_file, store } => Ok(PollerThread::start_with_config(
                split_file.clone(),
                store.clone(),
                config,
            )?),
            Backend::Evaluator(_) => Err(Error::ConfigurationError(
                "split file polling is only available in localhost mode",
            )),
        }
    }
}

impl TreatmentClient for SplitClient {
    fn treatment(&self, key: &str, feature_name: &str, attributes: Option<Attributes>) -> String {
        match &self.backend {
            Backend::Localhost { store, .. } => store
                .get_treatments()
                .get(feature_name)
                .cloned()
                .unwrap_or_else(|| CONTROL_TREATMENT.to_owned()),
            Backend::Evaluator(evaluator) => {
                evaluator.treatment(key, feature_name, attributes.as_ref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClientConfig, Error, TreatmentClient};

    #[test]
    fn empty_sdk_key_is_rejected() {
        assert!(matches!(
            ClientConfig::from_sdk_key("").to_client(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn localhost_without_split_file_serves_control() {
        let client = ClientConfig::from_sdk_key("localhost")
            .split_file("this/file/does/not/exist.split")
            .to_client()
            .unwrap();

        assert!(client.is_localhost());
        assert_eq!(client.treatment("user-1", "any-flag", None), "control");
    }

    #[test]
    fn unreadable_split_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            ClientConfig::from_sdk_key("localhost")
                .split_file(dir.path())
                .to_client(),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn evaluator_mode_cannot_poll_split_file() {
        let client = ClientConfig::from_sdk_key("sdk-key").to_client().unwrap();

        assert!(!client.is_localhost());
        assert!(matches!(
            client.start_poller_thread(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn invalid_evaluator_url_is_rejected() {
        assert!(matches!(
            ClientConfig::from_sdk_key("sdk-key")
                .evaluator_url("not a url")
                .to_client(),
            Err(Error::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn closures_are_clients() {
        let client = |key: &str, feature: &str, _attributes: Option<crate::Attributes>| {
            format!("{key}:{feature}")
        };

        assert_eq!(client.treatment("user-1", "flag", None), "user-1:flag");
    }
}
