use crate::{
    attributes::split_context,
    client::CONTROL_TREATMENT,
    provider::{FeatureProvider, Metadata},
    ClientConfig, Error, EvaluationContext, ResolutionDetail, Result, SplitClient,
    TreatmentClient,
};

/// Name reported in provider [`Metadata`].
pub const PROVIDER_NAME: &str = "Split";

/// A [`FeatureProvider`] that resolves typed flag values from Split treatments.
///
/// Split only returns string treatments. The provider converts them to the requested type and
/// reports how the value was obtained:
/// - `"control"` and empty treatments resolve to the default value with
///   [`ErrorCode::FlagNotFound`](crate::ErrorCode::FlagNotFound).
/// - Treatments that cannot be converted resolve to the default value with
///   [`ErrorCode::ParseError`](crate::ErrorCode::ParseError).
/// - Contexts without a [`TARGETING_KEY`](crate::TARGETING_KEY) resolve to the default value with
///   [`ErrorCode::TargetingKeyMissing`](crate::ErrorCode::TargetingKeyMissing), without calling
///   Split.
///
/// The provider holds no state besides the client, so it can be shared between threads whenever
/// the client can.
///
/// # Examples
/// ```
/// # use split_openfeature_provider::{FeatureProvider, SplitProvider, TARGETING_KEY};
/// let provider = SplitProvider::from_sdk_key("localhost").unwrap();
///
/// let context = [(TARGETING_KEY.to_owned(), "user-1".into())].into_iter().collect();
/// let show_banner = provider
///     .boolean_evaluation("show-banner", false, &context)
///     .value;
/// ```
pub struct SplitProvider<C = SplitClient> {
    client: C,
}

impl<C: TreatmentClient> SplitProvider<C> {
    /// Create a provider around an already initialized client.
    pub fn new(client: C) -> Self {
        SplitProvider { client }
    }

    /// Create a provider around an optional client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if `client` is `None`.
    pub fn try_new(client: Option<C>) -> Result<Self> {
        client
            .map(SplitProvider::new)
            .ok_or(Error::ConfigurationError("split client is required"))
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn evaluate<T>(
        &self,
        flag_key: &str,
        default_value: T,
        context: &EvaluationContext,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> ResolutionDetail<T> {
        let Some((targeting_key, attributes)) = split_context(context) else {
            log::warn!(target: "split", flag_key; "evaluation context has no targeting key");
            return ResolutionDetail::targeting_key_missing(default_value);
        };

        log::trace!(target: "split",
                    flag_key,
                    targeting_key,
                    attributes:serde = attributes;
                    "requesting treatment");
        let treatment = self.client.treatment(targeting_key, flag_key, attributes);

        if is_control(&treatment) {
            log::debug!(target: "split",
                        flag_key,
                        targeting_key,
                        treatment = treatment.as_str();
                        "flag not found, serving default value");
            return ResolutionDetail::flag_not_found(default_value, treatment);
        }

        match parse(&treatment) {
            Some(value) => {
                log::trace!(target: "split",
                            flag_key,
                            targeting_key,
                            treatment = treatment.as_str();
                            "evaluated a flag");
                ResolutionDetail::targeting_match(value, treatment)
            }
            None => {
                log::warn!(target: "split",
                           flag_key,
                           targeting_key,
                           treatment = treatment.as_str();
                           "unable to convert treatment to the requested type");
                ResolutionDetail::parse_error(default_value, treatment)
            }
        }
    }
}

impl SplitProvider<SplitClient> {
    /// Create a provider with a default-configured [`SplitClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if `sdk_key` is empty, or any error returned by
    /// [`SplitClient::new`].
    ///
    /// # Panics
    ///
    /// For SDK keys other than `"localhost"`, panics if called from within an async runtime. See
    /// [`SplitClient::new`].
    pub fn from_sdk_key(sdk_key: impl Into<String>) -> Result<Self> {
        SplitProvider::from_config(ClientConfig::from_sdk_key(sdk_key))
    }

    /// Create a provider with a [`SplitClient`] built from `config`.
    ///
    /// Errors and panics are the same as for [`SplitClient::new`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.to_client().map(SplitProvider::new)
    }
}

impl<C: TreatmentClient> FeatureProvider for SplitProvider<C> {
    fn metadata(&self) -> Metadata {
        Metadata {
            name: PROVIDER_NAME.to_owned(),
        }
    }

    fn boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> ResolutionDetail<bool> {
        self.evaluate(flag_key, default_value, context, parse_bool)
    }

    fn string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: &EvaluationContext,
    ) -> ResolutionDetail<String> {
        self.evaluate(flag_key, default_value, context, |treatment| {
            Some(treatment.to_owned())
        })
    }

    fn float_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> ResolutionDetail<f64> {
        self.evaluate(flag_key, default_value, context, |treatment| {
            treatment.parse().ok()
        })
    }

    fn int_evaluation(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> ResolutionDetail<i64> {
        self.evaluate(flag_key, default_value, context, |treatment| {
            treatment.parse().ok()
        })
    }

    fn object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: &EvaluationContext,
    ) -> ResolutionDetail<serde_json::Value> {
        self.evaluate(flag_key, default_value, context, |treatment| {
            serde_json::from_str(treatment).ok()
        })
    }
}

fn is_control(treatment: &str) -> bool {
    treatment.is_empty() || treatment == CONTROL_TREATMENT
}

/// Matching is case-sensitive: `"TRUE"` is not a boolean treatment.
fn parse_bool(treatment: &str) -> Option<bool> {
    match treatment {
        "true" | "on" => Some(true),
        "false" | "off" => Some(false),
        _ => None,
    }
}
