//! The provider contract application code evaluates flags through.
use crate::{EvaluationContext, ResolutionDetail};

/// Describes a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
}

/// A lifecycle hook attached to flag evaluation.
///
/// [`SplitProvider`](crate::SplitProvider) registers no hooks.
pub trait Hook: Send + Sync {}

/// A source of typed feature flag values.
///
/// Evaluation functions never fail: when a value cannot be resolved, `default_value` is returned
/// and the reason is reported in [`ResolutionDetail::error`].
pub trait FeatureProvider {
    /// Provider metadata.
    fn metadata(&self) -> Metadata;

    /// Hooks registered by the provider, in execution order.
    fn hooks(&self) -> &[Box<dyn Hook>] {
        &[]
    }

    fn boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: &EvaluationContext,
    ) -> ResolutionDetail<bool>;

    fn string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: &EvaluationContext,
    ) -> ResolutionDetail<String>;

    fn float_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> ResolutionDetail<f64>;

    fn int_evaluation(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> ResolutionDetail<i64>;

    fn object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: &EvaluationContext,
    ) -> ResolutionDetail<serde_json::Value>;
}
