//! A feature flag provider backed by [Split](https://www.split.io/) treatments.
//!
//! # Overview
//!
//! Split evaluates a flag for a subject and returns a *treatment*, which is always a string.
//! Application code usually wants typed values instead. [`SplitProvider`] implements the
//! [`FeatureProvider`] contract on top of any [`TreatmentClient`], converting treatments to
//! booleans, strings, floats, integers or JSON values:
//! - [`FeatureProvider::boolean_evaluation()`] (`"on"`/`"true"` and `"off"`/`"false"`)
//! - [`FeatureProvider::string_evaluation()`]
//! - [`FeatureProvider::float_evaluation()`]
//! - [`FeatureProvider::int_evaluation()`]
//! - [`FeatureProvider::object_evaluation()`]
//!
//! The subject is identified by the [`TARGETING_KEY`] entry of the [`EvaluationContext`]. All other
//! entries are forwarded to Split as attributes.
//!
//! ```
//! # use split_openfeature_provider::{Attributes, FeatureProvider, Reason, SplitProvider, TARGETING_KEY};
//! let provider = SplitProvider::new(|_key: &str, _flag: &str, _attributes: Option<Attributes>| {
//!     "42".to_owned()
//! });
//!
//! let context = [(TARGETING_KEY.to_owned(), "user-1".into())].into_iter().collect();
//! let resolution = provider.int_evaluation("max-items", 10, &context);
//! assert_eq!(resolution.value, 42);
//! assert_eq!(resolution.reason, Reason::TargetingMatch);
//! ```
//!
//! # Split client
//!
//! [`SplitClient`] is the default [`TreatmentClient`]. It is created from a [`ClientConfig`]:
//! - with the `"localhost"` SDK key, treatments are read from a split file (see
//!   [`ClientConfig::split_file`]), optionally reloaded by a [`PollerThread`];
//! - with any other SDK key, treatments are requested from a Split Evaluator service.
//!
//! # Error Handling
//!
//! Flag evaluation never fails. When a typed value cannot be produced, the default value is
//! returned and the cause is described by [`ResolutionDetail::error`].
//!
//! Construction of providers and clients returns [`Error`] for invalid configuration.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging messages with
//! the `split` target. Consider integrating a `log`-compatible logger implementation for better
//! visibility into evaluations.

#![warn(rustdoc::missing_crate_level_docs)]

mod attributes;
mod client;
mod config;
mod error;
mod evaluator;
mod localhost;
mod poller;
mod provider;
mod resolution;
mod split_provider;

pub use attributes::{AttributeValue, Attributes, EvaluationContext, TARGETING_KEY};
pub use client::{SplitClient, TreatmentClient, CONTROL_TREATMENT, LOCALHOST_SDK_KEY};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use poller::{PollerThread, PollerThreadConfig};
pub use provider::{FeatureProvider, Hook, Metadata};
pub use resolution::{ErrorCode, Reason, ResolutionDetail, ResolutionError};
pub use split_provider::{SplitProvider, PROVIDER_NAME};
