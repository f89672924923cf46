use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// Name of the evaluation context entry that identifies the subject being evaluated.
pub const TARGETING_KEY: &str = "targetingKey";

/// Type alias for a HashMap representing key-value pairs of attributes forwarded to Split.
///
/// # Examples
/// ```
/// # use split_openfeature_provider::{Attributes, AttributeValue};
/// let attributes = [
///     ("age".to_owned(), 30.into()),
///     ("is_premium_member".to_owned(), true.into()),
///     ("username".to_owned(), "john_doe".into()),
/// ].into_iter().collect::<Attributes>();
/// ```
pub type Attributes = HashMap<String, AttributeValue>;

/// Flattened evaluation context.
///
/// The [`TARGETING_KEY`] entry holds the subject key. Every other entry is forwarded to the Split
/// client as an attribute.
///
/// The targeting key must be an [`AttributeValue::String`]. Any other value is not converted and
/// is treated as a missing key, so the evaluation resolves to
/// [`ErrorCode::TargetingKeyMissing`](crate::ErrorCode::TargetingKeyMissing).
///
/// ```
/// # use split_openfeature_provider::{EvaluationContext, TARGETING_KEY};
/// let context: EvaluationContext = [
///     (TARGETING_KEY.to_owned(), "user-1".into()),
///     ("plan".to_owned(), "enterprise".into()),
/// ].into_iter().collect();
/// ```
pub type EvaluationContext = HashMap<String, AttributeValue>;

/// Value of a context attribute.
///
/// Conveniently implements `From` conversions for `String`, `&str`, `i64`, `f64`, `bool`, lists
/// and maps.
#[derive(Debug, Serialize, Deserialize, PartialEq, From, Clone)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Boolean(bool),
    /// An integral number.
    Integer(i64),
    /// A floating-point number.
    Number(f64),
    /// A list of values, e.g. for set matchers.
    List(Vec<AttributeValue>),
    /// A nested structure.
    Map(HashMap<String, AttributeValue>),
    /// A null value or absence of value.
    Null,
}

impl AttributeValue {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        if let AttributeValue::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

/// Splits `context` into the targeting key and the attributes to forward.
///
/// Returns `None` when the context has no string targeting key. Attributes are `None` rather than
/// an empty map when the targeting key is the only entry.
pub(crate) fn split_context(context: &EvaluationContext) -> Option<(&str, Option<Attributes>)> {
    let targeting_key = context.get(TARGETING_KEY)?.as_str()?;

    let attributes: Attributes = context
        .iter()
        .filter(|(name, _)| name.as_str() != TARGETING_KEY)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    Some((targeting_key, (!attributes.is_empty()).then_some(attributes)))
}
