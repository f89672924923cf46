//! Typed flag resolution results.
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a resolved value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// Split served a treatment that was converted to the requested type.
    TargetingMatch,
    /// No targeting rule matched, the default value was returned.
    Default,
    /// Evaluation failed, the default value was returned.
    Error,
}

/// Classification of evaluation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The evaluation context does not carry a targeting key.
    TargetingKeyMissing,
    /// Split returned the control treatment: the flag is unknown, killed, or no rule matched.
    FlagNotFound,
    /// The treatment cannot be converted to the requested type.
    ParseError,
}

impl ErrorCode {
    /// Wire name of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TargetingKeyMissing => "TARGETING_KEY_MISSING",
            ErrorCode::FlagNotFound => "FLAG_NOT_FOUND",
            ErrorCode::ParseError => "PARSE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An evaluation error carried inside a [`ResolutionDetail`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{code}: {message}")]
pub struct ResolutionError {
    pub code: ErrorCode,
    pub message: String,
}

impl ResolutionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> ResolutionError {
        ResolutionError {
            code,
            message: message.into(),
        }
    }

    pub fn targeting_key_missing() -> ResolutionError {
        ResolutionError::new(
            ErrorCode::TargetingKeyMissing,
            "Targeting key is required and missing.",
        )
    }

    pub fn flag_not_found() -> ResolutionError {
        ResolutionError::new(ErrorCode::FlagNotFound, "Flag not found.")
    }

    pub fn parse_error() -> ResolutionError {
        ResolutionError::new(
            ErrorCode::ParseError,
            "Error parsing the treatment to the given type.",
        )
    }
}

/// Result of a typed flag evaluation.
///
/// `value` always holds something usable: either the converted treatment or the default supplied
/// by the caller. `variant` holds the raw treatment returned by Split, even when conversion failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetail<T> {
    pub value: T,
    pub reason: Reason,
    pub variant: String,
    pub error: Option<ResolutionError>,
}

impl<T> ResolutionDetail<T> {
    pub(crate) fn targeting_match(value: T, variant: String) -> ResolutionDetail<T> {
        ResolutionDetail {
            value,
            reason: Reason::TargetingMatch,
            variant,
            error: None,
        }
    }

    pub(crate) fn targeting_key_missing(default_value: T) -> ResolutionDetail<T> {
        ResolutionDetail {
            value: default_value,
            reason: Reason::Error,
            variant: String::new(),
            error: Some(ResolutionError::targeting_key_missing()),
        }
    }

    pub(crate) fn flag_not_found(default_value: T, variant: String) -> ResolutionDetail<T> {
        ResolutionDetail {
            value: default_value,
            reason: Reason::Default,
            variant,
            error: Some(ResolutionError::flag_not_found()),
        }
    }

    pub(crate) fn parse_error(default_value: T, variant: String) -> ResolutionDetail<T> {
        ResolutionDetail {
            value: default_value,
            reason: Reason::Error,
            variant,
            error: Some(ResolutionError::parse_error()),
        }
    }

    /// Returns the error code, if evaluation failed.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|err| err.code)
    }

    /// Map `ResolutionDetail.value` using the `f` function.
    pub fn map<T2, F: FnOnce(T) -> T2>(self, f: F) -> ResolutionDetail<T2> {
        ResolutionDetail {
            value: f(self.value),
            reason: self.reason,
            variant: self.variant,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, Reason, ResolutionDetail, ResolutionError};

    #[test]
    fn error_display_includes_code() {
        assert_eq!(
            ResolutionError::flag_not_found().to_string(),
            "FLAG_NOT_FOUND: Flag not found."
        );
    }

    #[test]
    fn serializes_in_wire_format() {
        let detail = ResolutionDetail::parse_error(5_i64, "abc".to_owned());

        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            serde_json::json!({
                "value": 5,
                "reason": "ERROR",
                "variant": "abc",
                "error": {
                    "code": "PARSE_ERROR",
                    "message": "Error parsing the treatment to the given type.",
                },
            })
        );
    }

    #[test]
    fn map_keeps_resolution_metadata() {
        let detail = ResolutionDetail::flag_not_found(1_i64, "control".to_owned()).map(|x| x * 2);

        assert_eq!(detail.value, 2);
        assert_eq!(detail.reason, Reason::Default);
        assert_eq!(detail.variant, "control");
        assert_eq!(detail.error_code(), Some(ErrorCode::FlagNotFound));
    }
}
