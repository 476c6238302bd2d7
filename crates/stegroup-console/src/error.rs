//! Failures surfaced by console actions.
//!
//! # Design
//! - Keep error messages constant while carrying context fields for debugging.
//! - Localized text is chosen by the presentation layer via [`ActionError::message`].

use stegroup_client::ApiError;
use thiserror::Error;

use crate::messages::Messages;

/// Result alias for console actions.
pub type ActionResult<T> = Result<T, ActionError>;

/// Why a console action did not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The backend call failed; local state is untouched.
    #[error("service request failed")]
    Api {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying client error.
        source: ApiError,
    },
    /// The action is not available in the current state; no request was made.
    #[error("action not offered")]
    NotOffered {
        /// Machine-readable reason.
        reason: &'static str,
    },
    /// Input was rejected before any request.
    #[error("invalid action input")]
    Validation {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason.
        reason: &'static str,
    },
}

impl ActionError {
    pub(crate) const fn api(operation: &'static str, source: ApiError) -> Self {
        Self::Api { operation, source }
    }

    pub(crate) const fn not_offered(reason: &'static str) -> Self {
        Self::NotOffered { reason }
    }

    /// Localized message for the presentation layer.
    #[must_use]
    pub fn message(&self, messages: &Messages) -> &'static str {
        match self {
            Self::Api { operation, .. } => messages.operation_failed(operation),
            Self::NotOffered { reason } if *reason == crate::mutation::RATING_REQUIRED => {
                messages.rating_required
            }
            Self::NotOffered { .. } => messages.not_offered,
            Self::Validation { field: "ste_ids", .. } => messages.empty_selection,
            Self::Validation { .. } => messages.invalid_input,
        }
    }

    /// One-line diagnostic including context fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Api { operation, source } => format!("{self} ({operation}): {}", source.describe()),
            Self::NotOffered { reason } => format!("{self}: {reason}"),
            Self::Validation { field, reason } => format!("{self} '{field}': {reason}"),
        }
    }

    /// Underlying client error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            Self::NotOffered { .. } | Self::Validation { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stegroup_config::Locale;

    #[test]
    fn messages_follow_the_failing_operation() {
        let messages = Messages::for_locale(Locale::Ru);
        let err = ActionError::api(
            "submit_rating",
            ApiError::Status {
                operation: "submit_rating",
                status: 500,
                detail: None,
            },
        );
        assert_eq!(err.message(messages), "Не удалось отправить оценку");
        assert!(err.describe().contains("submit_rating"));
        assert_eq!(err.api_error().and_then(ApiError::status), Some(500));
    }

    #[test]
    fn empty_selection_has_its_own_text() {
        let messages = Messages::for_locale(Locale::Ru);
        let err = ActionError::Validation {
            field: "ste_ids",
            reason: "empty selection",
        };
        assert_eq!(
            err.message(messages),
            "Выберите хотя бы одну СТЕ для группировки"
        );
    }
}
