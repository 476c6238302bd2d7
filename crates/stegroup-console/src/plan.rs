//! Concurrent required + optional fetches.
//!
//! # Design
//! - The required fetch decides success of the whole load.
//! - The optional fetch can only degrade: its failure becomes
//!   [`Optional::Unavailable`], which is distinct from a loaded empty value.

use std::future::Future;

use stegroup_client::{ApiError, ApiResult};
use tracing::warn;

use crate::query::FetchError;

/// Outcome of a fetch whose failure must not fail the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Optional<T> {
    /// Not requested yet.
    Pending,
    /// Fetched successfully.
    Loaded(T),
    /// The fetch failed; the screen renders without it.
    Unavailable(FetchError),
}

impl<T> Optional<T> {
    /// Loaded value, if any.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending | Self::Unavailable(_) => None,
        }
    }

    /// Mutable access to the loaded value, if any.
    pub const fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending | Self::Unavailable(_) => None,
        }
    }

    /// True when the optional fetch failed.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Convert a fetch result, logging the failure.
    #[must_use]
    pub fn from_result(operation: &'static str, result: ApiResult<T>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(error) => {
                warn!(operation, error = %error.describe(), "optional fetch unavailable");
                Self::Unavailable(FetchError::from(&error))
            }
        }
    }
}

/// Run `required` and `optional` concurrently.
///
/// # Errors
/// Returns the required fetch's error; the optional result is discarded in
/// that case.
pub async fn load_with_optional<R, O, FR, FO>(
    required: FR,
    optional_operation: &'static str,
    optional: FO,
) -> Result<(R, Optional<O>), ApiError>
where
    FR: Future<Output = ApiResult<R>>,
    FO: Future<Output = ApiResult<O>>,
{
    let (required, optional) = tokio::join!(required, optional);
    let required = required?;
    Ok((required, Optional::from_result(optional_operation, optional)))
}
