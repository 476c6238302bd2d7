//! Session-level span helpers.

use tracing::Span;

use crate::init::build_sha;

/// Span wrapping one console session (a CLI invocation or a UI lifetime).
///
/// The `request_id` matches the `x-request-id` header sent with every backend
/// call so client and server logs line up.
#[must_use]
pub fn session_span(request_id: &str, command: &str) -> Span {
    tracing::info_span!(
        "session",
        request_id = %request_id,
        command = %command,
        build_sha = %build_sha()
    )
}
