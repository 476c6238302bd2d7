//! Shared context, error types, and the confirmation prompt for the CLI.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::anyhow;
use stegroup_client::{HttpModerationApi, SharedApi};
use stegroup_config::{ConfigError, ConsoleConfig};
use stegroup_console::{ActionError, AutoConfirm, Confirmer, FetchError, Messages};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }

    /// Actions refused before any request are validation errors; service
    /// failures keep their diagnostic after the localized text.
    pub(crate) fn from_action(error: &ActionError, messages: &Messages) -> Self {
        let message = error.message(messages);
        match error {
            ActionError::Api { .. } => Self::failure(anyhow!("{message} ({})", error.describe())),
            ActionError::NotOffered { .. } | ActionError::Validation { .. } => {
                Self::validation(message)
            }
        }
    }

    pub(crate) fn from_fetch(error: &FetchError, messages: &Messages) -> Self {
        let message = messages.operation_failed(error.operation.unwrap_or_default());
        Self::failure(anyhow!("{message} ({})", error.detail))
    }

    pub(crate) fn from_config(error: &ConfigError) -> Self {
        Self::validation(error.describe())
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) api: SharedApi,
    pub(crate) config: ConsoleConfig,
    pub(crate) messages: &'static Messages,
    pub(crate) confirmer: Box<dyn Confirmer>,
}

impl AppContext {
    /// Build the HTTP backend tagged with `request_id`.
    pub(crate) fn connect(
        config: ConsoleConfig,
        request_id: &str,
        assume_yes: bool,
    ) -> CliResult<Self> {
        let api = HttpModerationApi::new(config.api_url.clone(), config.timeout, request_id)
            .map_err(|err| CliError::failure(anyhow!(err.describe())))?;
        let confirmer: Box<dyn Confirmer> = if assume_yes {
            Box::new(AutoConfirm(true))
        } else {
            Box::new(PromptConfirmer)
        };
        Ok(Self::with_api(Arc::new(api), config, confirmer))
    }

    pub(crate) fn with_api(
        api: SharedApi,
        config: ConsoleConfig,
        confirmer: Box<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            messages: Messages::for_locale(config.locale),
            config,
            confirmer,
        }
    }
}

/// Asks on the terminal; declines when stdin is not interactive.
pub(crate) struct PromptConfirmer;

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return false;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "д" | "да"
    )
}
