//! Typed console configuration.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use stegroup_telemetry::LogFormat;
use url::Url;

/// Language used for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Russian, the language moderators work in.
    #[default]
    Ru,
    /// English.
    En,
}

impl Locale {
    /// Short language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }
}

impl Display for Locale {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let primary = normalized.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            _ => Err(format!("unsupported locale '{value}'")),
        }
    }
}

/// Settings shared by every console surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the grouping service, including the API prefix.
    pub api_url: Url,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Search debounce interval.
    pub debounce: Duration,
    /// Catalog search page size.
    pub search_page_size: u32,
    /// Aggregation list limit.
    pub aggregations_limit: u32,
    /// Message language.
    pub locale: Locale,
    /// Log output format; `None` infers from the build profile.
    pub log_format: Option<LogFormat>,
}

impl ConsoleConfig {
    /// Log format to install, resolving the build-profile default.
    #[must_use]
    pub fn effective_log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(LogFormat::infer)
    }
}
