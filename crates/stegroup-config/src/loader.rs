//! Environment loading for [`ConsoleConfig`].
//!
//! # Design
//! - Parsing goes through a lookup closure so tests never touch the process env.
//! - Unset and blank variables fall back to defaults; malformed ones are errors.
//! - Range checks mirror the backend limits so the console never sends a
//!   request the server would reject with 422.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use stegroup_telemetry::LogFormat;
use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConsoleConfig, Locale};

/// Base URL of the grouping service.
pub const ENV_API_URL: &str = "STEGROUP_API_URL";
/// HTTP timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "STEGROUP_HTTP_TIMEOUT_SECS";
/// Search debounce in milliseconds.
pub const ENV_DEBOUNCE_MS: &str = "STEGROUP_SEARCH_DEBOUNCE_MS";
/// Catalog search page size.
pub const ENV_SEARCH_PAGE_SIZE: &str = "STEGROUP_SEARCH_PAGE_SIZE";
/// Aggregation list limit.
pub const ENV_AGGREGATIONS_LIMIT: &str = "STEGROUP_AGGREGATIONS_LIMIT";
/// Message language.
pub const ENV_LOCALE: &str = "STEGROUP_LOCALE";
/// Log output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "STEGROUP_LOG_FORMAT";

impl ConsoleConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidField`] for the first malformed variable.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidField`] for the first malformed variable.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = parse_api_url(
            ENV_API_URL,
            read(ENV_API_URL).as_deref().unwrap_or(defaults::API_URL),
        )?;
        let timeout = read(ENV_TIMEOUT_SECS)
            .map(|raw| parse_number::<u64>(ENV_TIMEOUT_SECS, &raw, &(1..=600)))
            .transpose()?
            .map_or(defaults::HTTP_TIMEOUT, Duration::from_secs);
        let debounce = read(ENV_DEBOUNCE_MS)
            .map(|raw| parse_number::<u64>(ENV_DEBOUNCE_MS, &raw, &(0..=10_000)))
            .transpose()?
            .map_or(defaults::SEARCH_DEBOUNCE, Duration::from_millis);
        let search_page_size = read(ENV_SEARCH_PAGE_SIZE)
            .map(|raw| {
                parse_number(ENV_SEARCH_PAGE_SIZE, &raw, &defaults::SEARCH_PAGE_SIZE_RANGE)
            })
            .transpose()?
            .unwrap_or(defaults::SEARCH_PAGE_SIZE);
        let aggregations_limit = read(ENV_AGGREGATIONS_LIMIT)
            .map(|raw| {
                parse_number(
                    ENV_AGGREGATIONS_LIMIT,
                    &raw,
                    &defaults::AGGREGATIONS_LIMIT_RANGE,
                )
            })
            .transpose()?
            .unwrap_or(defaults::AGGREGATIONS_LIMIT);
        let locale = read(ENV_LOCALE)
            .map(|raw| parse_named::<Locale>(ENV_LOCALE, raw, "unsupported locale"))
            .transpose()?
            .unwrap_or_default();
        let log_format = read(ENV_LOG_FORMAT)
            .map(|raw| parse_named::<LogFormat>(ENV_LOG_FORMAT, raw, "unknown log format"))
            .transpose()?;

        let config = Self {
            api_url,
            timeout,
            debounce,
            search_page_size,
            aggregations_limit,
            locale,
            log_format,
        };
        tracing::debug!(
            api_url = %config.api_url,
            locale = %config.locale,
            search_page_size = config.search_page_size,
            "console configuration loaded"
        );
        Ok(config)
    }
}

/// Validate a service base URL.
///
/// # Errors
/// Rejects unparsable URLs and non-HTTP schemes.
pub fn parse_api_url(field: &'static str, raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidField {
        field,
        reason: "must be an absolute URL",
        value: raw.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field,
            reason: "scheme must be http or https",
            value: raw.to_string(),
        });
    }
    Ok(url)
}

fn parse_number<T>(field: &'static str, raw: &str, range: &RangeInclusive<T>) -> ConfigResult<T>
where
    T: FromStr + PartialOrd,
{
    let value = raw.parse::<T>().map_err(|_| ConfigError::InvalidField {
        field,
        reason: "must be a non-negative integer",
        value: raw.to_string(),
    })?;
    if !range.contains(&value) {
        return Err(ConfigError::InvalidField {
            field,
            reason: "out of accepted range",
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_named<T>(field: &'static str, raw: String, reason: &'static str) -> ConfigResult<T>
where
    T: FromStr,
{
    raw.parse::<T>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            reason,
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> ConfigResult<ConsoleConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        ConsoleConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() -> ConfigResult<()> {
        let config = load(&[])?;
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8000/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.search_page_size, 20);
        assert_eq!(config.aggregations_limit, 100);
        assert_eq!(config.locale, Locale::Ru);
        assert_eq!(config.log_format, None);
        Ok(())
    }

    #[test]
    fn overrides_are_applied() -> ConfigResult<()> {
        let config = load(&[
            (ENV_API_URL, "https://moderation.example/api/v1"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_DEBOUNCE_MS, "0"),
            (ENV_SEARCH_PAGE_SIZE, "50"),
            (ENV_AGGREGATIONS_LIMIT, "500"),
            (ENV_LOCALE, "en"),
            (ENV_LOG_FORMAT, "json"),
        ])?;
        assert_eq!(config.api_url.host_str(), Some("moderation.example"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.debounce, Duration::ZERO);
        assert_eq!(config.search_page_size, 50);
        assert_eq!(config.aggregations_limit, 500);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.effective_log_format(), LogFormat::Json);
        Ok(())
    }

    #[test]
    fn blank_values_fall_back_to_defaults() -> ConfigResult<()> {
        let config = load(&[(ENV_SEARCH_PAGE_SIZE, "   "), (ENV_LOCALE, "")])?;
        assert_eq!(config.search_page_size, 20);
        assert_eq!(config.locale, Locale::Ru);
        Ok(())
    }

    #[test]
    fn page_size_above_backend_limit_is_rejected() {
        let err = load(&[(ENV_SEARCH_PAGE_SIZE, "101")]).err();
        assert_eq!(
            err,
            Some(ConfigError::InvalidField {
                field: ENV_SEARCH_PAGE_SIZE,
                reason: "out of accepted range",
                value: "101".into(),
            })
        );
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = load(&[(ENV_AGGREGATIONS_LIMIT, "many")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField { field: ENV_AGGREGATIONS_LIMIT, .. })
        ));

        let err = load(&[(ENV_API_URL, "ftp://files.example")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField { reason: "scheme must be http or https", .. })
        ));

        let err = load(&[(ENV_LOCALE, "fr")]).err();
        assert!(err.is_some_and(|err| err.describe().contains("STEGROUP_LOCALE='fr'")));
    }
}
