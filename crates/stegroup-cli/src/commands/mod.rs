//! Command handlers grouped by console screen.

pub(crate) mod aggregation;
pub(crate) mod aggregations;
pub(crate) mod catalog;
pub(crate) mod navigate;

#[cfg(test)]
pub(crate) mod test_context {
    use std::sync::Arc;

    use anyhow::{Result, anyhow};
    use httpmock::MockServer;
    use stegroup_client::{HttpModerationApi, SharedApi};
    use stegroup_config::{ConsoleConfig, Locale};
    use stegroup_console::AutoConfirm;

    use crate::client::AppContext;

    pub(crate) fn config() -> Result<ConsoleConfig> {
        let mut config = ConsoleConfig::from_lookup(|_| None).map_err(|err| anyhow!(err.describe()))?;
        config.locale = Locale::En;
        Ok(config)
    }

    /// Context talking to `server` under `/api/v1`.
    pub(crate) fn http_context(server: &MockServer, answer: bool) -> Result<AppContext> {
        let mut config = config()?;
        config.api_url = server.url("/api/v1").parse()?;
        let api = HttpModerationApi::new(config.api_url.clone(), config.timeout, "cli-test")
            .map_err(|err| anyhow!(err.describe()))?;
        Ok(AppContext::with_api(
            Arc::new(api),
            config,
            Box::new(AutoConfirm(answer)),
        ))
    }

    /// Context backed by an in-memory service.
    pub(crate) fn fake_context(api: SharedApi, answer: bool) -> Result<AppContext> {
        Ok(AppContext::with_api(
            api,
            config()?,
            Box::new(AutoConfirm(answer)),
        ))
    }
}
