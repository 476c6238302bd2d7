use std::sync::Arc;

use stegroup_api_models::Aggregation;
use stegroup_console::{AggregationFilter, AggregationsPage, Window};

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_aggregations;

pub(crate) async fn handle_list(
    ctx: &AppContext,
    filter: AggregationFilter,
    output: OutputFormat,
) -> CliResult<()> {
    let page = AggregationsPage::open(Arc::clone(&ctx.api), &ctx.config, filter);
    let state = page.list().settled().await;
    if let Some(error) = &state.error {
        return Err(CliError::from_fetch(error, ctx.messages));
    }
    print_window(&state.window, output)
}

/// Regenerate every aggregation and print the resulting list.
pub(crate) async fn handle_group_all(ctx: &AppContext, output: OutputFormat) -> CliResult<()> {
    let page = AggregationsPage::open(
        Arc::clone(&ctx.api),
        &ctx.config,
        AggregationFilter::default(),
    );
    page.list().settled().await;
    page.group_all()
        .await
        .map_err(|err| CliError::from_action(&err, ctx.messages))?;
    print_window(&page.list().snapshot().window, output)
}

fn print_window(window: &Window<Aggregation>, output: OutputFormat) -> CliResult<()> {
    println!(
        "{}",
        render_aggregations(&window.items, window.total, output)?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use serde_json::json;
    use stegroup_api_models::GroupingRequest;
    use stegroup_client::SharedApi;
    use stegroup_test_support::FakeModerationApi;
    use stegroup_test_support::fixtures::{aggregation, catalog_items, saved_aggregation};

    use crate::commands::test_context::{fake_context, http_context};

    #[tokio::test]
    async fn list_sends_saved_only_and_limit() -> Result<()> {
        let server = MockServer::start_async().await;
        let saved = saved_aggregation(2, &catalog_items("Ozka", 1, 2));
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/grouping/aggregations")
                .query_param("saved_only", "true")
                .query_param("limit", "100");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([saved]));
        });

        let ctx = http_context(&server, true)?;
        let filter = AggregationFilter {
            saved_only: true,
            category_id: None,
        };
        handle_list(&ctx, filter, OutputFormat::Json)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn list_failure_is_reported() -> Result<()> {
        let fake = Arc::new(FakeModerationApi::new());
        fake.fail("list_aggregations", 500);
        let ctx = fake_context(fake, true)?;
        let err = handle_list(&ctx, AggregationFilter::default(), OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("list should fail"))?;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with(ctx.messages.aggregations_failed));
        Ok(())
    }

    #[tokio::test]
    async fn group_all_forces_regeneration() -> Result<()> {
        let server = MockServer::start_async().await;
        let members = catalog_items("Ozka", 1, 2);
        let request = serde_json::to_value(GroupingRequest::regenerate_all())?;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/grouping/aggregations");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        });
        let regroup = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/grouping/")
                .json_body(request);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "aggregations": [aggregation(1, &members)],
                    "total_groups": 1,
                    "total_items": 2
                }));
        });

        let ctx = http_context(&server, true)?;
        handle_group_all(&ctx, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        regroup.assert();
        Ok(())
    }

    #[tokio::test]
    async fn group_all_failure_is_reported() -> Result<()> {
        let fake = Arc::new(FakeModerationApi::with_catalog(catalog_items("Ozka", 1, 2)));
        fake.fail("perform_grouping", 500);
        let api: SharedApi = fake.clone();
        let ctx = fake_context(api, true)?;
        let err = handle_group_all(&ctx, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("regrouping should fail"))?;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with(ctx.messages.grouping_failed));
        assert_eq!(fake.call_count("perform_grouping"), 1);
        Ok(())
    }
}
