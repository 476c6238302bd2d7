use std::sync::Arc;

use anyhow::anyhow;
use stegroup_api_models::{AggregationId, AggregationItemId, ItemId};
use stegroup_console::{ActionError, AggregationDetailPage, Optional, Outcome};

use crate::cli::{AddItemArgs, MoveArgs, OutputFormat, RateArgs, RemoveItemArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::navigate::follow;
use crate::output::{render_aggregation, render_ratings};

async fn open(ctx: &AppContext, id: AggregationId) -> CliResult<AggregationDetailPage> {
    let page = AggregationDetailPage::open(Arc::clone(&ctx.api), &ctx.config, id).await;
    if let Some(error) = page.error() {
        return Err(CliError::from_fetch(error, ctx.messages));
    }
    Ok(page)
}

fn print_page(
    ctx: &AppContext,
    page: &AggregationDetailPage,
    output: OutputFormat,
) -> CliResult<()> {
    let aggregation = page
        .aggregation()
        .ok_or_else(|| CliError::failure(anyhow!("aggregation {} was not loaded", page.id())))?;
    println!(
        "{}",
        render_aggregation(aggregation, page.ratings(), ctx.messages, output)?
    );
    Ok(())
}

/// Print the page after an applied change; other outcomes go through [`follow`].
async fn settle(
    ctx: &AppContext,
    page: &AggregationDetailPage,
    result: Result<Outcome, ActionError>,
    output: OutputFormat,
) -> CliResult<()> {
    match result.map_err(|err| CliError::from_action(&err, ctx.messages))? {
        Outcome::Applied => print_page(ctx, page, output),
        outcome => follow(ctx, outcome, output).await,
    }
}

pub(crate) async fn handle_show(
    ctx: &AppContext,
    id: AggregationId,
    output: OutputFormat,
) -> CliResult<()> {
    let page = open(ctx, id).await?;
    print_page(ctx, &page, output)
}

pub(crate) async fn handle_save(ctx: &AppContext, id: AggregationId) -> CliResult<()> {
    let mut page = open(ctx, id).await?;
    page.save()
        .await
        .map_err(|err| CliError::from_action(&err, ctx.messages))?;
    println!("aggregation {id} saved");
    Ok(())
}

pub(crate) async fn handle_delete(
    ctx: &AppContext,
    id: AggregationId,
    output: OutputFormat,
) -> CliResult<()> {
    let mut page = open(ctx, id).await?;
    let outcome = page
        .delete(ctx.confirmer.as_ref())
        .await
        .map_err(|err| CliError::from_action(&err, ctx.messages))?;
    follow(ctx, outcome, output).await
}

pub(crate) async fn handle_remove_item(
    ctx: &AppContext,
    args: RemoveItemArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut page = open(ctx, AggregationId(args.aggregation)).await?;
    let result = page
        .remove_item(AggregationItemId(args.item), ctx.confirmer.as_ref())
        .await;
    settle(ctx, &page, result, output).await
}

pub(crate) async fn handle_add_item(
    ctx: &AppContext,
    args: AddItemArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut page = open(ctx, AggregationId(args.aggregation)).await?;
    let result = page.add_item(ItemId(args.item), args.order).await;
    settle(ctx, &page, result, output).await
}

pub(crate) async fn handle_move(
    ctx: &AppContext,
    args: MoveArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let (aggregation, item) = args.ids();
    let mut page = open(ctx, aggregation).await?;
    let result = page.move_item(item, args.direction.into()).await;
    settle(ctx, &page, result, output).await
}

pub(crate) async fn handle_rate(
    ctx: &AppContext,
    args: RateArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut page = open(ctx, AggregationId(args.aggregation)).await?;
    let form = page.form_mut();
    form.rating = args.rating;
    form.comment = args.comment.unwrap_or_default();
    page.submit_rating()
        .await
        .map_err(|err| CliError::from_action(&err, ctx.messages))?;
    match page.ratings().loaded() {
        Some(summary) => println!("{}", render_ratings(summary, output)?),
        None => eprintln!("{}", ctx.messages.ratings_unavailable),
    }
    Ok(())
}

pub(crate) async fn handle_ratings(
    ctx: &AppContext,
    id: AggregationId,
    output: OutputFormat,
) -> CliResult<()> {
    let page = open(ctx, id).await?;
    match page.ratings() {
        Optional::Loaded(summary) => {
            println!("{}", render_ratings(summary, output)?);
            Ok(())
        }
        Optional::Unavailable(error) => Err(CliError::from_fetch(error, ctx.messages)),
        Optional::Pending => Err(CliError::failure(anyhow!(
            "ratings for aggregation {id} were not requested"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use stegroup_api_models::RatingRequest;
    use stegroup_client::SharedApi;
    use stegroup_test_support::fixtures::{aggregation, catalog_items, saved_aggregation};
    use stegroup_test_support::{Call, FakeModerationApi};

    use crate::cli::Direction;
    use crate::commands::test_context::{fake_context, http_context};

    const GROUP: AggregationId = AggregationId(4);

    fn seeded() -> Arc<FakeModerationApi> {
        let catalog = catalog_items("Ozka", 1, 5);
        let fake = Arc::new(FakeModerationApi::with_catalog(catalog.clone()));
        fake.insert_aggregation(aggregation(4, &catalog[0..3]));
        fake
    }

    fn context(fake: &Arc<FakeModerationApi>, answer: bool) -> Result<AppContext> {
        let api: SharedApi = fake.clone();
        fake_context(api, answer)
    }

    #[tokio::test]
    async fn remove_item_deletes_membership_row_over_http() -> Result<()> {
        let server = MockServer::start_async().await;
        let group = aggregation(4, &catalog_items("Ozka", 1, 3));
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/grouping/aggregations/4");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!(group));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/ratings/aggregations/4");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "aggregation_id": 4,
                    "average_rating": null,
                    "ratings_count": 0,
                    "ratings": []
                }));
        });
        let removal = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/v1/aggregations/4/items/401");
            then.status(204);
        });

        let ctx = http_context(&server, true)?;
        let args = RemoveItemArgs {
            aggregation: 4,
            item: 401,
        };
        handle_remove_item(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        removal.assert();
        Ok(())
    }

    #[tokio::test]
    async fn declined_removal_sends_nothing() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, false)?;
        let args = RemoveItemArgs {
            aggregation: 4,
            item: 401,
        };
        handle_remove_item(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(fake.call_count("remove_item"), 0);
        assert_eq!(
            fake.aggregation(GROUP).map(|group| group.items.len()),
            Some(3)
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_row_is_not_offered() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = RemoveItemArgs {
            aggregation: 4,
            item: 1,
        };
        let err = handle_remove_item(&ctx, args, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("catalog id is not a membership row"))?;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fake.call_count("remove_item"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn move_at_edge_is_a_validation_error() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = MoveArgs {
            aggregation: 4,
            item: 400,
            direction: Direction::Up,
        };
        let err = handle_move(&ctx, args, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("first row cannot move up"))?;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fake.call_count("change_item_order"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn move_down_requests_next_position() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = MoveArgs {
            aggregation: 4,
            item: 400,
            direction: Direction::Down,
        };
        handle_move(&ctx, args, OutputFormat::Json)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(fake.calls().contains(&Call::ChangeOrder {
            aggregation: GROUP,
            item: AggregationItemId(400),
            new_order: 1,
        }));
        Ok(())
    }

    #[tokio::test]
    async fn add_item_passes_requested_order() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = AddItemArgs {
            aggregation: 4,
            item: 5,
            order: Some(0),
        };
        handle_add_item(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(fake.calls().contains(&Call::AddItem {
            aggregation: GROUP,
            item: ItemId(5),
            order: Some(0),
        }));
        Ok(())
    }

    #[tokio::test]
    async fn rate_submits_trimmed_comment() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = RateArgs {
            aggregation: 4,
            rating: 5,
            comment: Some("  exact duplicates ".into()),
        };
        handle_rate(&ctx, args, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(fake.calls().contains(&Call::SubmitRating(
            GROUP,
            RatingRequest {
                rating: 5,
                comment: Some("exact duplicates".into()),
            }
        )));
        Ok(())
    }

    #[tokio::test]
    async fn rate_without_score_never_reaches_the_server() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        let args = RateArgs {
            aggregation: 4,
            rating: 0,
            comment: None,
        };
        let err = handle_rate(&ctx, args, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("score is required"))?;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), ctx.messages.rating_required);
        assert_eq!(fake.call_count("submit_rating"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_ratings_fail_the_ratings_command_only() -> Result<()> {
        let fake = seeded();
        fake.fail("get_ratings", 503);
        let ctx = context(&fake, true)?;

        assert!(handle_show(&ctx, GROUP, OutputFormat::Table).await.is_ok());
        let err = handle_ratings(&ctx, GROUP, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("ratings should be unavailable"))?;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with(ctx.messages.ratings_unavailable));
        Ok(())
    }

    #[tokio::test]
    async fn saving_a_saved_aggregation_is_refused() -> Result<()> {
        let catalog = catalog_items("Ozka", 1, 2);
        let fake = Arc::new(FakeModerationApi::with_catalog(catalog.clone()));
        fake.insert_aggregation(saved_aggregation(4, &catalog));
        let ctx = context(&fake, true)?;
        let err = handle_save(&ctx, GROUP)
            .await
            .err()
            .ok_or_else(|| anyhow!("already saved"))?;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fake.call_count("save_aggregation"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_lists_remaining_aggregations() -> Result<()> {
        let fake = seeded();
        let ctx = context(&fake, true)?;
        handle_delete(&ctx, GROUP, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(fake.aggregation(GROUP).is_none());
        assert_eq!(fake.call_count("list_aggregations"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_aggregation_is_a_failure() -> Result<()> {
        let fake = Arc::new(FakeModerationApi::new());
        let ctx = context(&fake, true)?;
        let err = handle_show(&ctx, AggregationId(99), OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("aggregation should be missing"))?;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with(ctx.messages.aggregation_failed));
        Ok(())
    }
}
