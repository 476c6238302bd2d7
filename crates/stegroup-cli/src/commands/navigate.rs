use stegroup_console::{AggregationFilter, Outcome, Route};
use tracing::debug;

use crate::cli::{OutputFormat, SearchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{aggregation, aggregations, catalog};

/// Render the screen behind a console path.
pub(crate) async fn handle_open(ctx: &AppContext, path: &str, output: OutputFormat) -> CliResult<()> {
    show(ctx, Route::parse(path), output).await
}

/// Act on an action outcome: navigation renders the target screen.
pub(crate) async fn follow(ctx: &AppContext, outcome: Outcome, output: OutputFormat) -> CliResult<()> {
    match outcome {
        Outcome::Navigate(route) => show(ctx, route, output).await,
        Outcome::Applied => Ok(()),
        Outcome::Cancelled => {
            eprintln!("{}", ctx.messages.cancelled);
            Ok(())
        }
    }
}

async fn show(ctx: &AppContext, route: Route, output: OutputFormat) -> CliResult<()> {
    debug!(route = %route, "rendering screen");
    match route {
        Route::Search => {
            let args = SearchArgs {
                query: None,
                page: 1,
            };
            catalog::handle_search(ctx, args, output).await
        }
        Route::Item { id } => catalog::handle_item(ctx, id, output).await,
        Route::Aggregations => {
            aggregations::handle_list(ctx, AggregationFilter::default(), output).await
        }
        Route::AggregationDetail { id } => aggregation::handle_show(ctx, id, output).await,
        Route::NotFound => Err(CliError::validation(ctx.messages.not_found)),
    }
}
