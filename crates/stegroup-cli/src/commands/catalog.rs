use std::sync::Arc;

use anyhow::anyhow;
use stegroup_api_models::ItemId;
use stegroup_console::{ItemPage, SearchPage, Selection};

use crate::cli::{GroupArgs, OutputFormat, SearchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::navigate::follow;
use crate::output::{render_item, render_search};

pub(crate) async fn handle_search(
    ctx: &AppContext,
    args: SearchArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let page = SearchPage::open_at(
        Arc::clone(&ctx.api),
        &ctx.config,
        args.query.unwrap_or_default(),
        args.page,
    );
    let state = page.results().settled().await;
    if let Some(error) = &state.error {
        return Err(CliError::from_fetch(error, ctx.messages));
    }
    println!(
        "{}",
        render_search(&state.window.items, state.pagination(), output)?
    );
    Ok(())
}

pub(crate) async fn handle_item(ctx: &AppContext, id: ItemId, output: OutputFormat) -> CliResult<()> {
    let page = ItemPage::open(Arc::clone(&ctx.api), id).await;
    if let Some(error) = page.error() {
        return Err(CliError::from_fetch(error, ctx.messages));
    }
    let item = page
        .item()
        .ok_or_else(|| CliError::failure(anyhow!("item {id} was not loaded")))?;
    println!("{}", render_item(item, &page.characteristics(), output)?);
    Ok(())
}

pub(crate) async fn handle_group(
    ctx: &AppContext,
    args: GroupArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut selection = Selection::default();
    for id in args.ids {
        selection.select(ItemId(id));
    }
    let outcome = selection
        .group(&ctx.api)
        .await
        .map_err(|err| CliError::from_action(&err, ctx.messages))?;
    follow(ctx, outcome, output).await
}
