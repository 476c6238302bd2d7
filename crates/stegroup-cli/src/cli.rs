//! Argument parsing and command dispatch.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stegroup_api_models::{AggregationId, AggregationItemId, ItemId};
use stegroup_config::loader::parse_api_url;
use stegroup_config::{ConsoleConfig, Locale};
use stegroup_console::{AggregationFilter, MoveDirection};
use stegroup_telemetry::{LoggingConfig, init_logging, session_span};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{aggregation, aggregations, catalog, navigate};

const CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let request_id = Uuid::new_v4().to_string();
    let command_name = command_label(&cli.command);

    let ctx = match prepare(&cli, &request_id) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let span = session_span(&request_id, command_name);
    match dispatch(cli.command, &ctx, cli.output).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

fn prepare(cli: &Cli, request_id: &str) -> CliResult<AppContext> {
    let config = ConsoleConfig::from_env().map_err(|err| CliError::from_config(&err))?;
    let config = cli.apply_overrides(config);
    init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: config.effective_log_format(),
        ..LoggingConfig::default()
    })
    .map_err(CliError::failure)?;
    AppContext::connect(config, request_id, cli.yes)
}

pub(crate) async fn dispatch(
    command: Command,
    ctx: &AppContext,
    output: OutputFormat,
) -> CliResult<()> {
    match command {
        Command::Search(args) => catalog::handle_search(ctx, args, output).await,
        Command::Item(args) => catalog::handle_item(ctx, ItemId(args.id), output).await,
        Command::Group(args) if args.all => aggregations::handle_group_all(ctx, output).await,
        Command::Group(args) => catalog::handle_group(ctx, args, output).await,
        Command::Aggregations(args) => {
            aggregations::handle_list(ctx, args.filter(), output).await
        }
        Command::Aggregation(args) => aggregation::handle_show(ctx, args.id(), output).await,
        Command::Save(args) => aggregation::handle_save(ctx, args.id()).await,
        Command::Delete(args) => aggregation::handle_delete(ctx, args.id(), output).await,
        Command::RemoveItem(args) => aggregation::handle_remove_item(ctx, args, output).await,
        Command::AddItem(args) => aggregation::handle_add_item(ctx, args, output).await,
        Command::Move(args) => aggregation::handle_move(ctx, args, output).await,
        Command::Rate(args) => aggregation::handle_rate(ctx, args, output).await,
        Command::Ratings(args) => aggregation::handle_ratings(ctx, args.id(), output).await,
        Command::Open(args) => navigate::handle_open(ctx, &args.path, output).await,
    }
}

#[derive(Parser)]
#[command(
    name = "stegroup",
    about = "Moderation console for STE duplicate grouping"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, value_parser = parse_url, help = "Service base URL including the API prefix")]
    api_url: Option<Url>,
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u64).range(1..=600),
        help = "Per-request timeout in seconds"
    )]
    timeout: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, value_parser = parse_locale, help = "Message language (ru, en)")]
    locale: Option<Locale>,
    #[arg(
        long,
        short = 'y',
        global = true,
        help = "Answer yes to confirmation prompts"
    )]
    yes: bool,
    #[arg(
        long,
        global = true,
        env = "STEGROUP_LOG_LEVEL",
        default_value = CLI_LOG_LEVEL
    )]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn apply_overrides(&self, mut config: ConsoleConfig) -> ConsoleConfig {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        config
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search the catalog.
    Search(SearchArgs),
    /// Show one catalog item.
    Item(ItemArgs),
    /// List aggregations.
    Aggregations(AggregationsArgs),
    /// Show one aggregation with its members and ratings.
    Aggregation(AggregationArgs),
    /// Group the given items, or regenerate every aggregation with `--all`.
    Group(GroupArgs),
    /// Mark an aggregation as saved.
    Save(AggregationArgs),
    /// Delete an aggregation.
    Delete(AggregationArgs),
    /// Remove a membership row from an aggregation.
    RemoveItem(RemoveItemArgs),
    /// Add a catalog item to an aggregation.
    AddItem(AddItemArgs),
    /// Move a membership row one step.
    Move(MoveArgs),
    /// Rate an aggregation.
    Rate(RateArgs),
    /// Show the ratings of an aggregation.
    Ratings(AggregationArgs),
    /// Render the screen behind a console path such as `/aggregations/4`.
    Open(OpenArgs),
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    #[arg(help = "Search text; empty lists the whole catalog")]
    pub(crate) query: Option<String>,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) page: u32,
}

#[derive(Args)]
pub(crate) struct ItemArgs {
    #[arg(help = "Catalog item identifier")]
    pub(crate) id: i64,
}

#[derive(Args, Default)]
pub(crate) struct AggregationsArgs {
    #[arg(long, help = "Only aggregations marked as saved")]
    pub(crate) saved_only: bool,
    #[arg(long, help = "Restrict to one category")]
    pub(crate) category: Option<String>,
}

impl AggregationsArgs {
    pub(crate) fn filter(self) -> AggregationFilter {
        AggregationFilter {
            saved_only: self.saved_only,
            category_id: self.category,
        }
    }
}

#[derive(Args)]
pub(crate) struct AggregationArgs {
    #[arg(help = "Aggregation identifier")]
    pub(crate) id: i64,
}

impl AggregationArgs {
    pub(crate) const fn id(&self) -> AggregationId {
        AggregationId(self.id)
    }
}

#[derive(Args, Default)]
pub(crate) struct GroupArgs {
    #[arg(value_name = "ITEM_ID", help = "Catalog items to group together")]
    pub(crate) ids: Vec<i64>,
    #[arg(long, conflicts_with = "ids", help = "Regenerate every aggregation")]
    pub(crate) all: bool,
}

#[derive(Args)]
pub(crate) struct RemoveItemArgs {
    #[arg(help = "Aggregation identifier")]
    pub(crate) aggregation: i64,
    #[arg(help = "Membership row identifier (not the catalog item id)")]
    pub(crate) item: i64,
}

#[derive(Args)]
pub(crate) struct AddItemArgs {
    #[arg(help = "Aggregation identifier")]
    pub(crate) aggregation: i64,
    #[arg(help = "Catalog item identifier")]
    pub(crate) item: i64,
    #[arg(long, help = "Position to insert at; the server appends when omitted")]
    pub(crate) order: Option<i32>,
}

#[derive(Args)]
pub(crate) struct MoveArgs {
    #[arg(help = "Aggregation identifier")]
    pub(crate) aggregation: i64,
    #[arg(help = "Membership row identifier")]
    pub(crate) item: i64,
    #[arg(value_enum)]
    pub(crate) direction: Direction,
}

impl MoveArgs {
    pub(crate) const fn ids(&self) -> (AggregationId, AggregationItemId) {
        (AggregationId(self.aggregation), AggregationItemId(self.item))
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

#[derive(Args)]
pub(crate) struct RateArgs {
    #[arg(help = "Aggregation identifier")]
    pub(crate) aggregation: i64,
    #[arg(help = "Score from 1 to 5")]
    pub(crate) rating: u8,
    #[arg(long, help = "Optional comment")]
    pub(crate) comment: Option<String>,
}

#[derive(Args)]
pub(crate) struct OpenArgs {
    #[arg(help = "Console path, e.g. /ste/42")]
    pub(crate) path: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Search(_) => "search",
        Command::Item(_) => "item",
        Command::Aggregations(_) => "aggregations",
        Command::Aggregation(_) => "aggregation",
        Command::Group(_) => "group",
        Command::Save(_) => "save",
        Command::Delete(_) => "delete",
        Command::RemoveItem(_) => "remove-item",
        Command::AddItem(_) => "add-item",
        Command::Move(_) => "move",
        Command::Rate(_) => "rate",
        Command::Ratings(_) => "ratings",
        Command::Open(_) => "open",
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    parse_api_url("--api-url", input).map_err(|err| err.describe())
}

fn parse_locale(input: &str) -> Result<Locale, String> {
    input.parse()
}
