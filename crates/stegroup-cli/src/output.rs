//! Output renderers and formatting helpers for CLI commands.
//!
//! Renderers return the text instead of printing so handlers stay the only
//! place that writes to stdout.

use anyhow::anyhow;
use serde::Serialize;
use stegroup_api_models::{Aggregation, AggregationRatings, CatalogItem};
use stegroup_console::{Messages, Optional, Pagination};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

#[derive(Serialize)]
struct SearchView<'a> {
    items: &'a [CatalogItem],
    total: u64,
    page: u32,
    page_count: u64,
}

#[derive(Serialize)]
struct AggregationListView<'a> {
    aggregations: &'a [Aggregation],
    total: u64,
}

#[derive(Serialize)]
struct AggregationView<'a> {
    aggregation: &'a Aggregation,
    ratings: Option<&'a AggregationRatings>,
    ratings_unavailable: bool,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_search(
    items: &[CatalogItem],
    pagination: Pagination,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(&SearchView {
            items,
            total: pagination.total,
            page: pagination.page,
            page_count: pagination.page_count(),
        });
    }
    let mut lines = vec![format!(
        "{:>8} {:<14} {:<20} NAME",
        "ID", "STE", "MANUFACTURER"
    )];
    for item in items {
        lines.push(format!(
            "{:>8} {:<14} {:<20} {}",
            item.id.get(),
            item.ste_id,
            item.manufacturer.as_deref().unwrap_or("-"),
            item.name
        ));
    }
    if pagination.is_shown() {
        lines.push(format!(
            "page {}/{} ({} total)",
            pagination.page,
            pagination.page_count(),
            pagination.total
        ));
    } else {
        lines.push(format!("{} total", pagination.total));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_item(
    item: &CatalogItem,
    characteristics: &[(String, String)],
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(item);
    }
    let mut lines = vec![
        format!("id: {}", item.id),
        format!("ste: {}", item.ste_id),
        format!("name: {}", item.name),
    ];
    let optional = [
        ("manufacturer", &item.manufacturer),
        ("model", &item.model),
        ("country", &item.country),
        ("category", &item.category_name),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    if !characteristics.is_empty() {
        lines.push("characteristics:".to_string());
        for (name, value) in characteristics {
            lines.push(format!("  {name}: {value}"));
        }
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_aggregations(
    aggregations: &[Aggregation],
    total: u64,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(&AggregationListView {
            aggregations,
            total,
        });
    }
    let mut lines = vec![format!(
        "{:>6} {:>5} {:>6} {:<5} {:<8} NAME",
        "ID", "ITEMS", "RATING", "SAVED", "STATUS"
    )];
    for aggregation in aggregations {
        lines.push(format!(
            "{:>6} {:>5} {:>6} {:<5} {:<8} {}",
            aggregation.id.get(),
            aggregation.items_count,
            format_rating(aggregation.rating),
            yes_no(aggregation.is_saved),
            aggregation.status.as_str(),
            aggregation.display_name()
        ));
    }
    lines.push(format!("{total} total"));
    Ok(lines.join("\n"))
}

pub(crate) fn render_aggregation(
    aggregation: &Aggregation,
    ratings: &Optional<AggregationRatings>,
    messages: &Messages,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(&AggregationView {
            aggregation,
            ratings: ratings.loaded(),
            ratings_unavailable: ratings.is_unavailable(),
        });
    }
    let mut lines = vec![
        format!("id: {}", aggregation.id),
        format!("name: {}", aggregation.display_name()),
        format!("status: {}", aggregation.status.as_str()),
        format!("saved: {}", yes_no(aggregation.is_saved)),
        format!("rating: {}", format_rating(aggregation.rating)),
    ];
    if let Some(category) = &aggregation.category_name {
        lines.push(format!("category: {category}"));
    }
    lines.push(format!("items: {}", aggregation.items_count));
    lines.push(format!(
        "  {:>8} {:>5} {:>8} NAME",
        "ROW", "ORDER", "STE"
    ));
    for member in &aggregation.items {
        lines.push(format!(
            "  {:>8} {:>5} {:>8} {}",
            member.id.get(),
            member.order,
            member.ste.id.get(),
            member.ste.name
        ));
    }
    match ratings {
        Optional::Loaded(summary) => lines.extend(rating_lines(summary)),
        Optional::Unavailable(_) => lines.push(messages.ratings_unavailable.to_string()),
        Optional::Pending => {}
    }
    Ok(lines.join("\n"))
}

pub(crate) fn render_ratings(
    summary: &AggregationRatings,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(summary);
    }
    Ok(rating_lines(summary).join("\n"))
}

fn rating_lines(summary: &AggregationRatings) -> Vec<String> {
    let mut lines = vec![format!(
        "ratings: {} (average {})",
        summary.ratings_count,
        format_rating(summary.average_rating)
    )];
    for rating in &summary.ratings {
        let comment = rating.comment.as_deref().unwrap_or("");
        lines.push(format!("  {:.0} {comment}", rating.rating).trim_end().to_string());
    }
    lines
}

pub(crate) fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "-".to_string(), |value| format!("{value:.1}"))
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
