//! Local patches applied after the server confirmed a change.
//!
//! Nothing here talks to the network. Pages call the service first and only
//! apply one of these functions once the call succeeded, so a failure leaves
//! the held state exactly as it was.

use stegroup_api_models::{Aggregation, AggregationId, AggregationItem, AggregationItemId, AggregationRatings};

use crate::routes::Route;

/// Reason used when a rating is submitted without a score.
pub const RATING_REQUIRED: &str = "rating required";
/// Reason used when saving an aggregation that is already saved.
pub const ALREADY_SAVED: &str = "already saved";
/// Reason used when a move would leave the list.
pub const MOVE_AT_EDGE: &str = "item already at edge";
/// Reason used when the target row is not held locally.
pub const UNKNOWN_ITEM: &str = "item not in aggregation";
/// Reason used when no aggregation has been loaded yet.
pub const NOT_LOADED: &str = "aggregation not loaded";

/// What a completed action asks the presentation layer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The change is reflected in local state.
    Applied,
    /// The user declined the confirmation; no request was made.
    Cancelled,
    /// The change succeeded and the user should be taken elsewhere.
    Navigate(Route),
}

/// Source of yes/no answers for destructive actions.
pub trait Confirmer: Send + Sync {
    /// Ask `prompt`; `true` proceeds.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmer with a fixed answer (`--yes`, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Direction of a one-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

/// Order to request for moving `item` one step, or why the move is not offered.
///
/// # Errors
/// Returns [`UNKNOWN_ITEM`] or [`MOVE_AT_EDGE`].
pub fn move_target(
    items: &[AggregationItem],
    item: AggregationItemId,
    direction: MoveDirection,
) -> Result<i32, &'static str> {
    let index = items
        .iter()
        .position(|candidate| candidate.id == item)
        .ok_or(UNKNOWN_ITEM)?;
    let current = items[index].order;
    match direction {
        MoveDirection::Up if index == 0 => Err(MOVE_AT_EDGE),
        MoveDirection::Down if index + 1 == items.len() => Err(MOVE_AT_EDGE),
        MoveDirection::Up => Ok(current - 1),
        MoveDirection::Down => Ok(current + 1),
    }
}

/// Drop the membership row `item` and recompute `items_count`.
///
/// Returns `false` when no row matched.
pub fn remove_membership(aggregation: &mut Aggregation, item: AggregationItemId) -> bool {
    let before = aggregation.items.len();
    aggregation.items.retain(|existing| existing.id != item);
    aggregation.items_count = u32::try_from(aggregation.items.len()).unwrap_or(u32::MAX);
    aggregation.items.len() != before
}

/// Flip `is_saved` on the matching aggregation of a list.
pub fn mark_saved_in(list: &mut [Aggregation], id: AggregationId) -> bool {
    list.iter_mut()
        .find(|aggregation| aggregation.id == id)
        .map(|aggregation| aggregation.is_saved = true)
        .is_some()
}

/// Remove the matching aggregation from a list.
pub fn remove_aggregation(list: &mut Vec<Aggregation>, id: AggregationId) -> bool {
    let before = list.len();
    list.retain(|aggregation| aggregation.id != id);
    list.len() != before
}

/// Copy the freshly fetched average onto the aggregation.
pub fn apply_rating_summary(aggregation: &mut Aggregation, summary: &AggregationRatings) {
    aggregation.rating = summary.average_rating;
}
