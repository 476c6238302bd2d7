//! Aggregation list screen (`/aggregations`).

use std::sync::Arc;

use stegroup_api_models::{AggregationId, GroupingRequest};
use stegroup_client::SharedApi;
use stegroup_config::ConsoleConfig;
use tracing::info;

use crate::error::{ActionError, ActionResult};
use crate::messages::Messages;
use crate::mutation::{self, ALREADY_SAVED, Confirmer, Outcome, UNKNOWN_ITEM};
use crate::query::{QueryController, Window};
use crate::sources::{AggregationFilter, AggregationSource};

/// Aggregation list with save, delete and regroup actions.
pub struct AggregationsPage {
    api: SharedApi,
    messages: &'static Messages,
    list: QueryController<AggregationSource>,
}

impl AggregationsPage {
    /// Open the screen and fetch the list with `filter`.
    #[must_use]
    pub fn open(api: SharedApi, config: &ConsoleConfig, filter: AggregationFilter) -> Self {
        let source = Arc::new(AggregationSource::new(Arc::clone(&api)));
        let list = QueryController::spawn(
            source,
            filter,
            config.aggregations_limit,
            config.debounce,
        );
        Self {
            api,
            messages: Messages::for_locale(config.locale),
            list,
        }
    }

    /// List controller.
    #[must_use]
    pub const fn list(&self) -> &QueryController<AggregationSource> {
        &self.list
    }

    /// Toggle the saved-only filter; refetches immediately.
    pub fn set_saved_only(&self, saved_only: bool) {
        let mut filter = self.list.snapshot().committed;
        filter.saved_only = saved_only;
        self.list.set_filter(filter);
    }

    /// Retry the last failed fetch.
    pub fn retry(&self) {
        self.list.retry();
    }

    /// Mark an aggregation as saved.
    ///
    /// # Errors
    /// Not offered for unknown or already saved rows; propagates service failures.
    pub async fn save(&self, id: AggregationId) -> ActionResult<Outcome> {
        let current = self.list.settled().await;
        let row = current
            .window
            .items
            .iter()
            .find(|aggregation| aggregation.id == id)
            .ok_or(ActionError::not_offered(UNKNOWN_ITEM))?;
        if row.is_saved {
            return Err(ActionError::not_offered(ALREADY_SAVED));
        }
        self.api
            .save_aggregation(id)
            .await
            .map_err(|source| ActionError::api("save_aggregation", source))?;
        info!(aggregation_id = %id, "aggregation saved");
        self.list.patch(move |window| {
            mutation::mark_saved_in(&mut window.items, id);
        });
        self.list.settled().await;
        Ok(Outcome::Applied)
    }

    /// Delete an aggregation after confirmation.
    ///
    /// # Errors
    /// Propagates service failures; the list is untouched in that case.
    pub async fn delete(
        &self,
        id: AggregationId,
        confirmer: &dyn Confirmer,
    ) -> ActionResult<Outcome> {
        if !confirmer.confirm(self.messages.confirm_delete) {
            return Ok(Outcome::Cancelled);
        }
        self.api
            .delete_aggregation(id)
            .await
            .map_err(|source| ActionError::api("delete_aggregation", source))?;
        info!(aggregation_id = %id, "aggregation deleted");
        self.list.patch(move |window| {
            if mutation::remove_aggregation(&mut window.items, id) {
                window.total = window.total.saturating_sub(1);
            }
        });
        self.list.settled().await;
        Ok(Outcome::Applied)
    }

    /// Regenerate every aggregation and replace the held list with the result.
    ///
    /// # Errors
    /// Propagates service failures; the list is untouched in that case.
    pub async fn group_all(&self) -> ActionResult<Outcome> {
        let response = self
            .api
            .perform_grouping(&GroupingRequest::regenerate_all())
            .await
            .map_err(|source| ActionError::api("perform_grouping", source))?;
        info!(
            groups = response.total_groups,
            items = response.total_items,
            "full regrouping completed"
        );
        self.list
            .patch(move |window| *window = Window::complete(response.aggregations));
        self.list.settled().await;
        Ok(Outcome::Applied)
    }
}
