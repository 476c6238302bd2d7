//! Catalog search screen (`/`).

use std::collections::BTreeSet;
use std::sync::Arc;

use stegroup_api_models::{GroupingRequest, ItemId};
use stegroup_client::SharedApi;
use stegroup_config::ConsoleConfig;
use tracing::info;

use crate::error::{ActionError, ActionResult};
use crate::mutation::Outcome;
use crate::query::QueryController;
use crate::routes::Route;
use crate::sources::CatalogSource;

/// Catalog items picked for grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<ItemId>,
}

impl Selection {
    /// Toggle `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id)
        }
    }

    /// Add `id` regardless of its current state.
    pub fn select(&mut self, id: ItemId) {
        self.ids.insert(id);
    }

    /// Selected identifiers in ascending order.
    #[must_use]
    pub const fn ids(&self) -> &BTreeSet<ItemId> {
        &self.ids
    }

    /// Run the grouping for the selection and clear it.
    ///
    /// # Errors
    /// Rejects an empty selection without a request; propagates service
    /// failures with the selection kept.
    pub async fn group(&mut self, api: &SharedApi) -> ActionResult<Outcome> {
        if self.ids.is_empty() {
            return Err(ActionError::Validation {
                field: "ste_ids",
                reason: "empty selection",
            });
        }
        let request = GroupingRequest::for_items(self.ids.iter().copied().collect());
        let response = api
            .perform_grouping(&request)
            .await
            .map_err(|source| ActionError::api("perform_grouping", source))?;
        info!(
            selected = self.ids.len(),
            groups = response.total_groups,
            "grouping of selection completed"
        );
        self.ids.clear();
        Ok(Outcome::Navigate(Route::Aggregations))
    }
}

/// Search results plus the selection used for grouping.
pub struct SearchPage {
    api: SharedApi,
    results: QueryController<CatalogSource>,
    selection: Selection,
}

impl SearchPage {
    /// Open the screen and fetch page 1 of `query`.
    #[must_use]
    pub fn open(api: SharedApi, config: &ConsoleConfig, query: impl Into<String>) -> Self {
        Self::open_at(api, config, query, 1)
    }

    /// Open the screen directly on `page` of `query`.
    #[must_use]
    pub fn open_at(
        api: SharedApi,
        config: &ConsoleConfig,
        query: impl Into<String>,
        page: u32,
    ) -> Self {
        let source = Arc::new(CatalogSource::new(Arc::clone(&api)));
        let results = QueryController::spawn_at(
            source,
            query.into(),
            page,
            config.search_page_size,
            config.debounce,
        );
        Self {
            api,
            results,
            selection: Selection::default(),
        }
    }

    /// Result list controller.
    #[must_use]
    pub const fn results(&self) -> &QueryController<CatalogSource> {
        &self.results
    }

    /// Search text changed (debounced).
    pub fn type_query(&self, text: impl Into<String>) {
        self.results.edit(text.into());
    }

    /// Jump to `page`.
    pub fn go_to_page(&self, page: u32) {
        self.results.set_page(page);
    }

    /// Retry the last failed fetch.
    pub fn retry(&self) {
        self.results.retry();
    }

    /// Toggle `id` in the selection; returns whether it is now selected.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        self.selection.toggle(id)
    }

    /// Current selection.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<ItemId> {
        self.selection.ids()
    }

    /// Group the selected items and move to the aggregation list.
    ///
    /// # Errors
    /// See [`Selection::group`].
    pub async fn group_selected(&mut self) -> ActionResult<Outcome> {
        self.selection.group(&self.api).await
    }
}
