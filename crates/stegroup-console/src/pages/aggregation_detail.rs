//! Aggregation detail screen (`/aggregations/:id`).
//!
//! # Design
//! - The aggregation is required; the ratings summary is optional and may be
//!   [`Optional::Unavailable`] while the rest of the screen works.
//! - Removal and save patch the held record; reorder and add re-synchronize
//!   by reloading, since the server decides final positions.

use stegroup_api_models::{
    Aggregation, AggregationId, AggregationItemId, AggregationRatings, ItemId, RatingRequest,
};
use stegroup_client::SharedApi;
use stegroup_config::ConsoleConfig;
use tracing::{info, warn};

use crate::error::{ActionError, ActionResult};
use crate::messages::Messages;
use crate::mutation::{
    self, ALREADY_SAVED, Confirmer, MoveDirection, NOT_LOADED, Outcome, RATING_REQUIRED,
    UNKNOWN_ITEM,
};
use crate::plan::{Optional, load_with_optional};
use crate::query::FetchError;
use crate::routes::Route;

/// Pending rating input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingForm {
    /// Chosen score; 0 means none chosen.
    pub rating: u8,
    /// Free-text comment; blank is omitted from the request.
    pub comment: String,
}

impl RatingForm {
    /// Request body for the current input.
    ///
    /// # Errors
    /// Not offered without a score; scores above 5 are invalid.
    pub fn request(&self) -> ActionResult<RatingRequest> {
        match self.rating {
            0 => Err(ActionError::not_offered(RATING_REQUIRED)),
            1..=5 => Ok(RatingRequest {
                rating: self.rating,
                comment: Some(self.comment.trim())
                    .filter(|comment| !comment.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(ActionError::Validation {
                field: "rating",
                reason: "must be between 1 and 5",
            }),
        }
    }

    /// Back to `(0, "")`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One aggregation with its members and ratings.
pub struct AggregationDetailPage {
    api: SharedApi,
    messages: &'static Messages,
    id: AggregationId,
    aggregation: Option<Aggregation>,
    ratings: Optional<AggregationRatings>,
    error: Option<FetchError>,
    form: RatingForm,
}

impl AggregationDetailPage {
    /// Open the screen and load the aggregation and its ratings.
    pub async fn open(api: SharedApi, config: &ConsoleConfig, id: AggregationId) -> Self {
        let mut page = Self {
            api,
            messages: Messages::for_locale(config.locale),
            id,
            aggregation: None,
            ratings: Optional::Pending,
            error: None,
            form: RatingForm::default(),
        };
        page.reload().await;
        page
    }

    /// Identifier of the shown aggregation.
    #[must_use]
    pub const fn id(&self) -> AggregationId {
        self.id
    }

    /// Loaded aggregation.
    #[must_use]
    pub const fn aggregation(&self) -> Option<&Aggregation> {
        self.aggregation.as_ref()
    }

    /// Ratings summary state.
    #[must_use]
    pub const fn ratings(&self) -> &Optional<AggregationRatings> {
        &self.ratings
    }

    /// Failure of the last load.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Rating input.
    #[must_use]
    pub const fn form(&self) -> &RatingForm {
        &self.form
    }

    /// Editable rating input.
    pub const fn form_mut(&mut self) -> &mut RatingForm {
        &mut self.form
    }

    /// Fetch the aggregation and ratings again, concurrently.
    pub async fn reload(&mut self) {
        let api = &self.api;
        let loaded = load_with_optional(
            api.get_aggregation(self.id),
            "get_ratings",
            api.get_ratings(self.id),
        )
        .await;
        match loaded {
            Ok((aggregation, ratings)) => {
                self.aggregation = Some(aggregation);
                self.ratings = ratings;
                self.error = None;
            }
            Err(error) => {
                warn!(aggregation_id = %self.id, error = %error.describe(), "aggregation load failed");
                self.error = Some(FetchError::from(&error));
            }
        }
    }

    /// Mark the aggregation as saved.
    ///
    /// # Errors
    /// Not offered before load or when already saved; propagates service failures.
    pub async fn save(&mut self) -> ActionResult<Outcome> {
        let aggregation = self.loaded()?;
        if aggregation.is_saved {
            return Err(ActionError::not_offered(ALREADY_SAVED));
        }
        self.api
            .save_aggregation(self.id)
            .await
            .map_err(|source| ActionError::api("save_aggregation", source))?;
        info!(aggregation_id = %self.id, "aggregation saved");
        if let Some(aggregation) = self.aggregation.as_mut() {
            aggregation.is_saved = true;
        }
        Ok(Outcome::Applied)
    }

    /// Delete the aggregation after confirmation and leave for the list.
    ///
    /// # Errors
    /// Not offered before load; propagates service failures.
    pub async fn delete(&mut self, confirmer: &dyn Confirmer) -> ActionResult<Outcome> {
        self.loaded()?;
        if !confirmer.confirm(self.messages.confirm_delete) {
            return Ok(Outcome::Cancelled);
        }
        self.api
            .delete_aggregation(self.id)
            .await
            .map_err(|source| ActionError::api("delete_aggregation", source))?;
        info!(aggregation_id = %self.id, "aggregation deleted");
        Ok(Outcome::Navigate(Route::Aggregations))
    }

    /// Remove one membership row after confirmation.
    ///
    /// # Errors
    /// Not offered for rows not held locally; propagates service failures.
    pub async fn remove_item(
        &mut self,
        item: AggregationItemId,
        confirmer: &dyn Confirmer,
    ) -> ActionResult<Outcome> {
        let aggregation = self.loaded()?;
        if !aggregation.items.iter().any(|existing| existing.id == item) {
            return Err(ActionError::not_offered(UNKNOWN_ITEM));
        }
        if !confirmer.confirm(self.messages.confirm_remove_item) {
            return Ok(Outcome::Cancelled);
        }
        self.api
            .remove_item(self.id, item)
            .await
            .map_err(|source| ActionError::api("remove_item", source))?;
        info!(aggregation_id = %self.id, item_id = %item, "item removed from aggregation");
        if let Some(aggregation) = self.aggregation.as_mut() {
            mutation::remove_membership(aggregation, item);
        }
        Ok(Outcome::Applied)
    }

    /// Move a membership row one step and reload.
    ///
    /// # Errors
    /// Not offered at the list edges; propagates service failures.
    pub async fn move_item(
        &mut self,
        item: AggregationItemId,
        direction: MoveDirection,
    ) -> ActionResult<Outcome> {
        let aggregation = self.loaded()?;
        let new_order =
            mutation::move_target(&aggregation.items, item, direction).map_err(ActionError::not_offered)?;
        self.api
            .change_item_order(self.id, item, new_order)
            .await
            .map_err(|source| ActionError::api("change_item_order", source))?;
        info!(aggregation_id = %self.id, item_id = %item, new_order, "item order changed");
        self.reload().await;
        Ok(Outcome::Applied)
    }

    /// Add a catalog item and reload.
    ///
    /// # Errors
    /// Not offered before load; propagates service failures.
    pub async fn add_item(&mut self, ste: ItemId, order: Option<i32>) -> ActionResult<Outcome> {
        self.loaded()?;
        self.api
            .add_item(self.id, ste, order)
            .await
            .map_err(|source| ActionError::api("add_item", source))?;
        info!(aggregation_id = %self.id, ste_id = %ste, "item added to aggregation");
        self.reload().await;
        Ok(Outcome::Applied)
    }

    /// Submit the rating form, then refresh the ratings summary and copy its
    /// average onto the aggregation.
    ///
    /// # Errors
    /// Not offered without a score; propagates submission failures with the
    /// form kept.
    pub async fn submit_rating(&mut self) -> ActionResult<Outcome> {
        self.loaded()?;
        let request = self.form.request()?;
        self.api
            .submit_rating(self.id, &request)
            .await
            .map_err(|source| ActionError::api("submit_rating", source))?;
        info!(aggregation_id = %self.id, rating = request.rating, "rating submitted");
        self.form.reset();

        self.ratings = Optional::from_result("get_ratings", self.api.get_ratings(self.id).await);
        if let (Some(summary), Some(aggregation)) =
            (self.ratings.loaded(), self.aggregation.as_mut())
        {
            mutation::apply_rating_summary(aggregation, summary);
        }
        Ok(Outcome::Applied)
    }

    fn loaded(&self) -> ActionResult<&Aggregation> {
        self.aggregation
            .as_ref()
            .ok_or(ActionError::not_offered(NOT_LOADED))
    }
}
