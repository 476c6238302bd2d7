//! Service operations exposed to the console layer.

use std::sync::Arc;

use async_trait::async_trait;
use stegroup_api_models::{
    Aggregation, AggregationId, AggregationItemId, AggregationListQuery, AggregationRatings,
    CatalogItem, CatalogSearchQuery, GroupingRequest, GroupingResponse, ItemId, RatingRequest,
    SearchResponse,
};

use crate::error::ApiResult;

/// Every backend call the moderation console performs.
///
/// Each method is a single best-effort request; callers decide what to do
/// with failures.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// `GET /ste/`: search the catalog.
    async fn search_items(&self, query: &CatalogSearchQuery) -> ApiResult<SearchResponse>;

    /// `GET /ste/{id}`: fetch one catalog item.
    async fn get_item(&self, id: ItemId) -> ApiResult<CatalogItem>;

    /// `POST /grouping/`: run the backend grouping.
    async fn perform_grouping(&self, request: &GroupingRequest) -> ApiResult<GroupingResponse>;

    /// `GET /grouping/aggregations`: list aggregations.
    async fn list_aggregations(&self, query: &AggregationListQuery)
    -> ApiResult<Vec<Aggregation>>;

    /// `GET /grouping/aggregations/{id}`: fetch one aggregation with its items.
    async fn get_aggregation(&self, id: AggregationId) -> ApiResult<Aggregation>;

    /// `POST /aggregations/{id}/items/{steId}`: add a catalog item to an aggregation.
    async fn add_item(
        &self,
        aggregation: AggregationId,
        item: ItemId,
        order: Option<i32>,
    ) -> ApiResult<()>;

    /// `DELETE /aggregations/{id}/items/{itemId}`: remove a membership row.
    async fn remove_item(&self, aggregation: AggregationId, item: AggregationItemId)
    -> ApiResult<()>;

    /// `PUT /aggregations/{id}/items/{itemId}/order`: request a new position.
    async fn change_item_order(
        &self,
        aggregation: AggregationId,
        item: AggregationItemId,
        new_order: i32,
    ) -> ApiResult<()>;

    /// `POST /aggregations/{id}/save`: mark an aggregation as canonical.
    async fn save_aggregation(&self, id: AggregationId) -> ApiResult<()>;

    /// `DELETE /aggregations/{id}`: destroy an aggregation.
    async fn delete_aggregation(&self, id: AggregationId) -> ApiResult<()>;

    /// `POST /ratings/aggregations/{id}`: append a rating.
    async fn submit_rating(&self, id: AggregationId, request: &RatingRequest) -> ApiResult<()>;

    /// `GET /ratings/aggregations/{id}`: ratings summary.
    async fn get_ratings(&self, id: AggregationId) -> ApiResult<AggregationRatings>;
}

/// Shared reference to the service backend.
pub type SharedApi = Arc<dyn ModerationApi>;
