//! [`WindowSource`] implementations backed by the grouping service.

use async_trait::async_trait;
use stegroup_api_models::{Aggregation, AggregationListQuery, CatalogItem, CatalogSearchQuery};
use stegroup_client::{ApiResult, SharedApi};

use crate::query::{Window, WindowRequest, WindowSource};

/// Catalog search: free text, paged by offset.
pub struct CatalogSource {
    api: SharedApi,
}

impl CatalogSource {
    /// Source over `api`.
    #[must_use]
    pub const fn new(api: SharedApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WindowSource for CatalogSource {
    type Query = String;
    type Item = CatalogItem;

    async fn fetch(&self, request: WindowRequest<String>) -> ApiResult<Window<CatalogItem>> {
        let query = CatalogSearchQuery {
            query: Some(request.query).filter(|text| !text.is_empty()),
            category_id: None,
            limit: Some(request.limit),
            offset: Some(request.offset),
        };
        let response = self.api.search_items(&query).await?;
        Ok(Window {
            items: response.items,
            total: response.total,
        })
    }
}

/// Filters of the aggregation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationFilter {
    /// Only show saved aggregations.
    pub saved_only: bool,
    /// Restrict to one category.
    pub category_id: Option<String>,
}

/// Aggregation list: one window of up to `limit` rows, no offset.
pub struct AggregationSource {
    api: SharedApi,
}

impl AggregationSource {
    /// Source over `api`.
    #[must_use]
    pub const fn new(api: SharedApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WindowSource for AggregationSource {
    type Query = AggregationFilter;
    type Item = Aggregation;

    async fn fetch(
        &self,
        request: WindowRequest<AggregationFilter>,
    ) -> ApiResult<Window<Aggregation>> {
        let query = AggregationListQuery {
            category_id: request.query.category_id,
            saved_only: Some(request.query.saved_only),
            limit: Some(request.limit),
            offset: None,
        };
        let list = self.api.list_aggregations(&query).await?;
        Ok(Window::complete(list))
    }
}
