//! reqwest implementation of [`ModerationApi`].
//!
//! # Design
//! - One shared `reqwest::Client` carries the timeout and the `x-request-id` header.
//! - Paths are joined relative to the configured base so deployments under a
//!   prefix such as `/api/v1` work unchanged.
//! - Non-success statuses are classified through [`ApiError::from_response`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use stegroup_api_models::{
    Aggregation, AggregationId, AggregationItemId, AggregationListQuery, AggregationRatings,
    CatalogItem, CatalogSearchQuery, GroupingRequest, GroupingResponse, ItemId, RatingRequest,
    SearchResponse,
};
use tracing::{debug, warn};

use crate::api::ModerationApi;
use crate::error::{ApiError, ApiResult};

/// Header used to correlate console sessions with server logs.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// HTTP client for the grouping service.
#[derive(Debug, Clone)]
pub struct HttpModerationApi {
    client: Client,
    base_url: Url,
}

impl HttpModerationApi {
    /// Build a client rooted at `base_url` (for example `http://host:8000/api/v1`).
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequestId`] when `request_id` is not a valid
    /// header value and [`ApiError::ClientBuild`] when reqwest rejects the
    /// configuration.
    pub fn new(base_url: Url, timeout: Duration, request_id: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let value =
            HeaderValue::from_str(request_id).map_err(|_| ApiError::InvalidRequestId {
                value: request_id.to_string(),
            })?;
        headers.insert(HEADER_REQUEST_ID, value);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an already configured client.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Base URL every request path is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ApiError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "request completed");
            return Ok(response);
        }
        let error = ApiError::from_response(operation, response).await;
        warn!(operation, error = %error.describe(), "request rejected");
        Err(error)
    }

    async fn fetch<T>(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<()> {
        self.execute(operation, request).await.map(drop)
    }
}

#[async_trait]
impl ModerationApi for HttpModerationApi {
    async fn search_items(&self, query: &CatalogSearchQuery) -> ApiResult<SearchResponse> {
        let request = self.client.get(self.url("ste/")?).query(query);
        self.fetch("search_items", request).await
    }

    async fn get_item(&self, id: ItemId) -> ApiResult<CatalogItem> {
        let request = self.client.get(self.url(&format!("ste/{id}"))?);
        self.fetch("get_item", request).await
    }

    async fn perform_grouping(&self, request: &GroupingRequest) -> ApiResult<GroupingResponse> {
        let request = self.client.post(self.url("grouping/")?).json(request);
        self.fetch("perform_grouping", request).await
    }

    async fn list_aggregations(
        &self,
        query: &AggregationListQuery,
    ) -> ApiResult<Vec<Aggregation>> {
        let request = self
            .client
            .get(self.url("grouping/aggregations")?)
            .query(query);
        self.fetch("list_aggregations", request).await
    }

    async fn get_aggregation(&self, id: AggregationId) -> ApiResult<Aggregation> {
        let request = self
            .client
            .get(self.url(&format!("grouping/aggregations/{id}"))?);
        self.fetch("get_aggregation", request).await
    }

    async fn add_item(
        &self,
        aggregation: AggregationId,
        item: ItemId,
        order: Option<i32>,
    ) -> ApiResult<()> {
        let mut request = self
            .client
            .post(self.url(&format!("aggregations/{aggregation}/items/{item}"))?);
        if let Some(order) = order {
            request = request.query(&[("order", order)]);
        }
        self.send("add_item", request).await
    }

    async fn remove_item(
        &self,
        aggregation: AggregationId,
        item: AggregationItemId,
    ) -> ApiResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("aggregations/{aggregation}/items/{item}"))?);
        self.send("remove_item", request).await
    }

    async fn change_item_order(
        &self,
        aggregation: AggregationId,
        item: AggregationItemId,
        new_order: i32,
    ) -> ApiResult<()> {
        let request = self
            .client
            .put(self.url(&format!("aggregations/{aggregation}/items/{item}/order"))?)
            .query(&[("new_order", new_order)]);
        self.send("change_item_order", request).await
    }

    async fn save_aggregation(&self, id: AggregationId) -> ApiResult<()> {
        let request = self
            .client
            .post(self.url(&format!("aggregations/{id}/save"))?);
        self.send("save_aggregation", request).await
    }

    async fn delete_aggregation(&self, id: AggregationId) -> ApiResult<()> {
        let request = self.client.delete(self.url(&format!("aggregations/{id}"))?);
        self.send("delete_aggregation", request).await
    }

    async fn submit_rating(&self, id: AggregationId, request: &RatingRequest) -> ApiResult<()> {
        let request = self
            .client
            .post(self.url(&format!("ratings/aggregations/{id}"))?)
            .json(request);
        self.send("submit_rating", request).await
    }

    async fn get_ratings(&self, id: AggregationId) -> ApiResult<AggregationRatings> {
        let request = self
            .client
            .get(self.url(&format!("ratings/aggregations/{id}"))?);
        self.fetch("get_ratings", request).await
    }
}
