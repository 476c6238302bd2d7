//! In-memory grouping service recording every call.
//!
//! The fake keeps enough server behaviour (windowing, membership edits,
//! rating averages) for page state to be exercised end to end without HTTP.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use stegroup_api_models::{
    Aggregation, AggregationId, AggregationItem, AggregationItemId, AggregationListQuery,
    AggregationRatings, AggregationStatus, CatalogItem, CatalogSearchQuery, GroupingRequest,
    GroupingResponse, ItemId, Rating, RatingId, RatingRequest, SearchResponse,
};
use stegroup_client::{ApiError, ApiResult, ModerationApi};

use crate::fixtures::fixed_time;

/// One recorded service call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `search_items`.
    Search(CatalogSearchQuery),
    /// `get_item`.
    GetItem(ItemId),
    /// `perform_grouping`.
    Group(GroupingRequest),
    /// `list_aggregations`.
    ListAggregations(AggregationListQuery),
    /// `get_aggregation`.
    GetAggregation(AggregationId),
    /// `add_item`.
    AddItem {
        /// Target aggregation.
        aggregation: AggregationId,
        /// Catalog item added.
        item: ItemId,
        /// Requested position.
        order: Option<i32>,
    },
    /// `remove_item`.
    RemoveItem {
        /// Target aggregation.
        aggregation: AggregationId,
        /// Membership row removed.
        item: AggregationItemId,
    },
    /// `change_item_order`.
    ChangeOrder {
        /// Target aggregation.
        aggregation: AggregationId,
        /// Membership row moved.
        item: AggregationItemId,
        /// Requested position.
        new_order: i32,
    },
    /// `save_aggregation`.
    Save(AggregationId),
    /// `delete_aggregation`.
    Delete(AggregationId),
    /// `submit_rating`.
    SubmitRating(AggregationId, RatingRequest),
    /// `get_ratings`.
    GetRatings(AggregationId),
}

impl Call {
    /// Operation name matching [`ApiError::operation`].
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Search(_) => "search_items",
            Self::GetItem(_) => "get_item",
            Self::Group(_) => "perform_grouping",
            Self::ListAggregations(_) => "list_aggregations",
            Self::GetAggregation(_) => "get_aggregation",
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::ChangeOrder { .. } => "change_item_order",
            Self::Save(_) => "save_aggregation",
            Self::Delete(_) => "delete_aggregation",
            Self::SubmitRating(..) => "submit_rating",
            Self::GetRatings(_) => "get_ratings",
        }
    }
}

#[derive(Default)]
struct FakeState {
    catalog: Vec<CatalogItem>,
    aggregations: BTreeMap<AggregationId, Aggregation>,
    ratings: BTreeMap<AggregationId, Vec<Rating>>,
    failures: HashMap<&'static str, u16>,
    calls: Vec<Call>,
    next_aggregation: i64,
    next_membership: i64,
    next_rating: i64,
}

/// In-memory [`ModerationApi`] implementation.
#[derive(Default)]
pub struct FakeModerationApi {
    state: Mutex<FakeState>,
}

impl FakeModerationApi {
    /// Empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service seeded with a catalog.
    #[must_use]
    pub fn with_catalog(items: Vec<CatalogItem>) -> Self {
        let fake = Self::new();
        fake.lock().catalog = items;
        fake
    }

    /// Insert or replace an aggregation.
    pub fn insert_aggregation(&self, aggregation: Aggregation) {
        let mut state = self.lock();
        state.next_aggregation = state.next_aggregation.max(aggregation.id.get());
        for item in &aggregation.items {
            state.next_membership = state.next_membership.max(item.id.get());
        }
        state.aggregations.insert(aggregation.id, aggregation);
    }

    /// Seed a rating for an aggregation.
    pub fn insert_rating(&self, aggregation: AggregationId, rating: u8, comment: Option<&str>) {
        let mut state = self.lock();
        state.push_rating(
            aggregation,
            &RatingRequest {
                rating,
                comment: comment.map(str::to_string),
            },
        );
    }

    /// Make every call to `operation` fail with `status` until [`Self::recover`].
    pub fn fail(&self, operation: &'static str, status: u16) {
        self.lock().failures.insert(operation, status);
    }

    /// Undo [`Self::fail`].
    pub fn recover(&self, operation: &'static str) {
        self.lock().failures.remove(operation);
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls to `operation`.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Server-side copy of an aggregation.
    #[must_use]
    pub fn aggregation(&self, id: AggregationId) -> Option<Aggregation> {
        self.lock().aggregations.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, call: Call) -> ApiResult<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        let operation = call.operation();
        state.calls.push(call);
        if let Some(status) = state.failures.get(operation) {
            return Err(ApiError::Status {
                operation,
                status: *status,
                detail: Some("injected failure".into()),
            });
        }
        Ok(state)
    }
}

fn not_found(operation: &'static str, what: &str) -> ApiError {
    ApiError::Status {
        operation,
        status: 404,
        detail: Some(format!("{what} not found")),
    }
}

fn membership_count(aggregation: &Aggregation) -> u32 {
    u32::try_from(aggregation.items.len()).unwrap_or(u32::MAX)
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

impl FakeState {
    fn aggregation_mut(
        &mut self,
        operation: &'static str,
        id: AggregationId,
    ) -> ApiResult<&mut Aggregation> {
        self.aggregations
            .get_mut(&id)
            .ok_or_else(|| not_found(operation, "Aggregation"))
    }

    fn create_aggregation(&mut self, members: Vec<CatalogItem>) -> Aggregation {
        self.next_aggregation += 1;
        let id = AggregationId(self.next_aggregation);
        let mut items = Vec::with_capacity(members.len());
        for (position, ste) in members.into_iter().enumerate() {
            self.next_membership += 1;
            items.push(AggregationItem {
                id: AggregationItemId(self.next_membership),
                ste,
                order: i32::try_from(position).unwrap_or(i32::MAX),
                created_at: fixed_time(),
            });
        }
        let aggregation = Aggregation {
            id,
            name: items.first().map(|item| item.ste.name.clone()),
            category_id: items.first().and_then(|item| item.ste.category_id.clone()),
            category_name: items.first().and_then(|item| item.ste.category_name.clone()),
            grouping_characteristics: Default::default(),
            status: AggregationStatus::Auto,
            rating: None,
            is_saved: false,
            created_at: fixed_time(),
            updated_at: None,
            items_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            items,
        };
        self.aggregations.insert(id, aggregation.clone());
        aggregation
    }

    fn push_rating(&mut self, aggregation: AggregationId, request: &RatingRequest) {
        self.next_rating += 1;
        let entry = self.ratings.entry(aggregation).or_default();
        entry.push(Rating {
            id: RatingId(self.next_rating),
            rating: f64::from(request.rating),
            comment: request.comment.clone(),
            created_at: fixed_time(),
        });
        let average = average(entry);
        if let Some(stored) = self.aggregations.get_mut(&aggregation) {
            stored.rating = average;
        }
    }
}

fn average(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
    Some(ratings.iter().map(|rating| rating.rating).sum::<f64>() / f64::from(count))
}

#[async_trait]
impl ModerationApi for FakeModerationApi {
    async fn search_items(&self, query: &CatalogSearchQuery) -> ApiResult<SearchResponse> {
        let state = self.begin(Call::Search(query.clone()))?;
        let needle = query.query.as_deref().map(str::to_lowercase);
        let matching: Vec<&CatalogItem> = state
            .catalog
            .iter()
            .filter(|item| {
                needle
                    .as_deref()
                    .is_none_or(|needle| item.name.to_lowercase().contains(needle))
            })
            .filter(|item| {
                query
                    .category_id
                    .as_ref()
                    .is_none_or(|category| item.category_id.as_ref() == Some(category))
            })
            .collect();
        let offset = to_index(query.offset.unwrap_or(0));
        let limit = to_index(u64::from(query.limit.unwrap_or(20)));
        Ok(SearchResponse {
            total: u64::try_from(matching.len()).unwrap_or(u64::MAX),
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    async fn get_item(&self, id: ItemId) -> ApiResult<CatalogItem> {
        let state = self.begin(Call::GetItem(id))?;
        state
            .catalog
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| not_found("get_item", "STE"))
    }

    async fn perform_grouping(&self, request: &GroupingRequest) -> ApiResult<GroupingResponse> {
        let mut state = self.begin(Call::Group(request.clone()))?;
        let groups: Vec<Vec<CatalogItem>> = if let Some(ids) = &request.ste_ids {
            let members: Vec<CatalogItem> = state
                .catalog
                .iter()
                .filter(|item| ids.contains(&item.id))
                .cloned()
                .collect();
            vec![members]
        } else {
            if request.force_regenerate {
                state
                    .aggregations
                    .retain(|_, aggregation| aggregation.is_saved);
            }
            let mut by_manufacturer: BTreeMap<String, Vec<CatalogItem>> = BTreeMap::new();
            for item in &state.catalog {
                by_manufacturer
                    .entry(item.manufacturer.clone().unwrap_or_default())
                    .or_default()
                    .push(item.clone());
            }
            by_manufacturer.into_values().collect()
        };
        let total_items = groups.iter().map(Vec::len).sum::<usize>();
        let aggregations: Vec<Aggregation> = groups
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(|members| state.create_aggregation(members))
            .collect();
        Ok(GroupingResponse {
            total_groups: u64::try_from(aggregations.len()).unwrap_or(u64::MAX),
            total_items: u64::try_from(total_items).unwrap_or(u64::MAX),
            aggregations,
        })
    }

    async fn list_aggregations(
        &self,
        query: &AggregationListQuery,
    ) -> ApiResult<Vec<Aggregation>> {
        let state = self.begin(Call::ListAggregations(query.clone()))?;
        let saved_only = query.saved_only.unwrap_or(false);
        Ok(state
            .aggregations
            .values()
            .filter(|aggregation| !saved_only || aggregation.is_saved)
            .skip(to_index(query.offset.unwrap_or(0)))
            .take(to_index(u64::from(query.limit.unwrap_or(100))))
            .cloned()
            .collect())
    }

    async fn get_aggregation(&self, id: AggregationId) -> ApiResult<Aggregation> {
        let state = self.begin(Call::GetAggregation(id))?;
        state
            .aggregations
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("get_aggregation", "Aggregation"))
    }

    async fn add_item(
        &self,
        aggregation: AggregationId,
        item: ItemId,
        order: Option<i32>,
    ) -> ApiResult<()> {
        let mut state = self.begin(Call::AddItem {
            aggregation,
            item,
            order,
        })?;
        let ste = state
            .catalog
            .iter()
            .find(|candidate| candidate.id == item)
            .cloned()
            .ok_or_else(|| not_found("add_item", "STE"))?;
        state.next_membership += 1;
        let membership = AggregationItemId(state.next_membership);
        let target = state.aggregation_mut("add_item", aggregation)?;
        if target.items.iter().any(|existing| existing.ste.id == item) {
            return Err(ApiError::Status {
                operation: "add_item",
                status: 400,
                detail: Some("STE already in aggregation".into()),
            });
        }
        let order = order.unwrap_or_else(|| {
            target
                .items
                .iter()
                .map(|existing| existing.order + 1)
                .max()
                .unwrap_or(0)
        });
        target.items.push(AggregationItem {
            id: membership,
            ste,
            order,
            created_at: fixed_time(),
        });
        target.items.sort_by_key(|existing| existing.order);
        target.items_count = membership_count(target);
        target.status = AggregationStatus::Manual;
        Ok(())
    }

    async fn remove_item(
        &self,
        aggregation: AggregationId,
        item: AggregationItemId,
    ) -> ApiResult<()> {
        let mut state = self.begin(Call::RemoveItem { aggregation, item })?;
        let target = state.aggregation_mut("remove_item", aggregation)?;
        let before = target.items.len();
        target.items.retain(|existing| existing.id != item);
        if target.items.len() == before {
            return Err(not_found("remove_item", "Item"));
        }
        target.items_count = membership_count(target);
        target.status = AggregationStatus::Manual;
        Ok(())
    }

    async fn change_item_order(
        &self,
        aggregation: AggregationId,
        item: AggregationItemId,
        new_order: i32,
    ) -> ApiResult<()> {
        let mut state = self.begin(Call::ChangeOrder {
            aggregation,
            item,
            new_order,
        })?;
        let target = state.aggregation_mut("change_item_order", aggregation)?;
        let position = target
            .items
            .iter()
            .position(|existing| existing.id == item)
            .ok_or_else(|| not_found("change_item_order", "Item"))?;
        let moved = target.items.remove(position);
        let destination = usize::try_from(new_order.max(0))
            .unwrap_or(0)
            .min(target.items.len());
        target.items.insert(destination, moved);
        for (index, existing) in target.items.iter_mut().enumerate() {
            existing.order = i32::try_from(index).unwrap_or(i32::MAX);
        }
        target.status = AggregationStatus::Manual;
        Ok(())
    }

    async fn save_aggregation(&self, id: AggregationId) -> ApiResult<()> {
        let mut state = self.begin(Call::Save(id))?;
        let target = state.aggregation_mut("save_aggregation", id)?;
        target.is_saved = true;
        target.status = AggregationStatus::Manual;
        Ok(())
    }

    async fn delete_aggregation(&self, id: AggregationId) -> ApiResult<()> {
        let mut state = self.begin(Call::Delete(id))?;
        state
            .aggregations
            .remove(&id)
            .map(drop)
            .ok_or_else(|| not_found("delete_aggregation", "Aggregation"))?;
        state.ratings.remove(&id);
        Ok(())
    }

    async fn submit_rating(&self, id: AggregationId, request: &RatingRequest) -> ApiResult<()> {
        let mut state = self.begin(Call::SubmitRating(id, request.clone()))?;
        if !(1..=5).contains(&request.rating) {
            return Err(ApiError::Status {
                operation: "submit_rating",
                status: 422,
                detail: Some("rating: Input should be between 1 and 5".into()),
            });
        }
        state.aggregation_mut("submit_rating", id)?;
        state.push_rating(id, request);
        Ok(())
    }

    async fn get_ratings(&self, id: AggregationId) -> ApiResult<AggregationRatings> {
        let state = self.begin(Call::GetRatings(id))?;
        if !state.aggregations.contains_key(&id) {
            return Err(not_found("get_ratings", "Aggregation"));
        }
        let ratings = state.ratings.get(&id).cloned().unwrap_or_default();
        Ok(AggregationRatings {
            aggregation_id: id,
            average_rating: average(&ratings),
            ratings_count: u32::try_from(ratings.len()).unwrap_or(u32::MAX),
            ratings,
        })
    }
}
