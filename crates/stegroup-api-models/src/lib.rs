#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the STE grouping service API.
//!
//! The console and the CLI both encode requests and decode responses through
//! these types so the wire contract lives in one place. Identifiers are
//! newtypes: an [`AggregationItemId`] can never be passed where an [`ItemId`]
//! is expected, which keeps "remove by membership identity" honest.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod timestamp;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw numeric identifier as issued by the server.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, formatter)
            }
        }
    };
}

id_type!(
    /// Server-assigned identifier of a catalog item (STE).
    ItemId
);
id_type!(
    /// Server-assigned identifier of an aggregation.
    AggregationId
);
id_type!(
    /// Identifier of a single membership row inside an aggregation.
    AggregationItemId
);
id_type!(
    /// Identifier of a submitted rating.
    RatingId
);

/// Characteristic name → value mapping. Values are JSON scalars, usually strings.
pub type Characteristics = BTreeMap<String, Value>;

/// Render a characteristic value as display text; `None` for null/empty values.
#[must_use]
pub fn characteristic_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

/// One catalog line item ("standard trade unit").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Numeric identity assigned by the server.
    pub id: ItemId,
    /// External catalog code.
    pub ste_id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    /// Optional image location.
    pub image_url: Option<String>,
    #[serde(default)]
    /// Model designation.
    pub model: Option<String>,
    #[serde(default)]
    /// Country of origin.
    pub country: Option<String>,
    #[serde(default)]
    /// Manufacturer name.
    pub manufacturer: Option<String>,
    #[serde(default)]
    /// Category code.
    pub category_id: Option<String>,
    #[serde(default)]
    /// Category display name.
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Free-form characteristics; key order is irrelevant.
    pub characteristics: Characteristics,
    #[serde(with = "timestamp")]
    /// Creation time.
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    /// Last update time, when the record was modified.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paged catalog search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Items of the requested window.
    pub items: Vec<CatalogItem>,
    /// Total number of matches across all windows.
    pub total: u64,
}

/// Lifecycle marker of an aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStatus {
    /// Machine-produced and not yet curated.
    Auto,
    /// Curated by a moderator.
    Manual,
}

impl AggregationStatus {
    /// Wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

/// Membership row linking a catalog item into an aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregationItem {
    /// Identity of the membership row (distinct from the catalog item id).
    pub id: AggregationItemId,
    /// Wrapped catalog item.
    pub ste: CatalogItem,
    /// Display/curation position.
    pub order: i32,
    #[serde(with = "timestamp")]
    /// Time the item joined the aggregation.
    pub created_at: DateTime<Utc>,
}

/// A group of catalog items considered the same product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aggregation {
    /// Aggregation identity.
    pub id: AggregationId,
    #[serde(default)]
    /// Name derived by the backend.
    pub name: Option<String>,
    #[serde(default)]
    /// Category code shared by members.
    pub category_id: Option<String>,
    #[serde(default)]
    /// Category display name.
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Attributes that caused the grouping.
    pub grouping_characteristics: Characteristics,
    /// Whether the group is machine-produced or curated.
    pub status: AggregationStatus,
    #[serde(default)]
    /// Average of submitted ratings, if any.
    pub rating: Option<f64>,
    /// True once a moderator saved the group as canonical.
    pub is_saved: bool,
    #[serde(with = "timestamp")]
    /// Creation time.
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    /// Members in display order.
    pub items: Vec<AggregationItem>,
    #[serde(default)]
    /// Member count as reported by the server.
    pub items_count: u32,
}

impl Aggregation {
    /// Name to show, falling back to the identifier when the backend left it empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("#{}", self.id), ToString::to_string)
    }
}

/// Query parameters for `GET /ste/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Free-text query; omitted means "match all".
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Category filter.
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Window size.
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Window start.
    pub offset: Option<u64>,
}

/// Query parameters for `GET /grouping/aggregations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregationListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Category filter.
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to saved aggregations.
    pub saved_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Maximum number of aggregations.
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Window start.
    pub offset: Option<u64>,
}

/// Body of `POST /grouping/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Explicit catalog items to group; absent means all items.
    pub ste_ids: Option<Vec<ItemId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Category filter.
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Characteristics to group by.
    pub characteristics: Option<Characteristics>,
    /// Discard existing automatic aggregations before grouping.
    pub force_regenerate: bool,
}

impl GroupingRequest {
    /// Group an explicit selection of catalog items.
    #[must_use]
    pub fn for_items(ids: Vec<ItemId>) -> Self {
        Self {
            ste_ids: Some(ids),
            force_regenerate: false,
            ..Self::default()
        }
    }

    /// Regenerate every aggregation from the whole catalog.
    #[must_use]
    pub fn regenerate_all() -> Self {
        Self {
            force_regenerate: true,
            ..Self::default()
        }
    }
}

/// Result of a grouping run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupingResponse {
    /// Aggregations produced by the run.
    pub aggregations: Vec<Aggregation>,
    /// Number of groups produced.
    pub total_groups: u64,
    /// Number of catalog items covered.
    pub total_items: u64,
}

/// Body of `POST /ratings/aggregations/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingRequest {
    /// Score in `1..=5`.
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// A single submitted rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Rating identity.
    pub id: RatingId,
    /// Score; the backend stores it as a float.
    pub rating: f64,
    #[serde(default)]
    /// Optional comment.
    pub comment: Option<String>,
    #[serde(with = "timestamp")]
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Ratings summary for one aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregationRatings {
    /// Aggregation the ratings belong to.
    pub aggregation_id: AggregationId,
    #[serde(default)]
    /// Average score; null until the first rating arrives.
    pub average_rating: Option<f64>,
    /// Number of ratings.
    pub ratings_count: u32,
    #[serde(default)]
    /// Ratings, newest first.
    pub ratings: Vec<Rating>,
}

/// Error envelope returned by the backend for non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Either a message or a list of validation issues.
    pub detail: ErrorDetail,
}

/// Payload of [`ErrorBody::detail`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Plain diagnostic message.
    Message(String),
    /// Request validation failures.
    Validation(Vec<ValidationIssue>),
}

/// One request validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    #[serde(default)]
    /// Location of the offending field.
    pub loc: Vec<Value>,
    /// Human-readable description.
    pub msg: String,
}

impl ErrorBody {
    /// Flatten the detail into a single message line.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.detail {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| {
                    let location = issue
                        .loc
                        .iter()
                        .map(|part| part.as_str().map_or_else(|| part.to_string(), str::to_string))
                        .collect::<Vec<_>>()
                        .join(".");
                    if location.is_empty() {
                        issue.msg.clone()
                    } else {
                        format!("{location}: {}", issue.msg)
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_json(id: i64) -> Value {
        json!({
            "id": id,
            "ste_id": format!("STE-{id}"),
            "name": "Ozka tire 180/60",
            "image_url": null,
            "model": "KNK",
            "country": null,
            "manufacturer": "Ozka",
            "category_id": "tires",
            "category_name": "Tires",
            "characteristics": {"width": "180", "ply": 6, "color": null},
            "created_at": "2025-11-29T10:00:00",
            "updated_at": null
        })
    }

    #[test]
    fn catalog_item_accepts_naive_timestamps_and_mixed_characteristics() {
        let item: CatalogItem = serde_json::from_value(item_json(7)).expect("decode item");
        assert_eq!(item.id, ItemId(7));
        assert_eq!(item.created_at.to_rfc3339(), "2025-11-29T10:00:00+00:00");
        assert_eq!(
            item.characteristics.get("ply").and_then(characteristic_text),
            Some("6".to_string())
        );
        assert_eq!(
            item.characteristics.get("color").and_then(characteristic_text),
            None
        );
    }

    #[test]
    fn aggregation_tolerates_null_grouping_characteristics() {
        let payload = json!({
            "id": 3,
            "name": null,
            "category_id": "tires",
            "grouping_characteristics": null,
            "status": "auto",
            "rating": null,
            "is_saved": false,
            "created_at": "2025-11-29T10:00:00Z",
            "items": [{
                "id": 40,
                "ste": item_json(7),
                "order": 0,
                "created_at": "2025-11-29T10:00:00.123456"
            }],
            "items_count": 1
        });
        let aggregation: Aggregation = serde_json::from_value(payload).expect("decode");
        assert!(aggregation.grouping_characteristics.is_empty());
        assert_eq!(aggregation.status, AggregationStatus::Auto);
        assert_eq!(aggregation.items[0].id, AggregationItemId(40));
        assert_eq!(aggregation.display_name(), "#3");
    }

    #[test]
    fn search_query_omits_unset_fields() {
        let query = CatalogSearchQuery {
            query: None,
            limit: Some(20),
            offset: Some(0),
            ..CatalogSearchQuery::default()
        };
        let encoded = serde_json::to_value(&query).expect("encode");
        assert_eq!(encoded, json!({"limit": 20, "offset": 0}));
    }

    #[test]
    fn grouping_constructors_set_expected_flags() {
        let all = serde_json::to_value(GroupingRequest::regenerate_all()).expect("encode");
        assert_eq!(all, json!({"force_regenerate": true}));

        let picked =
            serde_json::to_value(GroupingRequest::for_items(vec![ItemId(1), ItemId(2)]))
                .expect("encode");
        assert_eq!(picked, json!({"ste_ids": [1, 2], "force_regenerate": false}));
    }

    #[test]
    fn error_body_flattens_validation_issues() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "rating"], "msg": "Input should be less than or equal to 5", "type": "x"},
                {"loc": ["query", "limit"], "msg": "too large"}
            ]
        }))
        .expect("decode");
        assert_eq!(
            body.message(),
            "body.rating: Input should be less than or equal to 5; query.limit: too large"
        );

        let plain: ErrorBody =
            serde_json::from_value(json!({"detail": "not found"})).expect("decode");
        assert_eq!(plain.message(), "not found");
    }

    #[test]
    fn ratings_summary_allows_null_average() {
        let summary: AggregationRatings = serde_json::from_value(json!({
            "aggregation_id": 3,
            "average_rating": null,
            "ratings_count": 0,
            "ratings": []
        }))
        .expect("decode");
        assert_eq!(summary.average_rating, None);
        assert!(summary.ratings.is_empty());
    }
}
