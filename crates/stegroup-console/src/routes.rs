//! Console navigation targets.

use std::fmt::{self, Display, Formatter};

use stegroup_api_models::{AggregationId, ItemId};

/// Screens the console can show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Route {
    /// `/` catalog search.
    Search,
    /// `/ste/:id` single catalog item.
    Item {
        /// Catalog item identifier.
        id: ItemId,
    },
    /// `/aggregations` aggregation list.
    Aggregations,
    /// `/aggregations/:id` aggregation detail.
    AggregationDetail {
        /// Aggregation identifier.
        id: AggregationId,
    },
    /// Anything else.
    NotFound,
}

impl Route {
    /// Resolve a path (query string and trailing slash tolerated).
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Search,
            ["aggregations"] => Self::Aggregations,
            ["ste", id] => id
                .parse::<i64>()
                .map_or(Self::NotFound, |id| Self::Item { id: ItemId(id) }),
            ["aggregations", id] => id.parse::<i64>().map_or(Self::NotFound, |id| {
                Self::AggregationDetail {
                    id: AggregationId(id),
                }
            }),
            _ => Self::NotFound,
        }
    }

    /// Canonical path for the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Search => "/".to_string(),
            Self::Item { id } => format!("/ste/{id}"),
            Self::Aggregations => "/aggregations".to_string(),
            Self::AggregationDetail { id } => format!("/aggregations/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}
