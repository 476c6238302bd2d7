//! Builders for catalog items and aggregations.

use chrono::{DateTime, Utc};
use serde_json::json;
use stegroup_api_models::{
    Aggregation, AggregationId, AggregationItem, AggregationItemId, AggregationStatus,
    CatalogItem, Characteristics, ItemId,
};

/// Fixed instant used for every fixture timestamp (2025-11-29T10:00:00Z).
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_764_410_400, 0).unwrap_or_default()
}

/// Catalog item with a manufacturer and a couple of characteristics.
#[must_use]
pub fn catalog_item(id: i64, name: &str) -> CatalogItem {
    let manufacturer = name.split_whitespace().next().unwrap_or(name).to_string();
    let mut characteristics = Characteristics::new();
    characteristics.insert("brand".into(), json!(manufacturer));
    characteristics.insert("size".into(), json!(format!("{}", 170 + id % 3 * 10)));
    CatalogItem {
        id: ItemId(id),
        ste_id: format!("STE-{id:05}"),
        name: name.to_string(),
        image_url: None,
        model: Some(format!("M-{id}")),
        country: Some("TR".into()),
        manufacturer: Some(manufacturer),
        category_id: Some("tires".into()),
        category_name: Some("Tires".into()),
        characteristics,
        created_at: fixed_time(),
        updated_at: None,
    }
}

/// `count` items named `"{prefix} item {n}"` with ids starting at `first_id`.
#[must_use]
pub fn catalog_items(prefix: &str, first_id: i64, count: usize) -> Vec<CatalogItem> {
    (0..count)
        .map(|offset| {
            let id = first_id + i64::try_from(offset).unwrap_or(i64::MAX - first_id);
            catalog_item(id, &format!("{prefix} item {id}"))
        })
        .collect()
}

/// Aggregation whose membership rows are numbered `id * 100 + position`.
#[must_use]
pub fn aggregation(id: i64, members: &[CatalogItem]) -> Aggregation {
    let items: Vec<AggregationItem> = members
        .iter()
        .enumerate()
        .map(|(position, ste)| {
            let order = i32::try_from(position).unwrap_or(i32::MAX);
            AggregationItem {
                id: AggregationItemId(id * 100 + i64::from(order)),
                ste: ste.clone(),
                order,
                created_at: fixed_time(),
            }
        })
        .collect();
    let mut grouping_characteristics = Characteristics::new();
    if let Some(manufacturer) = members.first().and_then(|item| item.manufacturer.clone()) {
        grouping_characteristics.insert("brand".into(), json!(manufacturer));
    }
    Aggregation {
        id: AggregationId(id),
        name: Some(format!("Group {id}")),
        category_id: Some("tires".into()),
        category_name: Some("Tires".into()),
        grouping_characteristics,
        status: AggregationStatus::Auto,
        rating: None,
        is_saved: false,
        created_at: fixed_time(),
        updated_at: None,
        items_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
        items,
    }
}

/// Same as [`aggregation`] but already marked as saved.
#[must_use]
pub fn saved_aggregation(id: i64, members: &[CatalogItem]) -> Aggregation {
    let mut aggregation = aggregation(id, members);
    aggregation.is_saved = true;
    aggregation.status = AggregationStatus::Manual;
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_numbers_membership_rows() {
        let members = catalog_items("Ozka", 1, 3);
        let group = aggregation(4, &members);
        let ids: Vec<i64> = group.items.iter().map(|item| item.id.get()).collect();
        assert_eq!(ids, vec![400, 401, 402]);
        assert_eq!(group.items_count, 3);
        assert_eq!(group.items[2].order, 2);
    }

    #[test]
    fn catalog_items_use_sequential_ids() {
        let items = catalog_items("Ozka", 10, 2);
        assert_eq!(items[1].id, ItemId(11));
        assert_eq!(items[1].name, "Ozka item 11");
    }
}
