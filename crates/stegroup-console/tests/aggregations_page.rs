use std::sync::Arc;

use anyhow::{Result, anyhow};
use stegroup_api_models::{AggregationId, AggregationListQuery};
use stegroup_client::SharedApi;
use stegroup_config::ConsoleConfig;
use stegroup_console::{
    ActionError, AggregationFilter, AggregationsPage, AutoConfirm, Outcome,
};
use stegroup_test_support::fixtures::{aggregation, catalog_item, catalog_items, saved_aggregation};
use stegroup_test_support::{Call, FakeModerationApi};

fn config() -> Result<ConsoleConfig> {
    ConsoleConfig::from_lookup(|_| None).map_err(|err| anyhow!(err.describe()))
}

fn seeded() -> Arc<FakeModerationApi> {
    let mut catalog = catalog_items("Ozka", 1, 4);
    catalog.push(catalog_item(5, "Michelin X"));
    let fake = Arc::new(FakeModerationApi::with_catalog(catalog.clone()));
    fake.insert_aggregation(aggregation(1, &catalog[0..2]));
    fake.insert_aggregation(saved_aggregation(2, &catalog[2..4]));
    fake.insert_aggregation(aggregation(3, &catalog[4..5]));
    fake
}

fn ids(page: &AggregationsPage) -> Vec<i64> {
    page.list()
        .snapshot()
        .window
        .items
        .iter()
        .map(|aggregation| aggregation.id.get())
        .collect()
}

#[tokio::test]
async fn list_request_sends_filter_and_limit() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    assert_eq!(ids(&page), vec![1, 2, 3]);
    assert_eq!(
        fake.calls().first(),
        Some(&Call::ListAggregations(AggregationListQuery {
            category_id: None,
            saved_only: Some(false),
            limit: Some(100),
            offset: None,
        }))
    );
    Ok(())
}

#[tokio::test]
async fn saved_only_toggle_refetches_immediately() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    page.set_saved_only(true);
    let state = page.list().settled().await;
    assert!(state.committed.saved_only);
    assert_eq!(ids(&page), vec![2]);
    assert_eq!(fake.call_count("list_aggregations"), 2);
    Ok(())
}

#[tokio::test]
async fn save_flips_flag_only_after_success() -> Result<()> {
    let fake = seeded();
    fake.fail("save_aggregation", 500);
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    let failed = page.save(AggregationId(1)).await;
    assert!(matches!(failed, Err(ActionError::Api { .. })));
    assert!(!page.list().snapshot().window.items[0].is_saved);

    fake.recover("save_aggregation");
    let outcome = page
        .save(AggregationId(1))
        .await
        .map_err(|err| anyhow!(err.describe()))?;
    assert_eq!(outcome, Outcome::Applied);
    assert!(page.list().snapshot().window.items[0].is_saved);
    Ok(())
}

#[tokio::test]
async fn saving_a_saved_aggregation_is_not_offered() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    let result = page.save(AggregationId(2)).await;
    assert!(matches!(result, Err(ActionError::NotOffered { .. })));
    assert_eq!(fake.call_count("save_aggregation"), 0);
    Ok(())
}

#[tokio::test]
async fn declined_delete_sends_nothing() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    let outcome = page
        .delete(AggregationId(1), &AutoConfirm(false))
        .await
        .map_err(|err| anyhow!(err.describe()))?;
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(fake.call_count("delete_aggregation"), 0);
    assert_eq!(ids(&page), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn confirmed_delete_removes_the_row() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    page.delete(AggregationId(1), &AutoConfirm(true))
        .await
        .map_err(|err| anyhow!(err.describe()))?;
    assert_eq!(ids(&page), vec![2, 3]);
    assert_eq!(page.list().snapshot().window.total, 2);
    Ok(())
}

#[tokio::test]
async fn failed_delete_keeps_the_row() -> Result<()> {
    let fake = seeded();
    fake.fail("delete_aggregation", 503);
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(api, &config()?, AggregationFilter::default());
    page.list().settled().await;

    let result = page.delete(AggregationId(3), &AutoConfirm(true)).await;
    assert!(result.is_err());
    assert_eq!(ids(&page), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn regroup_all_replaces_the_list_regardless_of_filter() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(
        api,
        &config()?,
        AggregationFilter {
            saved_only: true,
            category_id: None,
        },
    );
    page.list().settled().await;
    assert_eq!(ids(&page), vec![2]);

    page.group_all()
        .await
        .map_err(|err| anyhow!(err.describe()))?;

    let state = page.list().snapshot();
    let shown: Vec<Option<String>> = state
        .window
        .items
        .iter()
        .map(|aggregation| aggregation.name.clone())
        .collect();
    // One group per manufacturer, none of them saved.
    assert_eq!(shown.len(), 2);
    assert!(state.window.items.iter().all(|aggregation| !aggregation.is_saved));
    assert_eq!(state.window.total, 2);
    assert_eq!(fake.call_count("list_aggregations"), 1);
    Ok(())
}

#[tokio::test]
async fn regroup_all_wins_over_filter_fetch_still_pending() -> Result<()> {
    let fake = seeded();
    let api: SharedApi = fake.clone();
    let page = AggregationsPage::open(
        api,
        &config()?,
        AggregationFilter {
            saved_only: true,
            category_id: None,
        },
    );

    page.group_all()
        .await
        .map_err(|err| anyhow!(err.describe()))?;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    let state = page.list().settled().await;

    assert_eq!(state.window.items.len(), 2);
    assert!(state.window.items.iter().all(|aggregation| !aggregation.is_saved));
    assert!(!state.loading);
    Ok(())
}
