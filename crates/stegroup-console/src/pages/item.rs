//! Catalog item screen (`/ste/:id`).

use stegroup_api_models::{CatalogItem, ItemId, characteristic_text};
use stegroup_client::SharedApi;
use tracing::warn;

use crate::query::FetchError;

/// One catalog item, fetched once on open.
pub struct ItemPage {
    api: SharedApi,
    id: ItemId,
    item: Option<CatalogItem>,
    error: Option<FetchError>,
}

impl ItemPage {
    /// Open the screen and fetch the item.
    pub async fn open(api: SharedApi, id: ItemId) -> Self {
        let mut page = Self {
            api,
            id,
            item: None,
            error: None,
        };
        page.reload().await;
        page
    }

    /// Fetch the item again.
    pub async fn reload(&mut self) {
        match self.api.get_item(self.id).await {
            Ok(item) => {
                self.item = Some(item);
                self.error = None;
            }
            Err(error) => {
                warn!(item_id = %self.id, error = %error.describe(), "item fetch failed");
                self.error = Some(FetchError::from(&error));
            }
        }
    }

    /// Loaded item.
    #[must_use]
    pub const fn item(&self) -> Option<&CatalogItem> {
        self.item.as_ref()
    }

    /// Failure of the last fetch.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Characteristics with a displayable value, in name order.
    #[must_use]
    pub fn characteristics(&self) -> Vec<(String, String)> {
        self.item
            .iter()
            .flat_map(|item| item.characteristics.iter())
            .filter_map(|(name, value)| characteristic_text(value).map(|text| (name.clone(), text)))
            .collect()
    }
}
