//! Localized user-facing text.
//!
//! # Design
//! - Every message is a static string so failures never allocate to report.
//! - Russian is the primary locale; English mirrors it key for key.

use stegroup_config::Locale;

/// Static message table for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    /// Catalog search failed.
    pub search_failed: &'static str,
    /// Catalog item detail failed.
    pub item_failed: &'static str,
    /// Aggregation list failed.
    pub aggregations_failed: &'static str,
    /// Aggregation detail failed.
    pub aggregation_failed: &'static str,
    /// Ratings summary could not be fetched.
    pub ratings_unavailable: &'static str,
    /// Grouping run failed.
    pub grouping_failed: &'static str,
    /// Grouping requested with nothing selected.
    pub empty_selection: &'static str,
    /// Save failed.
    pub save_failed: &'static str,
    /// Aggregation deletion failed.
    pub delete_failed: &'static str,
    /// Membership removal failed.
    pub remove_item_failed: &'static str,
    /// Reorder failed.
    pub reorder_failed: &'static str,
    /// Adding a catalog item failed.
    pub add_item_failed: &'static str,
    /// Rating submission failed.
    pub rating_failed: &'static str,
    /// Confirmation prompt before deleting an aggregation.
    pub confirm_delete: &'static str,
    /// Confirmation prompt before removing a membership row.
    pub confirm_remove_item: &'static str,
    /// Action declined at the confirmation prompt.
    pub cancelled: &'static str,
    /// Action unavailable in the current state.
    pub not_offered: &'static str,
    /// Rating form submitted without a score.
    pub rating_required: &'static str,
    /// Input rejected before any request.
    pub invalid_input: &'static str,
    /// Unknown route.
    pub not_found: &'static str,
}

static RU: Messages = Messages {
    search_failed: "Не удалось загрузить СТЕ. Проверьте подключение к серверу.",
    item_failed: "Не удалось загрузить детали СТЕ",
    aggregations_failed: "Не удалось загрузить агрегации",
    aggregation_failed: "Не удалось загрузить детали агрегации",
    ratings_unavailable: "Оценки временно недоступны",
    grouping_failed: "Не удалось выполнить группировку",
    empty_selection: "Выберите хотя бы одну СТЕ для группировки",
    save_failed: "Не удалось сохранить агрегацию",
    delete_failed: "Не удалось удалить агрегацию",
    remove_item_failed: "Не удалось удалить СТЕ",
    reorder_failed: "Не удалось изменить порядок",
    add_item_failed: "Не удалось добавить СТЕ в группу",
    rating_failed: "Не удалось отправить оценку",
    confirm_delete: "Вы уверены, что хотите удалить эту агрегацию?",
    confirm_remove_item: "Удалить эту СТЕ из группы?",
    cancelled: "Действие отменено",
    not_offered: "Действие недоступно",
    rating_required: "Выберите оценку от 1 до 5",
    invalid_input: "Некорректные данные",
    not_found: "Страница не найдена",
};

static EN: Messages = Messages {
    search_failed: "Failed to load STE. Check the connection to the server.",
    item_failed: "Failed to load STE details",
    aggregations_failed: "Failed to load aggregations",
    aggregation_failed: "Failed to load aggregation details",
    ratings_unavailable: "Ratings are temporarily unavailable",
    grouping_failed: "Failed to perform grouping",
    empty_selection: "Select at least one STE to group",
    save_failed: "Failed to save aggregation",
    delete_failed: "Failed to delete aggregation",
    remove_item_failed: "Failed to remove STE",
    reorder_failed: "Failed to change order",
    add_item_failed: "Failed to add STE to the group",
    rating_failed: "Failed to submit rating",
    confirm_delete: "Are you sure you want to delete this aggregation?",
    confirm_remove_item: "Remove this STE from the group?",
    cancelled: "Action cancelled",
    not_offered: "Action is not available",
    rating_required: "Choose a rating from 1 to 5",
    invalid_input: "Invalid input",
    not_found: "Page not found",
};

impl Messages {
    /// Message table for `locale`.
    #[must_use]
    pub fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::Ru => &RU,
            Locale::En => &EN,
        }
    }

    /// Failure text for a service operation.
    #[must_use]
    pub fn operation_failed(&self, operation: &str) -> &'static str {
        match operation {
            "search_items" => self.search_failed,
            "get_item" => self.item_failed,
            "list_aggregations" => self.aggregations_failed,
            "get_aggregation" => self.aggregation_failed,
            "get_ratings" => self.ratings_unavailable,
            "perform_grouping" => self.grouping_failed,
            "save_aggregation" => self.save_failed,
            "delete_aggregation" => self.delete_failed,
            "remove_item" => self.remove_item_failed,
            "change_item_order" => self.reorder_failed,
            "add_item" => self.add_item_failed,
            "submit_rating" => self.rating_failed,
            _ => self.invalid_input,
        }
    }
}
