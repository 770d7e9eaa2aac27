//! Ingredient collection: expiry-window queries, dashboard warnings, and
//! assembly of a normalized generation request from a user's pantry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LarderError, Result};
use crate::request::{GenerationRequest, Preferences};

use super::item::InventoryItem;

/// Dashboard summary of a pantry partitioned by expiry status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpiryWarnings {
    /// Items whose expiry date has passed.
    pub expired: Vec<InventoryItem>,
    /// Items expiring within the next seven days.
    pub expiring_soon: Vec<InventoryItem>,
}

impl ExpiryWarnings {
    pub fn expired_count(&self) -> usize {
        self.expired.len()
    }

    pub fn expiring_soon_count(&self) -> usize {
        self.expiring_soon.len()
    }

    /// Whether there is nothing to warn about.
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.expiring_soon.is_empty()
    }
}

/// Partition a pantry into dashboard warnings.
///
/// Fresh items are omitted; both warning lists are sorted soonest
/// expiry first.
pub fn expiry_warnings(items: &[InventoryItem], today: NaiveDate) -> ExpiryWarnings {
    let mut warnings = ExpiryWarnings::default();
    for item in items {
        match item.status(today) {
            super::ExpiryStatus::Expired => warnings.expired.push(item.clone()),
            super::ExpiryStatus::ExpiringSoon => warnings.expiring_soon.push(item.clone()),
            super::ExpiryStatus::Fresh => {}
        }
    }
    warnings.expired.sort_by_key(|i| i.expires_on);
    warnings.expiring_soon.sort_by_key(|i| i.expires_on);
    warnings
}

/// Items whose expiry falls within `[today, today + days]`, sorted
/// ascending by expiry date (soonest first).
pub fn expiring_within(items: &[InventoryItem], today: NaiveDate, days: i64) -> Vec<InventoryItem> {
    let mut hits: Vec<InventoryItem> = items
        .iter()
        .filter(|item| {
            let remaining = item.days_remaining(today);
            remaining >= 0 && remaining <= days
        })
        .cloned()
        .collect();
    hits.sort_by_key(|i| i.expires_on);
    hits
}

/// Build a recipe `GenerationRequest` from a user's full pantry.
///
/// The pantry is split into waste-reduction priority items (expired or
/// expiring soon, soonest first) and the rest. An empty pantry is
/// rejected before any model call is attempted.
pub fn collect_request(
    items: Vec<InventoryItem>,
    preferences: Preferences,
    today: NaiveDate,
) -> Result<GenerationRequest> {
    if items.is_empty() {
        return Err(LarderError::EmptyPantry);
    }

    let mut request = GenerationRequest::recipes(today).with_preferences(preferences);
    for item in items {
        if item.is_priority(today) {
            request.priority_items.push(item);
        } else {
            request.other_items.push(item);
        }
    }
    request.priority_items.sort_by_key(|i| i.expires_on);
    request.other_items.sort_by_key(|i| i.expires_on);

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn pantry(t: NaiveDate) -> Vec<InventoryItem> {
        vec![
            InventoryItem::new("Rice", 5.0, "kg", t + Duration::days(300)),
            InventoryItem::new("Eggs", 6.0, "unit", t + Duration::days(5)),
            InventoryItem::new("Milk", 1.0, "litre", t + Duration::days(2)),
            InventoryItem::new("Yogurt", 1.0, "cup", t - Duration::days(1)),
        ]
    }

    #[test]
    fn test_expiring_within_sorted_soonest_first() {
        let t = today();
        let hits = expiring_within(&pantry(t), t, 7);

        let names: Vec<&str> = hits.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Eggs"]);
    }

    #[test]
    fn test_expiring_within_excludes_expired() {
        let t = today();
        let hits = expiring_within(&pantry(t), t, 7);
        assert!(hits.iter().all(|i| i.name != "Yogurt"));
    }

    #[test]
    fn test_warnings_partition_and_counts() {
        let t = today();
        let warnings = expiry_warnings(&pantry(t), t);

        assert_eq!(warnings.expired_count(), 1);
        assert_eq!(warnings.expiring_soon_count(), 2);
        assert_eq!(warnings.expired[0].name, "Yogurt");
        assert_eq!(warnings.expiring_soon[0].name, "Milk");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn test_collect_request_splits_priority() {
        let t = today();
        let request = collect_request(pantry(t), Preferences::new(), t).unwrap();

        let priority: Vec<&str> = request.priority_items.iter().map(|i| i.name.as_str()).collect();
        let other: Vec<&str> = request.other_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(priority, vec!["Yogurt", "Milk", "Eggs"]);
        assert_eq!(other, vec!["Rice"]);
    }

    #[test]
    fn test_collect_request_rejects_empty_pantry() {
        let result = collect_request(Vec::new(), Preferences::new(), today());
        assert!(matches!(result, Err(LarderError::EmptyPantry)));
    }
}
