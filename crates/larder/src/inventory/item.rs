//! Inventory item types and the expiry classification rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days within which an item counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Expiry status derived from the days remaining until an item's expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// The expiry date has passed.
    Expired,
    /// Expires within the next seven days (inclusive of today).
    ExpiringSoon,
    /// More than seven days of shelf life left.
    Fresh,
}

impl ExpiryStatus {
    /// Classify an expiry date relative to `today`.
    ///
    /// Total over any date pair: negative days remaining is `Expired`,
    /// zero through seven is `ExpiringSoon`, anything later is `Fresh`.
    pub fn classify(expires_on: NaiveDate, today: NaiveDate) -> Self {
        let days = days_remaining(expires_on, today);
        if days < 0 {
            ExpiryStatus::Expired
        } else if days <= EXPIRING_SOON_DAYS {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Fresh
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::ExpiringSoon => "Expiring Soon",
            ExpiryStatus::Fresh => "Fresh",
        }
    }
}

/// Signed number of days between `today` and the expiry date.
pub fn days_remaining(expires_on: NaiveDate, today: NaiveDate) -> i64 {
    (expires_on - today).num_days()
}

/// A pantry item owned by a user.
///
/// Created by the CRUD collaborator; read-only input to this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,

    /// Manufacture date, when known. Absence is legal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufactured_on: Option<NaiveDate>,

    pub expires_on: NaiveDate,

    /// Grocery category (e.g., "Dairy"), when assigned.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
}

impl InventoryItem {
    /// Create an item with the required fields.
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        expires_on: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            manufactured_on: None,
            expires_on,
            category: None,
        }
    }

    /// Set the manufacture date.
    pub fn with_manufactured_on(mut self, date: NaiveDate) -> Self {
        self.manufactured_on = Some(date);
        self
    }

    /// Set the grocery category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Expiry status of this item relative to `today`.
    pub fn status(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::classify(self.expires_on, today)
    }

    /// Signed days until this item expires.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        days_remaining(self.expires_on, today)
    }

    /// Whether the recipe prompt should treat this item as a
    /// waste-reduction priority (already expired or expiring soon).
    pub fn is_priority(&self, today: NaiveDate) -> bool {
        self.status(today) != ExpiryStatus::Fresh
    }
}
