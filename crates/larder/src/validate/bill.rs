//! Bill extraction result types.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::inventory::{InventoryItem, EXPIRING_SOON_DAYS};

/// One line item extracted from a photographed grocery bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillLineItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,

    /// Manufacture date, when printed on the receipt.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufactured_on: Option<NaiveDate>,

    /// Model-estimated expiry date.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_on: Option<NaiveDate>,

    /// Grocery category suggested by the model.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
}

impl BillLineItem {
    /// Convert into a pantry item. When the model supplied no expiry
    /// estimate, fall back to the expiring-soon horizon from `today`.
    pub fn into_inventory_item(self, today: NaiveDate) -> InventoryItem {
        let expires_on = self
            .expires_on
            .unwrap_or(today + Duration::days(EXPIRING_SOON_DAYS));
        InventoryItem {
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            manufactured_on: self.manufactured_on,
            expires_on,
            category: self.category,
        }
    }
}
