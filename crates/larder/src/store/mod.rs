//! Durable records and the pantry storage collaborator.
//!
//! Every operation is scoped by `user_id`. Duplicate saves are
//! permitted by design (each save is an explicit user action); the only
//! atomicity requirement is that a bill batch persists all-or-nothing.

mod json;
mod memory;
mod state;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inventory::InventoryItem;
use crate::validate::{BillLineItem, RecipeCandidate};

pub use json::JsonStore;
pub use memory::MemoryStore;

/// One durable pantry record with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryRecord {
    pub id: u64,
    pub user_id: u64,
    #[serde(flatten)]
    pub item: InventoryItem,
}

/// Durable form of a validated recipe candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: u64,
    pub owner_user_id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub recipe: RecipeCandidate,
}

/// Requested inventory deduction against one pantry record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Deduction {
    pub record_id: u64,
    pub quantity: f64,
}

/// Result of applying a batch of deductions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionOutcome {
    /// Records whose quantity was reduced.
    pub updated: usize,
    /// Records consumed completely and removed.
    pub removed: usize,
}

/// Storage collaborator for pantry items and saved recipes.
///
/// Implementations must be thread-safe (Send + Sync). Failures surface
/// as `DataUnavailable` and are never retried by the pipeline.
pub trait PantryStore: Send + Sync {
    /// Add one pantry item, returning the created record id.
    fn add_item(&self, user_id: u64, item: InventoryItem) -> Result<u64>;

    /// All of a user's pantry items.
    fn list_items(&self, user_id: u64) -> Result<Vec<InventoryItem>>;

    /// Items expiring within `[today, today + days]`, soonest first.
    fn list_items_expiring_within(
        &self,
        user_id: u64,
        days: i64,
        today: NaiveDate,
    ) -> Result<Vec<InventoryItem>>;

    /// Pantry records with their ids, for deduction matching.
    fn list_records(&self, user_id: u64) -> Result<Vec<PantryRecord>>;

    /// Persist a validated recipe, returning the created record id.
    fn save_recipe(&self, user_id: u64, recipe: RecipeCandidate) -> Result<u64>;

    /// All recipes saved by a user, newest first.
    fn list_recipes(&self, user_id: u64) -> Result<Vec<SavedRecipe>>;

    /// Fetch one saved recipe by id.
    fn get_recipe(&self, user_id: u64, recipe_id: u64) -> Result<SavedRecipe>;

    /// Delete one saved recipe. Only explicit user action reaches this.
    fn delete_recipe(&self, user_id: u64, recipe_id: u64) -> Result<()>;

    /// Persist a validated bill batch as pantry items, all-or-nothing,
    /// returning the created record ids in input order.
    fn save_bill_items(
        &self,
        user_id: u64,
        items: Vec<BillLineItem>,
        today: NaiveDate,
    ) -> Result<Vec<u64>>;

    /// Apply confirmed ingredient deductions.
    fn deduct(&self, user_id: u64, deductions: &[Deduction]) -> Result<DeductionOutcome>;
}
