//! In-memory pantry store, used by tests and short-lived sessions.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::error::Result;
use crate::inventory::InventoryItem;
use crate::validate::{BillLineItem, RecipeCandidate};

use super::state::StoreState;
use super::{Deduction, DeductionOutcome, PantryRecord, PantryStore, SavedRecipe};

/// Pantry store backed by process memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PantryStore for MemoryStore {
    fn add_item(&self, user_id: u64, item: InventoryItem) -> Result<u64> {
        Ok(self.state().add_item(user_id, item))
    }

    fn list_items(&self, user_id: u64) -> Result<Vec<InventoryItem>> {
        Ok(self.state().list_items(user_id))
    }

    fn list_items_expiring_within(
        &self,
        user_id: u64,
        days: i64,
        today: NaiveDate,
    ) -> Result<Vec<InventoryItem>> {
        Ok(self.state().list_items_expiring_within(user_id, days, today))
    }

    fn list_records(&self, user_id: u64) -> Result<Vec<PantryRecord>> {
        Ok(self.state().list_records(user_id))
    }

    fn save_recipe(&self, user_id: u64, recipe: RecipeCandidate) -> Result<u64> {
        Ok(self.state().save_recipe(user_id, recipe))
    }

    fn list_recipes(&self, user_id: u64) -> Result<Vec<SavedRecipe>> {
        Ok(self.state().list_recipes(user_id))
    }

    fn get_recipe(&self, user_id: u64, recipe_id: u64) -> Result<SavedRecipe> {
        self.state().get_recipe(user_id, recipe_id)
    }

    fn delete_recipe(&self, user_id: u64, recipe_id: u64) -> Result<()> {
        self.state().delete_recipe(user_id, recipe_id)
    }

    fn save_bill_items(
        &self,
        user_id: u64,
        items: Vec<BillLineItem>,
        today: NaiveDate,
    ) -> Result<Vec<u64>> {
        Ok(self.state().save_bill_items(user_id, items, today))
    }

    fn deduct(&self, user_id: u64, deductions: &[Deduction]) -> Result<DeductionOutcome> {
        Ok(self.state().deduct(user_id, deductions))
    }
}
