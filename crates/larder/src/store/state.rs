//! Shared in-memory state behind both store implementations.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LarderError, Result};
use crate::inventory::{self, InventoryItem};
use crate::validate::{BillLineItem, RecipeCandidate};

use super::{Deduction, DeductionOutcome, PantryRecord, SavedRecipe};

fn first_id() -> u64 {
    1
}

/// Complete store contents. Mutations happen on a scratch clone which
/// is committed only after a successful flush, keeping batches
/// all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct StoreState {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub pantry: Vec<PantryRecord>,
    #[serde(default)]
    pub recipes: Vec<SavedRecipe>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            pantry: Vec::new(),
            recipes: Vec::new(),
        }
    }
}

impl StoreState {
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_item(&mut self, user_id: u64, item: InventoryItem) -> u64 {
        let id = self.alloc_id();
        self.pantry.push(PantryRecord { id, user_id, item });
        id
    }

    pub fn list_items(&self, user_id: u64) -> Vec<InventoryItem> {
        self.pantry
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.item.clone())
            .collect()
    }

    pub fn list_items_expiring_within(
        &self,
        user_id: u64,
        days: i64,
        today: NaiveDate,
    ) -> Vec<InventoryItem> {
        inventory::expiring_within(&self.list_items(user_id), today, days)
    }

    pub fn list_records(&self, user_id: u64) -> Vec<PantryRecord> {
        self.pantry
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn save_recipe(&mut self, user_id: u64, recipe: RecipeCandidate) -> u64 {
        let id = self.alloc_id();
        self.recipes.push(SavedRecipe {
            id,
            owner_user_id: user_id,
            created_at: Utc::now(),
            recipe,
        });
        id
    }

    pub fn list_recipes(&self, user_id: u64) -> Vec<SavedRecipe> {
        let mut recipes: Vec<SavedRecipe> = self
            .recipes
            .iter()
            .filter(|saved| saved.owner_user_id == user_id)
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recipes
    }

    pub fn get_recipe(&self, user_id: u64, recipe_id: u64) -> Result<SavedRecipe> {
        self.recipes
            .iter()
            .find(|saved| saved.id == recipe_id && saved.owner_user_id == user_id)
            .cloned()
            .ok_or_else(|| {
                LarderError::DataUnavailable(format!("recipe {} not found", recipe_id))
            })
    }

    pub fn delete_recipe(&mut self, user_id: u64, recipe_id: u64) -> Result<()> {
        let before = self.recipes.len();
        self.recipes
            .retain(|saved| !(saved.id == recipe_id && saved.owner_user_id == user_id));
        if self.recipes.len() == before {
            return Err(LarderError::DataUnavailable(format!(
                "recipe {} not found",
                recipe_id
            )));
        }
        Ok(())
    }

    pub fn save_bill_items(
        &mut self,
        user_id: u64,
        items: Vec<BillLineItem>,
        today: NaiveDate,
    ) -> Vec<u64> {
        items
            .into_iter()
            .map(|line| self.add_item(user_id, line.into_inventory_item(today)))
            .collect()
    }

    /// Apply deductions. Missing records and non-positive quantities
    /// are skipped; a record drained to zero or below is removed.
    pub fn deduct(&mut self, user_id: u64, deductions: &[Deduction]) -> DeductionOutcome {
        let mut outcome = DeductionOutcome::default();
        for deduction in deductions {
            if deduction.quantity <= 0.0 {
                continue;
            }
            let Some(index) = self
                .pantry
                .iter()
                .position(|r| r.id == deduction.record_id && r.user_id == user_id)
            else {
                continue;
            };

            if self.pantry[index].item.quantity <= deduction.quantity {
                self.pantry.remove(index);
                outcome.removed += 1;
            } else {
                self.pantry[index].item.quantity -= deduction.quantity;
                outcome.updated += 1;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let t = today();
        let mut state = StoreState::default();
        let a = state.add_item(1, InventoryItem::new("Milk", 1.0, "litre", t));
        let b = state.add_item(1, InventoryItem::new("Eggs", 6.0, "unit", t));
        assert!(b > a);
    }

    #[test]
    fn test_listing_is_user_scoped() {
        let t = today();
        let mut state = StoreState::default();
        state.add_item(1, InventoryItem::new("Milk", 1.0, "litre", t));
        state.add_item(2, InventoryItem::new("Rice", 5.0, "kg", t));

        assert_eq!(state.list_items(1).len(), 1);
        assert_eq!(state.list_items(2).len(), 1);
        assert_eq!(state.list_items(3).len(), 0);
    }

    #[test]
    fn test_deduct_updates_and_removes() {
        let t = today();
        let mut state = StoreState::default();
        let milk = state.add_item(1, InventoryItem::new("Milk", 2.0, "litre", t));
        let eggs = state.add_item(1, InventoryItem::new("Eggs", 6.0, "unit", t));

        let outcome = state.deduct(
            1,
            &[
                Deduction { record_id: milk, quantity: 0.5 },
                Deduction { record_id: eggs, quantity: 6.0 },
            ],
        );

        assert_eq!(outcome, DeductionOutcome { updated: 1, removed: 1 });
        let items = state.list_items(1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1.5);
    }

    #[test]
    fn test_deduct_skips_foreign_and_missing_records() {
        let t = today();
        let mut state = StoreState::default();
        let other_users = state.add_item(2, InventoryItem::new("Milk", 1.0, "litre", t));

        let outcome = state.deduct(
            1,
            &[
                Deduction { record_id: other_users, quantity: 1.0 },
                Deduction { record_id: 999, quantity: 1.0 },
            ],
        );

        assert_eq!(outcome, DeductionOutcome::default());
        assert_eq!(state.list_items(2).len(), 1);
    }

    #[test]
    fn test_recipes_scoped_and_deletable() {
        let mut state = StoreState::default();
        let recipe = RecipeCandidate {
            name: "Test".to_string(),
            ingredients: vec![],
            steps: vec!["Cook.".to_string()],
            prep_time: "5 mins".to_string(),
            difficulty: crate::validate::Difficulty::Easy,
            macros: crate::validate::Macros {
                calories: 100.0,
                protein: 5.0,
                carbs: 10.0,
                fat: 3.0,
            },
        };

        let id = state.save_recipe(42, recipe);
        assert!(state.get_recipe(42, id).is_ok());
        assert!(state.get_recipe(7, id).is_err());

        state.delete_recipe(42, id).unwrap();
        assert!(state.get_recipe(42, id).is_err());
    }

    #[test]
    fn test_expiring_window_query() {
        let t = today();
        let mut state = StoreState::default();
        state.add_item(1, InventoryItem::new("Milk", 1.0, "litre", t + Duration::days(2)));
        state.add_item(1, InventoryItem::new("Rice", 5.0, "kg", t + Duration::days(90)));

        let soon = state.list_items_expiring_within(1, 7, t);
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].name, "Milk");
    }
}
