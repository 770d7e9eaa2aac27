//! JSON-file-backed pantry store.
//!
//! Mutations are applied to a scratch copy of the state and flushed via
//! a temp-file rename before being committed in memory, so a failed
//! write (including a bill batch) leaves both the file and the running
//! state untouched.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::error::{LarderError, Result};
use crate::inventory::InventoryItem;
use crate::validate::{BillLineItem, RecipeCandidate};

use super::state::StoreState;
use super::{Deduction, DeductionOutcome, PantryRecord, PantryStore, SavedRecipe};

/// Pantry store persisted as a single JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonStore {
    /// Open a store at `path`, creating an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            Self::load(&path)?
        } else {
            StoreState::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<StoreState> {
        let file = File::open(path).map_err(|e| {
            LarderError::DataUnavailable(format!("failed to open '{}': {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            LarderError::DataUnavailable(format!("failed to parse '{}': {}", path.display(), e))
        })
    }

    /// Write the state to disk atomically: serialize into a sibling
    /// temp file, then rename over the target.
    fn flush(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    LarderError::DataUnavailable(format!(
                        "failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(|e| {
            LarderError::DataUnavailable(format!(
                "failed to create '{}': {}",
                tmp_path.display(),
                e
            ))
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, state).map_err(|e| {
            LarderError::DataUnavailable(format!("failed to serialize store: {}", e))
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            LarderError::DataUnavailable(format!(
                "failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a mutation on a scratch copy, flush it, then commit.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.state();
        let mut scratch = guard.clone();
        let value = op(&mut scratch)?;
        self.flush(&scratch)?;
        *guard = scratch;
        Ok(value)
    }
}

impl PantryStore for JsonStore {
    fn add_item(&self, user_id: u64, item: InventoryItem) -> Result<u64> {
        self.mutate(|state| Ok(state.add_item(user_id, item)))
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
        self.mutate(|state| Ok(state.save_recipe(user_id, recipe)))
    }

    fn list_recipes(&self, user_id: u64) -> Result<Vec<SavedRecipe>> {
        Ok(self.state().list_recipes(user_id))
    }

    fn get_recipe(&self, user_id: u64, recipe_id: u64) -> Result<SavedRecipe> {
        self.state().get_recipe(user_id, recipe_id)
    }

    fn delete_recipe(&self, user_id: u64, recipe_id: u64) -> Result<()> {
        self.mutate(|state| state.delete_recipe(user_id, recipe_id))
    }

    fn save_bill_items(
        &self,
        user_id: u64,
        items: Vec<BillLineItem>,
        today: NaiveDate,
    ) -> Result<Vec<u64>> {
        self.mutate(|state| Ok(state.save_bill_items(user_id, items, today)))
    }

    fn deduct(&self, user_id: u64, deductions: &[Deduction]) -> Result<DeductionOutcome> {
        self.mutate(|state| Ok(state.deduct(user_id, deductions)))
    }
}
