//! Larder: AI recipe generation and receipt extraction for household
//! grocery tracking.
//!
//! Larder turns a user's dated pantry inventory into recipe suggestions
//! via an external generative model, and extracts grocery line items
//! from photographed bills. Model output is untrusted: everything is
//! validated into explicit typed structures before it is persisted.
//!
//! # Pipeline
//!
//! Collector → Prompt Builder → Model Invoker → Validator → Store. Each
//! request is an independent, single-threaded pass; the only blocking
//! point is the model call, bounded by a configured timeout.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use larder::{GeminiInvoker, JsonStore, Larder, Preferences};
//!
//! let larder = Larder::new(
//!     GeminiInvoker::from_env().unwrap(),
//!     JsonStore::open("pantry.json").unwrap(),
//! );
//!
//! let mut preferences = Preferences::new();
//! preferences.insert("diet".into(), "vegetarian".into());
//!
//! let batch = larder
//!     .suggest_recipes(1, preferences, Local::now().date_naive())
//!     .unwrap();
//! println!("{} recipes ({} dropped)", batch.items.len(), batch.dropped);
//! ```

pub mod error;
pub mod inventory;
pub mod llm;
pub mod request;
pub mod store;
pub mod validate;

mod larder;

pub use crate::larder::{Larder, LarderConfig};
pub use error::{LarderError, Result};
pub use inventory::{
    days_remaining, expiry_warnings, DeductionCandidate, ExpiryStatus, ExpiryWarnings,
    InventoryItem,
};
pub use llm::{GeminiInvoker, LlmConfig, MockInvoker, ModelInvoker};
pub use request::{GenerationRequest, ImagePayload, Preferences, RequestKind};
pub use store::{
    Deduction, DeductionOutcome, JsonStore, MemoryStore, PantryRecord, PantryStore, SavedRecipe,
};
pub use validate::{
    validate_bill, validate_recipes, BillLineItem, Difficulty, Macros, RecipeCandidate,
    RecipeIngredient, ValidatedBatch,
};
