//! Validation and normalization of untrusted model output.
//!
//! The expected schemas are explicit tagged structures (one per
//! accepted shape); anything that doesn't fit is rejected rather than
//! carried along as an arbitrary nested map.

mod bill;
mod recipe;
mod validator;

pub use bill::BillLineItem;
pub use recipe::{Difficulty, Macros, RecipeCandidate, RecipeIngredient};
pub use validator::{validate_bill, validate_recipes, ValidatedBatch};
