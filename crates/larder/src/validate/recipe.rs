//! Recipe candidate types produced by the validator.

use serde::{Deserialize, Serialize};

/// Difficulty rating of a recipe.
///
/// Unrecognized model values are rejected by the validator, never
/// defaulted, to avoid silently fabricating a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a model-supplied difficulty, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Macro-nutrient estimate per serving, in kcal and grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// One ingredient of a proposed recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
}

/// A model-proposed recipe pending persistence.
///
/// Invariant: every field is present and non-empty after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub name: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<String>,
    pub prep_time: String,
    pub difficulty: Difficulty,
    pub macros: Macros,
}
