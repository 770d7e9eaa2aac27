//! Matching recipe ingredients against pantry records for deduction.

use serde::{Deserialize, Serialize};

use crate::store::PantryRecord;
use crate::validate::RecipeIngredient;

/// One recipe ingredient paired with its best pantry match, if any,
/// for the user to confirm before quantities are deducted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionCandidate {
    pub ingredient_name: String,
    pub quantity_needed: f64,
    /// Record id of the best-matching pantry item.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub best_match: Option<u64>,
}

/// Pair each recipe ingredient with its best pantry match.
///
/// Exact name matches (case-insensitive) rank above substring matches
/// in either direction; unmatched ingredients carry no record id.
pub fn deduction_candidates(
    ingredients: &[RecipeIngredient],
    records: &[PantryRecord],
) -> Vec<DeductionCandidate> {
    ingredients
        .iter()
        .map(|ingredient| {
            let needle = ingredient.name.to_lowercase();
            let mut exact = None;
            let mut partial = None;

            for record in records {
                let candidate = record.item.name.to_lowercase();
                if candidate == needle {
                    exact.get_or_insert(record.id);
                } else if candidate.contains(&needle) || needle.contains(&candidate) {
                    partial.get_or_insert(record.id);
                }
            }

            DeductionCandidate {
                ingredient_name: ingredient.name.clone(),
                quantity_needed: ingredient.quantity,
                best_match: exact.or(partial),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryItem;
    use chrono::NaiveDate;

    fn record(id: u64, name: &str) -> PantryRecord {
        PantryRecord {
            id,
            user_id: 1,
            item: InventoryItem::new(
                name,
                1.0,
                "unit",
                NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            ),
        }
    }

    fn ingredient(name: &str, quantity: f64) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_exact_match_beats_partial() {
        let records = vec![record(1, "Basmati Rice"), record(2, "rice")];
        let candidates = deduction_candidates(&[ingredient("Rice", 1.0)], &records);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].best_match, Some(2));
    }

    #[test]
    fn test_substring_match_either_direction() {
        let records = vec![record(7, "Whole Wheat Flour")];
        let candidates = deduction_candidates(&[ingredient("Flour", 2.0)], &records);
        assert_eq!(candidates[0].best_match, Some(7));

        let candidates = deduction_candidates(&[ingredient("Organic Whole Wheat Flour", 2.0)], &records);
        assert_eq!(candidates[0].best_match, Some(7));
    }

    #[test]
    fn test_unmatched_ingredient_has_no_record() {
        let records = vec![record(1, "Milk")];
        let candidates = deduction_candidates(&[ingredient("Saffron", 0.5)], &records);
        assert_eq!(candidates[0].best_match, None);
        assert_eq!(candidates[0].quantity_needed, 0.5);
    }
}
