//! Validation and normalization of raw model output.
//!
//! Parsing is strict (invalid JSON is `MalformedResponse`), but batch
//! acceptance is deliberately lenient: model output is inherently
//! variable, so malformed entries are dropped and counted instead of
//! failing the whole batch. A batch with no usable entries surfaces the
//! first offending field as a `SchemaViolation`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{LarderError, Result};

use super::bill::BillLineItem;
use super::recipe::{Difficulty, Macros, RecipeCandidate, RecipeIngredient};

/// Leading decimal number in a quantity or macro string ("300 kcal", "20g").
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").unwrap());

/// Ingredient strings like "2 Tomatoes", "200g Paneer" or "1 cup Rice":
/// a leading quantity, an optional unit word, then the name.
static INGREDIENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(\d+(?:\.\d+)?)\s*(?:(?:g|kg|gms?|grams?|mg|ml|l|litres?|liters?|cups?|tbsps?|tsps?|oz|lbs?|pcs?|pieces?|units?)\b\.?)?\s*(\S.*)$",
    )
    .unwrap()
});

/// Outcome of validating one model response batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedBatch<T> {
    /// Entries that passed validation, in model order.
    pub items: Vec<T>,
    /// Number of malformed entries dropped from the batch.
    pub dropped: usize,
}

/// A schema problem located at a named field.
struct FieldError {
    field: String,
    message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<FieldError> for LarderError {
    fn from(err: FieldError) -> Self {
        LarderError::schema(err.field, err.message)
    }
}

/// Validate raw model output as a batch of recipe candidates.
pub fn validate_recipes(raw: &str) -> Result<ValidatedBatch<RecipeCandidate>> {
    validate_batch(raw, recipe_from_value)
}

/// Validate raw model output as a batch of bill line items.
pub fn validate_bill(raw: &str) -> Result<ValidatedBatch<BillLineItem>> {
    validate_batch(raw, bill_item_from_value)
}

fn validate_batch<T>(
    raw: &str,
    entry_from_value: fn(&Value) -> std::result::Result<T, FieldError>,
) -> Result<ValidatedBatch<T>> {
    let value = parse_json(raw)?;
    let entries = as_entries(value)?;

    let mut items = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    let mut first_error: Option<FieldError> = None;

    for entry in &entries {
        match entry_from_value(entry) {
            Ok(item) => items.push(item),
            Err(err) => {
                dropped += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    // Nothing usable at all: report the first schema problem instead of
    // an empty batch.
    if items.is_empty() {
        if let Some(err) = first_error {
            return Err(err.into());
        }
    }

    if dropped > 0 {
        warn!(dropped, accepted = items.len(), "dropped malformed entries from model batch");
    }

    Ok(ValidatedBatch { items, dropped })
}

/// Strict JSON parse after stripping any Markdown code fences the model
/// wrapped around its output.
fn parse_json(raw: &str) -> Result<Value> {
    let json_str = strip_code_fences(raw);
    serde_json::from_str(json_str)
        .map_err(|e| LarderError::MalformedResponse(format!("invalid JSON: {}", e)))
}

/// Extract JSON from a markdown code block if present.
fn strip_code_fences(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    }
}

/// A response is expected to be a JSON array; a single object is
/// tolerated as a one-entry batch.
fn as_entries(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(entries) => Ok(entries),
        obj @ Value::Object(_) => Ok(vec![obj]),
        other => Err(LarderError::schema(
            "$",
            format!("expected a JSON array of objects, got {}", type_name(&other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerce a JSON value to a number, accepting numeric strings with a
/// trailing unit the way the model tends to write macros.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_NUMBER
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

/// Look up the first present key among aliases.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key))
}

fn required_string(
    obj: &Map<String, Value>,
    keys: &[&str],
) -> std::result::Result<String, FieldError> {
    let name = keys[0];
    match field(obj, keys) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(FieldError::new(name, "must not be empty")),
        Some(other) => Err(FieldError::new(
            name,
            format!("expected a string, got {}", type_name(other)),
        )),
        None => Err(FieldError::new(name, "missing required field")),
    }
}

fn as_object(value: &Value) -> std::result::Result<&Map<String, Value>, FieldError> {
    value.as_object().ok_or_else(|| {
        FieldError::new("$", format!("expected an object, got {}", type_name(value)))
    })
}

// =============================================================================
// Recipe entries
// =============================================================================

fn recipe_from_value(value: &Value) -> std::result::Result<RecipeCandidate, FieldError> {
    let obj = as_object(value)?;

    let name = required_string(obj, &["name", "recipe_name"])?;
    let ingredients = ingredients_from_value(
        field(obj, &["ingredients"]).ok_or_else(|| FieldError::new("ingredients", "missing required field"))?,
    )?;
    let steps = steps_from_value(
        field(obj, &["steps", "instructions"])
            .ok_or_else(|| FieldError::new("steps", "missing required field"))?,
    )?;
    let prep_time = required_string(obj, &["prep_time", "time"])?;
    let difficulty = difficulty_from_value(
        field(obj, &["difficulty"])
            .ok_or_else(|| FieldError::new("difficulty", "missing required field"))?,
    )?;
    let macros = macros_from_value(obj)?;

    Ok(RecipeCandidate {
        name,
        ingredients,
        steps,
        prep_time,
        difficulty,
        macros,
    })
}

/// Accept both shapes the model produces: `{"name": ..., "quantity": ...}`
/// objects and bare strings like "2 Tomatoes" with an optional leading
/// quantity (defaulting to 1).
fn ingredients_from_value(
    value: &Value,
) -> std::result::Result<Vec<RecipeIngredient>, FieldError> {
    let entries = value
        .as_array()
        .ok_or_else(|| FieldError::new("ingredients", "expected an array"))?;
    if entries.is_empty() {
        return Err(FieldError::new("ingredients", "must not be empty"));
    }

    let mut ingredients = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(s) if !s.trim().is_empty() => {
                ingredients.push(ingredient_from_string(s));
            }
            Value::Object(obj) => {
                let name = required_string(obj, &["name"])
                    .map_err(|e| FieldError::new("ingredients", e.message))?;
                let quantity = match field(obj, &["quantity"]) {
                    Some(v) => coerce_number(v).ok_or_else(|| {
                        FieldError::new("ingredients", "quantity is not numeric")
                    })?,
                    None => 1.0,
                };
                ingredients.push(RecipeIngredient { name, quantity });
            }
            _ => {
                return Err(FieldError::new(
                    "ingredients",
                    "entries must be strings or objects",
                ))
            }
        }
    }
    Ok(ingredients)
}

fn ingredient_from_string(raw: &str) -> RecipeIngredient {
    let raw = raw.trim();
    match INGREDIENT_LINE.captures(raw) {
        Some(caps) => {
            let quantity = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1.0);
            let name = caps.get(2).map_or(raw, |m| m.as_str()).trim();
            RecipeIngredient {
                name: name.to_string(),
                quantity,
            }
        }
        None => RecipeIngredient {
            name: raw.to_string(),
            quantity: 1.0,
        },
    }
}

fn steps_from_value(value: &Value) -> std::result::Result<Vec<String>, FieldError> {
    let entries = value
        .as_array()
        .ok_or_else(|| FieldError::new("steps", "expected an array"))?;

    let mut steps = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(s) if !s.trim().is_empty() => steps.push(s.trim().to_string()),
            _ => return Err(FieldError::new("steps", "entries must be non-empty strings")),
        }
    }
    if steps.is_empty() {
        return Err(FieldError::new("steps", "must not be empty"));
    }
    Ok(steps)
}

fn difficulty_from_value(value: &Value) -> std::result::Result<Difficulty, FieldError> {
    let raw = value
        .as_str()
        .ok_or_else(|| FieldError::new("difficulty", "expected a string"))?;
    Difficulty::parse(raw)
        .ok_or_else(|| FieldError::new("difficulty", format!("unrecognized value '{}'", raw)))
}

/// Macros may arrive nested under "macros" with calories inside, or
/// with calories at the top level next to a macros object; the model
/// produces both.
fn macros_from_value(obj: &Map<String, Value>) -> std::result::Result<Macros, FieldError> {
    let nested = match field(obj, &["macros"]) {
        Some(Value::Object(m)) => Some(m),
        Some(other) => {
            return Err(FieldError::new(
                "macros",
                format!("expected an object, got {}", type_name(other)),
            ))
        }
        None => None,
    };

    let lookup = |keys: &[&str]| -> Option<f64> {
        nested
            .and_then(|m| field(m, keys))
            .or_else(|| field(obj, keys))
            .and_then(coerce_number)
    };

    let calories = lookup(&["calories"])
        .ok_or_else(|| FieldError::new("macros.calories", "missing or non-numeric"))?;
    let protein = lookup(&["protein"])
        .ok_or_else(|| FieldError::new("macros.protein", "missing or non-numeric"))?;
    let carbs = lookup(&["carbs"])
        .ok_or_else(|| FieldError::new("macros.carbs", "missing or non-numeric"))?;
    let fat = lookup(&["fat", "fats"])
        .ok_or_else(|| FieldError::new("macros.fat", "missing or non-numeric"))?;

    Ok(Macros {
        calories,
        protein,
        carbs,
        fat,
    })
}

// =============================================================================
// Bill entries
// =============================================================================

fn bill_item_from_value(value: &Value) -> std::result::Result<BillLineItem, FieldError> {
    let obj = as_object(value)?;

    let name = required_string(obj, &["name"])?;
    let quantity = match field(obj, &["quantity"]) {
        Some(v) => {
            coerce_number(v).ok_or_else(|| FieldError::new("quantity", "not numeric"))?
        }
        None => 1.0,
    };
    let unit = match field(obj, &["unit"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Null) | None => "unit".to_string(),
        Some(other) => {
            return Err(FieldError::new(
                "unit",
                format!("expected a string, got {}", type_name(other)),
            ))
        }
    };
    let manufactured_on = optional_date(obj, &["manufactured_on"])?;
    let expires_on = optional_date(obj, &["expires_on", "expiry"])?;
    let category = match field(obj, &["category"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };

    Ok(BillLineItem {
        name,
        quantity,
        unit,
        manufactured_on,
        expires_on,
        category,
    })
}

fn optional_date(
    obj: &Map<String, Value>,
    keys: &[&str],
) -> std::result::Result<Option<NaiveDate>, FieldError> {
    match field(obj, keys) {
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                FieldError::new(keys[0], format!("'{}' is not an ISO date (YYYY-MM-DD)", s))
            }),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(FieldError::new(
            keys[0],
            format!("expected a date string, got {}", type_name(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_recipe_json() -> &'static str {
        r#"{
            "name": "Milk Rice Pudding",
            "ingredients": [{"name": "Milk", "quantity": 1}, {"name": "Rice", "quantity": 0.5}],
            "steps": ["Boil the milk.", "Add the rice and simmer."],
            "prep_time": "30 mins",
            "difficulty": "easy",
            "macros": {"calories": 320, "protein": 9, "carbs": 55, "fat": 7}
        }"#
    }

    #[test]
    fn test_truncated_json_is_malformed_not_a_crash() {
        let result = validate_recipes("{");
        assert!(matches!(result, Err(LarderError::MalformedResponse(_))));
    }

    #[test]
    fn test_single_object_is_a_one_entry_batch() {
        let batch = validate_recipes(valid_recipe_json()).unwrap();
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.dropped, 0);
        assert_eq!(batch.items[0].name, "Milk Rice Pudding");
        assert_eq!(batch.items[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_markdown_fences_are_stripped() {
        let raw = format!("```json\n[{}]\n```", valid_recipe_json());
        let batch = validate_recipes(&raw).unwrap();
        assert_eq!(batch.items.len(), 1);
    }

    #[test]
    fn test_invalid_difficulty_drops_entry_and_reports_count() {
        let raw = format!(
            "[{good}, {bad}, {good}]",
            good = valid_recipe_json(),
            bad = valid_recipe_json().replace("\"easy\"", "\"extreme\"")
        );
        let batch = validate_recipes(&raw).unwrap();
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_all_entries_malformed_names_first_offending_field() {
        let raw = r#"[{"name": "No Steps Stew"}]"#;
        match validate_recipes(raw) {
            Err(LarderError::SchemaViolation { field, .. }) => assert_eq!(field, "ingredients"),
            other => panic!("expected SchemaViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_macro_strings_coerce_to_numbers() {
        let raw = r#"[{
            "name": "Paneer Curry",
            "ingredients": ["200g Paneer", "2 Tomatoes"],
            "instructions": ["Fry the paneer.", "Simmer in tomato gravy."],
            "time": "25 mins",
            "difficulty": "Medium",
            "calories": "300 kcal",
            "macros": {"protein": "20g", "carbs": "15g", "fats": "18g"}
        }]"#;

        let batch = validate_recipes(raw).unwrap();
        let recipe = &batch.items[0];
        assert_eq!(recipe.macros.calories, 300.0);
        assert_eq!(recipe.macros.protein, 20.0);
        assert_eq!(recipe.macros.fat, 18.0);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.prep_time, "25 mins");
    }

    #[test]
    fn test_string_ingredients_split_leading_quantity() {
        let ingredient = ingredient_from_string("2 Tomatoes");
        assert_eq!(ingredient.name, "Tomatoes");
        assert_eq!(ingredient.quantity, 2.0);

        let with_unit = ingredient_from_string("200g Paneer");
        assert_eq!(with_unit.name, "Paneer");
        assert_eq!(with_unit.quantity, 200.0);

        let cup = ingredient_from_string("1 cup Rice");
        assert_eq!(cup.name, "Rice");
        assert_eq!(cup.quantity, 1.0);

        let unitless = ingredient_from_string("Salt to taste");
        assert_eq!(unitless.name, "Salt to taste");
        assert_eq!(unitless.quantity, 1.0);
    }

    #[test]
    fn test_validation_round_trip_is_idempotent() {
        let batch = validate_recipes(valid_recipe_json()).unwrap();
        let serialized = serde_json::to_string(&batch.items).unwrap();

        let again = validate_recipes(&serialized).unwrap();
        assert_eq!(again.items, batch.items);
        assert_eq!(again.dropped, 0);
    }

    #[test]
    fn test_top_level_scalar_is_schema_violation() {
        match validate_recipes("42") {
            Err(LarderError::SchemaViolation { field, .. }) => assert_eq!(field, "$"),
            other => panic!("expected SchemaViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_bill_items_parse_with_aliases_and_defaults() {
        let raw = r#"[
            {"name": "Milk", "quantity": 1, "expiry": "2025-07-01", "category": "Dairy"},
            {"name": "Basmati Rice", "quantity": "2 bags", "unit": "bag", "expires_on": "2026-01-01"}
        ]"#;

        let batch = validate_bill(raw).unwrap();
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.dropped, 0);

        assert_eq!(batch.items[0].unit, "unit");
        assert_eq!(
            batch.items[0].expires_on,
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert_eq!(batch.items[1].quantity, 2.0);
        assert_eq!(batch.items[1].unit, "bag");
    }

    #[test]
    fn test_bill_item_with_bad_date_is_dropped() {
        let raw = r#"[
            {"name": "Milk", "expiry": "2025-07-01"},
            {"name": "Eggs", "expiry": "next week"}
        ]"#;

        let batch = validate_bill(raw).unwrap();
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.dropped, 1);
        assert_eq!(batch.items[0].name, "Milk");
    }

    #[test]
    fn test_empty_array_is_an_empty_batch() {
        let batch = validate_recipes("[]").unwrap();
        assert!(batch.items.is_empty());
        assert_eq!(batch.dropped, 0);
    }
}
