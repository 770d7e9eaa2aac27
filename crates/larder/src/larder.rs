//! Main Larder struct and the caller-facing pipeline.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{LarderError, Result};
use crate::inventory::{self, DeductionCandidate, ExpiryWarnings};
use crate::llm::{prompts, ModelInvoker};
use crate::request::{ImagePayload, Preferences};
use crate::store::{Deduction, DeductionOutcome, PantryStore, SavedRecipe};
use crate::validate::{
    validate_bill, validate_recipes, BillLineItem, RecipeCandidate, ValidatedBatch,
};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct LarderConfig {
    /// Window used when querying items that are about to expire.
    pub expiry_window_days: i64,

    /// Known grocery categories, embedded into the bill-extraction
    /// prompt so the model picks from real choices.
    pub categories: Vec<String>,
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            expiry_window_days: inventory::EXPIRING_SOON_DAYS,
            categories: [
                "Vegetables",
                "Fruits",
                "Dairy",
                "Meat/Fish",
                "Grains/Pasta",
                "Spices",
                "Condiments & Seasonings",
                "Beverages",
                "Snacks",
                "Others",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// The AI recipe and receipt-extraction pipeline.
///
/// Each method runs one short-lived, single-threaded pipeline pass:
/// Collector → Prompt Builder → Model Invoker → Validator → (on
/// success) the persistence collaborator. A failure at any stage
/// surfaces to the caller without partial writes.
pub struct Larder {
    config: LarderConfig,
    invoker: Arc<dyn ModelInvoker>,
    store: Arc<dyn PantryStore>,
}

impl Larder {
    /// Create a pipeline around a model invoker and pantry store.
    pub fn new(invoker: impl ModelInvoker + 'static, store: impl PantryStore + 'static) -> Self {
        Self {
            config: LarderConfig::default(),
            invoker: Arc::new(invoker),
            store: Arc::new(store),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: LarderConfig) -> Self {
        self.config = config;
        self
    }

    /// The pantry store collaborator.
    pub fn store(&self) -> &dyn PantryStore {
        self.store.as_ref()
    }

    /// Generate recipe candidates from a user's pantry.
    ///
    /// The whole pantry is collected and split into waste-reduction
    /// priority items and the rest; an empty pantry fails with
    /// `EmptyPantry` before any model call.
    pub fn suggest_recipes(
        &self,
        user_id: u64,
        preferences: Preferences,
        today: NaiveDate,
    ) -> Result<ValidatedBatch<RecipeCandidate>> {
        let items = self.store.list_items(user_id)?;
        let request = inventory::collect_request(items, preferences, today)?;
        debug!(
            priority = request.priority_items.len(),
            other = request.other_items.len(),
            "collected pantry for recipe generation"
        );

        let prompt = prompts::render(&request);
        let raw = self.complete_with_retry(&prompt, None)?;
        self.validate_with_reprompt(raw, &prompt, None, validate_recipes)
    }

    /// Extract grocery line items from a photographed bill.
    pub fn extract_bill(
        &self,
        image: ImagePayload,
        today: NaiveDate,
    ) -> Result<ValidatedBatch<BillLineItem>> {
        let request = crate::request::GenerationRequest::bill_extraction(image, today)
            .with_categories(self.config.categories.clone());
        let prompt = prompts::render(&request);
        let image = request.image.as_ref();
        let raw = self.complete_with_retry(&prompt, image)?;
        self.validate_with_reprompt(raw, &prompt, image, validate_bill)
    }

    /// Refine an existing recipe text against non-empty preferences.
    /// Free text in, free text out; no JSON validation stage.
    pub fn refine_recipe(&self, current_recipe: &str, preferences: &str) -> Result<String> {
        if preferences.trim().is_empty() {
            return Err(LarderError::MissingPreferences);
        }
        let prompt = prompts::refine_prompt(current_recipe, preferences);
        self.complete_with_retry(&prompt, None)
    }

    /// Markdown nutritional analysis of a food photo.
    pub fn analyze_food_image(&self, image: ImagePayload) -> Result<String> {
        self.complete_with_retry(prompts::food_analysis_prompt(), Some(&image))
    }

    /// Items expiring within the configured window, soonest first.
    pub fn expiring_items(
        &self,
        user_id: u64,
        today: NaiveDate,
    ) -> Result<Vec<crate::inventory::InventoryItem>> {
        self.store
            .list_items_expiring_within(user_id, self.config.expiry_window_days, today)
    }

    /// Dashboard summary of a user's pantry by expiry status.
    pub fn expiry_warnings(&self, user_id: u64, today: NaiveDate) -> Result<ExpiryWarnings> {
        Ok(inventory::expiry_warnings(
            &self.store.list_items(user_id)?,
            today,
        ))
    }

    /// Persist a chosen candidate, returning the record id. Duplicate
    /// saves of identical content are permitted by design.
    pub fn save_recipe(&self, user_id: u64, candidate: RecipeCandidate) -> Result<u64> {
        self.store.save_recipe(user_id, candidate)
    }

    /// All recipes a user has saved, newest first.
    pub fn saved_recipes(&self, user_id: u64) -> Result<Vec<SavedRecipe>> {
        self.store.list_recipes(user_id)
    }

    /// Persist a validated bill batch as pantry items, all-or-nothing.
    pub fn save_bill_items(
        &self,
        user_id: u64,
        items: Vec<BillLineItem>,
        today: NaiveDate,
    ) -> Result<Vec<u64>> {
        self.store.save_bill_items(user_id, items, today)
    }

    /// Match a saved recipe's ingredients against the user's pantry for
    /// confirmation before deduction.
    pub fn deduction_candidates(
        &self,
        user_id: u64,
        recipe_id: u64,
    ) -> Result<Vec<DeductionCandidate>> {
        let saved = self.store.get_recipe(user_id, recipe_id)?;
        let records = self.store.list_records(user_id)?;
        Ok(inventory::deduction_candidates(
            &saved.recipe.ingredients,
            &records,
        ))
    }

    /// Apply confirmed ingredient deductions.
    pub fn deduct_ingredients(
        &self,
        user_id: u64,
        deductions: &[Deduction],
    ) -> Result<DeductionOutcome> {
        self.store.deduct(user_id, deductions)
    }

    /// One model call with the caller-level retry policy applied: at
    /// most one retry, and only on transport failures, never on
    /// `ModelRefused` or `RateLimited`.
    fn complete_with_retry(&self, prompt: &str, image: Option<&ImagePayload>) -> Result<String> {
        match self.invoker.complete(prompt, image) {
            Err(err) if err.retryable() => {
                debug!(invoker = self.invoker.name(), error = %err, "retrying model call once");
                self.invoker.complete(prompt, image)
            }
            other => other,
        }
    }

    /// Validate raw output; on `MalformedResponse`, issue the single
    /// corrective re-prompt and validate its result instead.
    fn validate_with_reprompt<T>(
        &self,
        raw: String,
        prompt: &str,
        image: Option<&ImagePayload>,
        validate: fn(&str) -> Result<ValidatedBatch<T>>,
    ) -> Result<ValidatedBatch<T>> {
        match validate(&raw) {
            Err(LarderError::MalformedResponse(_)) => {
                debug!("malformed completion, issuing corrective re-prompt");
                let corrective = prompts::corrective_prompt(prompt);
                let raw = self.complete_with_retry(&corrective, image)?;
                validate(&raw)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryItem;
    use crate::llm::MockInvoker;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn recipe_json() -> &'static str {
        r#"[{
            "name": "Milk Rice",
            "ingredients": [{"name": "Milk", "quantity": 1}],
            "steps": ["Simmer."],
            "prep_time": "20 mins",
            "difficulty": "easy",
            "macros": {"calories": 200, "protein": 8, "carbs": 30, "fat": 5}
        }]"#
    }

    fn seeded_store(user_id: u64) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .add_item(
                user_id,
                InventoryItem::new("Milk", 1.0, "litre", today() + Duration::days(2)),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_empty_pantry_fails_before_model_call() {
        let larder = Larder::new(MockInvoker::new(), MemoryStore::new());
        let result = larder.suggest_recipes(1, Preferences::new(), today());

        assert!(matches!(result, Err(LarderError::EmptyPantry)));
    }

    #[test]
    fn test_transport_failure_retried_once() {
        let invoker = MockInvoker::new()
            .push_failure(LarderError::Timeout(30))
            .push_response(recipe_json());
        let larder = Larder::new(invoker, seeded_store(1));

        let batch = larder.suggest_recipes(1, Preferences::new(), today()).unwrap();
        assert_eq!(batch.items.len(), 1);
    }

    #[test]
    fn test_refusal_is_never_retried() {
        let invoker = MockInvoker::new()
            .push_failure(LarderError::ModelRefused("blocked".to_string()))
            .push_response(recipe_json());
        let larder = Larder::new(invoker, seeded_store(1));

        let result = larder.suggest_recipes(1, Preferences::new(), today());
        assert!(matches!(result, Err(LarderError::ModelRefused(_))));
    }

    #[test]
    fn test_malformed_response_gets_one_corrective_reprompt() {
        let invoker = MockInvoker::new()
            .push_response("this is not json")
            .push_response(recipe_json());
        let larder = Larder::new(invoker, seeded_store(1));

        let batch = larder.suggest_recipes(1, Preferences::new(), today()).unwrap();
        assert_eq!(batch.items.len(), 1);
    }

    #[test]
    fn test_repeated_malformed_output_fails() {
        let invoker = MockInvoker::new()
            .push_response("still not json")
            .push_response("also not json");
        let larder = Larder::new(invoker, seeded_store(1));

        let result = larder.suggest_recipes(1, Preferences::new(), today());
        assert!(matches!(result, Err(LarderError::MalformedResponse(_))));
    }

    #[test]
    fn test_refine_requires_preferences() {
        let larder = Larder::new(MockInvoker::new(), MemoryStore::new());
        let result = larder.refine_recipe("Some recipe", "   ");
        assert!(matches!(result, Err(LarderError::MissingPreferences)));
    }
}
