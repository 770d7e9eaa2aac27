//! Prompt templates for model interactions.
//!
//! Every builder here is deterministic and side-effect-free: the same
//! request always renders byte-identical text. Recipe and bill
//! templates are selected by request kind and never merged.

use chrono::NaiveDate;

use crate::inventory::InventoryItem;
use crate::request::{GenerationRequest, RequestKind};

/// Render the template selected by the request kind.
pub fn render(request: &GenerationRequest) -> String {
    match request.kind {
        RequestKind::Recipes => recipe_prompt(request),
        RequestKind::BillExtraction => bill_extraction_prompt(&request.categories, request.today),
    }
}

/// System prompt for all larder model interactions.
pub fn system_prompt() -> &'static str {
    r#"You are a pragmatic home-cooking assistant for a household grocery tracker.

Your role is to:
1. Propose practical recipes that reduce food waste
2. Extract grocery line items from photographed bills
3. Analyze food photos for nutritional content

Guidelines:
- Prioritize ingredients that are close to expiry
- Keep recipes practical and suitable for home cooking
- Always respond with valid JSON when the request demands it
- Never invent ingredients the user does not have, beyond basic pantry staples"#
}

/// Build the recipe-generation prompt.
///
/// Lists each item with quantity and days to expiry, states the
/// waste-reduction objective, embeds the user preferences, and demands
/// a JSON array matching the recipe schema.
pub fn recipe_prompt(request: &GenerationRequest) -> String {
    let priority = item_lines(&request.priority_items, request.today);
    let others = item_lines(&request.other_items, request.today);
    let preferences = preference_lines(request);

    format!(
        r#"As a creative chef, generate 3 detailed recipes based on these available ingredients.

CRITICAL PRIORITY (use these if possible as they are expiring):
{priority}

OTHER AVAILABLE INGREDIENTS:
{others}

User preferences:
{preferences}

Rules:
1. You don't have to use ALL ingredients, but favor the PRIORITY ones to reduce waste.
2. You can assume basic pantry staples (oil, salt, pepper, water) are available.

Return ONLY a valid JSON array of recipe objects. No markdown formatting.
Each object must have exactly these fields:
[
  {{
    "name": "Recipe Name",
    "ingredients": [{{"name": "Rice", "quantity": 1}}],
    "steps": ["Step 1...", "Step 2..."],
    "prep_time": "30 mins",
    "difficulty": "easy",
    "macros": {{"calories": 300, "protein": 20, "carbs": 45, "fat": 15}}
  }}
]
"difficulty" must be exactly one of "easy", "medium" or "hard".
"calories", "protein", "carbs" and "fat" must be numbers."#
    )
}

/// Build the bill-extraction prompt for an attached receipt image.
///
/// `today` anchors the model's expiry estimates and is passed in
/// explicitly; the builder never consults the ambient clock.
pub fn bill_extraction_prompt(categories: &[String], today: NaiveDate) -> String {
    let categories = if categories.is_empty() {
        "Others".to_string()
    } else {
        categories.join(", ")
    };

    format!(
        r#"Analyze this grocery bill/receipt image and extract ONLY the food/grocery items.
Ignore non-food items (like soap, paper towels) and general receipt text (taxes, store name).

For each food item, provide:
1. Generic ingredient name ONLY. Remove all brand names, packaging info, and adjectives.
   - Example: "Aashirvaad Shudh Chakki Atta" -> "Whole Wheat Flour"
   - Example: "Amul Gold Milk" -> "Milk"
   - Example: "Tata Salt" -> "Salt"
2. Quantity (default to 1 if not specified) and unit.
3. Estimated expiry date (YYYY-MM-DD) - make a reasonable guess based on the type of food
   (e.g., Milk: 7 days, Rice: 1 year, Vegetables: 5 days). Today is {today}.
4. Manufacture date (YYYY-MM-DD) only if printed on the receipt, otherwise null.
5. Category - choose the best match from this list: [{categories}]

Return ONLY a valid JSON array of objects. Do not include markdown formatting or backticks.
Example format:
[
  {{"name": "Milk", "quantity": 1, "unit": "litre", "manufactured_on": null, "expires_on": "{today}", "category": "Dairy"}}
]"#
    )
}

/// Build the recipe-refinement prompt.
pub fn refine_prompt(current_recipe: &str, preferences: &str) -> String {
    format!(
        r#"Modify this recipe based on the following preferences: {preferences}

Current recipe:
{current_recipe}

Provide the modified recipe with the same format as before."#
    )
}

/// Prompt for nutritional analysis of a food photo. Free text out, no
/// JSON stage.
pub fn food_analysis_prompt() -> &'static str {
    r#"Analyze this food image and provide:
- Name of the dish/food
- Estimated calories (total or per serving)
- Main ingredients visible
- Nutritional breakdown: protein, carbs and fat (approx grams)
- Healthiness rating (1-10) and brief explanation

Format the response in clear Markdown."#
}

/// Wrap a prompt whose completion failed JSON parsing for the single
/// corrective re-prompt.
pub fn corrective_prompt(original: &str) -> String {
    format!(
        r#"Your previous reply was not valid JSON. Answer the request below again.
Return valid JSON only: no prose, no markdown formatting, no backticks.

{original}"#
    )
}

fn item_lines(items: &[InventoryItem], today: NaiveDate) -> String {
    if items.is_empty() {
        return "None".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "- {} ({} {}, {})",
                item.name,
                item.quantity,
                item.unit,
                expiry_phrase(item.days_remaining(today))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn expiry_phrase(days: i64) -> String {
    match days {
        d if d < -1 => format!("expired {} days ago", -d),
        -1 => "expired 1 day ago".to_string(),
        0 => "expires today".to_string(),
        1 => "expires in 1 day".to_string(),
        d => format!("expires in {} days", d),
    }
}

fn preference_lines(request: &GenerationRequest) -> String {
    if request.preferences.is_empty() {
        return "None".to_string();
    }
    request
        .preferences
        .iter()
        .map(|(key, value)| format!("- {}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Preferences;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn sample_request() -> GenerationRequest {
        let t = today();
        let mut request = GenerationRequest::recipes(t)
            .with_preference("diet", "vegetarian")
            .with_preference("time", "30 minutes");
        request
            .priority_items
            .push(InventoryItem::new("Milk", 1.0, "litre", t + Duration::days(2)));
        request
            .other_items
            .push(InventoryItem::new("Rice", 5.0, "kg", t + Duration::days(300)));
        request
    }

    #[test]
    fn test_recipe_prompt_embeds_items_and_preferences() {
        let prompt = recipe_prompt(&sample_request());

        assert!(prompt.contains("- Milk (1 litre, expires in 2 days)"));
        assert!(prompt.contains("- Rice (5 kg, expires in 300 days)"));
        assert!(prompt.contains("- diet: vegetarian"));
        assert!(prompt.contains("- time: 30 minutes"));
        assert!(prompt.contains("\"easy\", \"medium\" or \"hard\""));
    }

    #[test]
    fn test_recipe_prompt_is_deterministic() {
        let request = sample_request();
        assert_eq!(recipe_prompt(&request), recipe_prompt(&request));
    }

    #[test]
    fn test_empty_sections_render_none() {
        let request = GenerationRequest::recipes(today()).with_preferences(Preferences::new());
        let prompt = recipe_prompt(&request);

        assert!(prompt.contains("as they are expiring):\nNone"));
        assert!(prompt.contains("User preferences:\nNone"));
    }

    #[test]
    fn test_expiry_phrases() {
        assert_eq!(expiry_phrase(-3), "expired 3 days ago");
        assert_eq!(expiry_phrase(-1), "expired 1 day ago");
        assert_eq!(expiry_phrase(0), "expires today");
        assert_eq!(expiry_phrase(1), "expires in 1 day");
        assert_eq!(expiry_phrase(4), "expires in 4 days");
    }

    #[test]
    fn test_bill_prompt_embeds_categories_and_date() {
        let categories = vec!["Dairy".to_string(), "Grains/Pasta".to_string()];
        let prompt = bill_extraction_prompt(&categories, today());

        assert!(prompt.contains("[Dairy, Grains/Pasta]"));
        assert!(prompt.contains("Today is 2025-06-15"));
        assert!(prompt.contains("Do not include markdown formatting"));
    }

    #[test]
    fn test_render_selects_template_by_kind() {
        let recipe = render(&sample_request());
        assert!(recipe.contains("generate 3 detailed recipes"));

        let image = crate::request::ImagePayload::from_base64("image/jpeg", "AAAA");
        let bill = render(
            &GenerationRequest::bill_extraction(image, today())
                .with_categories(vec!["Dairy".to_string()]),
        );
        assert!(bill.contains("grocery bill/receipt image"));
        assert!(bill.contains("[Dairy]"));
    }

    #[test]
    fn test_corrective_prompt_carries_original() {
        let corrective = corrective_prompt("original request text");
        assert!(corrective.contains("Return valid JSON only"));
        assert!(corrective.contains("original request text"));
    }
}
