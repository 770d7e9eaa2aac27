//! Ephemeral input bundle for one generation or extraction call.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::inventory::InventoryItem;

/// Free-form preference constraints, kept in insertion order so the
/// rendered prompt is deterministic.
pub type Preferences = IndexMap<String, String>;

/// Which prompt template a request selects. The two are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Recipe suggestions from pantry ingredients.
    Recipes,
    /// Line-item extraction from a photographed bill.
    BillExtraction,
}

/// Inline image payload for vision requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type of the encoded image (e.g., "image/jpeg").
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImagePayload {
    /// Encode raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Wrap an already-encoded string, stripping a data-URL header
    /// ("data:image/jpeg;base64,...") if the front end left one attached.
    pub fn from_base64(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        let data: String = data.into();
        let data = match (data.starts_with("data:"), data.find(',')) {
            (true, Some(comma)) => data[comma + 1..].to_string(),
            _ => data,
        };
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Normalized context for one model invocation.
///
/// Transient: constructed per call, never persisted. Pantry items are
/// split into waste-reduction priority items (expired or expiring soon,
/// soonest expiry first) and the rest, the way the prompt consumes them.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: RequestKind,

    /// Priority ingredients the prompt asks the model to favor.
    pub priority_items: Vec<InventoryItem>,

    /// Remaining pantry ingredients.
    pub other_items: Vec<InventoryItem>,

    /// User preference constraints, in insertion order.
    pub preferences: Preferences,

    /// Attached image for bill/photo analysis.
    pub image: Option<ImagePayload>,

    /// Known grocery categories, embedded into the bill template.
    pub categories: Vec<String>,

    /// Reference date for expiry arithmetic in the prompt. Passed in
    /// explicitly; the builder never consults the ambient clock.
    pub today: NaiveDate,
}

impl GenerationRequest {
    /// Start an empty recipe request.
    pub fn recipes(today: NaiveDate) -> Self {
        Self {
            kind: RequestKind::Recipes,
            priority_items: Vec::new(),
            other_items: Vec::new(),
            preferences: Preferences::new(),
            image: None,
            categories: Vec::new(),
            today,
        }
    }

    /// Start a bill-extraction request around an image.
    pub fn bill_extraction(image: ImagePayload, today: NaiveDate) -> Self {
        Self {
            kind: RequestKind::BillExtraction,
            priority_items: Vec::new(),
            other_items: Vec::new(),
            preferences: Preferences::new(),
            image: Some(image),
            categories: Vec::new(),
            today,
        }
    }

    /// Set the category list for bill extraction.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Add a preference constraint.
    pub fn with_preference(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.preferences.insert(key.into(), value.into());
        self
    }

    /// Replace the preference map.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }
}
