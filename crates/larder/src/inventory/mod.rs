//! Pantry inventory: item types, the expiry classification rule, and
//! the collector that turns a pantry into a generation request.

mod collector;
mod item;
mod matching;

pub use collector::{collect_request, expiring_within, expiry_warnings, ExpiryWarnings};
pub use item::{days_remaining, ExpiryStatus, InventoryItem, EXPIRING_SOON_DAYS};
pub use matching::{deduction_candidates, DeductionCandidate};
