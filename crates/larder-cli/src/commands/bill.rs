//! Bill extraction command.

use std::fs;
use std::path::Path;

use chrono::Local;
use colored::Colorize;
use larder::{GeminiInvoker, ImagePayload, JsonStore, Larder};

use crate::commands::CliResult;

pub fn run(store_path: &Path, user: u64, image: &Path, mime: &str, save: bool) -> CliResult {
    let bytes = fs::read(image)?;
    let payload = ImagePayload::from_bytes(mime, &bytes);

    let store = JsonStore::open(store_path)?;
    let larder = Larder::new(GeminiInvoker::from_env()?, store);
    let today = Local::now().date_naive();

    let batch = larder.extract_bill(payload, today)?;
    if batch.dropped > 0 {
        eprintln!(
            "{} {} malformed line item(s) dropped",
            "Note:".yellow(),
            batch.dropped
        );
    }
    if batch.items.is_empty() {
        println!("No grocery items recognized.");
        return Ok(());
    }

    for item in &batch.items {
        let expiry = item
            .expires_on
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "- {:<24} {:>6} {:<8} expires {}  [{}]",
            item.name,
            item.quantity,
            item.unit,
            expiry,
            item.category.as_deref().unwrap_or("Others")
        );
    }

    if save {
        let ids = larder.save_bill_items(user, batch.items, today)?;
        println!(
            "\n{} {} item(s) to the pantry",
            "Added".green().bold(),
            ids.len()
        );
    }

    Ok(())
}
