//! Pantry inventory commands.

use std::path::Path;

use chrono::Local;
use colored::Colorize;
use larder::{expiry_warnings, ExpiryStatus, InventoryItem, JsonStore, PantryStore};

use crate::cli::PantryCommands;
use crate::commands::CliResult;

pub fn run(store_path: &Path, user: u64, command: PantryCommands) -> CliResult {
    let store = JsonStore::open(store_path)?;
    let today = Local::now().date_naive();

    match command {
        PantryCommands::Add {
            name,
            expires,
            quantity,
            unit,
            category,
        } => {
            let mut item = InventoryItem::new(name.clone(), quantity, unit, expires);
            if let Some(category) = category {
                item = item.with_category(category);
            }
            let id = store.add_item(user, item)?;
            println!("{} {} (record {})", "Added".green().bold(), name, id);
        }

        PantryCommands::List => {
            let records = store.list_records(user)?;
            if records.is_empty() {
                println!("Pantry is empty.");
                return Ok(());
            }
            for record in records {
                let status = record.item.status(today);
                let label = match status {
                    ExpiryStatus::Expired => status.label().red().bold(),
                    ExpiryStatus::ExpiringSoon => status.label().yellow().bold(),
                    ExpiryStatus::Fresh => status.label().green(),
                };
                println!(
                    "{:>4}  {:<24} {:>6} {:<8} {}  {}",
                    record.id,
                    record.item.name,
                    record.item.quantity,
                    record.item.unit,
                    record.item.expires_on,
                    label
                );
            }
        }

        PantryCommands::Warnings => {
            let warnings = expiry_warnings(&store.list_items(user)?, today);
            if warnings.is_empty() {
                println!("{}", "Nothing is expired or expiring soon.".green());
                return Ok(());
            }
            if warnings.expired_count() > 0 {
                println!(
                    "{} {} item(s) have expired:",
                    "!".red().bold(),
                    warnings.expired_count()
                );
                for item in &warnings.expired {
                    println!("  - {} (expired {})", item.name, item.expires_on);
                }
            }
            if warnings.expiring_soon_count() > 0 {
                println!(
                    "{} {} item(s) expiring within 7 days:",
                    "!".yellow().bold(),
                    warnings.expiring_soon_count()
                );
                for item in &warnings.expiring_soon {
                    println!("  - {} (expires {})", item.name, item.expires_on);
                }
            }
        }
    }

    Ok(())
}
