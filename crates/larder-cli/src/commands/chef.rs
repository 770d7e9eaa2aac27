//! AI chef commands: suggest, refine, save, list, delete.

use std::fs;
use std::path::Path;

use chrono::Local;
use colored::Colorize;
use larder::{GeminiInvoker, JsonStore, Larder, PantryStore, Preferences, RecipeCandidate};

use crate::cli::ChefCommands;
use crate::commands::CliResult;

pub fn run(store_path: &Path, user: u64, command: ChefCommands) -> CliResult {
    let store = JsonStore::open(store_path)?;
    let today = Local::now().date_naive();

    match command {
        ChefCommands::Suggest { prefer, output } => {
            let preferences = parse_preferences(&prefer)?;
            let larder = Larder::new(GeminiInvoker::from_env()?, store);

            let batch = larder.suggest_recipes(user, preferences, today)?;
            if batch.dropped > 0 {
                eprintln!(
                    "{} {} malformed candidate(s) dropped",
                    "Note:".yellow(),
                    batch.dropped
                );
            }

            for (index, recipe) in batch.items.iter().enumerate() {
                print_recipe(index + 1, recipe);
            }

            if let Some(path) = output {
                fs::write(&path, serde_json::to_string_pretty(&batch.items)?)?;
                println!(
                    "\nWrote {} candidate(s) to {}",
                    batch.items.len(),
                    path.display()
                );
            }
        }

        ChefCommands::Refine {
            recipe,
            preferences,
        } => {
            let current = fs::read_to_string(&recipe)?;
            let larder = Larder::new(GeminiInvoker::from_env()?, store);
            let refined = larder.refine_recipe(&current, &preferences)?;
            println!("{}", refined);
        }

        ChefCommands::Save { candidate } => {
            let raw = fs::read_to_string(&candidate)?;
            let candidate: RecipeCandidate = serde_json::from_str(&raw)?;
            let name = candidate.name.clone();
            let id = store.save_recipe(user, candidate)?;
            println!("{} \"{}\" (recipe {})", "Saved".green().bold(), name, id);
        }

        ChefCommands::List => {
            let saved = store.list_recipes(user)?;
            if saved.is_empty() {
                println!("No saved recipes.");
                return Ok(());
            }
            for recipe in saved {
                println!(
                    "{:>4}  {:<32} {:>10} {:>8}  {}",
                    recipe.id,
                    recipe.recipe.name,
                    recipe.recipe.prep_time,
                    recipe.recipe.difficulty.label(),
                    recipe.created_at.format("%Y-%m-%d")
                );
            }
        }

        ChefCommands::Delete { id } => {
            store.delete_recipe(user, id)?;
            println!("{} recipe {}", "Deleted".green().bold(), id);
        }
    }

    Ok(())
}

fn print_recipe(index: usize, recipe: &RecipeCandidate) {
    println!("\n{} {}", format!("{}.", index).bold(), recipe.name.bold());
    println!(
        "   {} | {} | {:.0} kcal",
        recipe.prep_time,
        recipe.difficulty.label(),
        recipe.macros.calories
    );
    println!("   Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("     - {} x{}", ingredient.name, ingredient.quantity);
    }
    println!("   Steps:");
    for (number, step) in recipe.steps.iter().enumerate() {
        println!("     {}. {}", number + 1, step);
    }
}

fn parse_preferences(raw: &[String]) -> Result<Preferences, Box<dyn std::error::Error>> {
    let mut preferences = Preferences::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("preference '{}' is not in KEY=VALUE form", entry))?;
        preferences.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(preferences)
}
