//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Larder: pantry tracking with an AI chef
#[derive(Parser)]
#[command(name = "larder")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON pantry store
    #[arg(long, default_value = "larder.json", global = true)]
    pub store: PathBuf,

    /// Acting user id
    #[arg(long, default_value_t = 1, global = true)]
    pub user: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage pantry inventory
    Pantry {
        #[command(subcommand)]
        command: PantryCommands,
    },

    /// Generate, refine and save AI recipe suggestions
    Chef {
        #[command(subcommand)]
        command: ChefCommands,
    },

    /// Extract grocery items from a photographed bill
    Bill {
        /// Path to the bill image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// MIME type of the image
        #[arg(long, default_value = "image/jpeg")]
        mime: String,

        /// Add the extracted items to the pantry
        #[arg(long)]
        save: bool,
    },

    /// Nutritional analysis of a food photo
    Analyze {
        /// Path to the food image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// MIME type of the image
        #[arg(long, default_value = "image/jpeg")]
        mime: String,
    },
}

#[derive(Subcommand)]
pub enum PantryCommands {
    /// Add an item to the pantry
    Add {
        /// Item name
        name: String,

        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires: NaiveDate,

        /// Quantity on hand
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,

        /// Unit of measure
        #[arg(long, default_value = "unit")]
        unit: String,

        /// Grocery category (e.g., "Dairy")
        #[arg(long)]
        category: Option<String>,
    },

    /// List pantry items with expiry status
    List,

    /// Show expired and expiring-soon items
    Warnings,
}

#[derive(Subcommand)]
pub enum ChefCommands {
    /// Generate recipe suggestions from the pantry
    Suggest {
        /// Preference constraints as KEY=VALUE (repeatable)
        #[arg(short, long = "prefer", value_name = "KEY=VALUE")]
        prefer: Vec<String>,

        /// Write accepted candidates to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refine a recipe text against new preferences
    Refine {
        /// Path to a file holding the current recipe text
        #[arg(value_name = "RECIPE_FILE")]
        recipe: PathBuf,

        /// Preferences to apply
        preferences: String,
    },

    /// Save a recipe candidate from a JSON file
    Save {
        /// Path to a JSON file holding one recipe candidate
        #[arg(value_name = "CANDIDATE_FILE")]
        candidate: PathBuf,
    },

    /// List saved recipes
    List,

    /// Delete a saved recipe
    Delete {
        /// Recipe record id
        id: u64,
    },
}
