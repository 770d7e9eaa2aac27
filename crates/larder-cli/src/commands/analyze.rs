//! Food photo analysis command.

use std::fs;
use std::path::Path;

use larder::{GeminiInvoker, ImagePayload, Larder, MemoryStore};

use crate::commands::CliResult;

pub fn run(image: &Path, mime: &str) -> CliResult {
    let bytes = fs::read(image)?;
    let payload = ImagePayload::from_bytes(mime, &bytes);

    // Analysis touches no durable state; an empty in-memory store
    // satisfies the pipeline's collaborator slot.
    let larder = Larder::new(GeminiInvoker::from_env()?, MemoryStore::new());
    let analysis = larder.analyze_food_image(payload)?;
    println!("{}", analysis);

    Ok(())
}
