//! `.env` loading.
//!
//! A `.env` file in the working directory (or any parent) is read before the
//! config, so `GOOGLE_API_KEY=...` kept next to the dataset enables
//! classification. Variables already set in the environment win.

use std::path::{Path, PathBuf};

/// Load the nearest `.env` file. Returns its path when one was read.
pub fn load() -> Option<PathBuf> {
    outcome(dotenvy::dotenv())
}

/// Load a specific `.env` file.
pub fn load_from(path: &Path) -> Option<PathBuf> {
    outcome(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

// Runs before logging is set up, so problems go to stderr directly.
fn outcome(result: Result<PathBuf, dotenvy::Error>) -> Option<PathBuf> {
    match result {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            eprintln!("Warning: Failed to read .env file: {e}");
            None
        }
    }
}
