use crate::models::Listing;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the listing dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the listing dataset from a JSON array on disk
///
/// Called once at startup; the result is shared read-only afterwards.
pub fn load_listings<P: AsRef<Path>>(path: P) -> Result<Vec<Listing>, DatasetError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: display.clone(),
        source,
    })?;

    parse_listings(&raw).map_err(|source| DatasetError::Parse {
        path: display,
        source,
    })
}

/// Parse listings from JSON text
pub fn parse_listings(raw: &str) -> Result<Vec<Listing>, serde_json::Error> {
    serde_json::from_str(raw)
}
