// ============================================
// Catalog Loader
// ============================================
//
// Reads the item catalog (JSON array) and rejects anything the ranking
// core cannot take: duplicate ids, blank topics, intensity outside [0, 1].

use crate::models::{Item, ItemId};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog is empty")]
    Empty,

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("Item {0} has a blank topic")]
    BlankTopic(ItemId),

    #[error("Item {id} has intensity {intensity} outside [0, 1]")]
    IntensityOutOfRange { id: ItemId, intensity: f64 },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Load and validate a catalog file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Item>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let items = parse_catalog(&raw)?;

    info!(
        path = %path.display(),
        items = items.len(),
        topics = topic_universe(&items).len(),
        "Catalog loaded"
    );

    Ok(items)
}

/// Parse and validate catalog JSON
pub fn parse_catalog(raw: &str) -> Result<Vec<Item>> {
    let items: Vec<Item> = serde_json::from_str(raw)?;
    validate(&items)?;
    Ok(items)
}

pub fn validate(items: &[Item]) -> Result<()> {
    if items.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut ids = HashSet::with_capacity(items.len());
    for item in items {
        if !ids.insert(item.id) {
            return Err(CatalogError::DuplicateId(item.id));
        }
        if item.topic.trim().is_empty() {
            return Err(CatalogError::BlankTopic(item.id));
        }
        if !(0.0..=1.0).contains(&item.intensity) {
            return Err(CatalogError::IntensityOutOfRange {
                id: item.id,
                intensity: item.intensity,
            });
        }
    }

    Ok(())
}

/// Distinct topics in order of first appearance
pub fn topic_universe(items: &[Item]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.topic.as_str()))
        .map(|item| item.topic.clone())
        .collect()
}
