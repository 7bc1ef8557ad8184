//! Card definitions and the catalog the table starts with.

use std::{fs, io, path::Path, path::PathBuf};

use bevy::{platform::collections::HashSet, prelude::*};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A playable card. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Face color as a hex string, e.g. `#e74c3c`.
    pub color: String,
}

impl Card {
    pub fn new(id: u32, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: CardId(id),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Marker on the root entity of a rendered card.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct TableCard {
    pub id: CardId,
}

pub fn default_catalog() -> Vec<Card> {
    vec![
        Card::new(1, "Red Card", "#e74c3c"),
        Card::new(2, "Green Card", "#2ecc71"),
        Card::new(3, "Blue Card", "#3498db"),
        Card::new(4, "Purple Card", "#9b59b6"),
        Card::new(5, "Yellow Card", "#f1c40f"),
        Card::new(6, "Orange Card", "#e67e22"),
        Card::new(7, "Teal Card", "#1abc9c"),
        Card::new(8, "Pink Card", "#e84393"),
        Card::new(9, "Cyan Card", "#00cec9"),
        Card::new(10, "Lime Card", "#badc58"),
    ]
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed catalog json")]
    Json(#[from] serde_json::Error),
    #[error("catalog has no cards")]
    Empty,
    #[error("card id {0} appears more than once")]
    DuplicateId(CardId),
}

/// Parse a JSON array of cards.
pub fn parse_catalog(json: &str) -> Result<Vec<Card>, CatalogError> {
    let cards: Vec<Card> = serde_json::from_str(json)?;
    if cards.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen: HashSet<_> = HashSet::default();
    for card in &cards {
        if !seen.insert(card.id) {
            return Err(CatalogError::DuplicateId(card.id));
        }
    }

    Ok(cards)
}

pub fn load_catalog(path: &Path) -> Result<Vec<Card>, CatalogError> {
    let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json)
}
