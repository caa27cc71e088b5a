//! Shared domain models.

/// Validated construction of user-authored records.
pub mod draft;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub use draft::{DraftField, FieldError, GameDraft};

/// Catalog identifier of a game.
pub type GameId = u64;
/// Catalog identifier of a genre.
pub type GenreId = u64;
/// Catalog identifier of a platform.
pub type PlatformId = u64;

/// A single game as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRecord {
    /// Stable identifier (e.g. `3498`).
    pub id: GameId,
    /// Human-readable title.
    pub name: String,
    /// First release date, when known.
    #[serde(default)]
    pub released: Option<NaiveDate>,
    /// Aggregate rating between 0.0 and 5.0.
    #[serde(default)]
    pub rating: Option<f32>,
    /// Cover or background image URL.
    #[serde(default, rename = "background_image")]
    pub image: Option<String>,
    /// Genre tags in catalog order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<Genre>,
    /// Platform tags in catalog order.
    #[serde(default, deserialize_with = "platform_entries")]
    pub platforms: Vec<Platform>,
    /// Long-form plain-text description. Only present on detail lookups.
    #[serde(default, rename = "description_raw")]
    pub description: Option<String>,
}

impl GameRecord {
    /// Returns a user-facing label combining title and release year.
    pub fn display_name(&self) -> String {
        match self.released {
            Some(date) => format!("{} ({})", self.name, date.year()),
            None => self.name.clone(),
        }
    }

    /// Whether the record carries the given genre tag.
    pub fn has_genre(&self, genre: GenreId) -> bool {
        self.genres.iter().any(|tag| tag.id == genre)
    }

    /// Whether the record is available on the given platform.
    pub fn has_platform(&self, platform: PlatformId) -> bool {
        self.platforms.iter().any(|tag| tag.id == platform)
    }
}

/// Genre tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Catalog identifier.
    pub id: GenreId,
    /// Display name (e.g. `Action`).
    pub name: String,
}

/// Platform tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Catalog identifier.
    pub id: PlatformId,
    /// Display name (e.g. `PlayStation 5`).
    pub name: String,
    /// URL-safe short name (e.g. `playstation5`).
    #[serde(default)]
    pub slug: String,
}

#[derive(Deserialize)]
struct PlatformEntry {
    platform: Platform,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// The catalog nests each platform one level deep: `[{ "platform": { .. } }]`.
fn platform_entries<'de, D>(deserializer: D) -> Result<Vec<Platform>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<PlatformEntry> = null_as_empty(deserializer)?;
    Ok(entries.into_iter().map(|entry| entry.platform).collect())
}
