use std::fmt;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::{GameId, GameRecord, Genre};

static IMAGE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").expect("invalid image url regex"));

/// Raw form input describing a game the user wants to add by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameDraft {
    /// Game title.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Rating as typed, expected in `0..=5`.
    pub rating: String,
    /// Release date as `YYYY-MM-DD`.
    pub released: String,
    /// Image URL ending in a common raster extension.
    pub image: String,
    /// Comma-separated genre names.
    pub genres: String,
}

/// Draft field a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// [`GameDraft::name`]
    Name,
    /// [`GameDraft::description`]
    Description,
    /// [`GameDraft::rating`]
    Rating,
    /// [`GameDraft::released`]
    Released,
    /// [`GameDraft::image`]
    Image,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DraftField::Name => "name",
            DraftField::Description => "description",
            DraftField::Rating => "rating",
            DraftField::Released => "released",
            DraftField::Image => "image",
        };
        f.write_str(label)
    }
}

/// A single rejected draft field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Offending field.
    pub field: DraftField,
    /// Message suitable for display next to the field.
    pub message: &'static str,
}

impl FieldError {
    fn new(field: DraftField, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl GameDraft {
    /// Validate the draft and build a record keyed by the current timestamp.
    pub fn validate(&self) -> Result<GameRecord, Vec<FieldError>> {
        let id = Utc::now().timestamp_millis().max(0) as GameId;
        self.validate_with_id(id)
    }

    /// Validate the draft and build a record with the given id.
    ///
    /// Every failing field is reported, not just the first.
    pub fn validate_with_id(&self, id: GameId) -> Result<GameRecord, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new(DraftField::Name, "Game name is required"));
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FieldError::new(
                DraftField::Description,
                "Description is required",
            ));
        }

        let rating = self.rating.trim();
        let parsed_rating = if rating.is_empty() {
            errors.push(FieldError::new(DraftField::Rating, "Rating is required"));
            None
        } else {
            match rating.parse::<f32>() {
                Ok(value) if (0.0..=5.0).contains(&value) => Some(value),
                _ => {
                    errors.push(FieldError::new(
                        DraftField::Rating,
                        "Rating must be between 0 and 5",
                    ));
                    None
                }
            }
        };

        let released = self.released.trim();
        let parsed_released = if released.is_empty() {
            errors.push(FieldError::new(
                DraftField::Released,
                "Release date is required",
            ));
            None
        } else {
            match NaiveDate::parse_from_str(released, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new(
                        DraftField::Released,
                        "Release date must be YYYY-MM-DD",
                    ));
                    None
                }
            }
        };

        let image = self.image.trim();
        if image.is_empty() {
            errors.push(FieldError::new(DraftField::Image, "Image URL is required"));
        } else if !IMAGE_URL_RE.is_match(image) {
            errors.push(FieldError::new(
                DraftField::Image,
                "Please enter a valid image URL",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let genres = self
            .genres
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .enumerate()
            .map(|(index, value)| Genre {
                id: id.wrapping_add(index as u64 + 1),
                name: value.to_string(),
            })
            .collect();

        Ok(GameRecord {
            id,
            name: name.to_string(),
            released: parsed_released,
            rating: parsed_rating,
            image: Some(image.to_string()),
            genres,
            platforms: Vec::new(),
            description: Some(description.to_string()),
        })
    }
}
