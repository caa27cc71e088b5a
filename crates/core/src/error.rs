//! Error taxonomy shared by the catalog, library and service layers.

use thiserror::Error;

use crate::models::GameId;

/// Failures surfaced by catalog queries and library operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure or an unexpected response from the remote catalog.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Detail lookup for an id the catalog does not know.
    #[error("game not found: {0}")]
    NotFound(GameId),

    /// Library operation addressed to an unknown category tag.
    #[error("invalid library category: {0}")]
    InvalidCategory(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::NetworkFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            CatalogError::NotFound(3498).to_string(),
            "game not found: 3498"
        );
        assert_eq!(
            CatalogError::InvalidCategory("favourites".into()).to_string(),
            "invalid library category: favourites"
        );
    }
}
