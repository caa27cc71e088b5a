use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::query::{QueryState, PAGE_SIZE};
use crate::{
    config::AppConfig,
    error::CatalogError,
    models::{GameId, GameRecord, Genre, Platform},
};

/// Read-only access to a remote game catalog.
///
/// Each call is independent; callers may drop a future at any point and
/// ignore its outcome.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of games matching `query`.
    async fn list_games(&self, query: &QueryState) -> Result<Vec<GameRecord>, CatalogError>;

    /// Full record for a single game.
    async fn get_game(&self, id: GameId) -> Result<GameRecord, CatalogError>;

    /// All genres known to the catalog.
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// All platforms known to the catalog.
    async fn list_platforms(&self) -> Result<Vec<Platform>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// HTTP client for RAWG-compatible catalog endpoints.
pub struct RawgClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RawgClient {
    /// Build a client from application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(format!("gamevault/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<(StatusCode, Option<T>), CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "catalog request");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status, None));
        }
        if !status.is_success() {
            return Err(CatalogError::NetworkFailure(format!(
                "server returned {status}"
            )));
        }

        let body = response.json().await?;
        Ok((status, Some(body)))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<T>, CatalogError> {
        match self.get_json::<Page<T>>(path, params).await? {
            (_, Some(page)) => Ok(page.results),
            (status, None) => Err(CatalogError::NetworkFailure(format!(
                "server returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl CatalogClient for RawgClient {
    async fn list_games(&self, query: &QueryState) -> Result<Vec<GameRecord>, CatalogError> {
        let params = list_params(&self.api_key, query);
        self.get_page("games", &params).await
    }

    async fn get_game(&self, id: GameId) -> Result<GameRecord, CatalogError> {
        let params = [("key", self.api_key.clone())];
        match self.get_json(&format!("games/{id}"), &params).await? {
            (_, Some(game)) => Ok(game),
            (_, None) => Err(CatalogError::NotFound(id)),
        }
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let params = [("key", self.api_key.clone())];
        self.get_page("genres", &params).await
    }

    async fn list_platforms(&self) -> Result<Vec<Platform>, CatalogError> {
        let params = [("key", self.api_key.clone())];
        self.get_page("platforms", &params).await
    }
}

fn list_params(api_key: &str, query: &QueryState) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("key", api_key.to_string()),
        ("page", query.page.to_string()),
        ("page_size", PAGE_SIZE.to_string()),
    ];
    if let Some(genre) = query.genre {
        params.push(("genres", genre.to_string()));
    }
    if let Some(platform) = query.platform {
        params.push(("platforms", platform.to_string()));
    }
    if let Some(term) = query.search_term() {
        params.push(("search", term.to_string()));
    }
    params
}
