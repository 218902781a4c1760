//! D&D 5e API client for the monster catalog
//!
//! The public API lists monsters per challenge rating at
//! `GET /api/monsters?challenge_rating=<n>`. Listing entries carry only an
//! index, a name and a URL, so each result is tagged with the rating it was
//! requested under.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::CatalogError;
use crate::domain::entities::CreatureSummary;
use crate::domain::value_objects::ChallengeRating;
use crate::infrastructure::config::Dnd5eApiConfig;
use crate::infrastructure::creature_cache::CreatureFetcher;

/// Listings fetched at the same time when loading the whole catalog
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Client for the D&D 5e REST API
pub struct Dnd5eApiClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl Dnd5eApiClient {
    pub fn new(config: &Dnd5eApiConfig) -> Result<Self, Dnd5eApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    /// List the monsters with exactly the given challenge rating
    #[instrument(skip(self), fields(cr = %cr))]
    pub async fn list_monsters_by_cr(
        &self,
        cr: ChallengeRating,
    ) -> Result<Vec<CreatureSummary>, Dnd5eApiError> {
        let url = format!("{}/api/monsters", self.base_url);
        let listing: MonsterListResponse = self
            .get_json(&url, &[("challenge_rating", cr.value().to_string())])
            .await?;

        debug!(count = listing.results.len(), "Fetched monster listing");
        Ok(listing
            .results
            .into_iter()
            .map(|m| CreatureSummary::new(m.index, m.name, cr))
            .collect())
    }

    /// Fetch every monster by walking all canonical challenge ratings
    #[instrument(skip(self))]
    pub async fn fetch_all_monsters(&self) -> Result<Vec<CreatureSummary>, Dnd5eApiError> {
        let listings: Vec<Vec<CreatureSummary>> =
            stream::iter(ChallengeRating::canonical_values())
                .map(|cr| self.list_monsters_by_cr(cr))
                .buffered(MAX_CONCURRENT_REQUESTS)
                .try_collect()
                .await?;

        Ok(listings.into_iter().flatten().collect())
    }

    /// GET with the client's retry policy: connection failures, timeouts,
    /// 429 and 5xx are retried with exponential backoff; other statuses fail
    /// immediately.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, Dnd5eApiError> {
        let mut attempt = 0;
        loop {
            match self.try_get_json(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "D&D 5e API request failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, Dnd5eApiError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Dnd5eApiError::ApiError { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CreatureFetcher for Dnd5eApiClient {
    async fn fetch_all(&self) -> Result<Vec<CreatureSummary>, CatalogError> {
        Ok(self.fetch_all_monsters().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Dnd5eApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    ApiError { status: StatusCode, body: String },
}

impl Dnd5eApiError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_connect() || e.is_timeout(),
            Self::ApiError { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

impl From<Dnd5eApiError> for CatalogError {
    fn from(err: Dnd5eApiError) -> Self {
        match err {
            Dnd5eApiError::HttpError(e) if e.is_decode() => CatalogError::InvalidData(e.to_string()),
            other => CatalogError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MonsterListResponse {
    results: Vec<MonsterReference>,
}

#[derive(Debug, Deserialize)]
struct MonsterReference {
    index: String,
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::StatusCode as AxumStatus,
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    #[derive(Default)]
    struct FakeApi {
        calls: AtomicUsize,
        failures_before_success: usize,
        failure_status: u16,
    }

    async fn monsters(
        State(api): State<Arc<FakeApi>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let call = api.calls.fetch_add(1, Ordering::SeqCst);
        if call < api.failures_before_success {
            let status = AxumStatus::from_u16(api.failure_status).unwrap();
            return (status, "unavailable").into_response();
        }

        let results = match params.get("challenge_rating").map(String::as_str) {
            Some("0.25") => json!([{ "index": "goblin", "name": "Goblin", "url": "/api/monsters/goblin" }]),
            Some("5") => json!([
                { "index": "troll", "name": "Troll", "url": "/api/monsters/troll" },
                { "index": "air-elemental", "name": "Air Elemental", "url": "/api/monsters/air-elemental" }
            ]),
            _ => json!([]),
        };
        let count = results.as_array().map_or(0, Vec::len);
        Json(json!({ "count": count, "results": results })).into_response()
    }

    async fn spawn_fake_api(api: FakeApi) -> (String, Arc<FakeApi>) {
        let api = Arc::new(api);
        let app = Router::new()
            .route("/api/monsters", get(monsters))
            .with_state(api.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), api)
    }

    fn client_for(base_url: &str, max_retries: u32) -> Dnd5eApiClient {
        Dnd5eApiClient::new(&Dnd5eApiConfig {
            base_url: format!("{}/", base_url),
            timeout: Duration::from_secs(5),
            max_retries,
            retry_base_delay: Duration::from_millis(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_by_cr_tags_results_with_rating() {
        let (base_url, _) = spawn_fake_api(FakeApi::default()).await;
        let client = client_for(&base_url, 0);

        let cr = ChallengeRating::parse("1/4").unwrap();
        let monsters = client.list_monsters_by_cr(cr).await.unwrap();

        assert_eq!(monsters.len(), 1);
        assert_eq!(monsters[0].id, "goblin");
        assert_eq!(monsters[0].display_name, "Goblin");
        assert_eq!(monsters[0].reference_rating, cr);
    }

    #[tokio::test]
    async fn test_fetch_all_walks_every_rating() {
        let (base_url, api) = spawn_fake_api(FakeApi::default()).await;
        let client = client_for(&base_url, 0);

        let monsters = client.fetch_all_monsters().await.unwrap();
        let ids: Vec<&str> = monsters.iter().map(|m| m.id.as_str()).collect();

        // Ordered by rating, then by listing order
        assert_eq!(ids, vec!["goblin", "troll", "air-elemental"]);
        assert_eq!(api.calls.load(Ordering::SeqCst), 34);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let (base_url, api) = spawn_fake_api(FakeApi {
            failures_before_success: 2,
            failure_status: 503,
            ..Default::default()
        })
        .await;
        let client = client_for(&base_url, 2);

        let monsters = client
            .list_monsters_by_cr(ChallengeRating::parse("5").unwrap())
            .await
            .unwrap();
        assert_eq!(monsters.len(), 2);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (base_url, api) = spawn_fake_api(FakeApi {
            failures_before_success: 10,
            failure_status: 502,
            ..Default::default()
        })
        .await;
        let client = client_for(&base_url, 1);

        let err = client
            .list_monsters_by_cr(ChallengeRating::parse("5").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Dnd5eApiError::ApiError { status, .. } if status == StatusCode::BAD_GATEWAY));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (base_url, api) = spawn_fake_api(FakeApi {
            failures_before_success: 1,
            failure_status: 404,
            ..Default::default()
        })
        .await;
        let client = client_for(&base_url, 3);

        let err = client
            .list_monsters_by_cr(ChallengeRating::parse("5").unwrap())
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }
}
