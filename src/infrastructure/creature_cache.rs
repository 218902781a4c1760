//! Cached creature catalog
//!
//! Wraps a remote creature source with two cache levels: an in-memory copy
//! shared between requests and a JSON file on disk that survives restarts.
//! Both expire after the configured TTL. Only one request reloads at a time;
//! while it does, other requests get the expired in-memory copy. When the
//! remote source fails and an expired copy exists, the expired copy is served
//! instead of an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::{CatalogError, CreatureCatalogPort};
use crate::domain::entities::CreatureSummary;

/// A remote source able to produce the whole creature list
#[async_trait]
pub trait CreatureFetcher: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<CreatureSummary>, CatalogError>;
}

/// On-disk cache file layout
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    fetched_at: DateTime<Utc>,
    creatures: Vec<CreatureSummary>,
}

#[derive(Debug, Clone)]
struct CachedCatalog {
    fetched_at: DateTime<Utc>,
    creatures: Arc<Vec<CreatureSummary>>,
}

impl CachedCatalog {
    fn is_fresh(&self, ttl: Duration) -> bool {
        match (Utc::now() - self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            // Timestamp in the future
            Err(_) => false,
        }
    }
}

pub struct CachedCreatureCatalog {
    fetcher: Arc<dyn CreatureFetcher>,
    cache_path: PathBuf,
    ttl: Duration,
    memory: RwLock<Option<CachedCatalog>>,
    /// Held while loading from disk or the remote source
    loading: Mutex<()>,
}

impl CachedCreatureCatalog {
    pub fn new(fetcher: Arc<dyn CreatureFetcher>, cache_path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache_path: cache_path.into(),
            ttl,
            memory: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    /// Fetch from the remote source and update both cache levels
    async fn fetch_and_store(&self) -> Result<CachedCatalog, CatalogError> {
        let creatures = self.fetcher.fetch_all().await?;
        let fetched_at = Utc::now();

        let file = CacheFile {
            fetched_at,
            creatures,
        };
        if let Err(e) = write_cache_file(&self.cache_path, &file).await {
            // Serving from memory still works; the next restart refetches
            warn!(path = %self.cache_path.display(), error = %e, "Failed to write catalog cache file");
        }

        info!(creatures = file.creatures.len(), "Fetched creature catalog from remote source");
        Ok(CachedCatalog {
            fetched_at,
            creatures: Arc::new(file.creatures),
        })
    }
}

#[async_trait]
impl CreatureCatalogPort for CachedCreatureCatalog {
    #[instrument(skip(self))]
    async fn list_creatures(&self) -> Result<Arc<Vec<CreatureSummary>>, CatalogError> {
        let expired = match self.memory.read().await.as_ref() {
            Some(cached) if cached.is_fresh(self.ttl) => return Ok(cached.creatures.clone()),
            other => other.cloned(),
        };

        // One loader at a time; everyone else gets the expired copy if there is one
        let _loading = match (self.loading.try_lock(), expired.as_ref()) {
            (Ok(guard), _) => guard,
            (Err(_), Some(expired)) => {
                debug!(fetched_at = %expired.fetched_at, "Catalog reload in progress; serving expired copy");
                return Ok(expired.creatures.clone());
            }
            (Err(_), None) => self.loading.lock().await,
        };

        // A previous loader may have finished while we waited
        if let Some(cached) = self.memory.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return Ok(cached.creatures.clone());
            }
        }

        let on_disk = match read_cache_file(&self.cache_path).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(path = %self.cache_path.display(), error = %e, "Ignoring unreadable catalog cache file");
                None
            }
        };
        if let Some(cached) = on_disk.as_ref().filter(|c| c.is_fresh(self.ttl)) {
            debug!(creatures = cached.creatures.len(), "Loaded creature catalog from disk cache");
            *self.memory.write().await = Some(cached.clone());
            return Ok(cached.creatures.clone());
        }

        match self.fetch_and_store().await {
            Ok(fetched) => {
                let creatures = fetched.creatures.clone();
                *self.memory.write().await = Some(fetched);
                Ok(creatures)
            }
            Err(e) => match expired.or(on_disk) {
                Some(stale) => {
                    warn!(
                        error = %e,
                        fetched_at = %stale.fetched_at,
                        "Remote catalog unavailable; serving expired cache"
                    );
                    Ok(stale.creatures)
                }
                None => Err(e),
            },
        }
    }

    #[instrument(skip(self))]
    async fn refresh(&self) -> Result<usize, CatalogError> {
        let _loading = self.loading.lock().await;
        let fetched = self.fetch_and_store().await?;
        let count = fetched.creatures.len();
        *self.memory.write().await = Some(fetched);
        Ok(count)
    }
}

async fn read_cache_file(path: &Path) -> Result<Option<CachedCatalog>, CatalogError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CatalogError::Unavailable(e.to_string())),
    };
    let file: CacheFile =
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::InvalidData(e.to_string()))?;
    Ok(Some(CachedCatalog {
        fetched_at: file.fetched_at,
        creatures: Arc::new(file.creatures),
    }))
}

/// Write via a temporary file and rename so readers never see a partial file
async fn write_cache_file(path: &Path, file: &CacheFile) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(file)?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await?;
    tokio::fs::rename(&tmp_path, path).await
}
