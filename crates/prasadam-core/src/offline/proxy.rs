use reqwest::{Method, Url};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::storage::StoreError;

use super::buckets::CacheStorage;
use super::network::{AssetRequest, AssetResponse, Network};
use super::{OFFLINE_PAGE, SYNC_ORDERS_TAG};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Install failed for {url}: {reason}")]
    Install { url: String, reason: String },

    #[error("Cannot activate before install completes")]
    NotInstalled,

    #[error("Offline: {url} is not cached and the network is unreachable")]
    Offline {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("Cache storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Lifecycle of the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// Created, nothing cached yet.
    Registered,
    /// Precache manifest stored.
    Installed,
    /// Stale buckets evicted; fetches are intercepted.
    Activated,
}

/// Result of an intercepted fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller goes to the network itself.
    Bypassed,
    /// Served from a cache bucket without touching the network.
    Cached(AssetResponse),
    /// Fetched from the network (and stored, if cacheable).
    Network(AssetResponse),
    /// Network failed; the cached offline page was served instead.
    OfflineFallback(AssetResponse),
}

impl FetchOutcome {
    pub fn into_response(self) -> Option<AssetResponse> {
        match self {
            FetchOutcome::Bypassed => None,
            FetchOutcome::Cached(r) | FetchOutcome::Network(r) | FetchOutcome::OfflineFallback(r) => {
                Some(r)
            }
        }
    }
}

/// Snapshot for status display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyStatus {
    pub state: ProxyState,
    pub cache_name: String,
    pub entries: usize,
    pub last_updated: Option<String>,
}

struct Inner {
    state: ProxyState,
    storage: CacheStorage,
}

/// Cache-first fetch layer with versioned buckets.
///
/// Lifecycle: `install` precaches the manifest, `activate` evicts every bucket
/// not named `cache_name`, and from then on `handle_fetch` serves GETs from
/// cache before falling back to the network.
pub struct OfflineProxy<N> {
    network: N,
    cache_name: String,
    origin: Url,
    manifest: Vec<Url>,
    inner: Mutex<Inner>,
}

impl<N: Network> OfflineProxy<N> {
    /// `manifest` entries may be paths relative to `origin` or absolute URLs.
    pub fn new(
        network: N,
        cache_name: &str,
        origin: Url,
        manifest: &[&str],
        storage: CacheStorage,
    ) -> Result<Self, ProxyError> {
        let manifest = manifest
            .iter()
            .map(|entry| {
                origin.join(entry).map_err(|e| ProxyError::InvalidUrl {
                    url: entry.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // A bucket left by an earlier run can serve before the new install finishes
        let state = if storage.entry_count(cache_name) > 0 {
            ProxyState::Installed
        } else {
            ProxyState::Registered
        };

        Ok(Self {
            network,
            cache_name: cache_name.to_string(),
            origin,
            manifest,
            inner: Mutex::new(Inner { state, storage }),
        })
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub async fn state(&self) -> ProxyState {
        self.inner.lock().await.state
    }

    /// Precache every manifest entry into the current bucket.
    ///
    /// All or nothing: if any entry fails to fetch or is not OK, nothing is
    /// stored and the proxy stays `Registered`.
    pub async fn install(&self) -> Result<(), ProxyError> {
        info!(cache = %self.cache_name, assets = self.manifest.len(), "Installing offline cache");

        let fetches = self.manifest.iter().map(|url| async move {
            let request = AssetRequest::get(url.clone());
            (url, self.network.fetch(&request).await)
        });
        let results = futures::future::join_all(fetches).await;

        let mut entries = Vec::with_capacity(results.len());
        for (url, result) in results {
            match result {
                Ok(response) if response.is_ok() => entries.push((url.to_string(), response)),
                Ok(response) => {
                    return Err(ProxyError::Install {
                        url: url.to_string(),
                        reason: format!("status {}", response.status),
                    });
                }
                Err(e) => {
                    return Err(ProxyError::Install {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut inner = self.inner.lock().await;
        inner.storage.open_bucket(&self.cache_name)?;
        inner.storage.put_all(&self.cache_name, entries)?;
        if inner.state == ProxyState::Registered {
            inner.state = ProxyState::Installed;
        }
        info!(cache = %self.cache_name, "Offline cache installed");
        Ok(())
    }

    /// Evict every bucket except the current one and start intercepting fetches.
    /// Returns the names of the deleted buckets.
    pub async fn activate(&self) -> Result<Vec<String>, ProxyError> {
        let mut inner = self.inner.lock().await;
        if inner.state == ProxyState::Registered {
            return Err(ProxyError::NotInstalled);
        }

        let mut deleted = Vec::new();
        for name in inner.storage.keys() {
            if name != self.cache_name {
                info!(cache = %name, "Deleting old cache");
                inner.storage.delete(&name)?;
                deleted.push(name);
            }
        }

        inner.state = ProxyState::Activated;
        Ok(deleted)
    }

    /// Cache-first fetch with network fallback.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<FetchOutcome, ProxyError> {
        if request.method != Method::GET || request.is_extension() {
            return Ok(FetchOutcome::Bypassed);
        }

        let url = request.url.to_string();
        {
            let inner = self.inner.lock().await;
            if inner.state != ProxyState::Activated {
                return Ok(FetchOutcome::Bypassed);
            }
            if let Some(cached) = inner.storage.match_any(&self.cache_name, &url) {
                debug!(url = %url, "Serving from offline cache");
                return Ok(FetchOutcome::Cached(cached));
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(&url, &response).await;
                Ok(FetchOutcome::Network(response))
            }
            Err(e) => {
                if request.accepts_html() {
                    if let Some(page) = self.offline_page().await {
                        warn!(url = %url, error = %e, "Network unavailable, serving offline page");
                        return Ok(FetchOutcome::OfflineFallback(page));
                    }
                }
                Err(ProxyError::Offline { url, source: e })
            }
        }
    }

    /// Network-first fetch for an explicit reload.
    ///
    /// A fresh answer replaces the cached copy; the cache is only used when
    /// the network fails.
    pub async fn handle_refresh(&self, request: &AssetRequest) -> Result<FetchOutcome, ProxyError> {
        if request.method != Method::GET
            || request.is_extension()
            || self.state().await != ProxyState::Activated
        {
            return Ok(FetchOutcome::Bypassed);
        }

        let url = request.url.to_string();
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(&url, &response).await;
                Ok(FetchOutcome::Network(response))
            }
            Err(e) => {
                let cached = self.inner.lock().await.storage.match_any(&self.cache_name, &url);
                match cached {
                    Some(cached) => {
                        warn!(url = %url, error = %e, "Reload failed, serving cached copy");
                        Ok(FetchOutcome::Cached(cached))
                    }
                    None => Err(ProxyError::Offline { url, source: e }),
                }
            }
        }
    }

    async fn store(&self, url: &str, response: &AssetResponse) {
        if !response.is_cacheable() {
            return;
        }
        let mut inner = self.inner.lock().await;
        if let Err(e) = inner.storage.put(&self.cache_name, url, response.clone()) {
            warn!(url = %url, error = %e, "Failed to cache response");
        }
    }

    /// Background-sync hook. Returns true if the tag has a handler.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        if tag == SYNC_ORDERS_TAG {
            self.sync_orders().await;
            true
        } else {
            debug!(tag, "No sync handler for tag");
            false
        }
    }

    // TODO: queue failed orders under a dedicated storage key and resubmit them here.
    async fn sync_orders(&self) {
        info!("Syncing offline orders...");
    }

    pub async fn status(&self) -> ProxyStatus {
        let inner = self.inner.lock().await;
        ProxyStatus {
            state: inner.state,
            cache_name: self.cache_name.clone(),
            entries: inner.storage.entry_count(&self.cache_name),
            last_updated: inner
                .storage
                .newest_entry(&self.cache_name)
                .map(|cached| cached.age_display()),
        }
    }

    async fn offline_page(&self) -> Option<AssetResponse> {
        let url = self.origin.join(OFFLINE_PAGE).ok()?;
        let inner = self.inner.lock().await;
        inner.storage.match_any(&self.cache_name, url.as_str())
    }
}
