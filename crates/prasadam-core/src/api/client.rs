//! API client for the storefront backend.
//!
//! This module provides the `ApiClient` struct for fetching the temple and
//! prasadam catalog and placing orders. Catalog GETs go through the offline
//! cache proxy when one is attached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{OrderRequest, OrderResponse, PrasadamItem, Temple};
use crate::offline::{
    AssetRequest, AssetResponse, CacheStorage, HttpNetwork, OfflineProxy, ProxyError, CACHE_NAME,
    PRECACHE_MANIFEST,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const ACCEPT_JSON: &str = "application/json";

/// Response from `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Read side of the backend.
pub trait CatalogApi: Send + Sync {
    fn fetch_temples(&self) -> impl Future<Output = Result<Vec<Temple>>> + Send;
    fn fetch_prasadam(&self) -> impl Future<Output = Result<Vec<PrasadamItem>>> + Send;
    fn fetch_prasadam_for_temple(
        &self,
        temple_id: i64,
    ) -> impl Future<Output = Result<Vec<PrasadamItem>>> + Send;
}

/// Where orders are sent.
pub trait OrderGateway: Send + Sync {
    fn place_order(&self, order: &OrderRequest) -> impl Future<Output = Result<OrderResponse>> + Send;
}

/// Backend API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    proxy: Option<Arc<OfflineProxy<HttpNetwork>>>,
    /// Ask the network before the offline cache.
    network_first: bool,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            proxy: None,
            network_first: false,
        })
    }

    /// Put an offline cache proxy for `site_origin`, backed by `storage`,
    /// in front of catalog GETs. The proxy shares this client's connection pool.
    pub fn with_offline_cache(self, site_origin: &str, storage: CacheStorage) -> Result<Self> {
        let origin = Url::parse(site_origin)
            .with_context(|| format!("Invalid site origin {}", site_origin))?;
        let network = HttpNetwork::new(self.client.clone(), origin.clone());
        let proxy = OfflineProxy::new(network, CACHE_NAME, origin, PRECACHE_MANIFEST, storage)?;
        Ok(self.with_proxy(Arc::new(proxy)))
    }

    /// Route catalog GETs through `proxy`.
    pub fn with_proxy(mut self, proxy: Arc<OfflineProxy<HttpNetwork>>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn proxy(&self) -> Option<&Arc<OfflineProxy<HttpNetwork>>> {
        self.proxy.as_ref()
    }

    /// A client for an explicit reload: catalog GETs go to the network first
    /// and refresh the offline cache, which only answers if the network fails.
    pub fn reloading(&self) -> Self {
        Self {
            network_first: true,
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);

        if let Some(ref proxy) = self.proxy {
            let parsed = Url::parse(&url).with_context(|| format!("Invalid API URL {}", url))?;
            let request = AssetRequest::get(parsed).with_accept(ACCEPT_JSON);
            let outcome = if self.network_first {
                proxy.handle_refresh(&request).await
            } else {
                proxy.handle_fetch(&request).await
            };
            match outcome {
                Ok(outcome) => {
                    if let Some(response) = outcome.into_response() {
                        return decode_asset(&url, response);
                    }
                }
                Err(ProxyError::Offline { url, source }) => {
                    warn!(url = %url, error = %source, "Request failed with nothing cached");
                    return Err(ApiError::Offline(url).into());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Offline cache failed for {}", url));
                }
            }
        }

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Data Fetching Methods =====

    pub async fn fetch_temples(&self) -> Result<Vec<Temple>> {
        let temples: Vec<Temple> = self.get("temples").await?;
        debug!(count = temples.len(), "Fetched temples");
        Ok(temples)
    }

    pub async fn fetch_prasadam(&self) -> Result<Vec<PrasadamItem>> {
        let items: Vec<PrasadamItem> = self.get("prasadam").await?;
        debug!(count = items.len(), "Fetched prasadam");
        Ok(items)
    }

    pub async fn fetch_prasadam_for_temple(&self, temple_id: i64) -> Result<Vec<PrasadamItem>> {
        let items: Vec<PrasadamItem> = self
            .get(&format!("temples/{}/prasadam", temple_id))
            .await?;
        debug!(temple_id, count = items.len(), "Fetched temple prasadam");
        Ok(items)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url("health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to reach API health endpoint")?;
        let response = Self::check_response(response).await?;
        response.json().await.context("Failed to parse health response")
    }

    /// Submit an order. Never goes through the offline cache.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse> {
        let url = self.url("order");
        let response = self
            .client
            .post(&url)
            .json(order)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ApiError::from)
            .context("Failed to read order response")?;
        interpret_order_response(status, &body)
    }
}

impl CatalogApi for ApiClient {
    async fn fetch_temples(&self) -> Result<Vec<Temple>> {
        ApiClient::fetch_temples(self).await
    }

    async fn fetch_prasadam(&self) -> Result<Vec<PrasadamItem>> {
        ApiClient::fetch_prasadam(self).await
    }

    async fn fetch_prasadam_for_temple(&self, temple_id: i64) -> Result<Vec<PrasadamItem>> {
        ApiClient::fetch_prasadam_for_temple(self, temple_id).await
    }
}

impl OrderGateway for ApiClient {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse> {
        ApiClient::place_order(self, order).await
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Decode a JSON body the proxy handed back.
fn decode_asset<T: DeserializeOwned>(url: &str, response: AssetResponse) -> Result<T> {
    if !response.is_ok() {
        let status = StatusCode::from_u16(response.status)
            .with_context(|| format!("Invalid status {} from {}", response.status, url))?;
        let body = String::from_utf8_lossy(&response.body);
        return Err(ApiError::from_status(status, &body).into());
    }
    serde_json::from_slice(&response.body)
        .with_context(|| format!("Failed to parse JSON response from {}", url))
}

/// Turn the status and body of `POST /order` into an answer.
///
/// The backend reports business rejections as `400 {"success": false, "error": ...}`,
/// so any body of the right shape saying `success: false` is returned as `Ok`.
/// A non-2xx status claiming success, or a body that doesn't parse, is an error.
pub fn interpret_order_response(status: StatusCode, body: &str) -> Result<OrderResponse> {
    match serde_json::from_str::<OrderResponse>(body) {
        Ok(parsed) if status.is_success() || !parsed.success => Ok(parsed),
        Ok(_) => Err(ApiError::from_status(status, body).into()),
        Err(e) if status.is_success() => Err(ApiError::InvalidResponse(e.to_string()))
            .context("Failed to parse order response"),
        Err(_) => Err(ApiError::from_status(status, body).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::ResponseKind;

    fn asset(status: u16, body: &str) -> AssetResponse {
        AssetResponse {
            status,
            kind: ResponseKind::Basic,
            content_type: Some(ACCEPT_JSON.to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://localhost:5000/api", "temples"), "http://localhost:5000/api/temples");
        assert_eq!(join_url("http://localhost:5000/api/", "/order"), "http://localhost:5000/api/order");
    }

    #[test]
    fn test_new_trims_base_url() {
        let config = Config {
            api_base_url: "https://shop.example.org/api/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("temples/3/prasadam"), "https://shop.example.org/api/temples/3/prasadam");
        assert!(client.proxy().is_none());
    }

    #[tokio::test]
    async fn test_with_offline_cache() {
        let client = ApiClient::new(&Config::default()).unwrap();
        let cached = client
            .clone()
            .with_offline_cache("http://localhost:5000", CacheStorage::in_memory())
            .unwrap();
        let proxy = cached.proxy().unwrap();
        assert_eq!(proxy.cache_name(), CACHE_NAME);
        assert_eq!(proxy.state().await, crate::offline::ProxyState::Registered);

        assert!(!cached.network_first);
        assert!(cached.reloading().network_first);
        assert!(cached.reloading().proxy().is_some());

        assert!(client.with_offline_cache("not a url", CacheStorage::in_memory()).is_err());
    }

    #[test]
    fn test_interpret_success() {
        let response = interpret_order_response(
            StatusCode::OK,
            r#"{"success": true, "order_id": 42, "message": "Order placed"}"#,
        )
        .unwrap();
        assert!(response.success);
        assert_eq!(response.order_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_interpret_business_rejection_on_400() {
        let response = interpret_order_response(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "error": "Item out of stock"}"#,
        )
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.rejection_reason(), "Item out of stock");
    }

    #[test]
    fn test_interpret_server_error_page() {
        let err = interpret_order_response(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
    }

    #[test]
    fn test_interpret_success_claim_on_error_status() {
        let err = interpret_order_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"success": true}"#)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
    }

    #[test]
    fn test_interpret_garbage_on_200() {
        let err = interpret_order_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_asset() {
        let temples: Vec<Temple> = decode_asset(
            "http://localhost:5000/api/temples",
            asset(200, r#"[{"id": 1, "name": "Somnath Temple", "location": "Gujarat", "description": "First", "type": "jyotirlinga"}]"#),
        )
        .unwrap();
        assert_eq!(temples.len(), 1);
        assert_eq!(temples[0].name, "Somnath Temple");

        let err = decode_asset::<Vec<Temple>>("http://localhost:5000/api/temples", asset(404, "{}"))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_))));
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status": "healthy", "service": "E-Prashadam API", "version": "1.0.0", "timestamp": "2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.version, "1.0.0");
    }
}
