//! Requests, responses and the network seam the proxy fetches through.

use std::future::Future;

use reqwest::{header, Client, Method, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ApiError;

/// Request as seen by the proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub method: Method,
    pub url: Url,
    pub accept: Option<String>,
}

impl AssetRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            accept: None,
        }
    }

    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = Some(accept.to_string());
        self
    }

    /// Navigation-style request: the caller would take an HTML page.
    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false)
    }

    /// Browser-extension URLs (`chrome-extension://`, `moz-extension://`, ...).
    pub fn is_extension(&self) -> bool {
        self.url.scheme().ends_with("-extension")
    }
}

/// How the response relates to the storefront's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Cross-origin response.
    Cors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only plain same-origin 200s are stored at runtime.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// Where the proxy goes when the cache misses.
pub trait Network: Send + Sync {
    fn fetch(
        &self,
        request: &AssetRequest,
    ) -> impl Future<Output = Result<AssetResponse, ApiError>> + Send;
}

/// Real network access over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: Url,
}

impl HttpNetwork {
    pub fn new(client: Client, origin: Url) -> Self {
        Self { client, origin }
    }

    fn kind_for(&self, url: &Url) -> ResponseKind {
        if url.origin() == self.origin.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        }
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, ApiError> {
        let mut builder = self.client.request(request.method.clone(), request.url.clone());
        if let Some(ref accept) = request.accept {
            builder = builder.header(header::ACCEPT, accept.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let kind = self.kind_for(response.url());
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "Network fetch");
        Ok(AssetResponse {
            status,
            kind,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_accepts_html() {
        let nav = AssetRequest::get(url("http://localhost:5000/"))
            .with_accept("text/html,application/xhtml+xml");
        assert!(nav.accepts_html());

        let api = AssetRequest::get(url("http://localhost:5000/api/temples"))
            .with_accept("application/json");
        assert!(!api.accepts_html());

        let bare = AssetRequest::get(url("http://localhost:5000/style.css"));
        assert!(!bare.accepts_html());
    }

    #[test]
    fn test_is_extension() {
        assert!(AssetRequest::get(url("chrome-extension://abcdef/script.js")).is_extension());
        assert!(AssetRequest::get(url("moz-extension://abcdef/script.js")).is_extension());
        assert!(!AssetRequest::get(url("https://fonts.googleapis.com/css2")).is_extension());
    }

    #[test]
    fn test_kind_for_origin() {
        let network = HttpNetwork::new(Client::new(), url("http://localhost:5000"));
        assert_eq!(network.kind_for(&url("http://localhost:5000/style.css")), ResponseKind::Basic);
        assert_eq!(network.kind_for(&url("http://localhost:8080/style.css")), ResponseKind::Cors);
        assert_eq!(
            network.kind_for(&url("https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css")),
            ResponseKind::Cors
        );
    }

    #[test]
    fn test_is_cacheable() {
        let mut response = AssetResponse {
            status: 200,
            kind: ResponseKind::Basic,
            content_type: None,
            body: Vec::new(),
        };
        assert!(response.is_cacheable());
        response.kind = ResponseKind::Cors;
        assert!(!response.is_cacheable());
        response.kind = ResponseKind::Basic;
        response.status = 206;
        assert!(!response.is_cacheable());
        assert!(response.is_ok());
    }
}
