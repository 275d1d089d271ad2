//! Offline cache proxy.
//!
//! Sits in front of the API client's GETs. After `install` and `activate`,
//! requests are answered from versioned cache buckets first and only go to
//! the network on a miss.

pub mod buckets;
pub mod network;
pub mod proxy;

pub use buckets::{CacheStorage, CachedData};
pub use network::{AssetRequest, AssetResponse, HttpNetwork, Network, ResponseKind};
pub use proxy::{FetchOutcome, OfflineProxy, ProxyError, ProxyState, ProxyStatus};

/// Current bucket name. Bumping it evicts older buckets on the next activation.
pub const CACHE_NAME: &str = "e-prashadam-v1.0.0";

/// Background-sync tag for orders placed while offline.
pub const SYNC_ORDERS_TAG: &str = "sync-orders";

/// Served to navigation requests when the network is down.
pub const OFFLINE_PAGE: &str = "/index.html";

/// Assets stored on install, relative to the site origin unless absolute.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/script.js",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    "https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600;700&family=Playfair+Display:wght@700&display=swap",
    "https://images.unsplash.com/photo-1536093059670-8d6be2be30f7?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
];
