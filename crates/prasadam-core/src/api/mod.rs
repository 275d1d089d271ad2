//! REST API client module for the storefront backend.
//!
//! This module provides the `ApiClient` for fetching temples and prasadam
//! and for placing orders, plus the `CatalogApi` / `OrderGateway` seams the
//! rest of the crate is written against.

pub mod client;
pub mod error;

pub use client::{interpret_order_response, ApiClient, CatalogApi, HealthStatus, OrderGateway};
pub use error::ApiError;
