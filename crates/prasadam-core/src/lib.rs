//! Core library for the E-Prashadam storefront.
//!
//! - `api`: backend client (`ApiClient`) and its error type
//! - `models`: temples, prasadam, cart and order types
//! - `catalog`: fetched collections and local temple filters
//! - `cart`: cart manager and its persistent store
//! - `checkout`: order summary and submission flow
//! - `view`: view-models for rendering
//! - `offline`: cache-first proxy in front of catalog requests
//! - `storage`: durable key-value slots

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod models;
pub mod offline;
pub mod storage;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use cart::{CartEvent, CartManager, CartStore};
pub use catalog::{Catalog, CatalogScope, TempleFilter};
pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutState, SubmitOutcome};
pub use config::Config;
