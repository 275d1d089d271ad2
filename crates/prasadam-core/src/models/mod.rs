//! Data models for storefront entities.
//!
//! This module contains the data structures used across the storefront:
//!
//! - `Temple`, `TempleType`: pilgrimage sites and their category
//! - `PrasadamItem`: an orderable offering
//! - `Cart`, `CartLine`: the shopping cart aggregate
//! - Order types: `ContactDetails`, `OrderRequest`, `OrderResponse`, `OrderSummary`

pub mod cart;
pub mod order;
pub mod prasadam;
pub mod temple;

use serde::{Deserialize, Deserializer};

pub use cart::{round_currency, Cart, CartLine};
pub use order::{
    can_add_field_char, ContactDetails, ContactField, OrderRequest, OrderResponse, OrderSummary,
    OrderSummaryLine,
};
pub use prasadam::PrasadamItem;
pub use temple::{Temple, TempleType};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
