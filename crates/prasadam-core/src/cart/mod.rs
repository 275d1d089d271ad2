//! Shopping cart state and persistence.
//!
//! - `CartStore`: loads and saves the cart snapshot in a durable slot
//! - `CartManager`: owns the in-memory cart, saves after every mutation and
//!   publishes `CartEvent`s to subscribers

pub mod manager;
pub mod store;

pub use manager::{CartEvent, CartManager};
pub use store::CartStore;
