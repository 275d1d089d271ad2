use tracing::{debug, warn};

use crate::models::{Cart, CartLine};
use crate::storage::{KeyValueStore, StoreError};

/// Slot holding the JSON-encoded cart line list.
pub const CART_KEY: &str = "cart";

/// Serialization boundary between the cart and its durable slot.
pub struct CartStore {
    backend: Box<dyn KeyValueStore>,
}

impl CartStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load the saved cart. A missing, unreadable or unparsable slot is an empty cart.
    pub fn load(&self) -> Cart {
        let contents = match self.backend.get(CART_KEY) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("No saved cart found");
                return Cart::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Vec<CartLine>>(&contents) {
            Ok(lines) => {
                let cart = Cart::from_lines(lines);
                debug!(lines = cart.len(), "Loaded saved cart");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse saved cart, starting empty");
                Cart::new()
            }
        }
    }

    /// Overwrite the slot with a complete snapshot of `cart`.
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let contents = serde_json::to_string(cart).map_err(|source| StoreError::Encode {
            key: CART_KEY.to_string(),
            source,
        })?;
        self.backend.set(CART_KEY, &contents)
    }
}
