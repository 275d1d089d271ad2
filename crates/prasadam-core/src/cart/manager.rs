use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{Cart, CartLine, PrasadamItem};
use crate::storage::StoreError;

use super::CartStore;

/// Notification published after every cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// A line was created or its quantity increased; `quantity` is the new line quantity.
    Added { id: i64, quantity: u32, item_count: u32 },
    Removed { id: i64, item_count: u32 },
    Cleared,
}

/// Owner of the in-memory cart.
///
/// Every mutation is applied in memory first, then saved through the
/// `CartStore` and published to subscribers. A failed save is returned to the
/// caller; the in-memory cart keeps the change either way.
pub struct CartManager {
    cart: Cart,
    store: CartStore,
    subscribers: Vec<mpsc::UnboundedSender<CartEvent>>,
}

impl CartManager {
    /// Create a manager seeded from whatever the store holds.
    pub fn load(store: CartStore) -> Self {
        let cart = store.load();
        Self {
            cart,
            store,
            subscribers: Vec::new(),
        }
    }

    /// Receive a `CartEvent` for every subsequent mutation.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CartEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add `quantity` of `item`, merging with an existing line for the same id.
    /// A zero quantity changes nothing.
    pub fn add_item(&mut self, item: &PrasadamItem, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return Ok(());
        }
        let new_quantity = self.cart.merge(CartLine::from_item(item, quantity));
        debug!(id = item.id, quantity = new_quantity, "Added to cart");
        self.persist_and_notify(CartEvent::Added {
            id: item.id,
            quantity: new_quantity,
            item_count: self.cart.item_count(),
        })
    }

    pub fn add_one(&mut self, item: &PrasadamItem) -> Result<(), StoreError> {
        self.add_item(item, 1)
    }

    /// Remove the line for `id`. Returns `Ok(false)` without saving when there is no such line.
    pub fn remove_item(&mut self, id: i64) -> Result<bool, StoreError> {
        if self.cart.remove(id).is_none() {
            return Ok(false);
        }
        debug!(id, "Removed from cart");
        self.persist_and_notify(CartEvent::Removed {
            id,
            item_count: self.cart.item_count(),
        })?;
        Ok(true)
    }

    /// Empty the cart. Only called once an order has been accepted.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.cart.clear();
        self.persist_and_notify(CartEvent::Cleared)
    }

    pub fn total_item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Cart total rounded to two decimals.
    pub fn total_price(&self) -> f64 {
        self.cart.total()
    }

    fn persist_and_notify(&mut self, event: CartEvent) -> Result<(), StoreError> {
        let saved = self.store.save(&self.cart);
        if let Err(ref e) = saved {
            warn!(error = %e, "Failed to save cart");
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        saved
    }
}
