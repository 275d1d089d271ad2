//! Shopping cart domain model.
//!
//! `Cart` is the pure aggregate: it knows how lines merge and how totals are
//! computed, but nothing about persistence or notifications. The
//! `CartManager` in `crate::cart` wraps it with both.

use serde::{Deserialize, Serialize};

use super::PrasadamItem;

/// One aggregated cart row: a distinct item and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub temple: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn from_item(item: &PrasadamItem, quantity: u32) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.unit_price(),
            temple: item.temple_name.clone(),
            quantity,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Ordered list of cart lines, at most one per item id.
///
/// Serializes as a bare JSON array of lines, which is both the persisted
/// snapshot format and the `items` payload of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.merge(line);
        }
        cart
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Add a line, merging quantities with an existing line for the same id.
    /// Returns the resulting quantity for that id. Zero-quantity lines are dropped.
    pub fn merge(&mut self, line: CartLine) -> u32 {
        if line.quantity == 0 {
            return self.get(line.id).map(|l| l.quantity).unwrap_or(0);
        }
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.quantity
            }
            None => {
                let quantity = line.quantity;
                self.lines.push(line);
                quantity
            }
        }
    }

    /// Remove the line for `id`. Returns the removed line, if there was one.
    pub fn remove(&mut self, id: i64) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Unrounded sum of price x quantity.
    pub fn raw_total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of price x quantity rounded to two decimals.
    pub fn total(&self) -> f64 {
        round_currency(self.raw_total())
    }
}

/// Round a rupee amount to paise.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, price: f64, quantity: u32) -> CartLine {
        CartLine {
            id,
            name: format!("Item {}", id),
            price,
            temple: "Somnath Temple".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_merge_same_id_increments_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.merge(line(1, 50.0, 1)), 1);
        assert_eq!(cart.merge(line(1, 50.0, 1)), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.merge(line(3, 10.0, 1));
        cart.merge(line(1, 10.0, 1));
        cart.merge(line(3, 10.0, 1));
        let ids: Vec<i64> = cart.lines().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_merge_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        assert_eq!(cart.merge(line(1, 50.0, 0)), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total() {
        let cart = Cart::from_lines(vec![line(1, 50.0, 2), line(2, 30.0, 1)]);
        assert_eq!(cart.total(), 130.00);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_rounds_to_paise() {
        let cart = Cart::from_lines(vec![line(1, 0.1, 1), line(2, 0.2, 1)]);
        assert_eq!(cart.total(), 0.3);
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut cart = Cart::from_lines(vec![line(1, 50.0, 2)]);
        assert!(cart.remove(99).is_none());
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.remove(1).map(|l| l.quantity), Some(2));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let cart = Cart::from_lines(vec![line(1, 50.0, 1), line(1, 50.0, 2)]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(1).map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_serializes_as_array() {
        let cart = Cart::from_lines(vec![line(1, 50.0, 2)]);
        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#""quantity":2"#));
        assert!(json.contains(r#""temple":"Somnath Temple""#));
    }
}
