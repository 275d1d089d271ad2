//! View-models for the storefront screens.
//!
//! Everything here is a pure projection of catalog, cart and checkout state
//! into display strings. The terminal layer only lays these out.

use crate::models::{Cart, OrderSummary, PrasadamItem, Temple, TempleType};
use crate::utils::{format_price, format_rupees};

/// Header accent for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAccent {
    Jyotirlinga,
    Dham,
}

impl From<TempleType> for CardAccent {
    fn from(temple_type: TempleType) -> Self {
        if temple_type.is_jyotirlinga() {
            CardAccent::Jyotirlinga
        } else {
            CardAccent::Dham
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempleCard {
    pub id: i64,
    pub name: String,
    pub type_label: &'static str,
    pub accent: CardAccent,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrasadamCard {
    pub id: i64,
    pub name: String,
    pub icon: &'static str,
    pub from: String,
    pub description: String,
    pub price: String,
    /// Show the "Added!" acknowledgement instead of the add button.
    pub just_added: bool,
}

impl PrasadamCard {
    pub fn button_label(&self) -> &'static str {
        if self.just_added {
            "✓ Added!"
        } else {
            "+ Add to Cart"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLineView {
    pub id: i64,
    pub name: String,
    pub temple: String,
    pub quantity: String,
    pub line_total: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub total: String,
    pub is_empty: bool,
    pub checkout_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummaryView {
    /// (`name (qty)`, line total)
    pub lines: Vec<(String, String)>,
    pub total: String,
}

pub fn temple_card(temple: &Temple) -> TempleCard {
    TempleCard {
        id: temple.id,
        name: temple.name.clone(),
        type_label: temple.temple_type.label(),
        accent: temple.temple_type.into(),
        location: temple.location.clone(),
        description: temple.description.clone(),
    }
}

pub fn temple_cards<'a>(temples: impl IntoIterator<Item = &'a Temple>) -> Vec<TempleCard> {
    temples.into_iter().map(temple_card).collect()
}

/// Icon for a prasadam card, by the temple type it comes from.
pub fn prasadam_icon(temple_type: TempleType) -> &'static str {
    if temple_type.is_jyotirlinga() {
        "🔥"
    } else {
        "🛕"
    }
}

/// `just_added` is the id whose "Added!" acknowledgement is still showing.
pub fn prasadam_cards(items: &[PrasadamItem], just_added: Option<i64>) -> Vec<PrasadamCard> {
    items
        .iter()
        .map(|item| PrasadamCard {
            id: item.id,
            name: item.name.clone(),
            icon: prasadam_icon(item.temple_type),
            from: format!("From: {}", item.temple_name),
            description: item.description.clone(),
            price: format_price(item.price),
            just_added: just_added == Some(item.id),
        })
        .collect()
}

pub fn cart_view(cart: &Cart) -> CartView {
    let lines = cart
        .lines()
        .iter()
        .map(|line| CartLineView {
            id: line.id,
            name: line.name.clone(),
            temple: line.temple.clone(),
            quantity: format!("Quantity: {} × {}", line.quantity, format_price(line.price)),
            line_total: format_rupees(line.line_total()),
        })
        .collect();

    let total = if cart.is_empty() {
        "₹0".to_string()
    } else {
        format_rupees(cart.total())
    };

    CartView {
        lines,
        item_count: cart.item_count(),
        total,
        is_empty: cart.is_empty(),
        checkout_enabled: !cart.is_empty(),
    }
}

pub fn order_summary_view(summary: &OrderSummary) -> OrderSummaryView {
    OrderSummaryView {
        lines: summary
            .lines
            .iter()
            .map(|line| {
                (
                    format!("{} ({})", line.name, line.quantity),
                    format_rupees(line.line_total),
                )
            })
            .collect(),
        total: format_rupees(summary.total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartLine;

    fn item(id: i64, price: f64, temple_type: TempleType) -> PrasadamItem {
        PrasadamItem {
            id,
            name: format!("Prasad {}", id),
            description: "Blessed offering".to_string(),
            price,
            temple_id: None,
            temple_name: "Kedarnath Temple".to_string(),
            temple_type,
        }
    }

    fn line(id: i64, price: f64, quantity: u32) -> CartLine {
        CartLine {
            id,
            name: format!("Prasad {}", id),
            price,
            temple: "Kedarnath Temple".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_temple_card_label_and_accent() {
        let mut temple = Temple {
            id: 1,
            name: "Somnath Temple".to_string(),
            location: "Gujarat".to_string(),
            description: "The first among the twelve Jyotirlingas".to_string(),
            temple_type: TempleType::Jyotirlinga,
        };
        let card = temple_card(&temple);
        assert_eq!(card.type_label, "Jyotirlinga");
        assert_eq!(card.accent, CardAccent::Jyotirlinga);

        temple.temple_type = TempleType::Other;
        let card = temple_card(&temple);
        assert_eq!(card.type_label, "Dham");
        assert_eq!(card.accent, CardAccent::Dham);
    }

    #[test]
    fn test_prasadam_cards() {
        let items = vec![item(1, 50.0, TempleType::Jyotirlinga), item(2, 12.5, TempleType::Dham)];
        let cards = prasadam_cards(&items, Some(2));

        assert_eq!(cards[0].icon, "🔥");
        assert_eq!(cards[0].from, "From: Kedarnath Temple");
        assert_eq!(cards[0].price, "₹50");
        assert_eq!(cards[0].button_label(), "+ Add to Cart");

        assert_eq!(cards[1].icon, "🛕");
        assert_eq!(cards[1].price, "₹12.5");
        assert_eq!(cards[1].button_label(), "✓ Added!");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = cart_view(&Cart::new());
        assert!(view.is_empty);
        assert!(!view.checkout_enabled);
        assert_eq!(view.total, "₹0");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_cart_view_lines_and_total() {
        let cart = Cart::from_lines(vec![line(1, 50.0, 2), line(2, 30.0, 1)]);
        let view = cart_view(&cart);
        assert!(view.checkout_enabled);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.lines[0].quantity, "Quantity: 2 × ₹50");
        assert_eq!(view.lines[0].line_total, "₹100.00");
        assert_eq!(view.total, "₹130.00");
    }

    #[test]
    fn test_order_summary_view() {
        let cart = Cart::from_lines(vec![line(1, 50.0, 2), line(2, 30.0, 1)]);
        let view = order_summary_view(&OrderSummary::from_cart(&cart));
        assert_eq!(view.lines[0], ("Prasad 1 (2)".to_string(), "₹100.00".to_string()));
        assert_eq!(view.lines[1], ("Prasad 2 (1)".to_string(), "₹30.00".to_string()));
        assert_eq!(view.total, "₹130.00");
    }
}
