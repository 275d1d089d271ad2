//! Order domain models.
//!
//! These types cover a single checkout attempt: the contact details typed
//! into the checkout form, the request body posted to the order endpoint,
//! the server's answer, and the summary shown before submitting.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Cart, CartLine};

/// Maximum accepted length for name, email and phone fields.
const MAX_FIELD_LENGTH: usize = 100;

/// Maximum accepted length for the delivery address.
const MAX_ADDRESS_LENGTH: usize = 500;

/// Contact form field, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Address,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Address,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Full Name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::Address => "Delivery Address",
        }
    }

    pub fn max_length(&self) -> usize {
        match self {
            ContactField::Address => MAX_ADDRESS_LENGTH,
            _ => MAX_FIELD_LENGTH,
        }
    }
}

/// Contact details collected by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ContactDetails {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Address => &self.address,
        }
    }

    pub fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Address => &mut self.address,
        }
    }

    /// Append a typed character if the field has room and the character is printable.
    /// Returns true if the character was accepted.
    pub fn push_char(&mut self, field: ContactField, c: char) -> bool {
        let value = self.field_mut(field);
        if can_add_field_char(field, value.chars().count(), c) {
            value.push(c);
            true
        } else {
            false
        }
    }

    /// First required field that is blank, in form order.
    pub fn first_missing(&self) -> Option<ContactField> {
        ContactField::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Check if a character can be typed into a contact field
pub fn can_add_field_char(field: ContactField, current_len: usize, c: char) -> bool {
    current_len < field.max_length() && !c.is_control()
}

/// Request body for `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub user_address: String,
    /// JSON-encoded snapshot of the cart lines.
    pub items: String,
    pub total_amount: f64,
}

impl OrderRequest {
    pub fn new(contact: &ContactDetails, cart: &Cart) -> serde_json::Result<Self> {
        Ok(Self {
            user_name: contact.name.trim().to_string(),
            user_email: contact.email.trim().to_string(),
            user_phone: contact.phone.trim().to_string(),
            user_address: contact.address.trim().to_string(),
            items: serde_json::to_string(cart)?,
            total_amount: cart.raw_total(),
        })
    }
}

/// Response from `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OrderResponse {
    /// Reason to show the user when the server rejected the order.
    pub fn rejection_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Order ids come back as strings from some backends and integers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    }))
}

/// One row of the order summary shown in the checkout dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummaryLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: f64,
}

/// Snapshot of the cart taken when the checkout dialog opens.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<OrderSummaryLine>,
    pub total: f64,
}

impl OrderSummary {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line: &CartLine| OrderSummaryLine {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
            total: cart.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            name: "Demo Devotee".to_string(),
            email: "devotee@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "Varanasi, Uttar Pradesh".to_string(),
        }
    }

    fn cart() -> Cart {
        Cart::from_lines(vec![
            CartLine {
                id: 1,
                name: "Laddu".to_string(),
                price: 50.0,
                temple: "Somnath Temple".to_string(),
                quantity: 2,
            },
            CartLine {
                id: 2,
                name: "Panchamrut".to_string(),
                price: 30.0,
                temple: "Somnath Temple".to_string(),
                quantity: 1,
            },
        ])
    }

    #[test]
    fn test_order_request_embeds_cart_as_json_string() {
        let request = OrderRequest::new(&contact(), &cart()).unwrap();
        assert_eq!(request.total_amount, 130.0);

        let lines: Vec<CartLine> = serde_json::from_str(&request.items).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 2);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["user_name"], "Demo Devotee");
        assert!(body["items"].is_string());
    }

    #[test]
    fn test_first_missing_field() {
        let mut details = contact();
        assert_eq!(details.first_missing(), None);
        details.phone = "   ".to_string();
        assert_eq!(details.first_missing(), Some(ContactField::Phone));
        details.name.clear();
        assert_eq!(details.first_missing(), Some(ContactField::Name));
    }

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(ContactField::Name, 0, 'a'));
        assert!(can_add_field_char(ContactField::Name, 99, 'z'));
        assert!(!can_add_field_char(ContactField::Name, 100, 'a'));
        assert!(can_add_field_char(ContactField::Address, 100, 'a'));
        assert!(!can_add_field_char(ContactField::Address, 500, 'a'));
        assert!(!can_add_field_char(ContactField::Email, 0, '\n'));
        assert!(!can_add_field_char(ContactField::Email, 0, '\x00'));
    }

    #[test]
    fn test_parse_order_response_variants() {
        let ok: OrderResponse =
            serde_json::from_str(r#"{"success": true, "order_id": "A1B2C3D4"}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.order_id.as_deref(), Some("A1B2C3D4"));

        let numeric: OrderResponse =
            serde_json::from_str(r#"{"success": true, "order_id": 42, "message": "Order created."}"#).unwrap();
        assert_eq!(numeric.order_id.as_deref(), Some("42"));

        let rejected: OrderResponse =
            serde_json::from_str(r#"{"success": false, "error": "Out of stock"}"#).unwrap();
        assert!(!rejected.success);
        assert_eq!(rejected.rejection_reason(), "Out of stock");

        let bare: OrderResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(bare.rejection_reason(), "Unknown error");
    }

    #[test]
    fn test_summary_from_cart() {
        let summary = OrderSummary::from_cart(&cart());
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total, 100.0);
        assert_eq!(summary.total, 130.0);
    }
}
