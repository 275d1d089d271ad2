//! Prasadam item domain model.

use serde::{Deserialize, Serialize};

use super::TempleType;

/// A temple offering available for order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrasadamItem {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    pub price: f64,
    /// The bulk listing omits the temple id; only name and type are sent.
    #[serde(default)]
    pub temple_id: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub temple_name: String,
    #[serde(default = "default_temple_type")]
    pub temple_type: TempleType,
}

fn default_temple_type() -> TempleType {
    TempleType::Other
}

impl PrasadamItem {
    /// Price clamped to zero; a negative price from the wire is never charged.
    pub fn unit_price(&self) -> f64 {
        self.price.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bulk_listing_item() {
        let json = r#"{"id": 7, "name": "Laddu", "description": "Blessed prasadam from Somnath Temple", "price": 200.0, "temple_name": "Somnath Temple", "temple_type": "jyotirlinga"}"#;
        let item: PrasadamItem = serde_json::from_str(json).expect("Failed to parse prasadam JSON");
        assert_eq!(item.id, 7);
        assert_eq!(item.temple_id, None);
        assert_eq!(item.temple_type, TempleType::Jyotirlinga);
        assert_eq!(item.unit_price(), 200.0);
    }

    #[test]
    fn test_parse_temple_scoped_item() {
        let json = r#"{"id": 40, "name": "Khaja", "description": null, "price": 190, "temple_id": 15}"#;
        let item: PrasadamItem = serde_json::from_str(json).expect("Failed to parse prasadam JSON");
        assert_eq!(item.temple_id, Some(15));
        assert_eq!(item.description, "");
        assert_eq!(item.temple_name, "");
        assert_eq!(item.temple_type, TempleType::Other);
    }

    #[test]
    fn test_negative_price_clamped() {
        let json = r#"{"id": 1, "name": "Broken", "price": -5.0}"#;
        let item: PrasadamItem = serde_json::from_str(json).expect("Failed to parse prasadam JSON");
        assert_eq!(item.unit_price(), 0.0);
    }
}
