//! Temple domain model.

use serde::{Deserialize, Serialize};

/// Pilgrimage-site category a temple belongs to.
///
/// The backend only ever sends `jyotirlinga` or `dham`; anything else is kept
/// as `Other` so an unexpected category never fails the whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempleType {
    Jyotirlinga,
    Dham,
    #[serde(other)]
    Other,
}

impl TempleType {
    /// Label shown on a temple card.
    pub fn label(&self) -> &'static str {
        match self {
            TempleType::Jyotirlinga => "Jyotirlinga",
            TempleType::Dham | TempleType::Other => "Dham",
        }
    }

    pub fn is_jyotirlinga(&self) -> bool {
        matches!(self, TempleType::Jyotirlinga)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temple {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(rename = "type")]
    pub temple_type: TempleType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temple() {
        let json = r#"{"id": 1, "name": "Somnath Temple", "location": "Gujarat", "type": "jyotirlinga", "description": "The first among the twelve Jyotirlingas"}"#;
        let temple: Temple = serde_json::from_str(json).expect("Failed to parse temple JSON");
        assert_eq!(temple.id, 1);
        assert_eq!(temple.temple_type, TempleType::Jyotirlinga);
        assert_eq!(temple.temple_type.label(), "Jyotirlinga");
    }

    #[test]
    fn test_parse_temple_null_description_and_unknown_type() {
        let json = r#"{"id": 14, "name": "Dwarka Dham", "location": "Gujarat", "type": "shakti_peetha", "description": null}"#;
        let temple: Temple = serde_json::from_str(json).expect("Failed to parse temple JSON");
        assert_eq!(temple.temple_type, TempleType::Other);
        assert_eq!(temple.description, "");
        assert_eq!(temple.temple_type.label(), "Dham");
    }
}
