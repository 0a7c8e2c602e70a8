//! Cafe item types

use serde::{Deserialize, Serialize};

/// A single item on the cafe menu.
///
/// An `id` of `0` asks the store to assign the key on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CafeItem {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CafeItem {
    pub fn new(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }

    /// True when the key is still unassigned.
    pub fn has_generated_id(&self) -> bool {
        self.id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_plain_field_names() {
        let item = CafeItem::new(1, "Latte", "hot");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "Latte", "description": "hot"})
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let item: CafeItem = serde_json::from_str(r#"{"name": "Mocha"}"#).unwrap();
        assert_eq!(item.id, 0);
        assert!(item.has_generated_id());
        assert_eq!(item.name.as_deref(), Some("Mocha"));
        assert_eq!(item.description, None);
    }

    #[test]
    fn test_null_fields_round_trip_as_null() {
        let item: CafeItem =
            serde_json::from_str(r#"{"id": 7, "name": null, "description": null}"#).unwrap();
        assert_eq!(item, CafeItem { id: 7, name: None, description: None });
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":7,"name":null,"description":null}"#);
    }
}
