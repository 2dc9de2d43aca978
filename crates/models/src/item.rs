use serde::{Deserialize, Serialize};

/// A stored item, addressed by a unique string id.
///
/// `images` is an ordered list of filenames in upload order. Entries are
/// appended on upload and removed only by explicit image removal; the same
/// filename may appear more than once.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// The replace document applied by an upsert.
///
/// Upsert is a full replace, not a merge: a field left `None`/empty here is
/// cleared on the stored record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Item {
    /// Materialize a record from an id and a replace document.
    pub fn from_fields(id: impl Into<String>, fields: ItemFields) -> Self {
        Self { id: id.into(), name: fields.name, value: fields.value, images: fields.images }
    }

    /// Extract the mutable fields, dropping the id.
    pub fn into_fields(self) -> ItemFields {
        ItemFields { name: self.name, value: self.value, images: self.images }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fields_is_a_full_replace() {
        let first = Item::from_fields(
            "a",
            ItemFields { name: Some("x".into()), value: Some(1.0), images: vec!["f.png".into()] },
        );
        assert_eq!(first.name.as_deref(), Some("x"));

        // replacing with a sparse document clears the omitted fields
        let second = Item::from_fields("a", ItemFields { value: Some(2.0), ..Default::default() });
        assert_eq!(second.name, None);
        assert_eq!(second.value, Some(2.0));
        assert!(second.images.is_empty());
    }

    #[test]
    fn fields_round_trip_preserves_image_order_and_duplicates() {
        let item = Item::from_fields(
            "a",
            ItemFields {
                name: None,
                value: None,
                images: vec!["f.png".into(), "g.png".into(), "f.png".into()],
            },
        );
        let fields = item.into_fields();
        assert_eq!(fields.images, vec!["f.png", "g.png", "f.png"]);
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let item = Item::from_fields("a", ItemFields { value: Some(2.0), ..Default::default() });
        let json = serde_json::to_value(&item).expect("serializes");
        assert_eq!(json, serde_json::json!({"id": "a", "value": 2.0, "images": []}));
    }

    #[test]
    fn sparse_json_deserializes_with_defaults() {
        let item: Item = serde_json::from_str(r#"{"id":"a"}"#).expect("deserializes");
        assert_eq!(item.id, "a");
        assert_eq!(item.name, None);
        assert!(item.images.is_empty());
    }
}
