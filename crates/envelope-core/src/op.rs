//! 1Password CLI (`op`) item model
//!
//! Only the parts of `op item list` / `op item get` JSON that Envelope uses
//! are modelled. Missing keys and `null` both fall back to empty values.

use serde::{Deserialize, Deserializer};

use crate::error::{EnvelopeError, Result};

/// Binary name of the 1Password CLI
pub const OP_BINARY: &str = "op";

/// Field id `op` uses for the free-form notes of an item. Never exported.
pub const NOTES_FIELD_ID: &str = "notesPlain";

/// An entry of `op item list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Full content of an item as returned by `op item get`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Field {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    /// Fields outside any section carry no (or a `null`) `section`; they land
    /// in the section with an empty id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub section: Section,
}

impl Field {
    /// Whether this field ends up in a generated `.env` file
    pub fn is_exported(&self) -> bool {
        self.id != NOTES_FIELD_ID && !self.value.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Arguments for `op item list`
pub fn list_args(vault: &str) -> Vec<String> {
    ["item", "list", "--vault", vault, "--format", "json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Arguments for `op item get`
pub fn get_args(item_id: &str) -> Vec<String> {
    ["item", "get", item_id, "--format", "json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parse the output of `op item list`, sorted by title.
///
/// The sort is stable and compares titles byte-wise, so equal titles keep
/// the order `op` returned them in.
pub fn parse_item_list(output: &[u8], vault: &str) -> Result<Vec<ListItem>> {
    let mut items: Vec<ListItem> =
        serde_json::from_slice(output).map_err(|source| EnvelopeError::Parse {
            what: "JSON from 'op'",
            source,
        })?;

    if items.is_empty() {
        return Err(EnvelopeError::EmptyResult(vault.to_string()));
    }

    items.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(items)
}

/// Parse the output of `op item get`
pub fn parse_item_detail(output: &[u8]) -> Result<ItemDetail> {
    serde_json::from_slice(output).map_err(|source| EnvelopeError::Parse {
        what: "item detail JSON",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[ListItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_list_args() {
        assert_eq!(
            list_args("Personal"),
            vec!["item", "list", "--vault", "Personal", "--format", "json"]
        );
    }

    #[test]
    fn test_get_args() {
        assert_eq!(get_args("abc123"), vec!["item", "get", "abc123", "--format", "json"]);
    }

    #[test]
    fn test_parse_item_list_sorts_by_title() {
        let json = br#"[
            {"id": "z", "title": "Zeta", "tags": ["prod"]},
            {"id": "a", "title": "Alpha", "tags": []}
        ]"#;
        let items = parse_item_list(json, "Personal").unwrap();
        assert_eq!(titles(&items), vec!["Alpha", "Zeta"]);
        assert_eq!(items[1].tags, vec!["prod"]);
    }

    #[test]
    fn test_parse_item_list_sort_is_stable_and_case_sensitive() {
        let json = br#"[
            {"id": "1", "title": "beta"},
            {"id": "2", "title": "Beta"},
            {"id": "3", "title": "beta"},
            {"id": "4", "title": "Alpha"}
        ]"#;
        let items = parse_item_list(json, "Work").unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn test_parse_item_list_empty() {
        let err = parse_item_list(b"[]", "Empty").unwrap_err();
        assert!(matches!(err, EnvelopeError::EmptyResult(ref v) if v == "Empty"));
    }

    #[test]
    fn test_parse_item_list_invalid_json() {
        let err = parse_item_list(b"not json", "Personal").unwrap_err();
        assert!(matches!(err, EnvelopeError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse JSON from 'op':"));
    }

    #[test]
    fn test_parse_item_list_wrong_shape() {
        let err = parse_item_list(br#"{"id": "x", "title": "y"}"#, "Personal").unwrap_err();
        assert!(matches!(err, EnvelopeError::Parse { .. }));
    }

    #[test]
    fn test_parse_item_detail() {
        let json = br#"{
            "id": "item1",
            "title": "Stripe",
            "sections": [{"id": "s1", "label": "API"}],
            "fields": [
                {"id": "f1", "label": "key", "value": "sk_test", "section": {"id": "s1", "label": "API"}},
                {"id": "notesPlain", "label": "notesPlain", "value": ""}
            ]
        }"#;
        let detail = parse_item_detail(json).unwrap();
        assert_eq!(detail.title, "Stripe");
        assert_eq!(detail.sections.len(), 1);
        assert_eq!(detail.fields[0].section.id, "s1");
        assert_eq!(detail.fields[1].section, Section::default());
    }

    #[test]
    fn test_parse_item_list_null_tags() {
        let items = parse_item_list(br#"[{"id":"1","title":"A","tags":null}]"#, "v").unwrap();
        assert!(items[0].tags.is_empty());
    }

    #[test]
    fn test_parse_item_detail_nulls() {
        let json = br#"{
            "id": "item1",
            "title": "Legacy",
            "sections": null,
            "fields": [
                {"id": "f1", "label": "user", "value": "bob", "section": null},
                {"id": "f2", "label": null, "value": null}
            ]
        }"#;
        let detail = parse_item_detail(json).unwrap();
        assert!(detail.sections.is_empty());
        assert_eq!(detail.fields[0].section, Section::default());
        assert_eq!(detail.fields[1].value, "");
        assert_eq!(crate::env::generate(&detail), "# Other\nuser=\"bob\"\n");

        let detail = parse_item_detail(br#"{"id":"x","title":"y","fields":null}"#).unwrap();
        assert!(detail.fields.is_empty());
    }

    #[test]
    fn test_parse_item_detail_invalid() {
        let err = parse_item_detail(b"[ERROR] nope").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse item detail JSON:"));
    }

    #[test]
    fn test_field_is_exported() {
        let mut field = Field {
            id: "f1".to_string(),
            label: "user".to_string(),
            value: "bob".to_string(),
            section: Section::default(),
        };
        assert!(field.is_exported());

        field.value.clear();
        assert!(!field.is_exported());

        field.value = "secret".to_string();
        field.id = NOTES_FIELD_ID.to_string();
        assert!(!field.is_exported());
    }
}
