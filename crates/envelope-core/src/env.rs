//! `.env` generation from a 1Password item
//!
//! Fields are grouped by section under a `# <label>` comment heading.
//! Groups appear in the order their section is first referenced by a field,
//! and fields keep their item order, so the same item always renders to the
//! same bytes.

use std::collections::HashMap;

use crate::op::{Field, ItemDetail};

/// Heading for fields whose section is unknown or has no label
pub const FALLBACK_HEADING: &str = "Other";

/// One `# heading` block of a `.env` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvGroup {
    pub heading: String,
    /// `key="value"` lines, in field order
    pub lines: Vec<String>,
}

/// A `.env` file, as a sequence of groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    pub groups: Vec<EnvGroup>,
}

impl EnvDocument {
    /// Build the document for an item
    pub fn from_item(detail: &ItemDetail) -> Self {
        let labels: HashMap<&str, &str> = detail
            .sections
            .iter()
            .map(|s| (s.id.as_str(), s.label.as_str()))
            .collect();

        // Section id -> fields, keyed by first appearance
        let mut grouped: Vec<(&str, Vec<&Field>)> = Vec::new();
        for field in detail.fields.iter().filter(|f| f.is_exported()) {
            let section_id = field.section.id.as_str();
            match grouped.iter_mut().find(|(id, _)| *id == section_id) {
                Some((_, fields)) => fields.push(field),
                None => grouped.push((section_id, vec![field])),
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(section_id, fields)| EnvGroup {
                heading: heading_for(labels.get(section_id).copied()),
                lines: fields.iter().map(|f| env_line(f)).collect(),
            })
            .collect();

        Self { groups }
    }

    /// Render as file text: groups separated by one blank line, exactly one
    /// trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for group in &self.groups {
            out.push_str(&format!("# {}\n", group.heading));
            for line in &group.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }

        let mut text = out.trim_end().to_string();
        text.push('\n');
        text
    }
}

/// Generate `.env` text for an item
pub fn generate(detail: &ItemDetail) -> String {
    EnvDocument::from_item(detail).render()
}

fn heading_for(label: Option<&str>) -> String {
    match label {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => FALLBACK_HEADING.to_string(),
    }
}

/// Values are written verbatim between double quotes, no escaping.
fn env_line(field: &Field) -> String {
    format!("{}=\"{}\"", field.label, field.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Section, NOTES_FIELD_ID};

    fn section(id: &str, label: &str) -> Section {
        Section {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    fn field(id: &str, label: &str, value: &str, section_id: &str) -> Field {
        Field {
            id: id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
            section: section(section_id, ""),
        }
    }

    #[test]
    fn test_generate_skips_notes() {
        let detail = ItemDetail {
            sections: vec![section("s1", "Website")],
            fields: vec![
                field("f1", "username", "bob", "s1"),
                field(NOTES_FIELD_ID, "notes", "secret", "s1"),
            ],
            ..Default::default()
        };
        assert_eq!(generate(&detail), "# Website\nusername=\"bob\"\n");
    }

    #[test]
    fn test_generate_skips_empty_values_and_empty_groups() {
        let detail = ItemDetail {
            sections: vec![section("s1", "Database"), section("s2", "Unused")],
            fields: vec![
                field("f1", "DB_HOST", "localhost", "s1"),
                field("f2", "DB_PASS", "", "s1"),
                field("f3", "EMPTY", "", "s2"),
            ],
            ..Default::default()
        };
        let text = generate(&detail);
        assert_eq!(text, "# Database\nDB_HOST=\"localhost\"\n");
        assert!(!text.contains("Unused"));
        assert!(!text.contains("DB_PASS"));
    }

    #[test]
    fn test_generate_groups_in_first_seen_order() {
        let detail = ItemDetail {
            sections: vec![section("a", "First"), section("b", "Second")],
            fields: vec![
                field("f1", "B1", "1", "b"),
                field("f2", "A1", "2", "a"),
                field("f3", "B2", "3", "b"),
            ],
            ..Default::default()
        };
        assert_eq!(
            generate(&detail),
            "# Second\nB1=\"1\"\nB2=\"3\"\n\n# First\nA1=\"2\"\n"
        );
    }

    #[test]
    fn test_generate_other_heading() {
        let detail = ItemDetail {
            sections: vec![section("s1", "")],
            fields: vec![
                field("f1", "blank_label", "x", "s1"),
                field("f2", "unknown_section", "y", "missing"),
                field("f3", "no_section", "z", ""),
            ],
            ..Default::default()
        };
        assert_eq!(
            generate(&detail),
            "# Other\nblank_label=\"x\"\n\n# Other\nunknown_section=\"y\"\n\n# Other\nno_section=\"z\"\n"
        );
    }

    #[test]
    fn test_generate_values_are_not_escaped() {
        let detail = ItemDetail {
            fields: vec![field("f1", "QUOTE", "say \"hi\"", "")],
            ..Default::default()
        };
        assert_eq!(generate(&detail), "# Other\nQUOTE=\"say \"hi\"\"\n");
    }

    #[test]
    fn test_generate_nothing_exported() {
        let detail = ItemDetail {
            fields: vec![field(NOTES_FIELD_ID, "notes", "only notes", "")],
            ..Default::default()
        };
        let doc = EnvDocument::from_item(&detail);
        assert!(doc.groups.is_empty());
        assert_eq!(doc.render(), "\n");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let detail = ItemDetail {
            sections: (0..20).map(|i| section(&format!("s{i}"), &format!("S{i}"))).collect(),
            fields: (0..60)
                .map(|i| field(&format!("f{i}"), &format!("K{i}"), "v", &format!("s{}", i % 20)))
                .collect(),
            ..Default::default()
        };
        let first = generate(&detail);
        for _ in 0..10 {
            assert_eq!(generate(&detail), first);
        }
        assert!(first.starts_with("# S0\nK0=\"v\"\nK20=\"v\"\nK40=\"v\"\n\n# S1\n"));
    }

    #[test]
    fn test_document_groups() {
        let detail = ItemDetail {
            sections: vec![section("s1", "API")],
            fields: vec![field("f1", "TOKEN", "abc", "s1")],
            ..Default::default()
        };
        let doc = EnvDocument::from_item(&detail);
        assert_eq!(
            doc.groups,
            vec![EnvGroup {
                heading: "API".to_string(),
                lines: vec!["TOKEN=\"abc\"".to_string()],
            }]
        );
    }
}
