use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors};

/// A CMS document addressed by its type (`about`, `odoo`, ...). Replaced
/// wholesale on every save; there is no version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub title: String,
    pub description: String,
    /// Page-specific structure, opaque to the server.
    pub content: Value,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /api/content?type=`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDocumentInput {
    pub title: String,
    pub description: String,
    pub content: Value,
}

impl ContentDocumentInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(validation::require("title", &self.title));
        if !self.content.is_object() {
            errors.push("content", "content must be a JSON object");
        }
        errors.into_result()
    }

    pub fn into_document(self, doc_type: &str) -> ContentDocument {
        ContentDocument {
            doc_type: doc_type.to_string(),
            title: self.title,
            description: self.description,
            content: self.content,
            updated_at: Utc::now(),
        }
    }
}

/// Document types are lowercase identifiers such as `about` or `odoo-page`.
pub fn is_valid_doc_type(doc_type: &str) -> bool {
    !doc_type.is_empty()
        && doc_type.len() <= 64
        && doc_type
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_requires_title_and_object_content() {
        let input = ContentDocumentInput {
            title: " ".into(),
            description: String::new(),
            content: json!([1, 2]),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.keys(), vec!["title", "content"]);

        let input = ContentDocumentInput {
            title: "À propos".into(),
            description: "Qui sommes-nous".into(),
            content: json!({ "sections": [] }),
        };
        assert!(input.validate().is_ok());
        let doc = input.into_document("about");
        assert_eq!(doc.doc_type, "about");
    }

    #[test]
    fn document_serializes_type_key() {
        let doc = ContentDocumentInput {
            title: "Odoo".into(),
            content: json!({}),
            ..Default::default()
        }
        .into_document("odoo");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "odoo");
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn doc_type_shape() {
        assert!(is_valid_doc_type("about"));
        assert!(is_valid_doc_type("odoo-page"));
        assert!(!is_valid_doc_type(""));
        assert!(!is_valid_doc_type("About"));
        assert!(!is_valid_doc_type("a/b"));
    }
}
