use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{self, FieldErrors};

pub const DEFAULT_LANGUAGE: &str = "fr";

const TITLE_MAX_CHARS: usize = 70;
const DESCRIPTION_MAX_CHARS: usize = 320;

/// SEO metadata of one page in one language. At most one entry exists per
/// (page, language) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoEntry {
    pub id: Uuid,
    pub page: String,
    pub language: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/seo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSeoEntry {
    pub page: String,
    pub language: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// Body of `PUT /api/seo/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoPatch {
    pub page: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoFilter {
    pub page: Option<String>,
    pub language: String,
}

impl SeoFilter {
    pub fn new(page: Option<String>, language: Option<String>) -> Self {
        Self {
            page: page.filter(|p| !p.is_empty()),
            language: language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        }
    }

    pub fn matches(&self, entry: &SeoEntry) -> bool {
        entry.language == self.language
            && self.page.as_ref().map_or(true, |page| &entry.page == page)
    }
}

fn is_language_code(language: &str) -> bool {
    language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase())
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim().to_string();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

fn validate_fields(page: &str, language: &str, title: &str, description: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(validation::require("page", page));
    if language.trim().is_empty() {
        errors.push("language", "language is required");
    } else if !is_language_code(language) {
        errors.push("language", "language must be a two-letter lowercase code");
    }
    errors.check(validation::require("title", title));
    errors.check(validation::max_chars("title", title, TITLE_MAX_CHARS));
    errors.check(validation::require("description", description));
    errors.check(validation::max_chars(
        "description",
        description,
        DESCRIPTION_MAX_CHARS,
    ));
    errors
}

impl NewSeoEntry {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.page, &self.language, &self.title, &self.description).into_result()
    }

    pub fn into_entry(self, updated_by: Option<String>) -> SeoEntry {
        let now = Utc::now();
        SeoEntry {
            id: Uuid::now_v7(),
            page: self.page.trim().to_string(),
            language: self.language,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            keywords: normalize_keywords(self.keywords),
            updated_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl SeoEntry {
    /// Apply a patch, returning the updated entry when it still validates.
    pub fn patched(&self, patch: SeoPatch, updated_by: Option<String>) -> Result<SeoEntry, FieldErrors> {
        let mut next = self.clone();
        if let Some(page) = patch.page {
            next.page = page.trim().to_string();
        }
        if let Some(language) = patch.language {
            next.language = language;
        }
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(keywords) = patch.keywords {
            next.keywords = normalize_keywords(keywords);
        }
        validate_fields(&next.page, &next.language, &next.title, &next.description)
            .into_result()?;
        next.updated_by = updated_by.or(next.updated_by);
        next.updated_at = Utc::now();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewSeoEntry {
        NewSeoEntry {
            page: "home".into(),
            language: "fr".into(),
            title: "Intégrateur Odoo au Maroc".into(),
            description: "Déploiement et accompagnement Odoo".into(),
            keywords: vec!["odoo".into(), " erp ".into(), "odoo".into(), "".into()],
        }
    }

    #[test]
    fn valid_entry_normalizes_keywords() {
        let input = input();
        assert!(input.validate().is_ok());
        let entry = input.into_entry(Some("admin@example.com".into()));
        assert_eq!(entry.keywords, vec!["odoo", "erp"]);
        assert_eq!(entry.updated_by.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn rejects_missing_and_oversized_fields() {
        let mut input = input();
        input.page = String::new();
        input.language = "FRA".into();
        input.title = "t".repeat(71);
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.keys(), vec!["page", "language", "title"]);
    }

    #[test]
    fn filter_defaults_to_french() {
        let filter = SeoFilter::new(None, None);
        assert_eq!(filter.language, "fr");
        assert_eq!(filter.page, None);

        let entry = input().into_entry(None);
        assert!(filter.matches(&entry));
        assert!(SeoFilter::new(Some("home".into()), Some("fr".into())).matches(&entry));
        assert!(!SeoFilter::new(Some("about".into()), None).matches(&entry));
        assert!(!SeoFilter::new(None, Some("en".into())).matches(&entry));
    }

    #[test]
    fn patch_revalidates() {
        let entry = input().into_entry(None);
        let patched = entry
            .patched(
                SeoPatch {
                    title: Some("Nouveau titre".into()),
                    ..Default::default()
                },
                Some("editor".into()),
            )
            .unwrap();
        assert_eq!(patched.title, "Nouveau titre");
        assert_eq!(patched.page, "home");
        assert_eq!(patched.updated_by.as_deref(), Some("editor"));

        let err = entry
            .patched(
                SeoPatch {
                    description: Some("  ".into()),
                    ..Default::default()
                },
                None,
            )
            .unwrap_err();
        assert!(err.contains("description"));
    }
}
