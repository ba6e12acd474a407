use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blocks::{sort_blocks, ContentBlock};
use crate::validation::{self, FieldErrors};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseMedia {
    pub hero_image: Option<String>,
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseSidebar {
    pub challenge: Option<String>,
    pub solution: Option<String>,
    /// Odoo modules deployed for the client.
    pub modules: Vec<String>,
    pub duration: Option<String>,
    pub results: Vec<String>,
}

/// Per-case overrides of the page SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCase {
    pub slug: String,
    pub name: String,
    pub headline: String,
    pub company: CompanyInfo,
    pub media: CaseMedia,
    pub blocks: Vec<ContentBlock>,
    pub sidebar: CaseSidebar,
    pub seo: SeoOverrides,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_published() -> bool {
    true
}

/// Body of `POST /api/clients` and `PUT /api/clients/{slug}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientCase {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub company: CompanyInfo,
    #[serde(default)]
    pub media: CaseMedia,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub sidebar: CaseSidebar,
    #[serde(default)]
    pub seo: SeoOverrides,
    #[serde(default = "default_published")]
    pub published: bool,
}

/// Lowercase ASCII words joined by single hyphens, e.g. `atlas-distribution`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 96
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

impl NewClientCase {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !is_valid_slug(&self.slug) {
            errors.push(
                "slug",
                "slug must be lowercase letters and digits separated by single hyphens",
            );
        }
        errors.check(validation::require("name", &self.name));
        errors.check(validation::require("headline", &self.headline));
        errors.check(validation::require("company.name", &self.company.name));
        errors.into_result()
    }

    /// Build the stored case. Blocks are kept in display order.
    pub fn into_case(self, created_at: Option<DateTime<Utc>>) -> ClientCase {
        let now = Utc::now();
        let mut blocks = self.blocks;
        sort_blocks(&mut blocks);
        ClientCase {
            slug: self.slug,
            name: self.name.trim().to_string(),
            headline: self.headline.trim().to_string(),
            company: self.company,
            media: self.media,
            blocks,
            sidebar: self.sidebar,
            seo: self.seo,
            published: self.published,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}
