//! Persistence for CMS content and leads.
//!
//! Two backends implement [`SiteStore`]: an in-memory map for development and
//! tests, and PostgreSQL where each record is a JSONB document next to the
//! columns used for lookups and uniqueness.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::content::{ClientCase, ContentDocument};
use crate::lead::{LeadRecord, PartialLead, PartialLeadRecord};
use crate::seo::{SeoEntry, SeoFilter};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    Duplicate(String),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Entries matching the filter, sorted by page.
    async fn list_seo(&self, filter: &SeoFilter) -> Result<Vec<SeoEntry>, StoreError>;
    async fn get_seo(&self, id: Uuid) -> Result<SeoEntry, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the (page, language) pair is
    /// already taken.
    async fn insert_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError>;
    async fn update_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError>;
    async fn delete_seo(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_content(&self, doc_type: &str) -> Result<ContentDocument, StoreError>;
    /// Create or wholesale replace the document of `doc.doc_type`.
    async fn put_content(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError>;

    /// Newest first.
    async fn list_cases(&self, include_unpublished: bool) -> Result<Vec<ClientCase>, StoreError>;
    async fn get_case(&self, slug: &str) -> Result<ClientCase, StoreError>;
    async fn insert_case(&self, case: ClientCase) -> Result<ClientCase, StoreError>;
    /// Replace the case stored under `slug`; `case.slug` may rename it.
    async fn replace_case(&self, slug: &str, case: ClientCase) -> Result<ClientCase, StoreError>;
    async fn delete_case(&self, slug: &str) -> Result<(), StoreError>;

    async fn insert_lead(&self, lead: LeadRecord) -> Result<LeadRecord, StoreError>;
    /// Newest first.
    async fn list_leads(&self) -> Result<Vec<LeadRecord>, StoreError>;
    /// Insert or merge into the partial lead sharing the same contact key. A
    /// record stored earlier under the lead's phone alone is folded into the
    /// email-keyed one.
    async fn upsert_partial_lead(&self, lead: PartialLead) -> Result<PartialLeadRecord, StoreError>;
    /// Most recently updated first.
    async fn list_partial_leads(&self) -> Result<Vec<PartialLeadRecord>, StoreError>;
}

fn keep_or_replace(current: &mut String, incoming: String) {
    if !incoming.trim().is_empty() {
        *current = incoming;
    }
}

/// Merge a fresh partial lead into the stored one with the same key.
/// Non-blank incoming fields win; behavior counters keep their maximum.
pub(crate) fn merge_partial(
    existing: Option<PartialLeadRecord>,
    key: String,
    lead: PartialLead,
) -> PartialLeadRecord {
    let now = Utc::now();
    match existing {
        None => PartialLeadRecord {
            id: Uuid::now_v7(),
            key,
            lead,
            created_at: now,
            updated_at: now,
        },
        Some(mut record) => {
            let stored = &mut record.lead;
            let fields = lead.fields;
            keep_or_replace(&mut stored.fields.first_name, fields.first_name);
            keep_or_replace(&mut stored.fields.last_name, fields.last_name);
            keep_or_replace(&mut stored.fields.email, fields.email);
            keep_or_replace(&mut stored.fields.phone, fields.phone);
            keep_or_replace(&mut stored.fields.country_code, fields.country_code);
            keep_or_replace(&mut stored.fields.company, fields.company);
            keep_or_replace(&mut stored.fields.message, fields.message);
            stored.behavior.merge_max(&lead.behavior);
            if lead.session_id.is_some() {
                stored.session_id = lead.session_id;
            }
            if lead.source.is_some() {
                stored.source = lead.source;
            }
            if lead.medium.is_some() {
                stored.medium = lead.medium;
            }
            record.key = key;
            record.updated_at = now;
            record
        }
    }
}

pub(crate) fn partial_key(lead: &PartialLead) -> Result<String, StoreError> {
    lead.fields
        .contact_key()
        .ok_or_else(|| StoreError::Invalid("partial lead needs a valid email or phone".into()))
}

/// Key of a phone-only record superseded by `key`, if the lead carries both.
/// When no record exists under `key` the superseded one moves there.
pub(crate) fn superseded_key(lead: &PartialLead, key: &str) -> Option<String> {
    lead.fields.phone_key().filter(|phone| phone != key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{BehaviorMetrics, LeadFields};

    #[test]
    fn merge_keeps_known_fields_and_max_behavior() {
        let first = PartialLead {
            fields: LeadFields {
                first_name: "Rania".into(),
                email: "rania@example.com".into(),
                company: "Orbit".into(),
                ..Default::default()
            },
            behavior: BehaviorMetrics {
                scroll_depth: 70,
                ..Default::default()
            },
            ..Default::default()
        };
        let record = merge_partial(None, "rania@example.com".into(), first);
        let created = record.created_at;

        let second = PartialLead {
            fields: LeadFields {
                email: "rania@example.com".into(),
                message: "Besoin d'un devis".into(),
                ..Default::default()
            },
            behavior: BehaviorMetrics {
                scroll_depth: 20,
                call_clicks: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = merge_partial(Some(record), "rania@example.com".into(), second);

        assert_eq!(merged.lead.fields.first_name, "Rania");
        assert_eq!(merged.lead.fields.company, "Orbit");
        assert_eq!(merged.lead.fields.message, "Besoin d'un devis");
        assert_eq!(merged.lead.behavior.scroll_depth, 70);
        assert_eq!(merged.lead.behavior.call_clicks, 1);
        assert_eq!(merged.created_at, created);
    }

    #[test]
    fn partial_key_requires_contact() {
        assert!(matches!(
            partial_key(&PartialLead::default()),
            Err(StoreError::Invalid(_))
        ));
    }
}
