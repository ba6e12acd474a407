//! In-memory store for development and tests. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{merge_partial, partial_key, superseded_key, SiteStore, StoreError};
use crate::content::{ClientCase, ContentDocument};
use crate::lead::{LeadRecord, PartialLead, PartialLeadRecord};
use crate::seo::{SeoEntry, SeoFilter};

#[derive(Default)]
struct MemoryState {
    seo: BTreeMap<Uuid, SeoEntry>,
    content: HashMap<String, ContentDocument>,
    cases: BTreeMap<String, ClientCase>,
    leads: Vec<LeadRecord>,
    partial_leads: HashMap<String, PartialLeadRecord>,
}

/// Uniqueness checks and writes happen under the same write lock, so two
/// concurrent inserts of one (page, language) pair cannot both succeed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn seo_pair_taken(state: &MemoryState, entry: &SeoEntry) -> bool {
    state
        .seo
        .values()
        .any(|e| e.id != entry.id && e.page == entry.page && e.language == entry.language)
}

#[async_trait]
impl SiteStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_seo(&self, filter: &SeoFilter) -> Result<Vec<SeoEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<SeoEntry> = state
            .seo
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.page.cmp(&b.page));
        Ok(entries)
    }

    async fn get_seo(&self, id: Uuid) -> Result<SeoEntry, StoreError> {
        let state = self.state.read().await;
        state
            .seo
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("seo entry {id}")))
    }

    async fn insert_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError> {
        let mut state = self.state.write().await;
        if seo_pair_taken(&state, &entry) {
            return Err(StoreError::Duplicate(format!(
                "seo entry for page '{}' and language '{}'",
                entry.page, entry.language
            )));
        }
        state.seo.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_seo(&self, entry: SeoEntry) -> Result<SeoEntry, StoreError> {
        let mut state = self.state.write().await;
        if !state.seo.contains_key(&entry.id) {
            return Err(StoreError::NotFound(format!("seo entry {}", entry.id)));
        }
        if seo_pair_taken(&state, &entry) {
            return Err(StoreError::Duplicate(format!(
                "seo entry for page '{}' and language '{}'",
                entry.page, entry.language
            )));
        }
        state.seo.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn delete_seo(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .seo
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("seo entry {id}")))
    }

    async fn get_content(&self, doc_type: &str) -> Result<ContentDocument, StoreError> {
        let state = self.state.read().await;
        state
            .content
            .get(doc_type)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("content '{doc_type}'")))
    }

    async fn put_content(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError> {
        let mut state = self.state.write().await;
        state.content.insert(doc.doc_type.clone(), doc.clone());
        Ok(doc)
    }

    async fn list_cases(&self, include_unpublished: bool) -> Result<Vec<ClientCase>, StoreError> {
        let state = self.state.read().await;
        let mut cases: Vec<ClientCase> = state
            .cases
            .values()
            .filter(|c| include_unpublished || c.published)
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    async fn get_case(&self, slug: &str) -> Result<ClientCase, StoreError> {
        let state = self.state.read().await;
        state
            .cases
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("client case '{slug}'")))
    }

    async fn insert_case(&self, case: ClientCase) -> Result<ClientCase, StoreError> {
        let mut state = self.state.write().await;
        if state.cases.contains_key(&case.slug) {
            return Err(StoreError::Duplicate(format!("client case '{}'", case.slug)));
        }
        state.cases.insert(case.slug.clone(), case.clone());
        Ok(case)
    }

    async fn replace_case(&self, slug: &str, case: ClientCase) -> Result<ClientCase, StoreError> {
        let mut state = self.state.write().await;
        if !state.cases.contains_key(slug) {
            return Err(StoreError::NotFound(format!("client case '{slug}'")));
        }
        if case.slug != slug && state.cases.contains_key(&case.slug) {
            return Err(StoreError::Duplicate(format!("client case '{}'", case.slug)));
        }
        state.cases.remove(slug);
        state.cases.insert(case.slug.clone(), case.clone());
        Ok(case)
    }

    async fn delete_case(&self, slug: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .cases
            .remove(slug)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("client case '{slug}'")))
    }

    async fn insert_lead(&self, lead: LeadRecord) -> Result<LeadRecord, StoreError> {
        let mut state = self.state.write().await;
        state.leads.push(lead.clone());
        Ok(lead)
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state.leads.iter().rev().cloned().collect())
    }

    async fn upsert_partial_lead(&self, lead: PartialLead) -> Result<PartialLeadRecord, StoreError> {
        let key = partial_key(&lead)?;
        let mut state = self.state.write().await;
        let superseded = superseded_key(&lead, &key).and_then(|k| state.partial_leads.remove(&k));
        let existing = state.partial_leads.remove(&key).or(superseded);
        let record = merge_partial(existing, key.clone(), lead);
        state.partial_leads.insert(key, record.clone());
        Ok(record)
    }

    async fn list_partial_leads(&self) -> Result<Vec<PartialLeadRecord>, StoreError> {
        let state = self.state.read().await;
        let mut records: Vec<PartialLeadRecord> = state.partial_leads.values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}
