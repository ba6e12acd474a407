use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted after content edits and lead activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SiteEvent {
    ContentUpdated(ContentUpdatedEvent),
    LeadCaptured(LeadEvent),
    PartialLeadStored(LeadEvent),
    LeadEscalated(LeadEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Seo,
    Document,
    ClientCase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentUpdatedEvent {
    pub kind: ContentKind,
    /// SEO entry id, document type or client case slug.
    pub key: String,
    pub deleted: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadEvent {
    pub key: String,
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SiteEvent {
    pub fn content(kind: ContentKind, key: impl Into<String>, deleted: bool) -> Self {
        SiteEvent::ContentUpdated(ContentUpdatedEvent {
            kind,
            key: key.into(),
            deleted,
            timestamp: Utc::now(),
        })
    }

    pub fn lead(key: impl Into<String>, session_id: Option<String>) -> LeadEvent {
        LeadEvent {
            key: key.into(),
            session_id,
            timestamp: Utc::now(),
        }
    }
}
