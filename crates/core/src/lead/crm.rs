//! Seam to the CRM that receives leads abandoned before submission.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{BehaviorMetrics, LeadFields, PartialLead};
use super::scoring::{behavior_score, describe_behavior, ScoreBucket};

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm request failed: {0}")]
    Transport(String),
    #[error("crm rejected lead with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Payload pushed to the CRM for an incomplete lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmPartialLead {
    #[serde(flatten)]
    pub fields: LeadFields,
    pub full_name: String,
    pub session_id: Option<String>,
    pub behavior: BehaviorMetrics,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub score: u32,
    pub bucket: ScoreBucket,
    pub description: String,
}

impl CrmPartialLead {
    /// Build the CRM payload, generating the behavior note unless the caller
    /// already supplied one.
    pub fn new(lead: PartialLead, description: Option<String>) -> Self {
        let score = behavior_score(&lead.behavior);
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| describe_behavior(&lead.behavior));
        Self {
            full_name: lead.fields.full_name(),
            fields: lead.fields,
            session_id: lead.session_id,
            behavior: lead.behavior,
            source: lead.source,
            medium: lead.medium,
            score,
            bucket: ScoreBucket::from_score(score),
            description,
        }
    }
}

#[async_trait]
pub trait CrmSink: Send + Sync {
    async fn push_partial_lead(&self, lead: &CrmPartialLead) -> Result<(), CrmError>;
}
