//! Outbound CRM clients for abandoned leads.

use std::sync::Arc;
use std::time::Duration;

use agency_site_core::lead::{CrmError, CrmPartialLead, CrmSink};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::AppConfig;

/// Posts partial leads as JSON to a CRM webhook.
#[derive(Debug, Clone)]
pub struct HttpCrm {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpCrm {
    pub fn new(endpoint: String, token: Option<String>) -> Result<Self, CrmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CrmError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

#[async_trait]
impl CrmSink for HttpCrm {
    async fn push_partial_lead(&self, lead: &CrmPartialLead) -> Result<(), CrmError> {
        let mut request = self.client.post(&self.endpoint).json(lead);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CrmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), "crm accepted partial lead");
        Ok(())
    }
}

/// Stand-in used when no CRM endpoint is configured. Only the score is
/// logged; contact details stay out of the logs.
#[derive(Debug, Clone, Default)]
pub struct LogOnlyCrm;

#[async_trait]
impl CrmSink for LogOnlyCrm {
    async fn push_partial_lead(&self, lead: &CrmPartialLead) -> Result<(), CrmError> {
        tracing::info!(
            session_id = lead.session_id.as_deref().unwrap_or("-"),
            score = lead.score,
            bucket = ?lead.bucket,
            "no CRM endpoint configured, partial lead logged only"
        );
        Ok(())
    }
}

pub fn crm_from_config(config: &AppConfig) -> Result<Arc<dyn CrmSink>, CrmError> {
    match &config.crm_endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "forwarding abandoned leads to CRM");
            Ok(Arc::new(HttpCrm::new(
                endpoint.clone(),
                config.crm_token.clone(),
            )?))
        }
        None => Ok(Arc::new(LogOnlyCrm)),
    }
}
