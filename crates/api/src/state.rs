use std::sync::Arc;

use agency_site_core::auth::TokenIssuer;
use agency_site_core::events::EventBus;
use agency_site_core::lead::{CrmSink, LeadSessions};
use agency_site_core::store::SiteStore;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn SiteStore>,
    config: AppConfig,
    event_bus: EventBus,
    crm: Arc<dyn CrmSink>,
    sessions: LeadSessions,
    tokens: TokenIssuer,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SiteStore>,
        config: AppConfig,
        event_bus: EventBus,
        crm: Arc<dyn CrmSink>,
    ) -> Self {
        let sessions = LeadSessions::new(
            crm.clone(),
            event_bus.clone(),
            config.partial_lead_delay(),
        );
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_secs);
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                event_bus,
                crm,
                sessions,
                tokens,
            }),
        }
    }

    pub fn store(&self) -> &dyn SiteStore {
        self.inner.store.as_ref()
    }

    pub fn store_handle(&self) -> Arc<dyn SiteStore> {
        self.inner.store.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn crm(&self) -> &dyn CrmSink {
        self.inner.crm.as_ref()
    }

    pub fn sessions(&self) -> &LeadSessions {
        &self.inner.sessions
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
