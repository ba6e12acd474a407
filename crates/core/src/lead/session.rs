//! Server-side contact form progress, keyed by a client-chosen session id.
//!
//! Each session moves through `empty → partially-filled → partial-lead-sent`
//! and ends either `completed` (the visitor submitted) or abandoned: the
//! escalation timer fired first, the snapshot went to the CRM and the session
//! was removed. Sessions that never reach a usable contact are dropped once
//! they sit idle for the escalation delay. All transitions happen under one
//! lock, so concurrent writers from several tabs merge instead of clobbering
//! each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use super::crm::{CrmPartialLead, CrmSink};
use super::model::{BehaviorMetrics, LeadFields, LeadFieldsPatch, PartialLead};
use super::validate::validate_phone;
use crate::events::{EventBus, SiteEvent};
use crate::geo;

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Empty,
    PartiallyFilled,
    PartialLeadSent,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session id must be 1 to 128 characters of letters, digits, '-' or '_'")]
    InvalidId,
    #[error("unknown country code: {0}")]
    UnknownCountry(String),
}

/// One write from the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUpdate {
    pub fields: LeadFieldsPatch,
    pub behavior: Option<BehaviorMetrics>,
    pub source: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub fields: LeadFields,
    pub behavior: BehaviorMetrics,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub escalation_armed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Result of [`LeadSessions::apply`]. `flush` carries the partial lead the
/// caller should persist, present only when a usable contact changed.
#[derive(Debug, Clone)]
pub struct SessionTransition {
    pub snapshot: SessionSnapshot,
    pub flush: Option<PartialLead>,
    pub timer_armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    Missing,
    AlreadyCompleted,
    Sent,
    Failed,
}

struct SessionEntry {
    fields: LeadFields,
    behavior: BehaviorMetrics,
    source: Option<String>,
    medium: Option<String>,
    /// Email/phone pair last handed out as a partial lead.
    flushed_contact: Option<String>,
    partial_sent: bool,
    completed: bool,
    timer: Option<AbortHandle>,
    /// Expiry for sessions without an armed escalation.
    idle: Option<AbortHandle>,
    touched_at: Instant,
    updated_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            fields: LeadFields::default(),
            behavior: BehaviorMetrics::default(),
            source: None,
            medium: None,
            flushed_contact: None,
            partial_sent: false,
            completed: false,
            timer: None,
            idle: None,
            touched_at: Instant::now(),
            updated_at: Utc::now(),
        }
    }

    fn state(&self) -> SessionState {
        if self.completed {
            SessionState::Completed
        } else if self.partial_sent {
            SessionState::PartialLeadSent
        } else if self.fields.is_empty() {
            SessionState::Empty
        } else {
            SessionState::PartiallyFilled
        }
    }

    fn snapshot(&self, session_id: &str) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session_id.to_string(),
            state: self.state(),
            fields: self.fields.clone(),
            behavior: self.behavior.clone(),
            source: self.source.clone(),
            medium: self.medium.clone(),
            escalation_armed: self.timer.is_some(),
            updated_at: self.updated_at,
        }
    }

    fn partial_lead(&self, session_id: &str) -> PartialLead {
        PartialLead {
            fields: self.fields.clone(),
            session_id: Some(session_id.to_string()),
            behavior: self.behavior.clone(),
            source: self.source.clone(),
            medium: self.medium.clone(),
        }
    }

    /// Identity of the usable contact, if the email or the phone is valid.
    fn contact_signature(&self) -> Option<String> {
        let email = self
            .fields
            .has_valid_email()
            .then(|| self.fields.email.trim().to_lowercase());
        let phone = if self.fields.phone.trim().is_empty() {
            None
        } else {
            validate_phone(self.fields.country(), &self.fields.phone).ok()
        };
        if email.is_none() && phone.is_none() {
            return None;
        }
        Some(format!(
            "{}|{}{}",
            email.unwrap_or_default(),
            self.fields.country().dial_code,
            phone.unwrap_or_default()
        ))
    }

    fn touch(&mut self) {
        self.touched_at = Instant::now();
        self.updated_at = Utc::now();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn cancel_idle(&mut self) {
        if let Some(idle) = self.idle.take() {
            idle.abort();
        }
    }

    fn cancel_all(&mut self) {
        self.cancel_timer();
        self.cancel_idle();
    }
}

fn check_id(session_id: &str) -> Result<(), SessionError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidId)
    }
}

/// Store of in-progress contact forms with their escalation timers.
#[derive(Clone)]
pub struct LeadSessions {
    inner: Arc<Inner>,
}

struct Inner {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    crm: Arc<dyn CrmSink>,
    events: EventBus,
    escalation_delay: Duration,
}

impl LeadSessions {
    pub fn new(crm: Arc<dyn CrmSink>, events: EventBus, escalation_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: Mutex::new(HashMap::new()),
                crm,
                events,
                escalation_delay,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionSnapshot> {
        let sessions = self.inner.sessions.lock().await;
        sessions.get(session_id).map(|entry| entry.snapshot(session_id))
    }

    /// Merge a form write into the session.
    ///
    /// Fields are last-write-wins; behavior counters keep their maximum. A
    /// session found already completed starts over. The first time a valid
    /// email or phone appears the escalation timer is armed; until then the
    /// session only carries an idle expiry.
    pub async fn apply(
        &self,
        session_id: &str,
        update: SessionUpdate,
    ) -> Result<SessionTransition, SessionError> {
        check_id(session_id)?;
        if let Some(code) = update.fields.country_code.as_deref() {
            if !code.is_empty() && geo::lookup(code).is_none() {
                return Err(SessionError::UnknownCountry(code.to_string()));
            }
        }

        let mut sessions = self.inner.sessions.lock().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);

        if entry.completed {
            tracing::debug!(session_id, "restarting previously completed session");
            entry.cancel_all();
            *entry = SessionEntry::new();
        }

        if let Some(code) = update.fields.country_code.as_deref() {
            let switched = !entry.fields.country_code.is_empty()
                && !entry.fields.country_code.eq_ignore_ascii_case(code);
            if switched && update.fields.phone.is_none() {
                entry.fields.phone.clear();
            }
        }
        update.fields.apply_to(&mut entry.fields);
        if let Some(behavior) = &update.behavior {
            entry.behavior.merge_max(behavior);
        }
        if update.source.is_some() {
            entry.source = update.source;
        }
        if update.medium.is_some() {
            entry.medium = update.medium;
        }
        entry.touch();

        let mut flush = None;
        let mut timer_armed = false;
        if let Some(signature) = entry.contact_signature() {
            if entry.flushed_contact.as_deref() != Some(signature.as_str()) {
                entry.flushed_contact = Some(signature);
                entry.partial_sent = true;
                flush = Some(entry.partial_lead(session_id));
                if entry.timer.is_none() {
                    entry.cancel_idle();
                    entry.timer = Some(self.arm_timer(session_id));
                    timer_armed = true;
                    tracing::debug!(
                        session_id,
                        delay_secs = self.inner.escalation_delay.as_secs(),
                        "armed partial lead escalation"
                    );
                }
            }
        }
        if entry.timer.is_none() && entry.idle.is_none() {
            entry.idle = Some(self.arm_idle(session_id, self.inner.escalation_delay));
        }

        Ok(SessionTransition {
            snapshot: entry.snapshot(session_id),
            flush,
            timer_armed,
        })
    }

    /// Switch the dial-code country. The phone is cleared since its digit
    /// count was checked against the previous country.
    pub async fn change_country(
        &self,
        session_id: &str,
        country_code: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        check_id(session_id)?;
        let country = geo::lookup(country_code)
            .ok_or_else(|| SessionError::UnknownCountry(country_code.to_string()))?;

        let mut sessions = self.inner.sessions.lock().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);
        if entry.completed {
            entry.cancel_all();
            *entry = SessionEntry::new();
        }
        entry.fields.country_code = country.code.to_string();
        entry.fields.phone.clear();
        entry.touch();
        if entry.timer.is_none() && entry.idle.is_none() {
            entry.idle = Some(self.arm_idle(session_id, self.inner.escalation_delay));
        }
        Ok(entry.snapshot(session_id))
    }

    /// Mark the session completed and cancel its escalation. The session
    /// then expires like any idle one.
    pub async fn complete(&self, session_id: &str) -> Option<SessionSnapshot> {
        let mut sessions = self.inner.sessions.lock().await;
        let entry = sessions.get_mut(session_id)?;
        entry.completed = true;
        entry.cancel_timer();
        entry.touch();
        if entry.idle.is_none() {
            entry.idle = Some(self.arm_idle(session_id, self.inner.escalation_delay));
        }
        Some(entry.snapshot(session_id))
    }

    /// Drop the session without escalating it.
    pub async fn discard(&self, session_id: &str) -> bool {
        let mut sessions = self.inner.sessions.lock().await;
        match sessions.remove(session_id) {
            Some(mut entry) => {
                entry.cancel_all();
                true
            }
            None => false,
        }
    }

    /// Timer expiry: push the snapshot to the CRM unless the visitor
    /// completed the form in the meantime. The session is removed either way.
    pub async fn escalate(&self, session_id: &str) -> EscalationOutcome {
        let lead = {
            let mut sessions = self.inner.sessions.lock().await;
            match sessions.get(session_id) {
                None => return EscalationOutcome::Missing,
                Some(entry) if entry.completed => {
                    tracing::debug!(session_id, "session completed before escalation");
                    return EscalationOutcome::AlreadyCompleted;
                }
                Some(_) => {}
            }
            match sessions.remove(session_id) {
                Some(mut entry) => {
                    entry.cancel_idle();
                    entry.partial_lead(session_id)
                }
                None => return EscalationOutcome::Missing,
            }
        };

        let key = lead.fields.contact_key().unwrap_or_default();
        let payload = CrmPartialLead::new(lead, None);
        match self.inner.crm.push_partial_lead(&payload).await {
            Ok(()) => {
                tracing::info!(session_id, bucket = ?payload.bucket, "escalated abandoned lead");
                self.inner.events.emit(SiteEvent::LeadEscalated(SiteEvent::lead(
                    key,
                    Some(session_id.to_string()),
                )));
                EscalationOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "failed to escalate abandoned lead");
                EscalationOutcome::Failed
            }
        }
    }

    /// Idle expiry: drop a session that has no armed escalation and saw no
    /// write for the whole delay. Recent activity pushes the expiry back.
    async fn expire_idle(&self, session_id: &str) {
        let delay = self.inner.escalation_delay;
        let mut sessions = self.inner.sessions.lock().await;
        let Some(entry) = sessions.get_mut(session_id) else {
            return;
        };
        if entry.timer.is_some() {
            entry.idle = None;
            return;
        }
        let idle_for = entry.touched_at.elapsed();
        if idle_for < delay {
            entry.idle = Some(self.arm_idle(session_id, delay - idle_for));
            return;
        }
        sessions.remove(session_id);
        tracing::debug!(session_id, "dropped idle session without contact");
    }

    fn arm_idle(&self, session_id: &str, after: Duration) -> AbortHandle {
        let sessions = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            sessions.expire_idle(&session_id).await;
        })
        .abort_handle()
    }

    fn arm_timer(&self, session_id: &str) -> AbortHandle {
        let sessions = self.clone();
        let session_id = session_id.to_string();
        let delay = self.inner.escalation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sessions.escalate(&session_id).await;
        })
        .abort_handle()
    }
}
