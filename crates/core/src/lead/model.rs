use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scoring::ScoreBucket;
use super::validate;
use crate::geo::{self, Country};

/// Contact form fields as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// ISO-3166 alpha-2 code of the selected dial code.
    pub country_code: String,
    pub company: String,
    pub message: String,
}

impl LeadFields {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Selected country, Morocco when unset or unknown.
    pub fn country(&self) -> &'static Country {
        geo::resolve(Some(self.country_code.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.company,
            &self.message,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }

    pub fn has_valid_email(&self) -> bool {
        validate::validate_email(&self.email).is_ok()
    }

    pub fn has_valid_phone(&self) -> bool {
        !self.phone.trim().is_empty()
            && validate::validate_phone(self.country(), &self.phone).is_ok()
    }

    /// Dedupe key for partial leads: lowercase email when valid, otherwise
    /// the phone in international digits.
    pub fn contact_key(&self) -> Option<String> {
        if self.has_valid_email() {
            return Some(self.email.trim().to_lowercase());
        }
        self.phone_key()
    }

    /// The phone in international digits, when it is valid for the country.
    pub fn phone_key(&self) -> Option<String> {
        let country = self.country();
        validate::validate_phone(country, &self.phone)
            .ok()
            .map(|digits| format!("{}{}", country.dial_code, digits))
    }
}

/// Field-wise update sent while the visitor types. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadFieldsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country_code: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl LeadFieldsPatch {
    pub fn apply_to(&self, fields: &mut LeadFields) {
        let pairs = [
            (&self.first_name, &mut fields.first_name),
            (&self.last_name, &mut fields.last_name),
            (&self.email, &mut fields.email),
            (&self.phone, &mut fields.phone),
            (&self.country_code, &mut fields.country_code),
            (&self.company, &mut fields.company),
            (&self.message, &mut fields.message),
        ];
        for (patch, field) in pairs {
            if let Some(value) = patch {
                *field = value.clone();
            }
        }
    }
}

/// Visitor behavior gathered on the page, used for lead prioritization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorMetrics {
    pub time_on_page_secs: u64,
    /// Deepest scroll position reached, in percent of the page.
    pub scroll_depth: u8,
    pub call_clicks: u32,
    pub whatsapp_clicks: u32,
    pub form_interactions: u32,
    pub pages_visited: Vec<String>,
}

impl BehaviorMetrics {
    /// Merge another snapshot of the same visit: counters keep the highest
    /// value seen and visited pages are unioned in first-seen order.
    pub fn merge_max(&mut self, other: &BehaviorMetrics) {
        self.time_on_page_secs = self.time_on_page_secs.max(other.time_on_page_secs);
        self.scroll_depth = self.scroll_depth.max(other.scroll_depth).min(100);
        self.call_clicks = self.call_clicks.max(other.call_clicks);
        self.whatsapp_clicks = self.whatsapp_clicks.max(other.whatsapp_clicks);
        self.form_interactions = self.form_interactions.max(other.form_interactions);
        for page in &other.pages_visited {
            if !self.pages_visited.contains(page) {
                self.pages_visited.push(page.clone());
            }
        }
    }
}

/// Full contact-form submission (`POST /api/contact`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(flatten)]
    pub fields: LeadFields,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub behavior: BehaviorMetrics,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
}

/// A stored, completed lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: LeadFields,
    pub behavior: BehaviorMetrics,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub score: u32,
    pub bucket: ScoreBucket,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Whatever the visitor has entered so far, once an email or phone is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLead {
    #[serde(flatten)]
    pub fields: LeadFields,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub behavior: BehaviorMetrics,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLeadRecord {
    pub id: Uuid,
    pub key: String,
    #[serde(flatten)]
    pub lead: PartialLead,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
