//! Behavioral lead scoring.
//!
//! Advisory only: the score picks a bucket that goes into the note sent to
//! the CRM. The one contract is that the score never decreases when any
//! input grows.

use serde::{Deserialize, Serialize};

use super::model::BehaviorMetrics;

const INTERACTION_CAP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreBucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ScoreBucket {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=3 => ScoreBucket::Low,
            4..=7 => ScoreBucket::Medium,
            8..=11 => ScoreBucket::High,
            _ => ScoreBucket::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBucket::Low => "faible",
            ScoreBucket::Medium => "moyen",
            ScoreBucket::High => "élevé",
            ScoreBucket::VeryHigh => "très élevé",
        }
    }
}

fn time_points(secs: u64) -> u32 {
    match secs {
        0..=29 => 0,
        30..=119 => 1,
        120..=299 => 2,
        _ => 3,
    }
}

fn scroll_points(depth: u8) -> u32 {
    match depth {
        0..=24 => 0,
        25..=49 => 1,
        50..=74 => 2,
        _ => 3,
    }
}

pub fn behavior_score(metrics: &BehaviorMetrics) -> u32 {
    let clicks = metrics
        .call_clicks
        .saturating_add(metrics.whatsapp_clicks)
        .saturating_mul(3);
    let interactions = metrics.form_interactions.min(INTERACTION_CAP) / 2;
    let pages = (metrics.pages_visited.len() as u32).min(5);

    time_points(metrics.time_on_page_secs)
        .saturating_add(scroll_points(metrics.scroll_depth))
        .saturating_add(clicks)
        .saturating_add(interactions)
        .saturating_add(pages)
}

fn format_duration(secs: u64) -> String {
    match (secs / 60, secs % 60) {
        (0, s) => format!("{s} s"),
        (m, 0) => format!("{m} min"),
        (m, s) => format!("{m} min {s} s"),
    }
}

/// Human-readable note summarizing the visit, attached to CRM leads.
pub fn describe_behavior(metrics: &BehaviorMetrics) -> String {
    let score = behavior_score(metrics);
    let bucket = ScoreBucket::from_score(score);

    let mut parts = vec![
        format!(
            "Temps passé sur la page : {}",
            format_duration(metrics.time_on_page_secs)
        ),
        format!("défilement maximal : {} %", metrics.scroll_depth.min(100)),
    ];
    if metrics.call_clicks > 0 {
        parts.push(format!("clics sur « Appeler » : {}", metrics.call_clicks));
    }
    if metrics.whatsapp_clicks > 0 {
        parts.push(format!("clics sur WhatsApp : {}", metrics.whatsapp_clicks));
    }
    if metrics.form_interactions > 0 {
        parts.push(format!(
            "interactions avec le formulaire : {}",
            metrics.form_interactions
        ));
    }
    if !metrics.pages_visited.is_empty() {
        parts.push(format!(
            "pages visitées : {}",
            metrics.pages_visited.join(", ")
        ));
    }

    format!(
        "{}. Niveau d'intérêt : {} (score {score}).",
        parts.join(", "),
        bucket.label()
    )
}
