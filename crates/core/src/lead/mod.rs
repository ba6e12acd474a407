pub mod crm;
pub mod model;
pub mod scoring;
pub mod session;
pub mod validate;

pub use crm::{CrmError, CrmPartialLead, CrmSink};
pub use model::{
    BehaviorMetrics, LeadFields, LeadFieldsPatch, LeadRecord, LeadSubmission, PartialLead,
    PartialLeadRecord,
};
pub use scoring::{behavior_score, describe_behavior, ScoreBucket};
pub use session::{
    EscalationOutcome, LeadSessions, SessionError, SessionSnapshot, SessionState,
    SessionTransition, SessionUpdate,
};
pub use validate::{is_form_valid, validate_email, validate_name, validate_phone, validate_submission};
