pub mod auth;
pub mod content;
pub mod events;
pub mod geo;
pub mod lead;
pub mod seo;
pub mod store;
pub mod validation;
