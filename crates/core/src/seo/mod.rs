pub mod model;

pub use model::{NewSeoEntry, SeoEntry, SeoFilter, SeoPatch, DEFAULT_LANGUAGE};
