pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::SiteEvent;
