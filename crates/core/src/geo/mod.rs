pub mod countries;
pub mod phone;

pub use countries::{lookup, resolve, Country, DigitRule, COUNTRIES, DEFAULT_COUNTRY_CODE};
pub use phone::{format_phone, normalize_digits};
