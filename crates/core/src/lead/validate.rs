//! Contact form validation.
//!
//! These rules mirror what visitors see in the form, so their messages are
//! in French. `is_form_valid` only gates the submit button (name + email);
//! `validate_submission` is the final guard and also checks an entered phone.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::LeadFields;
use crate::geo::{Country, DigitRule};
use crate::validation::{FieldError, FieldErrors};

const EMAIL_MAX_LEN: usize = 254;
const NAME_MIN_CHARS: usize = 2;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape regex"));

static EMAIL_LOCAL_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+$").expect("email local part regex"));

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::new("name", "Le nom est requis"));
    }
    if name.chars().count() < NAME_MIN_CHARS {
        return Err(FieldError::new(
            "name",
            "Le nom doit contenir au moins 2 caractères",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::new("email", "L'adresse email est requise"));
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err(FieldError::new("email", "L'adresse email est trop longue"));
    }
    if !EMAIL_SHAPE.is_match(email) || email.contains("..") {
        return Err(FieldError::new("email", "L'adresse email est invalide"));
    }
    let local = email.split('@').next().unwrap_or_default();
    if !EMAIL_LOCAL_PART.is_match(local) {
        return Err(FieldError::new(
            "email",
            "L'adresse email contient des caractères non autorisés",
        ));
    }
    Ok(())
}

/// Validate a phone for the selected country and return its national digits.
pub fn validate_phone(country: &Country, phone: &str) -> Result<String, FieldError> {
    if phone.trim().is_empty() {
        return Err(FieldError::new("phone", "Le numéro de téléphone est requis"));
    }
    let Some(digits) = crate::geo::normalize_digits(country, phone) else {
        return Err(FieldError::new(
            "phone",
            "Le numéro ne doit contenir que des chiffres",
        ));
    };
    let count = digits.len();
    if country.digits.accepts(count) {
        return Ok(digits);
    }

    let message = match country.digits {
        DigitRule::Exact { digits: expected } if count < expected => format!(
            "Le numéro doit contenir exactement {expected} chiffres après {} (manque {})",
            country.dial_code,
            expected - count
        ),
        DigitRule::Exact { digits: expected } => format!(
            "Le numéro doit contenir exactement {expected} chiffres après {} ({} en trop)",
            country.dial_code,
            count - expected
        ),
        DigitRule::Range { min, max } => {
            format!("Le numéro doit contenir entre {min} et {max} chiffres")
        }
    };
    Err(FieldError::new("phone", message))
}

/// Whether the submit action is enabled: name and email only.
pub fn is_form_valid(name: &str, email: &str) -> bool {
    validate_name(name).is_ok() && validate_email(email).is_ok()
}

/// Final guard before a lead is accepted. A phone is optional, but when one
/// was entered it must be valid for the selected country.
pub fn validate_submission(fields: &LeadFields) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.check(validate_name(&fields.full_name()));
    errors.check(validate_email(&fields.email));
    if !fields.phone.trim().is_empty() {
        errors.check(validate_phone(fields.country(), &fields.phone).map(|_| ()));
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{lookup, COUNTRIES};

    fn ma() -> &'static Country {
        lookup("MA").unwrap()
    }

    #[test]
    fn name_needs_two_trimmed_characters() {
        assert!(validate_name("").is_err());
        assert!(validate_name("  A  ").is_err());
        assert!(validate_name("Al").is_ok());
        assert!(validate_name(" Éa ").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.ma").is_ok());
        assert!(validate_email("a@@b.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("a..b@c.com").is_err());
        assert!(validate_email("a@b..com").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a#b@c.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn email_length_limit() {
        let local = "a".repeat(64);
        let domain = format!("{}.com", "b".repeat(185));
        let at_limit = format!("{local}@{domain}");
        assert_eq!(at_limit.len(), 254);
        assert!(validate_email(&at_limit).is_ok());

        let over = format!("a{at_limit}");
        assert!(validate_email(&over).is_err());
    }

    #[test]
    fn morocco_requires_exactly_nine_digits() {
        assert_eq!(
            validate_phone(ma(), "61 23 45 67 8").unwrap(),
            "612345678".to_string()
        );
        let err = validate_phone(ma(), "61 23 45 67").unwrap_err();
        assert_eq!(err.field, "phone");
        assert!(err.message.contains("manque 1"), "{}", err.message);

        let err = validate_phone(ma(), "61 23 45 67 89").unwrap_err();
        assert!(err.message.contains("1 en trop"), "{}", err.message);
    }

    #[test]
    fn other_countries_accept_eight_to_fifteen_digits() {
        for country in COUNTRIES.iter().filter(|c| c.code != "MA") {
            for count in 0..=18usize {
                let phone: String = "1".repeat(count);
                let valid = validate_phone(country, &phone).is_ok();
                assert_eq!(
                    valid,
                    (8..=15).contains(&count),
                    "{} with {count} digits",
                    country.code
                );
            }
        }
    }

    #[test]
    fn separators_are_ignored_but_letters_are_not() {
        let fr = lookup("FR").unwrap();
        assert!(validate_phone(fr, "(06) 12-34 56 78").is_ok());
        assert!(validate_phone(fr, "06 12 34 56 7x").is_err());
    }

    #[test]
    fn form_validity_ignores_phone() {
        assert!(is_form_valid("Sara", "sara@example.com"));
        assert!(!is_form_valid("S", "sara@example.com"));
        assert!(!is_form_valid("Sara", "sara@example"));
    }

    #[test]
    fn submission_guard_blocks_invalid_phone() {
        let mut fields = LeadFields {
            first_name: "Sara".into(),
            email: "sara@example.com".into(),
            country_code: "MA".into(),
            phone: "61 23 45 67".into(),
            ..Default::default()
        };
        assert!(is_form_valid(&fields.full_name(), &fields.email));
        let errors = validate_submission(&fields).unwrap_err();
        assert_eq!(errors.keys(), vec!["phone"]);

        fields.phone.clear();
        assert!(validate_submission(&fields).is_ok());

        fields.phone = "612345678".into();
        assert!(validate_submission(&fields).is_ok());
    }
}
