use super::countries::Country;

const SEPARATORS: [char; 4] = [' ', '-', '(', ')'];

fn strip_dial_code<'a>(country: &Country, input: &'a str) -> &'a str {
    let input = input.trim();
    let national = &country.dial_code[1..];
    if let Some(rest) = input.strip_prefix(country.dial_code) {
        return rest;
    }
    if let Some(rest) = input.strip_prefix("00").and_then(|r| r.strip_prefix(national)) {
        return rest;
    }
    input
}

/// National digits of `input` once the dial code and separators are removed.
///
/// Returns `None` when anything other than digits, spaces, hyphens or
/// parentheses is left.
pub fn normalize_digits(country: &Country, input: &str) -> Option<String> {
    let national = strip_dial_code(country, input);
    let mut digits = String::with_capacity(national.len());
    for c in national.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !SEPARATORS.contains(&c) {
            return None;
        }
    }
    Some(digits)
}

/// Display form: dial code followed by digit pairs, e.g. `+212 61 23 45 67 8`.
///
/// Non-digit characters are dropped and the digits are truncated to the
/// country's maximum length.
pub fn format_phone(country: &Country, input: &str) -> String {
    let digits: Vec<char> = strip_dial_code(country, input)
        .chars()
        .filter(char::is_ascii_digit)
        .take(country.digits.max())
        .collect();

    let mut out = String::from(country.dial_code);
    for pair in digits.chunks(2) {
        out.push(' ');
        out.extend(pair);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::lookup;

    fn ma() -> &'static Country {
        lookup("MA").unwrap()
    }

    fn fr() -> &'static Country {
        lookup("FR").unwrap()
    }

    #[test]
    fn normalize_strips_separators_and_dial_code() {
        assert_eq!(
            normalize_digits(ma(), "+212 61-23 (45) 67 8").as_deref(),
            Some("612345678")
        );
        assert_eq!(
            normalize_digits(ma(), "00212 612345678").as_deref(),
            Some("612345678")
        );
        assert_eq!(
            normalize_digits(fr(), "06 12 34 56 78").as_deref(),
            Some("0612345678")
        );
    }

    #[test]
    fn normalize_rejects_letters_and_other_symbols() {
        assert_eq!(normalize_digits(fr(), "06 12 AB 56"), None);
        assert_eq!(normalize_digits(fr(), "06.12.34.56.78"), None);
    }

    #[test]
    fn format_groups_pairs_after_dial_code() {
        assert_eq!(format_phone(ma(), "612345678"), "+212 61 23 45 67 8");
        assert_eq!(format_phone(ma(), "+212 6123"), "+212 61 23");
        assert_eq!(format_phone(fr(), ""), "+33");
    }

    #[test]
    fn format_truncates_to_country_maximum() {
        assert_eq!(format_phone(ma(), "6123456789999"), "+212 61 23 45 67 8");
        let formatted = format_phone(fr(), "12345678901234567890");
        let digits = formatted[3..].chars().filter(char::is_ascii_digit).count();
        assert_eq!(digits, 15);
    }
}
