//! Country dial-code table used by the contact form and phone formatting.
//!
//! Morocco is the fallback whenever geolocation fails or yields a code that
//! is not listed here.

use serde::Serialize;

pub const DEFAULT_COUNTRY_CODE: &str = "MA";

/// How many national digits a phone number must carry after the dial code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DigitRule {
    Exact { digits: usize },
    Range { min: usize, max: usize },
}

impl DigitRule {
    pub const fn max(&self) -> usize {
        match self {
            DigitRule::Exact { digits } => *digits,
            DigitRule::Range { max, .. } => *max,
        }
    }

    pub const fn accepts(&self, count: usize) -> bool {
        match self {
            DigitRule::Exact { digits } => count == *digits,
            DigitRule::Range { min, max } => count >= *min && count <= *max,
        }
    }
}

const INTERNATIONAL: DigitRule = DigitRule::Range { min: 8, max: 15 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub dial_code: &'static str,
    pub flag: &'static str,
    pub digits: DigitRule,
}

const fn country(
    code: &'static str,
    name: &'static str,
    dial_code: &'static str,
    flag: &'static str,
) -> Country {
    Country {
        code,
        name,
        dial_code,
        flag,
        digits: INTERNATIONAL,
    }
}

pub static COUNTRIES: &[Country] = &[
    Country {
        code: "MA",
        name: "Maroc",
        dial_code: "+212",
        flag: "🇲🇦",
        digits: DigitRule::Exact { digits: 9 },
    },
    country("FR", "France", "+33", "🇫🇷"),
    country("BE", "Belgique", "+32", "🇧🇪"),
    country("CH", "Suisse", "+41", "🇨🇭"),
    country("LU", "Luxembourg", "+352", "🇱🇺"),
    country("MC", "Monaco", "+377", "🇲🇨"),
    country("CA", "Canada", "+1", "🇨🇦"),
    country("US", "États-Unis", "+1", "🇺🇸"),
    country("GB", "Royaume-Uni", "+44", "🇬🇧"),
    country("IE", "Irlande", "+353", "🇮🇪"),
    country("ES", "Espagne", "+34", "🇪🇸"),
    country("PT", "Portugal", "+351", "🇵🇹"),
    country("IT", "Italie", "+39", "🇮🇹"),
    country("DE", "Allemagne", "+49", "🇩🇪"),
    country("NL", "Pays-Bas", "+31", "🇳🇱"),
    country("AT", "Autriche", "+43", "🇦🇹"),
    country("SE", "Suède", "+46", "🇸🇪"),
    country("NO", "Norvège", "+47", "🇳🇴"),
    country("DK", "Danemark", "+45", "🇩🇰"),
    country("PL", "Pologne", "+48", "🇵🇱"),
    country("TR", "Turquie", "+90", "🇹🇷"),
    country("DZ", "Algérie", "+213", "🇩🇿"),
    country("TN", "Tunisie", "+216", "🇹🇳"),
    country("LY", "Libye", "+218", "🇱🇾"),
    country("EG", "Égypte", "+20", "🇪🇬"),
    country("MR", "Mauritanie", "+222", "🇲🇷"),
    country("SN", "Sénégal", "+221", "🇸🇳"),
    country("ML", "Mali", "+223", "🇲🇱"),
    country("CI", "Côte d'Ivoire", "+225", "🇨🇮"),
    country("BF", "Burkina Faso", "+226", "🇧🇫"),
    country("NE", "Niger", "+227", "🇳🇪"),
    country("GN", "Guinée", "+224", "🇬🇳"),
    country("BJ", "Bénin", "+229", "🇧🇯"),
    country("TG", "Togo", "+228", "🇹🇬"),
    country("CM", "Cameroun", "+237", "🇨🇲"),
    country("GA", "Gabon", "+241", "🇬🇦"),
    country("CG", "Congo", "+242", "🇨🇬"),
    country("CD", "République démocratique du Congo", "+243", "🇨🇩"),
    country("MG", "Madagascar", "+261", "🇲🇬"),
    country("NG", "Nigeria", "+234", "🇳🇬"),
    country("KE", "Kenya", "+254", "🇰🇪"),
    country("ZA", "Afrique du Sud", "+27", "🇿🇦"),
    country("SA", "Arabie saoudite", "+966", "🇸🇦"),
    country("AE", "Émirats arabes unis", "+971", "🇦🇪"),
    country("QA", "Qatar", "+974", "🇶🇦"),
    country("KW", "Koweït", "+965", "🇰🇼"),
    country("LB", "Liban", "+961", "🇱🇧"),
    country("JO", "Jordanie", "+962", "🇯🇴"),
    country("IN", "Inde", "+91", "🇮🇳"),
    country("CN", "Chine", "+86", "🇨🇳"),
    country("JP", "Japon", "+81", "🇯🇵"),
    country("BR", "Brésil", "+55", "🇧🇷"),
    country("MX", "Mexique", "+52", "🇲🇽"),
    country("AU", "Australie", "+61", "🇦🇺"),
];

/// Case-insensitive lookup of an ISO-3166 alpha-2 code.
pub fn lookup(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES
        .iter()
        .find(|country| country.code.eq_ignore_ascii_case(code))
}

/// Resolve a possibly-missing geolocation result, falling back to Morocco.
pub fn resolve(code: Option<&str>) -> &'static Country {
    code.and_then(lookup).unwrap_or(&COUNTRIES[0])
}
