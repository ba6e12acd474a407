use agency_site_core::geo::{self, format_phone, Country, COUNTRIES};
use agency_site_core::lead::validate_phone;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/geo", get(visitor_country))
        .route("/api/geo/countries", get(list_countries))
        .route("/api/geo/phone", get(check_phone))
}

#[derive(Debug, Deserialize)]
struct GeoQuery {
    country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CountrySource {
    Query,
    Header,
    Default,
}

#[derive(Debug, Serialize)]
struct VisitorCountry {
    country: &'static Country,
    source: CountrySource,
}

/// Visitor country from `?country=`, then the geolocation header set by the
/// edge proxy, then Morocco.
async fn visitor_country(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GeoQuery>,
) -> Json<VisitorCountry> {
    if let Some(country) = query.country.as_deref().and_then(geo::lookup) {
        return Json(VisitorCountry {
            country,
            source: CountrySource::Query,
        });
    }

    let from_header = headers
        .get(state.config().geo_country_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(geo::lookup);
    match from_header {
        Some(country) => Json(VisitorCountry {
            country,
            source: CountrySource::Header,
        }),
        None => Json(VisitorCountry {
            country: geo::resolve(None),
            source: CountrySource::Default,
        }),
    }
}

async fn list_countries() -> Json<&'static [Country]> {
    Json(COUNTRIES)
}

#[derive(Debug, Deserialize)]
struct PhoneQuery {
    country: Option<String>,
    number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneCheck {
    country: &'static str,
    formatted: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    digits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn check_phone(Query(query): Query<PhoneQuery>) -> ApiResult<Json<PhoneCheck>> {
    let country = match query.country.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => geo::lookup(code)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown country code: {code}")))?,
        None => geo::resolve(None),
    };

    let formatted = format_phone(country, &query.number);
    let check = match validate_phone(country, &query.number) {
        Ok(digits) => PhoneCheck {
            country: country.code,
            formatted,
            valid: true,
            digits: Some(digits),
            error: None,
        },
        Err(err) => PhoneCheck {
            country: country.code,
            formatted,
            valid: false,
            digits: None,
            error: Some(err.message),
        },
    };
    Ok(Json(check))
}
