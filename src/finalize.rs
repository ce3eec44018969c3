//! Finalization and defaulting
//!
//! Merges every resolved item back into the extracted record and fills safe
//! fallbacks for anything left unresolved, so the output record is always
//! structurally complete. Pure over the session: finalizing twice without
//! mutation yields identical records.

use serde::{Deserialize, Serialize};

use crate::session::{
    ResolutionSession, FIELD_CITY, FIELD_COUNTRY, FIELD_SALUTATION, FIELD_VISIBILITY_STATUS,
};

pub(crate) const DEFAULT_DATE_OF_BIRTH: &str = "1990-01-01";
pub(crate) const FALLBACK_ID: &str = "1";
pub(crate) const FALLBACK_COUNTRY_NAME: &str = "Default Country";
pub(crate) const FALLBACK_CITY_NAME: &str = "Default City";
pub(crate) const FALLBACK_SALUTATION_NAME: &str = "Mr.";
pub(crate) const FALLBACK_STATUS_NAME: &str = "Active";

/// The extracted record enriched with canonical ids and names for every
/// resolvable field. Either the whole record is produced or the caller keeps
/// the unmodified extracted data; nothing is partially written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub address: String,
    pub street_address: String,
    pub country_id: String,
    pub country_name: String,
    pub city_id: String,
    pub city_name: String,
    pub salutation_id: String,
    pub salutation_name: String,
    pub visibility_status_id: String,
    pub visibility_status_name: String,
}

/// Produce the complete output record for a session.
///
/// Callable at any time; requiring `all_resolved` first is the caller's
/// policy, not a precondition here.
pub fn finalize(session: &ResolutionSession) -> OutputRecord {
    let extracted = session.extracted();

    let mut nationality = non_empty(extracted.nationality.clone());
    let mut country = None;
    let mut city = None;
    let mut salutation = None;
    let mut visibility_status = None;

    for item in &session.items {
        let Some(option) = item.selected.as_ref() else {
            continue;
        };
        let pair = (option.id.to_string(), option.name.clone());
        match item.field {
            FIELD_COUNTRY => {
                // The resolved country is authoritative for nationality.
                nationality = Some(option.name.clone());
                country = Some(pair);
            }
            FIELD_CITY => city = Some(pair),
            FIELD_SALUTATION => salutation = Some(pair),
            FIELD_VISIBILITY_STATUS => visibility_status = Some(pair),
            _ => {}
        }
    }

    let fallback = |name: &str| (FALLBACK_ID.to_string(), name.to_string());
    let (country_id, country_name) = country.unwrap_or_else(|| fallback(FALLBACK_COUNTRY_NAME));
    let (city_id, city_name) = city.unwrap_or_else(|| fallback(FALLBACK_CITY_NAME));
    let (salutation_id, salutation_name) =
        salutation.unwrap_or_else(|| fallback(FALLBACK_SALUTATION_NAME));
    let (visibility_status_id, visibility_status_name) =
        visibility_status.unwrap_or_else(|| fallback(FALLBACK_STATUS_NAME));

    OutputRecord {
        first_name: extracted.first_name.clone(),
        last_name: extracted.last_name.clone(),
        email: non_empty(extracted.email.clone()).unwrap_or_default(),
        phone_number: non_empty(extracted.phone_number.clone()).unwrap_or_default(),
        date_of_birth: non_empty(extracted.date_of_birth.clone())
            .unwrap_or_else(|| DEFAULT_DATE_OF_BIRTH.to_string()),
        nationality: nationality.unwrap_or_default(),
        address: non_empty(extracted.address.clone()).unwrap_or_default(),
        street_address: non_empty(extracted.street_address.clone()).unwrap_or_default(),
        country_id,
        country_name,
        city_id,
        city_name,
        salutation_id,
        salutation_name,
        visibility_status_id,
        visibility_status_name,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
