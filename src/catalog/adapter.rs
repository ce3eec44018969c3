//! Catalog service response types
//!
//! Each lookup type has its own row shape on the wire; the adapter maps every
//! shape into a [`CatalogOption`] through one tagged dispatch on
//! [`LookupType`] instead of sniffing field names across response objects.

use serde::Deserialize;
use serde_json::Value;

use super::{CatalogOption, LookupType, OptionId};
use crate::error::{CatalogError, CatalogResult};

/// Top-level response wrapper used by every catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogResponse {
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogCreateResponse {
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct CountryRow {
    id: String,
    name: String,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CityRow {
    id: String,
    name: String,
    #[serde(rename = "postalCode")]
    postal_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SalutationRow {
    id: String,
    #[serde(rename = "salutation")]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CodedRow {
    id: String,
    name: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Map one wire row into a [`CatalogOption`] according to the lookup type.
pub(crate) fn map_row(lookup_type: LookupType, row: Value) -> CatalogResult<CatalogOption> {
    let invalid = |e: serde_json::Error| {
        CatalogError::invalid_payload(format!(
            "malformed {} row from catalog: {}",
            lookup_type, e
        ))
    };

    match lookup_type {
        LookupType::Country => {
            let row: CountryRow = serde_json::from_value(row).map_err(invalid)?;
            Ok(CatalogOption {
                id: OptionId::new(row.id),
                name: row.name,
                code: row.country_code,
                description: row.description,
            })
        }
        LookupType::City => {
            let row: CityRow = serde_json::from_value(row).map_err(invalid)?;
            Ok(CatalogOption {
                id: OptionId::new(row.id),
                name: row.name,
                code: row.postal_code,
                description: None,
            })
        }
        LookupType::Salutation => {
            let row: SalutationRow = serde_json::from_value(row).map_err(invalid)?;
            Ok(CatalogOption {
                id: OptionId::new(row.id),
                name: row.name,
                code: None,
                description: None,
            })
        }
        LookupType::VisibilityStatus | LookupType::Industry | LookupType::JobRole => {
            let row: CodedRow = serde_json::from_value(row).map_err(invalid)?;
            Ok(CatalogOption {
                id: OptionId::new(row.id),
                name: row.name,
                code: row.code,
                description: row.description,
            })
        }
    }
}

pub(crate) fn map_rows(lookup_type: LookupType, rows: Vec<Value>) -> CatalogResult<Vec<CatalogOption>> {
    rows.into_iter()
        .map(|row| map_row(lookup_type, row))
        .collect()
}
