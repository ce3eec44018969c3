//! Canonical reference-data model
//!
//! The catalog is a remote authoritative store of canonical entities
//! (countries, cities, salutations, status codes). The engine only ever
//! holds copies of catalog entries; ownership stays with the service.

mod adapter;
mod client;
mod memory;

pub use client::{CatalogClient, CatalogConfig, HttpCatalogClient};
pub use memory::MemoryCatalog;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;

/// Opaque stable identifier for a catalog entry, unique within a lookup type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A canonical catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOption {
    pub id: OptionId,
    /// Display string, used for exact-match comparison (case-insensitive).
    pub name: String,
    /// Short alphabetic identifier; required format depends on the type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(id),
            name: name.into(),
            code: None,
            description: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Exact-match rule used by auto-validation: name equality, case-insensitive.
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.eq_ignore_ascii_case(candidate)
    }
}

/// Closed enumeration of reference-data kinds the catalog serves.
///
/// The default session only builds items for the first four; `Industry` and
/// `JobRole` are carried by the client contract for callers that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupType {
    Country,
    City,
    Salutation,
    VisibilityStatus,
    Industry,
    JobRole,
}

impl LookupType {
    /// Endpoint path segment on the remote catalog service.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LookupType::Country => "countries",
            LookupType::City => "cities",
            LookupType::Salutation => "salutations",
            LookupType::VisibilityStatus => "visibility-statuses",
            LookupType::Industry => "industries",
            LookupType::JobRole => "job-roles",
        }
    }

    /// Whether the remote side supports free-text search for this type.
    ///
    /// Cities are never searched by free text remotely: the client fetches
    /// the parent country's city list and filters by name locally.
    pub fn supports_server_search(&self) -> bool {
        !matches!(self, LookupType::City)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupType::Country => "country",
            LookupType::City => "city",
            LookupType::Salutation => "salutation",
            LookupType::VisibilityStatus => "visibilityStatus",
            LookupType::Industry => "industry",
            LookupType::JobRole => "jobRole",
        }
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type-specific create payload, dispatched on the lookup type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CreatePayload {
    #[serde(rename_all = "camelCase")]
    Country {
        name: String,
        /// 2-3 uppercase letters; derived from the name when omitted.
        code: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    City {
        name: String,
        country_id: OptionId,
        country_name: String,
        /// Length >= 3; defaults to "00000" when omitted.
        postal_code: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Salutation { name: String },
    #[serde(rename_all = "camelCase")]
    VisibilityStatus { name: String },
    #[serde(rename_all = "camelCase")]
    Industry { name: String },
    #[serde(rename_all = "camelCase")]
    JobRole { name: String },
}

impl CreatePayload {
    pub fn lookup_type(&self) -> LookupType {
        match self {
            CreatePayload::Country { .. } => LookupType::Country,
            CreatePayload::City { .. } => LookupType::City,
            CreatePayload::Salutation { .. } => LookupType::Salutation,
            CreatePayload::VisibilityStatus { .. } => LookupType::VisibilityStatus,
            CreatePayload::Industry { .. } => LookupType::Industry,
            CreatePayload::JobRole { .. } => LookupType::JobRole,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CreatePayload::Country { name, .. }
            | CreatePayload::City { name, .. }
            | CreatePayload::Salutation { name }
            | CreatePayload::VisibilityStatus { name }
            | CreatePayload::Industry { name }
            | CreatePayload::JobRole { name } => name,
        }
    }

    /// Validate the payload and fill type-specific defaults.
    ///
    /// Country codes absent from the payload are derived from the first two
    /// letters of the name, uppercased. City postal codes default to "00000".
    pub fn normalized(self) -> Result<CreatePayload, CatalogError> {
        if self.name().trim().is_empty() {
            return Err(CatalogError::invalid_payload(format!(
                "create name must not be empty for '{}'",
                self.lookup_type()
            )));
        }

        match self {
            CreatePayload::Country { name, code } => {
                let code = match code {
                    Some(code) => {
                        if !is_valid_country_code(&code) {
                            return Err(CatalogError::invalid_payload(format!(
                                "country code '{}' must be 2-3 uppercase letters",
                                code
                            )));
                        }
                        code
                    }
                    None => derive_country_code(&name),
                };
                Ok(CreatePayload::Country {
                    name,
                    code: Some(code),
                })
            }
            CreatePayload::City {
                name,
                country_id,
                country_name,
                postal_code,
            } => {
                let postal_code = postal_code.unwrap_or_else(|| DEFAULT_POSTAL_CODE.to_string());
                if postal_code.len() < 3 {
                    return Err(CatalogError::invalid_payload(format!(
                        "postal code '{}' must be at least 3 characters",
                        postal_code
                    )));
                }
                if country_name.trim().is_empty() {
                    return Err(CatalogError::invalid_payload(
                        "city create requires the parent country's name",
                    ));
                }
                Ok(CreatePayload::City {
                    name,
                    country_id,
                    country_name,
                    postal_code: Some(postal_code),
                })
            }
            other => Ok(other),
        }
    }
}

const DEFAULT_POSTAL_CODE: &str = "00000";

fn is_valid_country_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_uppercase())
}

/// First two letters of the name, uppercased.
fn derive_country_code(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect::<String>()
        .to_ascii_uppercase()
}
