//! Per-field resolution unit of work

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogOption, LookupType};

/// Lifecycle status of a resolution item.
///
/// An item is created once per session, mutated only by auto-validation or
/// explicit user resolution, and never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionStatus {
    Unresolved,
    AutoMatched,
    UserSelected,
    Skipped,
}

/// One field awaiting mapping to a canonical catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionItem {
    /// Name of the target attribute, e.g. "country".
    pub field: &'static str,
    pub lookup_type: LookupType,
    /// Raw extracted string; may be empty.
    pub extracted_value: String,
    pub status: ResolutionStatus,
    pub selected: Option<CatalogOption>,
    /// Field name of the item that must resolve before this one may.
    pub depends_on: Option<&'static str>,
    /// Candidate options fetched for this item, most recent search wins.
    pub options: Vec<CatalogOption>,
    /// Last auto-validation or search error, kept for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ResolutionItem {
    pub fn new(
        field: &'static str,
        lookup_type: LookupType,
        extracted_value: impl Into<String>,
    ) -> Self {
        Self {
            field,
            lookup_type,
            extracted_value: extracted_value.into(),
            status: ResolutionStatus::Unresolved,
            selected: None,
            depends_on: None,
            options: Vec::new(),
            last_error: None,
        }
    }

    pub fn depending_on(mut self, field: &'static str) -> Self {
        self.depends_on = Some(field);
        self
    }

    /// Whether this item unblocks items that depend on it.
    pub fn satisfies_dependents(&self) -> bool {
        matches!(
            self.status,
            ResolutionStatus::AutoMatched | ResolutionStatus::UserSelected
        ) || self.selected.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.status != ResolutionStatus::Unresolved || self.selected.is_some()
    }

    pub(crate) fn auto_match(&mut self, option: CatalogOption) {
        self.status = ResolutionStatus::AutoMatched;
        self.selected = Some(option);
        self.last_error = None;
    }

    pub(crate) fn select(&mut self, option: CatalogOption) {
        self.status = ResolutionStatus::UserSelected;
        self.selected = Some(option);
        self.last_error = None;
    }

    pub(crate) fn skip(&mut self) {
        self.status = ResolutionStatus::Skipped;
    }
}
