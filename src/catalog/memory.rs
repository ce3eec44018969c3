//! In-memory catalog backend
//!
//! Seedable [`CatalogClient`] implementation used by tests and available for
//! graceful degradation when no remote catalog is reachable. Mirrors the
//! remote contract: country-scoped city lists with local name filtering,
//! case-insensitive duplicate detection on create.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::client::filter_by_name_substring;
use super::{CatalogClient, CatalogOption, CreatePayload, LookupType, OptionId};
use crate::error::{CatalogError, CatalogResult};

#[derive(Default)]
pub struct MemoryCatalog {
    entries: Mutex<HashMap<LookupType, Vec<CatalogOption>>>,
    /// City lists keyed by parent country id.
    cities: Mutex<HashMap<OptionId, Vec<CatalogOption>>>,
    search_calls: Mutex<Vec<(LookupType, String)>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Self::default()
        }
    }

    pub fn seed(&self, lookup_type: LookupType, options: Vec<CatalogOption>) {
        self.entries
            .lock()
            .unwrap()
            .entry(lookup_type)
            .or_default()
            .extend(options);
    }

    pub fn seed_cities(&self, country_id: OptionId, options: Vec<CatalogOption>) {
        self.cities
            .lock()
            .unwrap()
            .entry(country_id)
            .or_default()
            .extend(options);
    }

    /// Simulate an unreachable catalog; every call fails `NetworkUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every `(lookup_type, term)` pair that reached the backend, in order.
    pub fn search_calls(&self) -> Vec<(LookupType, String)> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.lock().unwrap().len()
    }

    fn check_online(&self) -> CatalogResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::network("catalog unreachable"));
        }
        Ok(())
    }

    fn allocate_id(&self) -> OptionId {
        OptionId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn search(
        &self,
        lookup_type: LookupType,
        term: &str,
        parent: Option<&OptionId>,
    ) -> CatalogResult<Vec<CatalogOption>> {
        self.check_online()?;
        self.search_calls
            .lock()
            .unwrap()
            .push((lookup_type, term.to_string()));

        if lookup_type == LookupType::City {
            let Some(country) = parent else {
                return Ok(vec![]);
            };
            let all = self
                .cities
                .lock()
                .unwrap()
                .get(country)
                .cloned()
                .unwrap_or_default();
            if term.is_empty() {
                return Ok(all);
            }
            return Ok(filter_by_name_substring(all, term));
        }

        let all = self
            .entries
            .lock()
            .unwrap()
            .get(&lookup_type)
            .cloned()
            .unwrap_or_default();
        if term.is_empty() {
            return Ok(all);
        }
        Ok(filter_by_name_substring(all, term))
    }

    async fn create(&self, payload: CreatePayload) -> CatalogResult<CatalogOption> {
        self.check_online()?;
        let payload = payload.normalized()?;
        let lookup_type = payload.lookup_type();
        let name = payload.name().to_string();

        let duplicate = match &payload {
            CreatePayload::City { country_id, .. } => self
                .cities
                .lock()
                .unwrap()
                .get(country_id)
                .map(|list| list.iter().any(|o| o.name_matches(&name)))
                .unwrap_or(false),
            _ => self
                .entries
                .lock()
                .unwrap()
                .get(&lookup_type)
                .map(|list| list.iter().any(|o| o.name_matches(&name)))
                .unwrap_or(false),
        };
        if duplicate {
            return Err(CatalogError::Conflict {
                lookup_type: lookup_type.to_string(),
                name,
            });
        }

        let option = match payload {
            CreatePayload::Country { name, code } => {
                let option = CatalogOption {
                    id: self.allocate_id(),
                    name,
                    code,
                    description: None,
                };
                self.entries
                    .lock()
                    .unwrap()
                    .entry(LookupType::Country)
                    .or_default()
                    .push(option.clone());
                option
            }
            CreatePayload::City {
                name,
                country_id,
                postal_code,
                ..
            } => {
                let option = CatalogOption {
                    id: self.allocate_id(),
                    name,
                    code: postal_code,
                    description: None,
                };
                self.cities
                    .lock()
                    .unwrap()
                    .entry(country_id)
                    .or_default()
                    .push(option.clone());
                option
            }
            other => {
                let option = CatalogOption {
                    id: self.allocate_id(),
                    name: other.name().to_string(),
                    code: None,
                    description: None,
                };
                self.entries
                    .lock()
                    .unwrap()
                    .entry(lookup_type)
                    .or_default()
                    .push(option.clone());
                option
            }
        };

        Ok(option)
    }
}
