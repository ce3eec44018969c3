//! Resolution session
//!
//! Builds the per-field resolution items from one extracted-data record,
//! auto-validates them against the catalog, enforces dependency ordering
//! between items, and exposes the interactive resolution operations.

mod item;
pub mod salutation;

pub use item::{ResolutionItem, ResolutionStatus};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::catalog::{CatalogClient, CatalogOption, CreatePayload, LookupType, OptionId};
use crate::debounce::{DebouncedQueryController, SearchOutcome};
use crate::error::{ResolutionError, ResolutionResult};

pub const FIELD_COUNTRY: &str = "country";
pub const FIELD_CITY: &str = "city";
pub const FIELD_SALUTATION: &str = "salutation";
pub const FIELD_VISIBILITY_STATUS: &str = "visibilityStatus";

/// Seed used for the country item when neither nationality nor country was
/// extracted, so auto-validation always has something to test.
pub(crate) const DEFAULT_COUNTRY_SEED: &str = "United States";
pub(crate) const DEFAULT_STATUS_SEED: &str = "Active";

/// Free-text field values produced by the upstream extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub street_address: Option<String>,
}

/// One onboarding attempt's worth of resolution work.
///
/// Created per extracted-data record, discarded once finalization runs. No
/// state is shared across sessions; the catalog client is the only long-lived
/// resource and is stateless from the session's point of view.
pub struct ResolutionSession {
    pub id: Uuid,
    pub items: Vec<ResolutionItem>,
    extracted: ExtractedRecord,
    client: Arc<dyn CatalogClient>,
}

impl ResolutionSession {
    /// Build the resolution items for a record and auto-validate each one.
    ///
    /// Inclusion rules, in order:
    /// 1. any of nationality/country/city/address present → country item,
    ///    seeded `nationality ?? country ?? "United States"`;
    /// 2. city or address present → city item seeded `city ?? first address
    ///    segment`, depending on the country item;
    /// 3. firstName present → salutation item when the name heuristic
    ///    produced a guess;
    /// 4. always a visibility-status item seeded "Active".
    pub async fn init(client: Arc<dyn CatalogClient>, extracted: ExtractedRecord) -> Self {
        let mut items = Vec::new();

        let has_geo_hint = extracted.nationality.is_some()
            || extracted.country.is_some()
            || extracted.city.is_some()
            || extracted.address.is_some();
        if has_geo_hint {
            let seed = extracted
                .nationality
                .clone()
                .or_else(|| extracted.country.clone())
                .unwrap_or_else(|| DEFAULT_COUNTRY_SEED.to_string());
            items.push(ResolutionItem::new(FIELD_COUNTRY, LookupType::Country, seed));
        }

        if extracted.city.is_some() || extracted.address.is_some() {
            let seed = extracted
                .city
                .clone()
                .or_else(|| extracted.address.as_deref().map(first_address_segment))
                .unwrap_or_default();
            items.push(
                ResolutionItem::new(FIELD_CITY, LookupType::City, seed)
                    .depending_on(FIELD_COUNTRY),
            );
        }

        if let Some(first_name) = extracted.first_name.as_deref() {
            if let Some(guess) = salutation::guess_salutation(first_name) {
                items.push(ResolutionItem::new(
                    FIELD_SALUTATION,
                    LookupType::Salutation,
                    guess,
                ));
            }
        }

        items.push(ResolutionItem::new(
            FIELD_VISIBILITY_STATUS,
            LookupType::VisibilityStatus,
            DEFAULT_STATUS_SEED,
        ));

        let mut session = Self {
            id: Uuid::new_v4(),
            items,
            extracted,
            client,
        };

        // Creation order puts country before city, so an auto-matched
        // country unblocks the city within the same pass.
        for index in 0..session.items.len() {
            session.auto_validate(index).await;
        }

        session
    }

    pub fn extracted(&self) -> &ExtractedRecord {
        &self.extracted
    }

    pub fn item(&self, field: &str) -> Option<&ResolutionItem> {
        self.items.iter().find(|item| item.field == field)
    }

    fn item_index(&self, field: &str) -> ResolutionResult<usize> {
        self.items
            .iter()
            .position(|item| item.field == field)
            .ok_or_else(|| ResolutionError::UnknownField {
                field: field.to_string(),
            })
    }

    /// Every item has reached a terminal status or carries a selection.
    pub fn all_resolved(&self) -> bool {
        self.items.iter().all(ResolutionItem::is_resolved)
    }

    pub fn unresolved_fields(&self) -> Vec<&'static str> {
        self.items
            .iter()
            .filter(|item| !item.is_resolved())
            .map(|item| item.field)
            .collect()
    }

    /// The field blocking resolution of `field`, if any.
    pub fn blocked_on(&self, field: &str) -> Option<&'static str> {
        let item = self.item(field)?;
        let dependency = item.depends_on?;
        match self.item(dependency) {
            Some(dep) if dep.satisfies_dependents() => None,
            _ => Some(dependency),
        }
    }

    pub fn is_blocked(&self, field: &str) -> bool {
        self.blocked_on(field).is_some()
    }

    /// Raised synchronously, before any I/O.
    fn ensure_unblocked(&self, field: &str) -> ResolutionResult<()> {
        match self.blocked_on(field) {
            Some(blocked_on) => Err(ResolutionError::DependencyNotSatisfied {
                field: field.to_string(),
                blocked_on: blocked_on.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Parent scope for an item's searches: the dependency's selected id.
    fn parent_for(&self, field: &str) -> Option<OptionId> {
        let item = self.item(field)?;
        let dependency = item.depends_on?;
        self.item(dependency)?
            .selected
            .as_ref()
            .map(|option| option.id.clone())
    }

    /// Attempt automatic exact-match resolution for one item.
    ///
    /// Catalog errors are swallowed to `Unresolved` and kept on the item for
    /// display; auto-validation failure is never fatal.
    async fn auto_validate(&mut self, index: usize) {
        let (field, lookup_type, extracted_value) = {
            let item = &self.items[index];
            (item.field, item.lookup_type, item.extracted_value.clone())
        };

        // Cities cannot be validated until their country has resolved.
        let parent = self.parent_for(field);
        if self.items[index].depends_on.is_some() && parent.is_none() {
            return;
        }

        // Cities are fetched unfiltered (country-scoped); the exact-match
        // scan below does the matching.
        let term = if lookup_type.supports_server_search() {
            extracted_value.as_str()
        } else {
            ""
        };

        match self.client.search(lookup_type, term, parent.as_ref()).await {
            Ok(options) => {
                let exact = options
                    .iter()
                    .find(|option| option.name_matches(&extracted_value))
                    .cloned();
                let item = &mut self.items[index];
                item.options = options;
                if let Some(option) = exact {
                    tracing::debug!(field, name = %option.name, "auto-matched");
                    item.auto_match(option);
                }
            }
            Err(error) => {
                tracing::warn!(field, %error, "auto-validation failed, leaving unresolved");
                self.items[index].last_error = Some(error.to_string());
            }
        }
    }

    /// Dependency-checked catalog search; the fetched options replace the
    /// item's candidate list.
    pub async fn resolve_with_search(
        &mut self,
        field: &str,
        term: &str,
    ) -> ResolutionResult<Vec<CatalogOption>> {
        self.ensure_unblocked(field)?;
        let index = self.item_index(field)?;
        let lookup_type = self.items[index].lookup_type;
        let parent = self.parent_for(field);

        let options = self.client.search(lookup_type, term, parent.as_ref()).await?;
        self.items[index].options = options.clone();
        self.items[index].last_error = None;
        Ok(options)
    }

    /// Dependency-checked selection of a previously returned option.
    ///
    /// Selecting a country re-issues the city search with the new parent,
    /// discarding the city item's previously fetched options.
    pub async fn resolve_with_selection(
        &mut self,
        field: &str,
        option: CatalogOption,
    ) -> ResolutionResult<()> {
        self.ensure_unblocked(field)?;
        let index = self.item_index(field)?;
        self.items[index].select(option);

        if field == FIELD_COUNTRY {
            self.refresh_city_options().await;
        }
        Ok(())
    }

    /// Dependency-checked create; the new catalog entry becomes the
    /// selection. Catalog failures surface verbatim for the caller's retry
    /// affordance.
    pub async fn resolve_with_create(
        &mut self,
        field: &str,
        payload: CreatePayload,
    ) -> ResolutionResult<CatalogOption> {
        self.ensure_unblocked(field)?;
        let index = self.item_index(field)?;

        let created = self.client.create(payload).await?;
        self.items[index].select(created.clone());

        if field == FIELD_COUNTRY {
            self.refresh_city_options().await;
        }
        Ok(created)
    }

    /// Skip is always permitted, including for blocked items.
    pub fn skip(&mut self, field: &str) -> ResolutionResult<()> {
        let index = self.item_index(field)?;
        self.items[index].skip();
        Ok(())
    }

    /// Open a debounced search flow for one item, checked against its
    /// dependency first. City flows are scoped to the resolved country.
    pub fn debounced_search(
        &self,
        field: &str,
    ) -> ResolutionResult<(
        DebouncedQueryController,
        mpsc::UnboundedReceiver<SearchOutcome>,
    )> {
        self.ensure_unblocked(field)?;
        let index = self.item_index(field)?;
        let lookup_type = self.items[index].lookup_type;

        let (mut controller, outcomes) =
            DebouncedQueryController::new(Arc::clone(&self.client), lookup_type);
        if let Some(parent) = self.parent_for(field) {
            controller.set_parent(Some(parent));
        }
        Ok((controller, outcomes))
    }

    /// Discard the city item's fetched options and re-fetch them scoped to
    /// the newly resolved country. Failures stay on the item; the country
    /// selection itself is never rolled back.
    async fn refresh_city_options(&mut self) {
        let Ok(index) = self.item_index(FIELD_CITY) else {
            return;
        };
        let parent = self.parent_for(FIELD_CITY);
        self.items[index].options.clear();

        match self
            .client
            .search(LookupType::City, "", parent.as_ref())
            .await
        {
            Ok(options) => {
                self.items[index].options = options;
                self.items[index].last_error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "city option refresh failed");
                self.items[index].last_error = Some(error.to_string());
            }
        }
    }
}

/// First comma-separated segment of a free-text address.
fn first_address_segment(address: &str) -> String {
    address.split(',').next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    fn seeded_catalog() -> Arc<MemoryCatalog> {
        let catalog = MemoryCatalog::new();
        catalog.seed(
            LookupType::Country,
            vec![
                CatalogOption::new("7", "Germany").with_code("DE"),
                CatalogOption::new("8", "France").with_code("FR"),
            ],
        );
        catalog.seed_cities(
            OptionId::from("8"),
            vec![CatalogOption::new("80", "Paris")],
        );
        catalog.seed(
            LookupType::Salutation,
            vec![
                CatalogOption::new("1", "Mr."),
                CatalogOption::new("2", "Ms."),
            ],
        );
        catalog.seed(
            LookupType::VisibilityStatus,
            vec![CatalogOption::new("1", "Active")],
        );
        Arc::new(catalog)
    }

    #[tokio::test]
    async fn test_items_built_from_available_fields() {
        let record = ExtractedRecord {
            nationality: Some("France".to_string()),
            city: Some("Paris".to_string()),
            first_name: Some("Maria".to_string()),
            ..ExtractedRecord::default()
        };
        let session = ResolutionSession::init(seeded_catalog(), record).await;

        let fields: Vec<_> = session.items.iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                FIELD_COUNTRY,
                FIELD_CITY,
                FIELD_SALUTATION,
                FIELD_VISIBILITY_STATUS
            ]
        );

        assert_eq!(session.item(FIELD_COUNTRY).unwrap().extracted_value, "France");
        assert_eq!(
            session.item(FIELD_CITY).unwrap().depends_on,
            Some(FIELD_COUNTRY)
        );
        assert_eq!(session.item(FIELD_SALUTATION).unwrap().extracted_value, "Ms.");
        assert_eq!(
            session.item(FIELD_VISIBILITY_STATUS).unwrap().extracted_value,
            "Active"
        );
    }

    #[tokio::test]
    async fn test_country_seed_falls_back_to_default() {
        let record = ExtractedRecord {
            address: Some("5 Main St, Springfield".to_string()),
            ..ExtractedRecord::default()
        };
        let session = ResolutionSession::init(seeded_catalog(), record).await;

        assert_eq!(
            session.item(FIELD_COUNTRY).unwrap().extracted_value,
            DEFAULT_COUNTRY_SEED
        );
        // City seeded from the first address segment.
        assert_eq!(session.item(FIELD_CITY).unwrap().extracted_value, "5 Main St");
    }

    #[tokio::test]
    async fn test_no_geo_fields_builds_minimal_session() {
        let record = ExtractedRecord {
            first_name: Some("John".to_string()),
            ..ExtractedRecord::default()
        };
        let session = ResolutionSession::init(seeded_catalog(), record).await;

        let fields: Vec<_> = session.items.iter().map(|i| i.field).collect();
        assert_eq!(fields, vec![FIELD_SALUTATION, FIELD_VISIBILITY_STATUS]);
    }

    #[tokio::test]
    async fn test_auto_validation_cascades_country_to_city() {
        let record = ExtractedRecord {
            nationality: Some("France".to_string()),
            city: Some("Paris".to_string()),
            first_name: Some("Maria".to_string()),
            ..ExtractedRecord::default()
        };
        let session = ResolutionSession::init(seeded_catalog(), record).await;

        let country = session.item(FIELD_COUNTRY).unwrap();
        assert_eq!(country.status, ResolutionStatus::AutoMatched);
        assert_eq!(country.selected.as_ref().unwrap().name, "France");

        // Country resolved first, so the city validated against its list.
        let city = session.item(FIELD_CITY).unwrap();
        assert_eq!(city.status, ResolutionStatus::AutoMatched);
        assert_eq!(city.selected.as_ref().unwrap().name, "Paris");

        assert!(session
            .item(FIELD_VISIBILITY_STATUS)
            .map(|i| i.status == ResolutionStatus::AutoMatched)
            .unwrap());
    }

    #[tokio::test]
    async fn test_auto_validation_error_is_swallowed() {
        let catalog = seeded_catalog();
        catalog.set_offline(true);

        let record = ExtractedRecord {
            country: Some("Germany".to_string()),
            ..ExtractedRecord::default()
        };
        let session = ResolutionSession::init(catalog, record).await;

        let country = session.item(FIELD_COUNTRY).unwrap();
        assert_eq!(country.status, ResolutionStatus::Unresolved);
        assert!(country.last_error.is_some());
        assert!(!session.all_resolved());
    }

    #[tokio::test]
    async fn test_city_blocked_until_country_resolves() {
        let record = ExtractedRecord {
            country: Some("Atlantis".to_string()),
            city: Some("Poseidonia".to_string()),
            ..ExtractedRecord::default()
        };
        let mut session = ResolutionSession::init(seeded_catalog(), record).await;

        assert_eq!(session.blocked_on(FIELD_CITY), Some(FIELD_COUNTRY));
        let err = session.resolve_with_search(FIELD_CITY, "Pos").await;
        assert!(matches!(
            err,
            Err(ResolutionError::DependencyNotSatisfied { .. })
        ));

        let germany = CatalogOption::new("7", "Germany").with_code("DE");
        session
            .resolve_with_selection(FIELD_COUNTRY, germany)
            .await
            .expect("country selectable");

        assert!(!session.is_blocked(FIELD_CITY));
        assert!(session.resolve_with_search(FIELD_CITY, "Pos").await.is_ok());
    }

    #[tokio::test]
    async fn test_skip_allowed_for_blocked_items() {
        let record = ExtractedRecord {
            country: Some("Atlantis".to_string()),
            city: Some("Poseidonia".to_string()),
            ..ExtractedRecord::default()
        };
        let mut session = ResolutionSession::init(seeded_catalog(), record).await;

        assert!(session.is_blocked(FIELD_CITY));
        session.skip(FIELD_CITY).expect("skip always permitted");
        assert_eq!(
            session.item(FIELD_CITY).unwrap().status,
            ResolutionStatus::Skipped
        );
    }

    #[tokio::test]
    async fn test_country_change_refreshes_city_options() {
        let catalog = seeded_catalog();
        catalog.seed_cities(
            OptionId::from("7"),
            vec![
                CatalogOption::new("70", "Berlin"),
                CatalogOption::new("71", "Munich"),
            ],
        );

        let record = ExtractedRecord {
            country: Some("Atlantis".to_string()),
            city: Some("Poseidonia".to_string()),
            ..ExtractedRecord::default()
        };
        let mut session = ResolutionSession::init(catalog, record).await;

        session
            .resolve_with_selection(FIELD_COUNTRY, CatalogOption::new("8", "France"))
            .await
            .unwrap();
        let names: Vec<_> = session.item(FIELD_CITY).unwrap().options.iter()
            .map(|o| o.name.clone())
            .collect();
        assert_eq!(names, vec!["Paris"]);

        session
            .resolve_with_selection(FIELD_COUNTRY, CatalogOption::new("7", "Germany"))
            .await
            .unwrap();
        let names: Vec<_> = session.item(FIELD_CITY).unwrap().options.iter()
            .map(|o| o.name.clone())
            .collect();
        assert_eq!(names, vec!["Berlin", "Munich"]);
    }

    #[tokio::test]
    async fn test_create_resolves_item_with_new_option() {
        let record = ExtractedRecord {
            country: Some("Atlantis".to_string()),
            ..ExtractedRecord::default()
        };
        let mut session = ResolutionSession::init(seeded_catalog(), record).await;

        let created = session
            .resolve_with_create(
                FIELD_COUNTRY,
                CreatePayload::Country {
                    name: "Atlantis".to_string(),
                    code: None,
                },
            )
            .await
            .expect("create succeeds");

        assert_eq!(created.code.as_deref(), Some("AT"));
        let country = session.item(FIELD_COUNTRY).unwrap();
        assert_eq!(country.status, ResolutionStatus::UserSelected);
        assert_eq!(country.selected.as_ref().unwrap().name, "Atlantis");
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let mut session =
            ResolutionSession::init(seeded_catalog(), ExtractedRecord::default()).await;
        let err = session.resolve_with_search("industry", "Finance").await;
        assert!(matches!(err, Err(ResolutionError::UnknownField { .. })));
    }

    #[test]
    fn test_first_address_segment() {
        assert_eq!(first_address_segment("Berlin, 10115, Germany"), "Berlin");
        assert_eq!(first_address_segment("Berlin"), "Berlin");
        assert_eq!(first_address_segment(""), "");
    }
}
