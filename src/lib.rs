//! Reference-data resolution engine for profile onboarding
//!
//! An upstream extraction step turns a source document into a bag of
//! free-text field values ("Germany", "Berlin", "John"). Before those values
//! can be persisted as a profile, each semantically-typed field must be
//! resolved to a canonical entry in a remote reference-data catalog
//! (countries, cities, salutations, visibility statuses).
//!
//! The engine:
//! 1. infers which fields need resolution from the extracted record,
//! 2. orders them by dependency (a city resolves after its country),
//! 3. attempts automatic exact-match resolution against the catalog,
//! 4. exposes a debounced interactive search-or-create flow for the rest,
//! 5. finalizes into a complete output record with safe defaults.
//!
//! # Example
//!
//! ```ignore
//! use refdata_resolution::catalog::{CatalogConfig, HttpCatalogClient};
//! use refdata_resolution::session::{ExtractedRecord, ResolutionSession};
//! use refdata_resolution::finalize::finalize;
//! use std::sync::Arc;
//!
//! let client = Arc::new(HttpCatalogClient::new(CatalogConfig {
//!     credential: Some(token),
//!     ..CatalogConfig::default()
//! })?);
//!
//! let mut session = ResolutionSession::init(client, extracted).await;
//! for field in session.unresolved_fields() {
//!     // interactive search / create / skip per field
//! }
//! let output = finalize(&session);
//! ```

pub mod catalog;
pub mod debounce;
pub mod error;
pub mod finalize;
pub mod session;

pub use catalog::{
    CatalogClient, CatalogConfig, CatalogOption, CreatePayload, HttpCatalogClient, LookupType,
    MemoryCatalog, OptionId,
};
pub use debounce::{DebouncedQueryController, SearchOutcome, DEFAULT_DEBOUNCE};
pub use error::{CatalogError, CatalogResult, ResolutionError, ResolutionResult};
pub use finalize::{finalize, OutputRecord};
pub use session::{ExtractedRecord, ResolutionItem, ResolutionSession, ResolutionStatus};
