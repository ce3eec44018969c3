//! Shared fixtures for integration tests

use refdata_resolution::catalog::{CatalogOption, LookupType, MemoryCatalog, OptionId};
use std::sync::Arc;
use std::sync::Once;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "refdata_resolution=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Catalog seeded with the reference data the scenarios expect.
pub fn seeded_catalog() -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();

    catalog.seed(
        LookupType::Country,
        vec![
            CatalogOption::new("7", "Germany").with_code("DE"),
            CatalogOption::new("8", "France").with_code("FR"),
            CatalogOption::new("9", "United States").with_code("US"),
        ],
    );
    catalog.seed_cities(
        OptionId::from("7"),
        vec![
            CatalogOption::new("70", "Berlin"),
            CatalogOption::new("71", "Oberlin"),
            CatalogOption::new("72", "Munich"),
        ],
    );
    catalog.seed_cities(
        OptionId::from("8"),
        vec![
            CatalogOption::new("80", "Paris"),
            CatalogOption::new("81", "Lyon"),
        ],
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
        vec![
            CatalogOption::new("1", "Active"),
            CatalogOption::new("2", "Hidden"),
        ],
    );

    Arc::new(catalog)
}
