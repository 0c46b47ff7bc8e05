//! Search provider module
//!
//! Defines the provider and search-service traits, the Algolia adapter and a
//! factory that builds the configured provider.

mod html;
mod service;
mod traits;

pub mod algolia;

pub use algolia::Algolia;
pub use service::ProviderSearch;
pub use traits::*;

use crate::config::{ProviderSettings, SearchSettings};
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Build the search service named by `provider.kind`
pub fn create_service(
    provider: &ProviderSettings,
    search: &SearchSettings,
    client: HttpClient,
) -> Result<Arc<dyn SearchService>> {
    provider.validate()?;

    let service: Arc<dyn SearchService> = match provider.kind.as_str() {
        "algolia" => {
            let algolia = Algolia::from_settings(provider).with_facets(search.facets.clone());
            Arc::new(ProviderSearch::new(algolia, client))
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unknown provider type: {} (available: {})",
                other,
                available_providers().join(", ")
            ))
        }
    };

    info!(
        "Using provider {} (collection {})",
        service.name(),
        provider.collection_name
    );
    Ok(service)
}

/// Provider kinds `create_service` understands
pub fn available_providers() -> Vec<&'static str> {
    vec!["algolia"]
}
