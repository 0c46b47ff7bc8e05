//! Result type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facet name -> (facet value -> hit count)
pub type FacetCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// A single search hit mapped from the provider's record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Title, highlighted when the provider supplied highlighting
    pub title: String,
    /// Secondary heading (originating site)
    pub subtitle: String,
    /// Excerpt, highlighted when available
    pub summary: String,
    /// Link to the document
    pub url: String,
    /// Thumbnail URL; hits without one use the no-image template
    pub image: Option<String>,
    /// Alternative text for the thumbnail
    pub alt_text: String,
}

impl ResultItem {
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Provider-independent result of one execution
///
/// Built fresh per execution and dropped after rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Query text the provider resolved
    pub query: String,
    /// Total number of hits across all pages
    pub total_hits: u64,
    /// Current page (1-indexed, never above `total_pages`)
    pub current_page: u32,
    /// Number of pages, at least 1 even with zero hits
    pub total_pages: u32,
    /// Hits for the current page, in provider order
    pub hits: Vec<ResultItem>,
    /// Facet counts reported by the provider
    pub facets: FacetCounts,
}

impl SearchResult {
    /// An empty result for `query`
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            total_hits: 0,
            current_page: 1,
            total_pages: 1,
            hits: vec![],
            facets: FacetCounts::new(),
        }
    }

    /// Counts for one facet dimension, if the provider reported it
    pub fn facet(&self, name: &str) -> Option<&BTreeMap<String, u64>> {
        self.facets.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
