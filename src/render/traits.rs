//! Render, binding and URL reflection boundaries

use crate::pagination::PaginationWindow;
use crate::query::FacetSelection;
use crate::results::SearchResult;
use crate::search::SearchError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A spawned execution triggered by an interaction
pub type Execution = JoinHandle<Result<SearchResult, SearchError>>;

/// Called with the new query text. `None` once the runner is gone.
pub type QueryCallback = Arc<dyn Fn(String) -> Option<Execution> + Send + Sync>;

/// Called with the requested page number
pub type PageCallback = Arc<dyn Fn(u32) -> Option<Execution> + Send + Sync>;

/// Called with the facet value whose control was activated
pub type FacetCallback = Arc<dyn Fn(String) -> Option<Execution> + Send + Sync>;

/// Opaque reference to a control exposed by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Draws results and exposes the controls user input arrives on
pub trait RenderGateway: Send + Sync {
    /// Clear stats, hits, pagination and facet controls
    fn reset(&self);

    fn render_stats(&self, result: &SearchResult);

    /// Draw hits, or the empty state when there are none
    fn render_items(&self, result: &SearchResult);

    /// Draw page controls; `window` is derived from the result's bounds
    fn render_pagination(&self, result: &SearchResult, window: &PaginationWindow);

    /// Draw facet controls and keep `on_toggle` as their only listener
    fn render_facets(&self, result: &SearchResult, selected: &FacetSelection, on_toggle: FacetCallback);

    fn input_field(&self) -> ElementHandle;

    fn pagination_container(&self) -> ElementHandle;
}

/// Attaches listeners to gateway controls
///
/// Registering again on the same handle replaces the previous listener.
pub trait EventBinder: Send + Sync {
    fn register_search_box(&self, input: &ElementHandle, on_query: QueryCallback);

    fn register_pagination(&self, container: &ElementHandle, on_page: PageCallback);
}

/// Reports the current query text outward (address bar)
pub trait UrlReflector: Send + Sync {
    fn reflect_query(&self, query: &str);
}
