//! SiteSearch-RS: search page client for hosted search providers
//!
//! Maps query state to provider requests, maps provider responses to a
//! generic result, computes the pagination window and drives the
//! render-and-rebind loop that feeds user interactions back into new searches.

pub mod config;
pub mod network;
pub mod pagination;
pub mod providers;
pub mod query;
pub mod render;
pub mod results;
pub mod search;

pub use config::Settings;
pub use pagination::{compute_window, PaginationWindow};
pub use providers::{Provider, SearchService};
pub use query::{FacetSelection, QueryState};
pub use results::{ResultItem, SearchResult};
pub use search::{Runner, SearchError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
