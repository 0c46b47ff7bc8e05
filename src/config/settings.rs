//! Settings structures for SiteSearch-RS configuration

use crate::query::QueryState;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching `sitesearch.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    pub ui: UiSettings,
    /// Query state the page starts with
    pub initial: QueryState,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (SITESEARCH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SITESEARCH_PROVIDER") {
            self.provider.kind = val;
        }
        if let Some(val) = var("SITESEARCH_APP_ID") {
            self.provider.application_id = val;
        }
        if let Some(val) = var("SITESEARCH_API_KEY") {
            self.provider.api_key = val;
        }
        if let Some(val) = var("SITESEARCH_COLLECTION") {
            self.provider.collection_name = val;
        }
        if let Some(val) = var("SITESEARCH_ENDPOINT") {
            self.provider.endpoint = Some(val);
        }
        if let Some(val) = var("SITESEARCH_PAGE_URL") {
            self.ui.page_url = val;
        }
    }
}

/// Connection details for the hosted search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider type (`algolia`)
    pub kind: String,
    /// Application / account identifier
    pub application_id: String,
    /// Search-only API key
    pub api_key: String,
    /// Index or collection to query
    pub collection_name: String,
    /// Override for the provider host
    pub endpoint: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: "algolia".to_string(),
            application_id: String::new(),
            api_key: String::new(),
            collection_name: String::new(),
            endpoint: None,
        }
    }
}

impl ProviderSettings {
    /// Check that the credentials needed to reach the provider are present
    pub fn validate(&self) -> Result<()> {
        if self.application_id.is_empty() {
            bail!("provider.application_id is not set");
        }
        if self.api_key.is_empty() {
            bail!("provider.api_key is not set");
        }
        if self.collection_name.is_empty() {
            bail!("provider.collection_name is not set");
        }
        Ok(())
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Hits per page when the initial state does not set one
    pub page_size: u32,
    /// Number of page links shown around the current page
    pub pagination_window: u32,
    /// Facet dimensions counts are requested for
    pub facets: Vec<String>,
    /// Dimension rendered as toggleable refinements
    pub facet_dimension: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            pagination_window: 5,
            facets: vec!["post_type_name".to_string()],
            facet_dimension: "post_type_name".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub https: Option<String>,
    pub all: Option<String>,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Address of the search page, used for query reflection
    pub page_url: String,
    /// Query parameter carrying the search text
    pub query_param: String,
    /// Template overrides by name (`hit`, `hit_noimage`, `no_results`, ...)
    pub templates: HashMap<String, String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            page_url: "http://localhost/".to_string(),
            query_param: "s".to_string(),
            templates: HashMap::new(),
        }
    }
}
