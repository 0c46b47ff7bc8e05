//! Algolia search provider implementation
//!
//! Uses the multi-index query endpoint with a single request per search.

use super::html::{decode_entities, escape_html};
use super::traits::*;
use crate::config::ProviderSettings;
use crate::query::QueryState;
use crate::results::{FacetCounts, ResultItem, SearchResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Hits per page when the state does not say otherwise
pub const DEFAULT_HITS_PER_PAGE: u32 = 20;

/// Facet dimension that selections are OR-ed within
pub const POST_TYPE_FACET: &str = "post_type_name";

/// Native Algolia search parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgoliaQueryParams {
    pub query: String,
    pub hits_per_page: u32,
    /// 0-indexed; absent means the provider's first page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// AND-joined filter expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    /// Outer list is AND, inner lists are OR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_filters: Option<Vec<Vec<String>>>,
    /// Dimensions to compute counts for
    pub facets: Vec<String>,
}

/// Highlighted values from `_highlightResult`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightResult {
    pub post_title: Option<String>,
    pub post_excerpt: Option<String>,
}

/// A WordPress post record as indexed in Algolia
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgoliaHit {
    pub post_title: Option<String>,
    pub post_excerpt: Option<String>,
    pub origin_site: Option<String>,
    pub permalink: Option<String>,
    pub thumbnail: Option<String>,
    pub thumbnail_alt: Option<String>,
    pub highlight_result: HighlightResult,
}

impl AlgoliaHit {
    /// Read a hit record, ignoring fields that are missing or of the wrong type
    pub fn from_value(hit: &Value) -> Self {
        let highlight = hit.get("_highlightResult");
        let highlighted = |field: &str| {
            highlight
                .and_then(|h| h.get(field))
                .and_then(|h| h.get("value"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Self {
            post_title: string_field(hit, "post_title"),
            post_excerpt: string_field(hit, "post_excerpt"),
            origin_site: string_field(hit, "origin_site"),
            permalink: string_field(hit, "permalink"),
            thumbnail: string_field(hit, "thumbnail"),
            thumbnail_alt: string_field(hit, "thumbnail_alt"),
            highlight_result: HighlightResult {
                post_title: highlighted("post_title"),
                post_excerpt: highlighted("post_excerpt"),
            },
        }
    }
}

/// One entry of the multi-query `results` array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgoliaResponse {
    pub query: Option<String>,
    pub nb_hits: Option<u64>,
    pub page: Option<u32>,
    pub nb_pages: Option<u32>,
    pub hits: Vec<AlgoliaHit>,
    pub facets: FacetCounts,
}

impl AlgoliaResponse {
    /// Read a `results` entry the same lenient way as its hits
    pub fn from_value(entry: &Value) -> Self {
        let hits: Vec<AlgoliaHit> = entry
            .get("hits")
            .and_then(|h| h.as_array())
            .map(|hits| hits.iter().map(AlgoliaHit::from_value).collect())
            .unwrap_or_default();

        let facets: FacetCounts = entry
            .get("facets")
            .and_then(|f| f.as_object())
            .map(|dimensions| {
                dimensions
                    .iter()
                    .filter_map(|(name, values)| {
                        let counts: BTreeMap<String, u64> = values
                            .as_object()?
                            .iter()
                            .filter_map(|(value, count)| Some((value.clone(), count.as_u64()?)))
                            .collect();
                        Some((name.clone(), counts))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            query: string_field(entry, "query"),
            nb_hits: entry.get("nbHits").and_then(|n| n.as_u64()),
            page: u32_field(entry, "page"),
            nb_pages: u32_field(entry, "nbPages"),
            hits,
            facets,
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn u32_field(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
}

/// Algolia provider
pub struct Algolia {
    application_id: String,
    api_key: String,
    index_name: String,
    endpoint: String,
    facets: Vec<String>,
}

impl Algolia {
    pub fn new(
        application_id: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        let application_id = application_id.into();
        Self {
            endpoint: format!("https://{}-dsn.algolia.net", application_id),
            application_id,
            api_key: api_key.into(),
            index_name: index_name.into(),
            facets: vec![POST_TYPE_FACET.to_string()],
        }
    }

    /// Build from provider settings
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut algolia = Self::new(
            &settings.application_id,
            &settings.api_key,
            &settings.collection_name,
        );
        if let Some(ref endpoint) = settings.endpoint {
            algolia.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        algolia
    }

    /// Override the dimensions counts are requested for
    pub fn with_facets(mut self, facets: Vec<String>) -> Self {
        self.facets = facets;
        self
    }

    /// Map generic state to native parameters
    pub fn to_native_request(&self, state: &QueryState) -> AlgoliaQueryParams {
        let mut filters = Vec::new();
        if let Some(ref category) = state.category {
            filters.push(format!("category:\"{}\"", category));
        }

        let mut facet_filters = Vec::new();
        if !state.post_type_name.is_empty() {
            facet_filters.push(
                state
                    .post_type_name
                    .iter()
                    .map(|value| format!("{}:{}", POST_TYPE_FACET, value))
                    .collect(),
            );
        }

        AlgoliaQueryParams {
            query: state.query.clone(),
            hits_per_page: state.page_size.unwrap_or(DEFAULT_HITS_PER_PAGE),
            page: state.page.map(|page| page.max(1) - 1),
            filters: (!filters.is_empty()).then(|| filters.join(" AND ")),
            facet_filters: (!facet_filters.is_empty()).then_some(facet_filters),
            facets: self.facets.clone(),
        }
    }

    /// Map a native response to a generic result
    pub fn from_native_response(response: AlgoliaResponse) -> SearchResult {
        let total_pages = response.nb_pages.unwrap_or(1).max(1);
        let current_page = response.page.map_or(1, |page| page.saturating_add(1)).min(total_pages);

        SearchResult {
            query: response.query.unwrap_or_default(),
            total_hits: response.nb_hits.unwrap_or(0),
            current_page,
            total_pages,
            hits: response.hits.into_iter().map(Self::map_hit).collect(),
            facets: response.facets,
        }
    }

    fn map_hit(hit: AlgoliaHit) -> ResultItem {
        let highlight = hit.highlight_result;

        ResultItem {
            title: Self::highlighted(highlight.post_title, hit.post_title),
            summary: Self::highlighted(highlight.post_excerpt, hit.post_excerpt),
            subtitle: hit.origin_site.unwrap_or_default(),
            url: hit.permalink.unwrap_or_default(),
            image: hit
                .thumbnail
                .filter(|thumb| !thumb.is_empty())
                .map(|thumb| thumb.replace("/wp/", "/")),
            alt_text: hit.thumbnail_alt.unwrap_or_default(),
        }
    }

    /// Prefer decoded highlight markup, fall back to the escaped raw field
    fn highlighted(highlight: Option<String>, raw: Option<String>) -> String {
        match highlight {
            Some(value) if !value.is_empty() => decode_entities(&value),
            _ => raw.map(|raw| escape_html(&raw)).unwrap_or_default(),
        }
    }
}

impl Provider for Algolia {
    fn name(&self) -> &str {
        "algolia"
    }

    fn request(&self, state: &QueryState) -> Result<EngineRequest, ProviderError> {
        if self.index_name.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "no index name configured".to_string(),
            ));
        }

        let mut request = serde_json::to_value(self.to_native_request(state))?;
        if let Some(obj) = request.as_object_mut() {
            obj.insert("indexName".to_string(), self.index_name.clone().into());
        }

        Ok(
            EngineRequest::post(format!("{}/1/indexes/*/queries", self.endpoint))
                .header("x-algolia-application-id", &self.application_id)
                .header("x-algolia-api-key", &self.api_key)
                .param("x-algolia-agent", format!("sitesearch-rs ({})", crate::VERSION))
                .json(serde_json::json!({ "requests": [request] })),
        )
    }

    fn response(
        &self,
        response: EngineResponse,
        state: &QueryState,
    ) -> Result<SearchResult, ProviderError> {
        let body: Value = response.error_for_status()?.json()?;
        let first = match body
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|results| results.first())
        {
            Some(first) => first,
            None => return Ok(SearchResult::empty(&state.query)),
        };

        let mut result = Self::from_native_response(AlgoliaResponse::from_value(first));
        if result.query.is_empty() {
            result.query = state.query.clone();
        }
        Ok(result)
    }
}
