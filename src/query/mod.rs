//! Query state module
//!
//! Holds the user-facing search state: query text, page, page size,
//! category filter and the facet selection. A state is never edited in
//! place once it has been handed to the runner; every interaction derives
//! a new value from the previous one.

use serde::{Deserialize, Serialize};

/// Selected values for a single facet dimension
///
/// Keeps insertion order and never holds the same value twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FacetSelection(Vec<String>);

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Return a new selection with `value` added if absent, removed if present
    pub fn toggle(&self, value: &str) -> Self {
        if self.contains(value) {
            Self(self.0.iter().filter(|v| *v != value).cloned().collect())
        } else {
            let mut values = self.0.clone();
            values.push(value.to_string());
            Self(values)
        }
    }
}

impl From<Vec<String>> for FacetSelection {
    fn from(values: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self(unique)
    }
}

impl From<FacetSelection> for Vec<String> {
    fn from(selection: FacetSelection) -> Self {
        selection.0
    }
}

impl<S: Into<String>> FromIterator<S> for FacetSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

/// Generic search state shared by every provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryState {
    /// Free-text query
    pub query: String,
    /// Page number (1-indexed); `None` lets the provider pick its first page
    pub page: Option<u32>,
    /// Hits per page; `None` uses the adapter default
    pub page_size: Option<u32>,
    /// Exact-match category filter
    pub category: Option<String>,
    /// Selected content types
    pub post_type_name: FacetSelection,
}

impl QueryState {
    /// Create a state for a plain text query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Replace the query text. A new query always restarts at page 1.
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: Some(1),
            ..self.clone()
        }
    }

    /// Replace only the page number
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page.max(1)),
            ..self.clone()
        }
    }

    /// Replace only the facet selection
    pub fn with_facets(&self, selection: FacetSelection) -> Self {
        Self {
            post_type_name: selection,
            ..self.clone()
        }
    }

    /// Flip membership of one facet value, leaving every other field as is
    pub fn toggle_facet(&self, value: &str) -> Self {
        self.with_facets(self.post_type_name.toggle(value))
    }

    /// Set the category filter
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_query_resets_page() {
        let state = QueryState::new("rust").with_page(4).with_query("tokio");
        assert_eq!(state.query, "tokio");
        assert_eq!(state.page, Some(1));
    }

    #[test]
    fn test_new_query_keeps_filters() {
        let state = QueryState::new("rust")
            .with_category("news")
            .toggle_facet("page")
            .with_query("async");
        assert_eq!(state.category.as_deref(), Some("news"));
        assert!(state.post_type_name.contains("page"));
    }

    #[test]
    fn test_with_page_changes_only_page() {
        let state = QueryState::new("rust").with_category("news").with_page_size(10);
        let next = state.with_page(3);
        assert_eq!(next.page, Some(3));
        assert_eq!(QueryState { page: None, ..next }, state);
    }

    #[test]
    fn test_toggle_facet() {
        let state = QueryState::new("rust").with_page(2);
        let on = state.toggle_facet("post");
        assert_eq!(on.post_type_name.iter().collect::<Vec<_>>(), vec!["post"]);
        assert_eq!(on.page, Some(2));

        let off = on.toggle_facet("post");
        assert!(off.post_type_name.is_empty());
        assert_eq!(off, state);
    }

    #[test]
    fn test_toggle_preserves_order() {
        let selection: FacetSelection = ["a", "b", "c"].into_iter().collect();
        let toggled = selection.toggle("b").toggle("d");
        assert_eq!(toggled.iter().collect::<Vec<_>>(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_selection_deduplicates() {
        let selection = FacetSelection::from(vec![
            "page".to_string(),
            "post".to_string(),
            "page".to_string(),
        ]);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_deserialize_host_params() {
        let state: QueryState = serde_json::from_str(
            r#"{"query":"hello","post_type_name":["page","post"],"category":"news"}"#,
        )
        .unwrap();
        assert_eq!(state.query, "hello");
        assert_eq!(state.page, None);
        assert_eq!(state.post_type_name.len(), 2);
    }
}
