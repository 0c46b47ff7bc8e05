//! Template rendering with Tera

use super::traits::*;
use crate::config::UiSettings;
use crate::pagination::PaginationWindow;
use crate::query::FacetSelection;
use crate::results::{ResultItem, SearchResult};
use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

/// Built-in templates, overridable by name from the UI settings
const BUILTIN_TEMPLATES: [(&str, &str); 7] = [
    ("hit", include_str!("../templates/hit.html")),
    ("hit_noimage", include_str!("../templates/hit_noimage.html")),
    ("no_results", include_str!("../templates/no_results.html")),
    ("stats", include_str!("../templates/stats.html")),
    ("pagination_item", include_str!("../templates/pagination_item.html")),
    ("pagination_icon", include_str!("../templates/pagination_icon.html")),
    ("facet_item", include_str!("../templates/facet_item.html")),
];

const INPUT_FIELD: &str = "search-page-input";
const PAGINATION: &str = "search-page-pagination";

/// One facet control as last drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetEntry {
    pub value: String,
    pub count: u64,
    pub selected: bool,
}

/// Rendered regions of the search page
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub input_value: String,
    pub stats: String,
    pub hits: Vec<String>,
    pub pagination: Vec<String>,
    pub refinements: Vec<String>,
    pub facet_entries: Vec<FacetEntry>,
}

impl Page {
    /// Concatenated markup of every region
    pub fn html(&self) -> String {
        let mut html = self.stats.clone();
        for fragment in self
            .hits
            .iter()
            .chain(&self.pagination)
            .chain(&self.refinements)
        {
            html.push_str(fragment);
        }
        html
    }
}

/// [`RenderGateway`] drawing into an in-memory page with Tera templates
pub struct TemplateRenderer {
    tera: Tera,
    facet_dimension: String,
    page: Mutex<Page>,
    on_toggle: Mutex<Option<FacetCallback>>,
}

impl TemplateRenderer {
    /// Create a renderer with the built-in templates and any overrides
    pub fn new(ui: &UiSettings, facet_dimension: impl Into<String>) -> Result<Self> {
        let mut tera = Tera::default();

        for (name, source) in BUILTIN_TEMPLATES {
            let source = ui.templates.get(name).map(String::as_str).unwrap_or(source);
            tera.add_raw_template(&format!("{}.html", name), source)?;
        }

        Ok(Self {
            tera,
            facet_dimension: facet_dimension.into(),
            page: Mutex::new(Page::default()),
            on_toggle: Mutex::new(None),
        })
    }

    /// Prefill the search box
    pub fn with_input_value(self, value: impl Into<String>) -> Self {
        self.page.lock().input_value = value.into();
        self
    }

    /// Snapshot of the rendered page
    pub fn page(&self) -> Page {
        self.page.lock().clone()
    }

    pub fn html(&self) -> String {
        self.page.lock().html()
    }

    /// Activate the facet control for `value`
    pub fn click_facet(&self, value: &str) -> Option<Execution> {
        let listener = self.on_toggle.lock().clone()?;
        listener(value.to_string())
    }

    fn render(&self, name: &str, context: serde_json::Value) -> Option<String> {
        let rendered = Context::from_serialize(context)
            .and_then(|ctx| self.tera.render(&format!("{}.html", name), &ctx));

        match rendered {
            Ok(html) => Some(html),
            Err(e) => {
                error!("Template error in {}: {}", name, e);
                None
            }
        }
    }

    fn render_hit(&self, item: &ResultItem) -> Option<String> {
        let name = if item.has_image() { "hit" } else { "hit_noimage" };
        self.render(name, serde_json::json!({ "item": item }))
    }

    fn pagination_icon(&self, page: u32, icon: &str) -> Option<String> {
        self.render(
            "pagination_icon",
            serde_json::json!({ "page": page, "icon": icon }),
        )
    }

    /// Facet values to draw: the result's counts plus selected values it omitted
    fn facet_entries(&self, result: &SearchResult, selected: &FacetSelection) -> Vec<FacetEntry> {
        let mut entries: Vec<FacetEntry> = result
            .facet(&self.facet_dimension)
            .into_iter()
            .flatten()
            .map(|(value, count)| FacetEntry {
                value: value.clone(),
                count: *count,
                selected: selected.contains(value),
            })
            .collect();

        for value in selected.iter() {
            if !entries.iter().any(|e| e.value == value) {
                entries.push(FacetEntry {
                    value: value.to_string(),
                    count: 0,
                    selected: true,
                });
            }
        }
        entries
    }
}

impl RenderGateway for TemplateRenderer {
    fn reset(&self) {
        let mut page = self.page.lock();
        page.stats.clear();
        page.hits.clear();
        page.pagination.clear();
        page.refinements.clear();
        page.facet_entries.clear();
    }

    fn render_stats(&self, result: &SearchResult) {
        let stats = self
            .render(
                "stats",
                serde_json::json!({ "total_hits": result.total_hits, "query": result.query }),
            )
            .unwrap_or_default();
        self.page.lock().stats = stats;
    }

    fn render_items(&self, result: &SearchResult) {
        let fragments: Vec<String> = if result.hits.is_empty() {
            self.render("no_results", serde_json::json!({})).into_iter().collect()
        } else {
            result
                .hits
                .iter()
                .filter_map(|item| self.render_hit(item))
                .collect()
        };
        self.page.lock().hits.extend(fragments);
    }

    fn render_pagination(&self, result: &SearchResult, window: &PaginationWindow) {
        let mut fragments = Vec::new();

        if window.has_previous() {
            fragments.extend(self.pagination_icon(result.current_page - 1, "keyboard_arrow_left"));
        }

        for &page in &window.visible_pages {
            let (color, class_name) = if page == result.current_page {
                ("primary", "c-pagination--is-active")
            } else {
                ("default", "")
            };
            fragments.extend(self.render(
                "pagination_item",
                serde_json::json!({ "page": page, "color": color, "class_name": class_name }),
            ));
        }

        if window.has_next() {
            fragments.extend(self.pagination_icon(result.current_page + 1, "keyboard_arrow_right"));
        }

        self.page.lock().pagination.extend(fragments);
    }

    fn render_facets(&self, result: &SearchResult, selected: &FacetSelection, on_toggle: FacetCallback) {
        let entries = self.facet_entries(result, selected);
        let fragments: Vec<String> = entries
            .iter()
            .filter_map(|entry| self.render("facet_item", serde_json::json!(entry)))
            .collect();

        {
            let mut page = self.page.lock();
            page.refinements = fragments;
            page.facet_entries = entries;
        }
        *self.on_toggle.lock() = Some(on_toggle);
    }

    fn input_field(&self) -> ElementHandle {
        ElementHandle::new(INPUT_FIELD)
    }

    fn pagination_container(&self) -> ElementHandle {
        ElementHandle::new(PAGINATION)
    }
}
