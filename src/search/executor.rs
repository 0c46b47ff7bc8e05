//! Search execution and re-render pipeline

use super::models::SearchError;
use crate::pagination::compute_window;
use crate::providers::SearchService;
use crate::query::QueryState;
use crate::render::{
    EventBinder, Execution, FacetCallback, PageCallback, QueryCallback, RenderGateway,
    UrlReflector,
};
use crate::results::SearchResult;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Highest rendered execution and the state it rendered
#[derive(Debug, Default)]
struct Committed {
    sequence: u64,
    state: Option<QueryState>,
}

/// Decrements the in-flight counter when an execution finishes either way
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Search orchestrator
///
/// Every execution takes a sequence number when it starts. Once the provider
/// answers, the runner renders only if no higher-numbered execution has
/// rendered yet, so the page always shows the newest issued search that
/// completed. Gateway, binder, reflector and committed state are only written
/// while the commit lock is held.
pub struct Runner {
    service: Arc<dyn SearchService>,
    gateway: Arc<dyn RenderGateway>,
    binder: Arc<dyn EventBinder>,
    reflector: Arc<dyn UrlReflector>,
    initial: QueryState,
    pagination_window: u32,
    issued: AtomicU64,
    in_flight: AtomicUsize,
    committed: Mutex<Committed>,
    this: Weak<Runner>,
}

impl Runner {
    /// Create a runner and bind the search box once
    pub fn new(
        service: Arc<dyn SearchService>,
        gateway: Arc<dyn RenderGateway>,
        binder: Arc<dyn EventBinder>,
        reflector: Arc<dyn UrlReflector>,
        initial: QueryState,
        pagination_window: u32,
    ) -> Arc<Self> {
        let runner = Arc::new_cyclic(|this| Self {
            service,
            gateway,
            binder,
            reflector,
            initial,
            pagination_window,
            issued: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            committed: Mutex::new(Committed::default()),
            this: this.clone(),
        });

        runner
            .binder
            .register_search_box(&runner.gateway.input_field(), runner.query_callback());
        runner
    }

    /// Run the initial state (page load)
    pub async fn start(&self) -> Result<SearchResult, SearchError> {
        info!("Running initial search for '{}'", self.initial.query);
        self.execute(self.initial.clone()).await
    }

    /// Search for `state`, render the result and rebind the controls
    pub async fn execute(&self, state: QueryState) -> Result<SearchResult, SearchError> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Execution {} searching '{}' with {}", sequence, state.query, self.service.name());

        let response = {
            let _guard = InFlight::enter(&self.in_flight);
            self.service.search(&state).await
        };

        let result = match response {
            Ok(result) => result,
            Err(e) => {
                warn!("Execution {} failed, keeping previous results: {}", sequence, e);
                return Err(e.into());
            }
        };

        let mut committed = self.committed.lock();
        if sequence < committed.sequence {
            debug!(
                "Dropping execution {}, execution {} already rendered",
                sequence, committed.sequence
            );
            return Err(SearchError::StaleExecution {
                sequence,
                latest: committed.sequence,
            });
        }

        self.reflector.reflect_query(&result.query);
        self.render(&result, &state);

        committed.sequence = sequence;
        committed.state = Some(state);
        debug!(
            "Execution {} rendered page {}/{} ({} hits)",
            sequence, result.current_page, result.total_pages, result.total_hits
        );

        Ok(result)
    }

    /// State of the last rendered execution, or the initial state
    pub fn current_state(&self) -> QueryState {
        self.committed
            .lock()
            .state
            .clone()
            .unwrap_or_else(|| self.initial.clone())
    }

    /// Whether any provider call is outstanding
    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn render(&self, result: &SearchResult, state: &QueryState) {
        self.gateway.reset();
        self.gateway.render_stats(result);
        self.gateway.render_items(result);

        let window = compute_window(result.current_page, result.total_pages, self.pagination_window);
        self.gateway.render_pagination(result, &window);
        self.gateway
            .render_facets(result, &state.post_type_name, self.facet_callback(state));

        self.binder
            .register_pagination(&self.gateway.pagination_container(), self.page_callback(state));
    }

    fn query_callback(&self) -> QueryCallback {
        let this = self.this.clone();
        Arc::new(move |query: String| {
            let runner = this.upgrade()?;
            let next = runner.current_state().with_query(query);
            runner.spawn(next)
        })
    }

    fn page_callback(&self, state: &QueryState) -> PageCallback {
        let this = self.this.clone();
        let state = state.clone();
        Arc::new(move |page: u32| this.upgrade()?.spawn(state.with_page(page)))
    }

    fn facet_callback(&self, state: &QueryState) -> FacetCallback {
        let this = self.this.clone();
        let state = state.clone();
        Arc::new(move |value: String| this.upgrade()?.spawn(state.toggle_facet(&value)))
    }

    /// Run `state` on the current tokio runtime
    fn spawn(self: Arc<Self>, state: QueryState) -> Option<Execution> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        Some(handle.spawn(async move { self.execute(state).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiSettings;
    use crate::providers::ProviderError;
    use crate::render::{ListenerRegistry, QueryParamReflector, TemplateRenderer};
    use crate::results::ResultItem;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::oneshot;
    use tokio_test::{assert_err, assert_ok};

    type Gate = oneshot::Receiver<Result<SearchResult, ProviderError>>;

    /// Answers immediately unless a gate is registered for the query text
    #[derive(Default)]
    struct StubService {
        calls: Mutex<Vec<QueryState>>,
        gates: Mutex<HashMap<String, Gate>>,
        fail: AtomicBool,
    }

    impl StubService {
        fn gate(&self, query: &str) -> oneshot::Sender<Result<SearchResult, ProviderError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(query.to_string(), rx);
            tx
        }

        fn last_call(&self) -> QueryState {
            self.calls.lock().last().cloned().expect("no calls")
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    fn result_for(state: &QueryState, post_count: u64) -> SearchResult {
        SearchResult {
            query: state.query.clone(),
            total_hits: 30,
            current_page: state.page.unwrap_or(1),
            total_pages: 10,
            hits: (1..=3)
                .map(|i| ResultItem {
                    title: format!("{} {}", state.query, i),
                    url: format!("https://example.com/{}", i),
                    ..Default::default()
                })
                .collect(),
            facets: [(
                "post_type_name".to_string(),
                [("post".to_string(), post_count), ("page".to_string(), 1)]
                    .into_iter()
                    .collect(),
            )]
            .into_iter()
            .collect(),
        }
    }

    #[async_trait]
    impl SearchService for StubService {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(&self, state: &QueryState) -> Result<SearchResult, ProviderError> {
            let calls = {
                let mut calls = self.calls.lock();
                calls.push(state.clone());
                calls.len() as u64
            };

            let gate = self.gates.lock().remove(&state.query);
            if let Some(gate) = gate {
                return gate
                    .await
                    .unwrap_or_else(|_| Err(ProviderError::InvalidRequest("gate dropped".into())));
            }

            if self.fail.load(Ordering::SeqCst) {
                return Err(ProviderError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(result_for(state, calls * 10))
        }
    }

    struct Fixture {
        runner: Arc<Runner>,
        service: Arc<StubService>,
        gateway: Arc<TemplateRenderer>,
        binder: Arc<ListenerRegistry>,
        reflector: Arc<QueryParamReflector>,
    }

    fn fixture(initial: QueryState) -> Fixture {
        let service = Arc::new(StubService::default());
        let gateway = Arc::new(TemplateRenderer::new(&UiSettings::default(), "post_type_name").unwrap());
        let binder = Arc::new(ListenerRegistry::new());
        let reflector = Arc::new(QueryParamReflector::new("https://example.com/search", "s").unwrap());
        let runner = Runner::new(
            service.clone(),
            gateway.clone(),
            binder.clone(),
            reflector.clone(),
            initial,
            5,
        );
        Fixture {
            runner,
            service,
            gateway,
            binder,
            reflector,
        }
    }

    async fn wait_for_calls(service: &StubService, count: usize) {
        while service.call_count() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_start_renders_initial_state() {
        let f = fixture(QueryState::new("rust"));
        let result = assert_ok!(f.runner.start().await);

        assert_eq!(result.query, "rust");
        let page = f.gateway.page();
        assert!(page.stats.contains("30 results"));
        assert_eq!(page.hits.len(), 3);
        assert!(!page.pagination.is_empty());
        assert_eq!(page.facet_entries.len(), 2);
        assert_eq!(f.reflector.current_url().as_str(), "https://example.com/search?s=rust");
        assert_eq!(f.runner.current_state(), QueryState::new("rust"));
        assert!(!f.runner.is_searching());
    }

    #[tokio::test]
    async fn test_repeated_execution_does_not_duplicate() {
        let f = fixture(QueryState::default());
        let state = QueryState::new("rust").with_page(2);

        let first = assert_ok!(f.runner.execute(state.clone()).await);
        let second = assert_ok!(f.runner.execute(state).await);

        assert_eq!(first.hits, second.hits);
        assert_eq!(first.current_page, second.current_page);
        assert_eq!(f.gateway.page().hits.len(), 3);
        assert_eq!(f.binder.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_late_response_from_older_execution_is_dropped() {
        let f = fixture(QueryState::default());
        let release_a = f.service.gate("a");
        let release_b = f.service.gate("b");

        let runner = f.runner.clone();
        let a = tokio::spawn(async move { runner.execute(QueryState::new("a")).await });
        wait_for_calls(&f.service, 1).await;

        let runner = f.runner.clone();
        let b = tokio::spawn(async move { runner.execute(QueryState::new("b")).await });
        wait_for_calls(&f.service, 2).await;
        assert!(f.runner.is_searching());

        release_b.send(Ok(result_for(&QueryState::new("b"), 5))).unwrap();
        assert_ok!(b.await.unwrap());

        release_a.send(Ok(result_for(&QueryState::new("a"), 5))).unwrap();
        let stale = assert_err!(a.await.unwrap());
        assert!(stale.is_stale());

        let page = f.gateway.page();
        assert!(page.stats.contains("\"b\""));
        assert!(page.hits[0].contains("b 1"));
        assert_eq!(f.runner.current_state().query, "b");
        assert_eq!(f.reflector.current_url().as_str(), "https://example.com/search?s=b");
    }

    #[tokio::test]
    async fn test_in_order_responses_render_newest() {
        let f = fixture(QueryState::default());
        let release_a = f.service.gate("a");

        let runner = f.runner.clone();
        let a = tokio::spawn(async move { runner.execute(QueryState::new("a")).await });
        wait_for_calls(&f.service, 1).await;
        release_a.send(Ok(result_for(&QueryState::new("a"), 5))).unwrap();
        assert_ok!(a.await.unwrap());

        assert_ok!(f.runner.execute(QueryState::new("b")).await);
        assert!(f.gateway.page().stats.contains("\"b\""));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_render() {
        let f = fixture(QueryState::default());
        assert_ok!(f.runner.execute(QueryState::new("rust")).await);
        let before = f.gateway.html();

        f.service.fail.store(true, Ordering::SeqCst);
        let err = assert_err!(f.runner.execute(QueryState::new("tokio")).await);

        assert!(matches!(err, SearchError::Provider(ProviderError::Status { status: 503, .. })));
        assert_eq!(f.gateway.html(), before);
        assert_eq!(f.runner.current_state().query, "rust");
        assert_eq!(f.reflector.current_url().as_str(), "https://example.com/search?s=rust");
    }

    #[tokio::test]
    async fn test_page_click_replaces_only_page() {
        let f = fixture(QueryState::default());
        let state = QueryState::new("rust")
            .with_category("news")
            .with_page_size(10)
            .toggle_facet("post");
        assert_ok!(f.runner.execute(state.clone()).await);

        let execution = f
            .binder
            .click_page(&f.gateway.pagination_container(), 3)
            .expect("pagination bound");
        let result = assert_ok!(execution.await.unwrap());

        assert_eq!(result.current_page, 3);
        assert_eq!(f.service.last_call(), state.with_page(3));
        assert!(f.gateway.page().pagination.iter().any(|p| p.contains("c-pagination--is-active") && p.contains("data-page=\"3\"")));
    }

    #[tokio::test]
    async fn test_facet_toggle_flips_one_value() {
        let f = fixture(QueryState::default());
        let state = QueryState::new("rust").with_page(2).with_category("news");
        assert_ok!(f.runner.execute(state.clone()).await);

        let execution = f.gateway.click_facet("page").expect("facets bound");
        assert_ok!(execution.await.unwrap());
        let selected = f.service.last_call();
        assert_eq!(selected, state.toggle_facet("page"));

        let execution = f.gateway.click_facet("page").expect("facets bound");
        assert_ok!(execution.await.unwrap());
        assert_eq!(f.service.last_call(), state);
    }

    #[tokio::test]
    async fn test_chained_interactions_accumulate_state() {
        let f = fixture(QueryState::default());
        assert_ok!(f.runner.execute(QueryState::new("rust")).await);

        let execution = f.gateway.click_facet("post").unwrap();
        assert_ok!(execution.await.unwrap());
        let execution = f.binder.click_page(&f.gateway.pagination_container(), 4).unwrap();
        assert_ok!(execution.await.unwrap());

        let last = f.service.last_call();
        assert_eq!(last.page, Some(4));
        assert!(last.post_type_name.contains("post"));
        assert!(f
            .gateway
            .page()
            .facet_entries
            .iter()
            .any(|e| e.value == "post" && e.selected));
    }

    #[tokio::test]
    async fn test_new_query_resets_page() {
        let f = fixture(QueryState::default());
        let state = QueryState::new("rust").with_page(4).toggle_facet("post");
        assert_ok!(f.runner.execute(state.clone()).await);

        let execution = f
            .binder
            .input(&f.gateway.input_field(), "tokio")
            .expect("search box bound");
        assert_ok!(execution.await.unwrap());

        let executed = f.service.last_call();
        assert_eq!(executed.query, "tokio");
        assert_eq!(executed.page, Some(1));
        assert_eq!(executed.post_type_name, state.post_type_name);
    }

    #[tokio::test]
    async fn test_search_box_before_first_render_uses_initial_state() {
        let f = fixture(QueryState::new("").with_category("news"));
        let execution = f.binder.input(&f.gateway.input_field(), "rust").unwrap();
        assert_ok!(execution.await.unwrap());

        let executed = f.service.last_call();
        assert_eq!(executed.category.as_deref(), Some("news"));
        assert_eq!(executed.page, Some(1));
    }

    #[tokio::test]
    async fn test_facet_counts_refresh_every_execution() {
        let f = fixture(QueryState::default());
        assert_ok!(f.runner.execute(QueryState::new("rust")).await);
        let first = f.gateway.page().facet_entries;
        assert_ok!(f.runner.execute(QueryState::new("rust")).await);
        let second = f.gateway.page().facet_entries;

        let post_count = |entries: &[crate::render::FacetEntry]| {
            entries.iter().find(|e| e.value == "post").map(|e| e.count)
        };
        assert_eq!(post_count(&first), Some(10));
        assert_eq!(post_count(&second), Some(20));
    }

    #[tokio::test]
    async fn test_listeners_are_replaced_not_stacked() {
        let f = fixture(QueryState::default());
        for page in 1..=4 {
            assert_ok!(f.runner.execute(QueryState::new("rust").with_page(page)).await);
        }
        assert_eq!(f.binder.listener_count(), 2);

        let before = f.service.call_count();
        let execution = f.binder.click_page(&f.gateway.pagination_container(), 2).unwrap();
        assert_ok!(execution.await.unwrap());
        assert_eq!(f.service.call_count(), before + 1);
    }

    #[tokio::test]
    async fn test_callbacks_inert_after_runner_dropped() {
        let f = fixture(QueryState::default());
        assert_ok!(f.runner.execute(QueryState::new("rust")).await);

        let Fixture { runner, gateway, binder, .. } = f;
        drop(runner);

        assert!(binder.click_page(&gateway.pagination_container(), 2).is_none());
        assert!(gateway.click_facet("post").is_none());
        assert!(binder.input(&gateway.input_field(), "x").is_none());
    }
}
