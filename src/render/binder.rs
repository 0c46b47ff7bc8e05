//! In-memory event binder

use super::traits::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Keeps one listener per control and dispatches interactions to it
#[derive(Default)]
pub struct ListenerRegistry {
    search_boxes: Mutex<HashMap<ElementHandle, QueryCallback>>,
    pagination: Mutex<HashMap<ElementHandle, PageCallback>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver typed text to the search box listener on `handle`
    pub fn input(&self, handle: &ElementHandle, text: impl Into<String>) -> Option<Execution> {
        let listener = self.search_boxes.lock().get(handle).cloned()?;
        listener(text.into())
    }

    /// Deliver a page click to the pagination listener on `handle`
    pub fn click_page(&self, handle: &ElementHandle, page: u32) -> Option<Execution> {
        let listener = self.pagination.lock().get(handle).cloned()?;
        listener(page)
    }

    /// Total number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.search_boxes.lock().len() + self.pagination.lock().len()
    }
}

impl EventBinder for ListenerRegistry {
    fn register_search_box(&self, input: &ElementHandle, on_query: QueryCallback) {
        if self
            .search_boxes
            .lock()
            .insert(input.clone(), on_query)
            .is_some()
        {
            debug!("Replaced search box listener on {}", input.as_str());
        }
    }

    fn register_pagination(&self, container: &ElementHandle, on_page: PageCallback) {
        if self
            .pagination
            .lock()
            .insert(container.clone(), on_page)
            .is_some()
        {
            debug!("Replaced pagination listener on {}", container.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_rebinding_replaces_listener() {
        let registry = ListenerRegistry::new();
        let handle = ElementHandle::new("pagination");
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            registry.register_pagination(
                &handle,
                Arc::new(move |_page| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    None
                }),
            );
        }

        assert_eq!(registry.listener_count(), 1);
        assert!(registry.click_page(&handle, 2).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unbound_handle_is_ignored() {
        let registry = ListenerRegistry::new();
        assert!(registry.input(&ElementHandle::new("search"), "rust").is_none());
        assert_eq!(registry.listener_count(), 0);
    }
}
