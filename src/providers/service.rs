//! HTTP-backed search service

use super::traits::{Provider, ProviderError, SearchService};
use crate::network::HttpClient;
use crate::query::QueryState;
use crate::results::SearchResult;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs a [`Provider`]'s requests through the shared HTTP client
pub struct ProviderSearch<P> {
    provider: P,
    client: HttpClient,
}

impl<P: Provider> ProviderSearch<P> {
    pub fn new(provider: P, client: HttpClient) -> Self {
        Self { provider, client }
    }
}

#[async_trait]
impl<P: Provider> SearchService for ProviderSearch<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn search(&self, state: &QueryState) -> Result<SearchResult, ProviderError> {
        let start = Instant::now();
        let request = self.provider.request(state)?;

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", self.provider.name(), e);
                return Err(e);
            }
        };

        let result = match self.provider.response(response, state) {
            Ok(result) => result,
            Err(e) if e.is_rate_limited() => {
                warn!("{} is rate limiting searches", self.provider.name());
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        debug!(
            "{} returned {} of {} hits in {:?}",
            self.provider.name(),
            result.hits.len(),
            result.total_hits,
            start.elapsed()
        );

        Ok(result)
    }
}
