//! Execution outcome types

use crate::providers::ProviderError;
use thiserror::Error;

/// Why an execution did not render
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider call failed; the previous render is left in place
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A newer execution already rendered; this response was dropped
    #[error("execution {sequence} superseded by execution {latest}")]
    StaleExecution { sequence: u64, latest: u64 },
}

impl SearchError {
    /// Stale executions are expected under rapid input and are not user-facing
    pub fn is_stale(&self) -> bool {
        matches!(self, SearchError::StaleExecution { .. })
    }
}
