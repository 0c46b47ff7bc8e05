//! Result types for search results
//!
//! This module defines the provider-independent result shape consumed by rendering.

mod types;

pub use types::*;
