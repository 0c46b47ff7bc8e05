//! Search orchestration module
//!
//! Turns query-state changes into provider calls, renders the outcome and
//! rebinds the controls that feed the next change back in.

mod executor;
mod models;

pub use executor::Runner;
pub use models::*;
