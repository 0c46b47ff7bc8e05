//! Rendering and interaction module
//!
//! Defines the gateway, binder and URL reflection boundaries the runner talks
//! to, with a Tera-backed gateway, an in-memory listener registry and a
//! query-parameter reflector.

mod binder;
mod reflect;
mod templates;
mod traits;

pub use binder::ListenerRegistry;
pub use reflect::QueryParamReflector;
pub use templates::{FacetEntry, Page, TemplateRenderer};
pub use traits::*;
