//! HTTP API layer for roompoll.
//!
//! JSON-over-HTTP endpoints for rooms, polls, votes and results:
//!
//! - **Endpoints**: one router per resource, merged by [`router`]
//! - **Extractors**: JSON bodies with enveloped rejections
//! - **Middleware**: shared [`middleware::AppState`] and the HTTP layer stack
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, apply_layers};
