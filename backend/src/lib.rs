//! Request-handling core of a micro-blogging service.
//!
//! Layout follows ports and adapters: [`domain`] owns the routes and the
//! storage ports, [`inbound`] exposes them over HTTP, [`outbound`] provides
//! storage and [`middleware`] carries request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
