//! Pet adoption backend: listings, contact links and session-gated editing.
//!
//! The crate follows a ports-and-adapters layout. [`domain`] holds the
//! record store semantics, query engine and session state machine;
//! [`inbound`] exposes them over HTTP; [`outbound`] provides the in-memory
//! store and the identity provider adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
