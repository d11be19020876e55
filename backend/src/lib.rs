//! User records behind a typed schema, reachable through free-text messages.
//!
//! - [`domain`]: user types, intents, the query builder, schema executor, and
//!   the request pipeline
//! - [`outbound`]: key-value stores, the user repository, and
//!   text-understanding clients
//! - [`inbound`]: actix-web handlers
//! - [`middleware`]: request span middleware
//! - [`config`]: service settings

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::RequestSpan;
