//! Query documents and the builder that renders intents into them.

mod builder;
mod document;

pub use builder::{QueryBuildError, build_query};
pub use document::{FieldSelection, InputValue, OperationType, QueryDocument, RedactedDocument};
