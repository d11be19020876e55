//! Domain primitives, the intent pipeline, and the user schema.
//!
//! Purpose: keep every transformation from free text to store call free of
//! transport concerns. Adapters plug in through [`ports`].
//!
//! Public surface:
//! - User types: [`UserId`], [`UserFields`], [`PrivateUser`], [`PublicUser`],
//!   [`UserUpdateMask`].
//! - Intents: [`Intent`], [`OperationKind`], [`IntentParser`].
//! - Documents: [`query::QueryDocument`] and [`query::build_query`].
//! - Execution: [`schema::Schema`], [`ExecutionBridge`], [`IntentPipeline`].

pub mod execution;
pub mod intent;
pub mod intent_parser;
pub mod pipeline;
pub mod ports;
pub mod query;
pub mod schema;
pub mod user;

pub use self::execution::{ExecutionBridge, ExecutionError};
pub use self::intent::{Intent, OperationKind};
pub use self::intent_parser::{IntentParseError, IntentParser};
pub use self::pipeline::{IntentPipeline, PipelineError, PipelineOutcome};
pub use self::user::{
    PrivateUser, PublicUser, UserFields, UserId, UserUpdateMask, UserValidationError,
};
