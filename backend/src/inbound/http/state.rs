//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{TextUnderstanding, UserRepository};
use crate::domain::schema::{Schema, UserResolvers};
use crate::domain::{ExecutionBridge, IntentParser, IntentPipeline};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub text: Arc<dyn TextUnderstanding>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub schema: Schema,
    pub pipeline: IntentPipeline,
}

impl HttpState {
    /// Construct state from ports, bounding each `/ai` run by `deadline`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use user_intents::domain::ports::{FixtureTextUnderstanding, FixtureUserRepository};
    /// use user_intents::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let ports = HttpStatePorts {
    ///     users: Arc::new(FixtureUserRepository::default()),
    ///     text: Arc::new(FixtureTextUnderstanding::default()),
    /// };
    /// let state = HttpState::new(ports, Duration::from_secs(5));
    /// let _users = state.users.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, deadline: Duration) -> Self {
        let HttpStatePorts { users, text } = ports;
        let schema = Schema::new(UserResolvers::new(users.clone()));
        let pipeline = IntentPipeline::new(
            IntentParser::new(text),
            ExecutionBridge::new(schema.clone()),
            deadline,
        );
        Self {
            users,
            schema,
            pipeline,
        }
    }
}
