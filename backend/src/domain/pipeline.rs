//! Request pipeline for free-text messages.
//!
//! parse → build → execute, linear and bounded by one deadline. When the
//! deadline elapses the in-flight future is dropped; nothing is retried.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use super::execution::{ExecutionBridge, ExecutionError};
use super::intent::Intent;
use super::intent_parser::{IntentParseError, IntentParser};
use super::query::{QueryBuildError, QueryDocument, build_query};

/// Successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Intent the message resolved to.
    pub intent: Intent,
    /// Executor data.
    pub data: Value,
}

/// Stage at which a pipeline run stopped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The message could not be classified.
    #[error(transparent)]
    Parse(#[from] IntentParseError),
    /// The intent has no valid query shape.
    #[error("{source}")]
    Build {
        /// Intent that failed to render.
        intent: Intent,
        /// Builder failure.
        source: QueryBuildError,
    },
    /// The executor reported errors.
    #[error("{source}")]
    Execution {
        /// Intent that was executed.
        intent: Intent,
        /// Document that was executed.
        document: QueryDocument,
        /// Executor failure with partial data.
        source: ExecutionError,
    },
    /// The request deadline elapsed before completion.
    #[error("request deadline of {}ms exceeded", deadline.as_millis())]
    DeadlineExceeded {
        /// Configured deadline.
        deadline: Duration,
    },
}

/// Wires parser, builder, and bridge together.
#[derive(Clone)]
pub struct IntentPipeline {
    parser: IntentParser,
    bridge: ExecutionBridge,
    deadline: Duration,
}

impl IntentPipeline {
    /// Assemble a pipeline bounded by `deadline`.
    pub fn new(parser: IntentParser, bridge: ExecutionBridge, deadline: Duration) -> Self {
        Self {
            parser,
            bridge,
            deadline,
        }
    }

    /// Run `message` through every stage.
    ///
    /// # Errors
    ///
    /// Returns the [`PipelineError`] of the first stage that failed, or
    /// [`PipelineError::DeadlineExceeded`].
    pub async fn run(&self, message: &str) -> Result<PipelineOutcome, PipelineError> {
        timeout(self.deadline, self.run_stages(message))
            .await
            .unwrap_or_else(|_| {
                warn!(deadline_ms = self.deadline.as_millis(), "pipeline deadline exceeded");
                Err(PipelineError::DeadlineExceeded {
                    deadline: self.deadline,
                })
            })
    }

    async fn run_stages(&self, message: &str) -> Result<PipelineOutcome, PipelineError> {
        let intent = self.parser.parse(message).await?;
        info!(operation = %intent.operation(), "message classified");

        let document = match build_query(&intent) {
            Ok(document) => document,
            Err(source) => return Err(PipelineError::Build { intent, source }),
        };
        info!(document = %document.redacted(), "query document built");

        match self.bridge.execute(&document).await {
            Ok(data) => Ok(PipelineOutcome { intent, data }),
            Err(source) => Err(PipelineError::Execution {
                intent,
                document,
                source,
            }),
        }
    }
}
