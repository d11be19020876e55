//! Request middleware.
//!
//! Purpose: define middleware for request lifecycle concerns such as
//! correlation and structured request logging.

pub mod request_span;

pub use request_span::{RequestId, RequestSpan};
