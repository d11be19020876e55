//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **kv**: key-value store clients (in-memory, Redis)
//! - **persistence**: the user repository over a key-value table
//! - **text**: text-understanding clients (Anthropic HTTP, offline keywords)
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod kv;
pub mod persistence;
pub mod text;
