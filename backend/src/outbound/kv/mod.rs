//! Key-value store clients.
//!
//! Items are flat string maps keyed by [`KEY_ATTRIBUTE`]. Every mutation a
//! client exposes applies atomically: an update either writes all of its
//! assignments or none of them.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::ports::define_port_error;

mod memory;
mod redis;

pub use memory::InMemoryKeyValueStore;
pub use redis::{RedisKeyValueStore, RedisStoreOptions};

/// Partition key attribute of every table.
pub const KEY_ATTRIBUTE: &str = "id";

/// One stored item: attribute name to value.
pub type Item = BTreeMap<String, String>;

define_port_error! {
    /// Errors raised by key-value store clients.
    pub enum KeyValueStoreError {
        /// The store could not be reached.
        Connection { message: String } => "key-value store connection failed: {message}",
        /// The call exceeded its deadline.
        Timeout { message: String } => "key-value store timed out: {message}",
        /// A conditional write found the item in the wrong state.
        ConditionFailed { message: String } => "key-value store condition failed: {message}",
        /// The client rejected the request before applying it.
        InvalidRequest { message: String } => "key-value store request invalid: {message}",
        /// A stored value could not be decoded.
        Decode { message: String } => "key-value store returned malformed data: {message}",
    }
}

/// Condition attached to a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// Fail with [`KeyValueStoreError::ConditionFailed`] when the key exists.
    CreateOnly,
    /// Replace any existing item.
    Overwrite,
}

/// A partial update expressed as a `SET` instruction with alias tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Target table.
    pub table: String,
    /// Partition key of the item.
    pub key: String,
    /// Rendered instruction, e.g. `SET #email = :email`.
    pub expression: String,
    /// Name placeholders to attribute names.
    pub attribute_names: BTreeMap<String, String>,
    /// Value placeholders to values.
    pub attribute_values: BTreeMap<String, String>,
}

/// Client for a table-oriented key-value store.
///
/// Handles are shared across requests and must be safe for concurrent use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `item`, which must carry [`KEY_ATTRIBUTE`].
    async fn put_item(
        &self,
        table: &str,
        item: Item,
        mode: PutMode,
    ) -> Result<(), KeyValueStoreError>;

    /// Read one item, restricted to `projection` when it is non-empty.
    async fn get_item(
        &self,
        table: &str,
        key: &str,
        projection: &[String],
    ) -> Result<Option<Item>, KeyValueStoreError>;

    /// Read items in key order, at most `limit` when given.
    async fn scan(
        &self,
        table: &str,
        limit: Option<usize>,
        projection: &[String],
    ) -> Result<Vec<Item>, KeyValueStoreError>;

    /// Apply a `SET` instruction to an existing item.
    ///
    /// Fails with [`KeyValueStoreError::ConditionFailed`] when the item is
    /// absent; nothing is written in that case.
    async fn update_item(&self, request: UpdateRequest) -> Result<(), KeyValueStoreError>;

    /// Remove an item. Removing an absent item succeeds.
    async fn delete_item(&self, table: &str, key: &str) -> Result<(), KeyValueStoreError>;

    /// Cheap round trip used by readiness probes.
    async fn ping(&self) -> Result<(), KeyValueStoreError>;
}

/// Restrict `item` to `projection`; an empty projection keeps everything.
fn project(item: &Item, projection: &[String]) -> Item {
    if projection.is_empty() {
        return item.clone();
    }
    projection
        .iter()
        .filter_map(|name| item.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// Resolve an update request into attribute assignments, refusing key writes.
fn resolve_update(request: &UpdateRequest) -> Result<Vec<(&str, &String)>, KeyValueStoreError> {
    let assignments = update_expression::resolve_assignments(
        &request.expression,
        &request.attribute_names,
        &request.attribute_values,
    )
    .map_err(|err| KeyValueStoreError::invalid_request(err.to_string()))?;
    if assignments
        .iter()
        .any(|(attribute, _)| *attribute == KEY_ATTRIBUTE)
    {
        return Err(KeyValueStoreError::invalid_request(format!(
            "attribute '{KEY_ATTRIBUTE}' is the partition key and cannot be updated"
        )));
    }
    Ok(assignments)
}

fn item_key(item: &Item) -> Result<&str, KeyValueStoreError> {
    item.get(KEY_ATTRIBUTE)
        .map(String::as_str)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            KeyValueStoreError::invalid_request(format!("item lacks '{KEY_ATTRIBUTE}'"))
        })
}
