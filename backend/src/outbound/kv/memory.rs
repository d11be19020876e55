//! Process-local key-value store.
//!
//! Tables live behind one `RwLock`; every mutation holds the write lock for
//! its whole duration, so multi-attribute updates are atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Item, KeyValueStore, KeyValueStoreError, PutMode, UpdateRequest, item_key, project,
    resolve_update,
};

type Table = BTreeMap<String, Item>;

/// In-memory store with key-ordered tables.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    tables: Arc<RwLock<BTreeMap<String, Table>>>,
}

impl InMemoryKeyValueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn put_item(
        &self,
        table: &str,
        item: Item,
        mode: PutMode,
    ) -> Result<(), KeyValueStoreError> {
        let key = item_key(&item)?.to_owned();
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_owned()).or_default();
        if mode == PutMode::CreateOnly && rows.contains_key(&key) {
            return Err(KeyValueStoreError::condition_failed(format!(
                "item '{key}' already exists in '{table}'"
            )));
        }
        rows.insert(key, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &str,
        projection: &[String],
    ) -> Result<Option<Item>, KeyValueStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(key))
            .map(|item| project(item, projection)))
    }

    async fn scan(
        &self,
        table: &str,
        limit: Option<usize>,
        projection: &[String],
    ) -> Result<Vec<Item>, KeyValueStoreError> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .values()
            .take(limit.unwrap_or(usize::MAX))
            .map(|item| project(item, projection))
            .collect())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<(), KeyValueStoreError> {
        let assignments = resolve_update(&request)?;
        let mut tables = self.tables.write().await;
        let Some(item) = tables
            .get_mut(&request.table)
            .and_then(|rows| rows.get_mut(&request.key))
        else {
            return Err(KeyValueStoreError::condition_failed(format!(
                "item '{}' does not exist in '{}'",
                request.key, request.table
            )));
        };
        for (attribute, value) in assignments {
            item.insert(attribute.to_owned(), value.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<(), KeyValueStoreError> {
        if let Some(rows) = self.tables.write().await.get_mut(table) {
            rows.remove(key);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), KeyValueStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Store semantics relied on by the user repository.

    use rstest::{fixture, rstest};
    use update_expression::UpdateExpressionBuilder;

    use super::*;
    use crate::outbound::kv::KEY_ATTRIBUTE;

    const TABLE: &str = "users";

    fn item(key: &str, name: &str) -> Item {
        Item::from([
            (KEY_ATTRIBUTE.to_owned(), key.to_owned()),
            ("fName".to_owned(), name.to_owned()),
            ("password".to_owned(), "secret".to_owned()),
        ])
    }

    fn update(key: &str, pairs: &[(&str, &str)]) -> UpdateRequest {
        let mut builder = UpdateExpressionBuilder::new();
        for (attribute, value) in pairs {
            builder = builder
                .set(*attribute, (*value).to_owned())
                .expect("valid attribute");
        }
        let expression = builder.build().expect("non-empty update");
        UpdateRequest {
            table: TABLE.to_owned(),
            key: key.to_owned(),
            expression: expression.expression(),
            attribute_names: expression.attribute_names(),
            attribute_values: expression.into_attribute_values(),
        }
    }

    #[fixture]
    fn store() -> InMemoryKeyValueStore {
        InMemoryKeyValueStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn create_only_puts_refuse_existing_keys(store: InMemoryKeyValueStore) {
        store
            .put_item(TABLE, item("a", "Ada"), PutMode::CreateOnly)
            .await
            .expect("first put");

        let err = store
            .put_item(TABLE, item("a", "Alan"), PutMode::CreateOnly)
            .await
            .expect_err("second put");

        assert!(matches!(err, KeyValueStoreError::ConditionFailed { .. }));
        let stored = store.get_item(TABLE, "a", &[]).await.expect("get");
        assert_eq!(stored, Some(item("a", "Ada")));
    }

    #[rstest]
    #[tokio::test]
    async fn projections_never_return_other_attributes(store: InMemoryKeyValueStore) {
        store
            .put_item(TABLE, item("a", "Ada"), PutMode::Overwrite)
            .await
            .expect("put");

        let projection = vec![KEY_ATTRIBUTE.to_owned(), "fName".to_owned()];
        let fetched = store
            .get_item(TABLE, "a", &projection)
            .await
            .expect("get")
            .expect("present");

        assert!(!fetched.contains_key("password"));
        assert_eq!(fetched.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn scans_in_key_order_with_limit(store: InMemoryKeyValueStore) {
        for (key, name) in [("c", "Cy"), ("a", "Ada"), ("b", "Bo")] {
            store
                .put_item(TABLE, item(key, name), PutMode::Overwrite)
                .await
                .expect("put");
        }

        let keys: Vec<_> = store
            .scan(TABLE, Some(2), &[KEY_ATTRIBUTE.to_owned()])
            .await
            .expect("scan")
            .into_iter()
            .filter_map(|row| row.get(KEY_ATTRIBUTE).cloned())
            .collect();

        assert_eq!(keys, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[rstest]
    #[tokio::test]
    async fn updates_touch_only_assigned_attributes(store: InMemoryKeyValueStore) {
        store
            .put_item(TABLE, item("a", "Ada"), PutMode::Overwrite)
            .await
            .expect("put");

        store
            .update_item(update("a", &[("fName", "Augusta")]))
            .await
            .expect("update");

        let stored = store.get_item(TABLE, "a", &[]).await.expect("get").expect("present");
        assert_eq!(stored.get("fName").map(String::as_str), Some("Augusta"));
        assert_eq!(stored.get("password").map(String::as_str), Some("secret"));
    }

    #[rstest]
    #[tokio::test]
    async fn updates_require_an_existing_item(store: InMemoryKeyValueStore) {
        let err = store
            .update_item(update("ghost", &[("fName", "Nobody")]))
            .await
            .expect_err("absent item");

        assert!(matches!(err, KeyValueStoreError::ConditionFailed { .. }));
        assert_eq!(store.get_item(TABLE, "ghost", &[]).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn updates_cannot_rewrite_the_key(store: InMemoryKeyValueStore) {
        store
            .put_item(TABLE, item("a", "Ada"), PutMode::Overwrite)
            .await
            .expect("put");

        let err = store
            .update_item(update("a", &[("fName", "Eve"), (KEY_ATTRIBUTE, "b")]))
            .await
            .expect_err("key write");

        assert!(matches!(err, KeyValueStoreError::InvalidRequest { .. }));
        let stored = store.get_item(TABLE, "a", &[]).await.expect("get");
        assert_eq!(stored, Some(item("a", "Ada")), "no assignment applied");
    }

    #[rstest]
    #[tokio::test]
    async fn deletes_are_idempotent(store: InMemoryKeyValueStore) {
        store.delete_item(TABLE, "never-existed").await.expect("delete absent");
        store
            .put_item(TABLE, item("a", "Ada"), PutMode::Overwrite)
            .await
            .expect("put");
        store.delete_item(TABLE, "a").await.expect("delete");
        store.delete_item(TABLE, "a").await.expect("delete again");

        assert_eq!(store.get_item(TABLE, "a", &[]).await.expect("get"), None);
    }
}
