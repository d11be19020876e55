//! Redis-backed key-value store behind a `bb8` pool.
//!
//! Layout per table `t`:
//! - `t:item:<key>` is a hash holding the item's attributes.
//! - `t:index` is a sorted set of keys, all scored `0`, so `ZRANGE` walks
//!   keys in lexicographic order.
//!
//! Conditional writes run as Lua scripts so the existence check and the
//! write apply as one atomic step.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{self, RedisError, Script};
use tracing::debug;

use super::{
    Item, KeyValueStore, KeyValueStoreError, PutMode, UpdateRequest, item_key, resolve_update,
};

const PUT_SCRIPT: &str = r"
if ARGV[2] == 'create' and redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], unpack(ARGV, 3))
redis.call('ZADD', KEYS[2], 0, ARGV[1])
return 1
";

const UPDATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

/// Pool tuning for [`RedisKeyValueStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedisStoreOptions {
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// How long a caller waits for a pooled connection.
    pub connection_timeout: Duration,
}

impl Default for RedisStoreOptions {
    fn default() -> Self {
        Self {
            pool_size: 8,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

/// Key-value store adapter over Redis hashes.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    pool: Pool<RedisConnectionManager>,
    put_script: Script,
    update_script: Script,
}

impl RedisKeyValueStore {
    /// Build a pool for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError::Connection`] when the URL is invalid or
    /// the pool cannot be initialised.
    pub async fn connect(url: &str, options: RedisStoreOptions) -> Result<Self, KeyValueStoreError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| KeyValueStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(options.pool_size.max(1))
            .connection_timeout(options.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| KeyValueStoreError::connection(err.to_string()))?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self {
            pool,
            put_script: Script::new(PUT_SCRIPT),
            update_script: Script::new(UPDATE_SCRIPT),
        }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, KeyValueStoreError> {
        self.pool.get().await.map_err(map_pool_error)
    }
}

fn item_hash_key(table: &str, key: &str) -> String {
    format!("{table}:item:{key}")
}

fn index_key(table: &str) -> String {
    format!("{table}:index")
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn put_item(
        &self,
        table: &str,
        item: Item,
        mode: PutMode,
    ) -> Result<(), KeyValueStoreError> {
        let key = item_key(&item)?.to_owned();
        let mut invocation = self.put_script.prepare_invoke();
        invocation
            .key(item_hash_key(table, &key))
            .key(index_key(table))
            .arg(&key)
            .arg(match mode {
                PutMode::CreateOnly => "create",
                PutMode::Overwrite => "overwrite",
            });
        for (attribute, value) in &item {
            invocation.arg(attribute).arg(value);
        }

        let mut conn = self.connection().await?;
        let written: i64 = invocation
            .invoke_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        if written == 0 {
            return Err(KeyValueStoreError::condition_failed(format!(
                "item '{key}' already exists in '{table}'"
            )));
        }
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &str,
        projection: &[String],
    ) -> Result<Option<Item>, KeyValueStoreError> {
        let hash_key = item_hash_key(table, key);
        let mut conn = self.connection().await?;

        if projection.is_empty() {
            let all: HashMap<String, String> = redis::cmd("HGETALL")
                .arg(&hash_key)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            return Ok((!all.is_empty()).then(|| all.into_iter().collect()));
        }

        let (exists, values): (bool, Vec<Option<String>>) = redis::pipe()
            .atomic()
            .cmd("EXISTS")
            .arg(&hash_key)
            .cmd("HMGET")
            .arg(&hash_key)
            .arg(projection)
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(exists.then(|| zip_projection(projection, values)))
    }

    async fn scan(
        &self,
        table: &str,
        limit: Option<usize>,
        projection: &[String],
    ) -> Result<Vec<Item>, KeyValueStoreError> {
        let stop = match limit {
            Some(0) => return Ok(Vec::new()),
            Some(n) => i64::try_from(n).map_or(-1, |n| n - 1),
            None => -1,
        };
        let mut conn = self.connection().await?;
        let keys: Vec<String> = redis::cmd("ZRANGE")
            .arg(index_key(table))
            .arg(0)
            .arg(stop)
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in &keys {
            let hash_key = item_hash_key(table, key);
            if projection.is_empty() {
                pipe.cmd("HGETALL").arg(hash_key);
            } else {
                pipe.cmd("HMGET").arg(hash_key).arg(projection);
            }
        }

        // Keys deleted between ZRANGE and the pipeline come back empty.
        if projection.is_empty() {
            let rows: Vec<HashMap<String, String>> = pipe
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            Ok(rows
                .into_iter()
                .filter(|row| !row.is_empty())
                .map(|row| row.into_iter().collect())
                .collect())
        } else {
            let rows: Vec<Vec<Option<String>>> = pipe
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            Ok(rows
                .into_iter()
                .filter(|values| values.iter().any(Option::is_some))
                .map(|values| zip_projection(projection, values))
                .collect())
        }
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<(), KeyValueStoreError> {
        let assignments = resolve_update(&request)?;
        let mut invocation = self.update_script.prepare_invoke();
        invocation.key(item_hash_key(&request.table, &request.key));
        for (attribute, value) in assignments {
            invocation.arg(attribute).arg(value);
        }

        let mut conn = self.connection().await?;
        let written: i64 = invocation
            .invoke_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        if written == 0 {
            return Err(KeyValueStoreError::condition_failed(format!(
                "item '{}' does not exist in '{}'",
                request.key, request.table
            )));
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<(), KeyValueStoreError> {
        let mut conn = self.connection().await?;
        let (): () = redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(item_hash_key(table, key))
            .ignore()
            .cmd("ZREM")
            .arg(index_key(table))
            .arg(key)
            .ignore()
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), KeyValueStoreError> {
        let mut conn = self.connection().await?;
        let reply: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        debug!(reply, "redis ping");
        Ok(())
    }
}

fn zip_projection(projection: &[String], values: Vec<Option<String>>) -> Item {
    projection
        .iter()
        .zip(values)
        .filter_map(|(name, value)| value.map(|present| (name.clone(), present)))
        .collect()
}

fn map_pool_error(error: RunError<RedisError>) -> KeyValueStoreError {
    match error {
        RunError::User(inner) => map_redis_error(inner),
        RunError::TimedOut => {
            KeyValueStoreError::timeout("timed out waiting for a pooled connection")
        }
    }
}

fn map_redis_error(error: RedisError) -> KeyValueStoreError {
    if error.is_timeout() {
        KeyValueStoreError::timeout(error.to_string())
    } else if error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped()
    {
        KeyValueStoreError::connection(error.to_string())
    } else {
        KeyValueStoreError::invalid_request(error.to_string())
    }
}
