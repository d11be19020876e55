//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. This
//! module holds the app harness and a store double that counts writes.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::Value;
use tracing::Level;
use tracing::subscriber::DefaultGuard;

use user_intents::RequestSpan;
use user_intents::domain::ports::TextUnderstanding;
use user_intents::inbound::http::ai::ai;
use user_intents::inbound::http::graphql::{graphql, json_config};
use user_intents::inbound::http::state::{HttpState, HttpStatePorts};
use user_intents::outbound::kv::{
    InMemoryKeyValueStore, Item, KeyValueStore, KeyValueStoreError, PutMode, UpdateRequest,
};
use user_intents::outbound::persistence::{DEFAULT_USERS_TABLE, KeyValueUserRepository};

/// In-memory store that counts every write it receives, rejected ones included.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: InMemoryKeyValueStore,
    writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Full stored item, private attributes included.
    pub async fn raw_item(&self, key: &str) -> Option<Item> {
        self.inner
            .get_item(DEFAULT_USERS_TABLE, key, &[])
            .await
            .expect("in-memory reads succeed")
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn put_item(
        &self,
        table: &str,
        item: Item,
        mode: PutMode,
    ) -> Result<(), KeyValueStoreError> {
        self.record_write();
        self.inner.put_item(table, item, mode).await
    }

    async fn get_item(
        &self,
        table: &str,
        key: &str,
        projection: &[String],
    ) -> Result<Option<Item>, KeyValueStoreError> {
        self.inner.get_item(table, key, projection).await
    }

    async fn scan(
        &self,
        table: &str,
        limit: Option<usize>,
        projection: &[String],
    ) -> Result<Vec<Item>, KeyValueStoreError> {
        self.inner.scan(table, limit, projection).await
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<(), KeyValueStoreError> {
        self.record_write();
        self.inner.update_item(request).await
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<(), KeyValueStoreError> {
        self.record_write();
        self.inner.delete_item(table, key).await
    }

    async fn ping(&self) -> Result<(), KeyValueStoreError> {
        self.inner.ping().await
    }
}

/// Shared HTTP state over a fresh [`CountingStore`].
pub fn harness(text: Arc<dyn TextUnderstanding>) -> (web::Data<HttpState>, CountingStore) {
    let store = CountingStore::default();
    let users = Arc::new(KeyValueUserRepository::new(
        Arc::new(store.clone()),
        DEFAULT_USERS_TABLE,
    ));
    let state = HttpState::new(HttpStatePorts { users, text }, Duration::from_secs(5));
    (web::Data::new(state), store)
}

/// POST `body` to `uri` on an app built around `state`.
///
/// The state is shared, so consecutive calls observe each other's writes.
pub async fn post_json(state: &web::Data<HttpState>, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(state, uri, body.to_string()).await
}

/// POST a raw JSON payload, which need not be valid JSON.
pub async fn post_raw(
    state: &web::Data<HttpState>,
    uri: &str,
    payload: impl Into<String>,
) -> (StatusCode, Value) {
    let request = test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", "application/json"))
        .set_payload(payload.into());
    send(state, request).await
}

/// POST with no body and no content type.
pub async fn post_without_body(state: &web::Data<HttpState>, uri: &str) -> (StatusCode, Value) {
    send(state, test::TestRequest::post().uri(uri)).await
}

async fn send(state: &web::Data<HttpState>, request: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(RequestSpan)
            .service(ai)
            .service(graphql),
    )
    .await;
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

/// Log sink shared between a test and the subscriber writing into it.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's events at every level into the sink until the
    /// returned guard drops.
    pub fn install(&self) -> DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let buffer = self.0.lock().expect("log buffer lock");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer lock")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
