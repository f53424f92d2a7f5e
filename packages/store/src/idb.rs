//! # IndexedDB key-value store: browser-side persistence
//!
//! [`IdbStore`] is the [`KeyValueStore`] used on the **web platform**. It keeps cache
//! records in the browser's IndexedDB via [`rexie`], which gives the client an
//! offline-capable copy of the user's workouts.
//!
//! One database per user (`"liftbook-<user_id>"`, or `"liftbook"` when signed out),
//! version 1, with a single object store:
//!
//! | IndexedDB store | Key | Value |
//! |-----------------|-----|-------|
//! | `"records"` | cache key (e.g. `"workouts/<id>"`) | `Vec<u8>` via `serde_wasm_bindgen` |
//!
//! A fresh [`Rexie`] connection is opened for every operation; the browser caches the
//! underlying connection. All methods swallow errors (reads return `None`, writes do
//! nothing), so an unavailable IndexedDB degrades to "no local data" and the server
//! copy is used instead.

use crate::cache::KeyValueStore;
use rexie::{ObjectStore as RexieObjectStore, Rexie, TransactionMode};
use wasm_bindgen::JsValue;

const DEFAULT_DB_NAME: &str = "liftbook";
const DB_VERSION: u32 = 1;
const RECORDS_STORE: &str = "records";

/// IndexedDB-backed KeyValueStore for the web platform.
#[derive(Clone)]
pub struct IdbStore {
    db_name: String,
}

impl IdbStore {
    /// Create an unscoped store using the default `"liftbook"` database.
    pub fn new() -> Self {
        Self::with_namespace(None)
    }

    /// Create a store scoped to an optional user id.
    pub fn with_namespace(namespace: Option<&str>) -> Self {
        let db_name = match namespace {
            Some(ns) => format!("{DEFAULT_DB_NAME}-{ns}"),
            None => DEFAULT_DB_NAME.to_string(),
        };
        Self { db_name }
    }

    async fn open_db(&self) -> Result<Rexie, rexie::Error> {
        Rexie::builder(&self.db_name)
            .version(DB_VERSION)
            .add_object_store(RexieObjectStore::new(RECORDS_STORE))
            .build()
            .await
    }

    /// Drop the whole database, e.g. on logout.
    pub async fn clear(&self) {
        let _ = Rexie::delete(&self.db_name).await;
    }
}

impl Default for IdbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for IdbStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let db = self.open_db().await.ok()?;
        let tx = db
            .transaction(&[RECORDS_STORE], TransactionMode::ReadOnly)
            .ok()?;
        let store = tx.store(RECORDS_STORE).ok()?;

        let value = store.get(JsValue::from_str(key)).await.ok()??;
        serde_wasm_bindgen::from_value(value).ok()
    }

    async fn put(&self, key: &str, data: Vec<u8>) {
        let Ok(db) = self.open_db().await else {
            return;
        };
        let Ok(tx) = db.transaction(&[RECORDS_STORE], TransactionMode::ReadWrite) else {
            return;
        };
        let Ok(store) = tx.store(RECORDS_STORE) else {
            return;
        };

        let key = JsValue::from_str(key);
        let value = serde_wasm_bindgen::to_value(&data).unwrap_or(JsValue::NULL);
        let _ = store.put(&value, Some(&key)).await;
        let _ = tx.done().await;
    }

    async fn remove(&self, key: &str) {
        let Ok(db) = self.open_db().await else {
            return;
        };
        let Ok(tx) = db.transaction(&[RECORDS_STORE], TransactionMode::ReadWrite) else {
            return;
        };
        let Ok(store) = tx.store(RECORDS_STORE) else {
            return;
        };
        let _ = store.delete(JsValue::from_str(key)).await;
        let _ = tx.done().await;
    }

    async fn keys(&self, prefix: &str) -> Vec<String> {
        let Ok(db) = self.open_db().await else {
            return Vec::new();
        };
        let Ok(tx) = db.transaction(&[RECORDS_STORE], TransactionMode::ReadOnly) else {
            return Vec::new();
        };
        let Ok(store) = tx.store(RECORDS_STORE) else {
            return Vec::new();
        };
        let Ok(keys) = store.get_all_keys(None, None).await else {
            return Vec::new();
        };
        keys.into_iter()
            .filter_map(|k| k.as_string())
            .filter(|k| k.starts_with(prefix))
            .collect()
    }
}
