// src/store/mod.rs
//
// Collection-oriented persistence: each named collection is read and
// written as a whole list of JSON records.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;

mod postgres;

pub use postgres::PgStore;

pub const COMPLAINTS: &str = "complaints";
pub const FIELD_MANAGERS: &str = "field_managers";

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// All records in `collection`; empty if it was never written.
    async fn get(&self, collection: &str) -> Result<Vec<serde_json::Value>>;

    /// Replace the whole collection.
    async fn put(&self, collection: &str, records: Vec<serde_json::Value>) -> Result<()>;
}

pub async fn load<T: DeserializeOwned>(store: &dyn CollectionStore, collection: &str) -> Result<Vec<T>> {
    store
        .get(collection)
        .await?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Into::into))
        .collect()
}

pub async fn save<T: Serialize>(store: &dyn CollectionStore, collection: &str, records: &[T]) -> Result<()> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    store.put(collection, values).await
}

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, collection: &str, records: Vec<serde_json::Value>) -> Result<()> {
        self.collections
            .write()
            .await
            .insert(collection.to_string(), records);
        Ok(())
    }
}
