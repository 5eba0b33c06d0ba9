// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{query, query_as, Pool, Postgres};

use super::CollectionStore;
use crate::error::Result;

/// One row per collection; the whole list lives in a jsonb array.
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        query(
            r#"
            CREATE TABLE IF NOT EXISTS public.collections (
                name       TEXT PRIMARY KEY,
                records    JSONB NOT NULL DEFAULT '[]'::jsonb,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn get(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> =
            query_as(r#"SELECT records FROM public.collections WHERE name=$1"#)
                .bind(collection)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match row {
            Some((serde_json::Value::Array(items),)) => items,
            _ => Vec::new(),
        })
    }

    async fn put(&self, collection: &str, records: Vec<serde_json::Value>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        query(
            r#"
            INSERT INTO public.collections(name, records, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (name) DO UPDATE
               SET records = EXCLUDED.records,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(collection)
        .bind(serde_json::Value::Array(records))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
