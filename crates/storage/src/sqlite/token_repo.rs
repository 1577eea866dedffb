use async_trait::async_trait;
use sqlx::{Row, Sqlite, Transaction};

use crate::repository::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, StorageError, TokenStore};
use pycoder_core::model::TokenPair;

use super::SqliteRepository;

fn conn_err(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

impl SqliteRepository {
    async fn read_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM credentials WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn_err)?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    async fn upsert_value(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO credentials (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(self.clock.now())
        .execute(&mut **tx)
        .await
        .map_err(conn_err)?;
        Ok(())
    }

    async fn write_values(&self, values: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn_err)?;
        for (key, value) in values {
            self.upsert_value(&mut tx, key, value).await?;
        }
        tx.commit().await.map_err(conn_err)
    }
}

#[async_trait]
impl TokenStore for SqliteRepository {
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.read_value(ACCESS_TOKEN_KEY).await
    }

    async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.read_value(REFRESH_TOKEN_KEY).await
    }

    async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.write_values(&[
            (ACCESS_TOKEN_KEY, tokens.access.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh.as_str()),
        ])
        .await?;
        tracing::debug!("stored token pair");
        Ok(())
    }

    async fn save_access_token(&self, access: &str) -> Result<(), StorageError> {
        self.write_values(&[(ACCESS_TOKEN_KEY, access)]).await
    }

    async fn save_refresh_token(&self, refresh: &str) -> Result<(), StorageError> {
        self.write_values(&[(REFRESH_TOKEN_KEY, refresh)]).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM credentials WHERE key IN (?1, ?2)")
            .bind(ACCESS_TOKEN_KEY)
            .bind(REFRESH_TOKEN_KEY)
            .execute(&self.pool)
            .await
            .map_err(conn_err)?;
        tracing::debug!("cleared stored tokens");
        Ok(())
    }
}
