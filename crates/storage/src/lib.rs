use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

mod memory;
pub mod registrations;

pub use memory::MemoryStore;
pub use registrations::RegistrationRepository;

/// Per-key write counter. `Revision(0)` means the key was never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub i64);

impl Revision {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSnapshot {
    pub value: Option<String>,
    pub revision: Revision,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write to `{key}` expected revision {expected} but found {actual}")]
    Conflict {
        key: String,
        expected: i64,
        actual: i64,
    },
    #[error("failed to encode stored value for `{key}`: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// String key-value storage with optimistic concurrency.
///
/// `set_item` only succeeds when the caller's `expected` revision still
/// matches the stored one; removal always succeeds and also advances the
/// revision so that stale writers are rejected afterwards.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> StoreResult<ItemSnapshot>;
    async fn set_item(&self, key: &str, value: &str, expected: Revision) -> StoreResult<Revision>;
    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> anyhow::Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn current_revision(&self, key: &str) -> anyhow::Result<Revision> {
        let revision: Option<i64> =
            sqlx::query_scalar("SELECT revision FROM kv_items WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to read revision for `{key}`"))?;
        Ok(Revision(revision.unwrap_or_default()))
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get_item(&self, key: &str) -> StoreResult<ItemSnapshot> {
        let row = sqlx::query("SELECT value, revision FROM kv_items WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read `{key}`"))?;

        let Some(row) = row else {
            return Ok(ItemSnapshot::default());
        };
        Ok(ItemSnapshot {
            value: row.try_get::<Option<String>, _>("value").context("bad value column")?,
            revision: Revision(row.try_get::<i64, _>("revision").context("bad revision column")?),
        })
    }

    async fn set_item(&self, key: &str, value: &str, expected: Revision) -> StoreResult<Revision> {
        let result = if expected == Revision::default() {
            sqlx::query(
                "INSERT INTO kv_items (key, value, revision) VALUES (?, ?, 1)
                 ON CONFLICT(key) DO NOTHING",
            )
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE kv_items
                 SET value = ?, revision = revision + 1, updated_at = CURRENT_TIMESTAMP
                 WHERE key = ? AND revision = ?",
            )
            .bind(value)
            .bind(key)
            .bind(expected.0)
            .execute(&self.pool)
            .await
        };
        let result = result.with_context(|| format!("failed to write `{key}`"))?;

        if result.rows_affected() == 0 {
            let actual = self.current_revision(key).await?;
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected.0,
                actual: actual.0,
            });
        }
        Ok(expected.next())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE kv_items
             SET value = NULL, revision = revision + 1, updated_at = CURRENT_TIMESTAMP
             WHERE key = ?",
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to remove `{key}`"))?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
