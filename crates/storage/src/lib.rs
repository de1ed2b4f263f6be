use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

mod cursor;
pub mod journal;

pub use cursor::{BufferedRows, RowCursor, ScanTarget, Value};

const MEMORY_URL: &str = "sqlite::memory:";

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// The relational store the web layer talks to.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn connect(&self) -> Result<()>;
    async fn close(&self);
    async fn execute(&self, statement: &str, args: &[Value]) -> Result<ExecResult>;
    async fn query(&self, statement: &str, args: &[Value]) -> Result<Box<dyn RowCursor>>;

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    /// Opens the database, creating the file when missing, and applies migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let storage = Self::lazy(database_url)?;
        storage.connect().await?;
        Ok(storage)
    }

    /// Builds the pool without touching the database until first use.
    pub fn lazy(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if database_url.starts_with(MEMORY_URL) {
            // every connection to :memory: is a separate database
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        Ok(Self {
            pool: pool_options.connect_lazy_with(connect_options),
        })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for Storage {
    async fn connect(&self) -> Result<()> {
        self.health_check().await?;
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to apply journal migrations")?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn execute(&self, statement: &str, args: &[Value]) -> Result<ExecResult> {
        let result = bind_values(sqlx::query(statement), args)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to execute `{statement}`"))?;
        Ok(ExecResult {
            last_insert_id: result.last_insert_rowid(),
            rows_affected: result.rows_affected(),
        })
    }

    async fn query(&self, statement: &str, args: &[Value]) -> Result<Box<dyn RowCursor>> {
        let rows = bind_values(sqlx::query(statement), args)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to query `{statement}`"))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| sqlx::Column::name(column).to_string())
                    .collect()
            })
            .unwrap_or_default();
        let values = rows.iter().map(row_values).collect::<Result<Vec<_>>>()?;
        Ok(Box::new(BufferedRows::new(columns, values)))
    }

    async fn ping(&self) -> Result<()> {
        self.health_check().await
    }
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(*v),
            Value::Text(text) => query.bind(text.as_str()),
        };
    }
    query
}

fn row_values(row: &SqliteRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|index| column_value(row, index)).collect()
}

fn column_value(row: &SqliteRow, index: usize) -> Result<Value> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(Value::Null, Value::Integer));
    }
    let value: Option<String> = row
        .try_get(index)
        .with_context(|| format!("unsupported value in column {index}"))?;
    Ok(value.map_or(Value::Null, Value::Text))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
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
    if database_url.starts_with(MEMORY_URL) || !database_url.starts_with("sqlite:") {
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
