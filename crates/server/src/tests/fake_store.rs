use std::{sync::Mutex, time::Duration};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use shared::domain::Entry;
use storage::{BufferedRows, DataStore, ExecResult, RowCursor, Value};

const ENTRY_COLUMNS: [&str; 5] = ["id", "slug", "title", "date", "content"];

/// Deterministic stand-in for the SQLite store.
///
/// Every query returns the same canned rows regardless of the statement, and
/// every statement passed to `execute` is recorded for later inspection.
pub(crate) struct FakeStore {
    rows: Vec<Vec<Value>>,
    fail_queries: bool,
    fail_executes: bool,
    fail_pings: bool,
    query_delay: Option<Duration>,
    rows_affected: u64,
    pub(crate) executed: Mutex<Vec<(String, Vec<Value>)>>,
    pub(crate) queries: Mutex<usize>,
}

impl FakeStore {
    pub(crate) fn empty() -> Self {
        Self {
            rows: Vec::new(),
            fail_queries: false,
            fail_executes: false,
            fail_pings: false,
            query_delay: None,
            rows_affected: 1,
            executed: Mutex::new(Vec::new()),
            queries: Mutex::new(0),
        }
    }

    pub(crate) fn with_entry(entry: &Entry) -> Self {
        Self {
            rows: vec![vec![
                Value::from(entry.id),
                Value::from(entry.slug.as_str()),
                Value::from(entry.title.as_str()),
                Value::from(entry.date.as_str()),
                Value::from(entry.content.as_str()),
            ]],
            ..Self::empty()
        }
    }

    pub(crate) fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub(crate) fn failing_executes(mut self) -> Self {
        self.fail_executes = true;
        self
    }

    pub(crate) fn failing_pings(mut self) -> Self {
        self.fail_pings = true;
        self
    }

    /// Every query waits this long before answering.
    pub(crate) fn sleeping(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub(crate) fn affecting(mut self, rows_affected: u64) -> Self {
        self.rows_affected = rows_affected;
        self
    }

    pub(crate) fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for FakeStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {}

    async fn execute(&self, statement: &str, args: &[Value]) -> Result<ExecResult> {
        if self.fail_executes {
            bail!("simulated execute failure");
        }
        self.executed
            .lock()
            .map_err(|_| anyhow!("fake store poisoned"))?
            .push((statement.to_string(), args.to_vec()));
        Ok(ExecResult {
            last_insert_id: 1,
            rows_affected: self.rows_affected,
        })
    }

    async fn query(&self, _statement: &str, _args: &[Value]) -> Result<Box<dyn RowCursor>> {
        *self
            .queries
            .lock()
            .map_err(|_| anyhow!("fake store poisoned"))? += 1;
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_queries {
            bail!("simulated query failure");
        }
        Ok(Box::new(BufferedRows::new(
            ENTRY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            self.rows.clone(),
        )))
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_pings {
            bail!("simulated ping failure");
        }
        Ok(())
    }
}
