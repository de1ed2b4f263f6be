use anyhow::{anyhow, bail, Result};
use shared::domain::EntryId;

/// A single column value as it crosses the store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<EntryId> for Value {
    fn from(value: EntryId) -> Self {
        Self::Integer(value.0)
    }
}

/// A typed destination a [`RowCursor`] can write a column into.
pub trait ScanTarget {
    fn assign(&mut self, value: &Value) -> Result<()>;
}

impl ScanTarget for i64 {
    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = match value {
            Value::Integer(v) => *v,
            Value::Text(text) => text
                .parse()
                .map_err(|_| anyhow!("cannot scan text {text:?} into an integer"))?,
            Value::Null => bail!("cannot scan NULL into an integer"),
        };
        Ok(())
    }
}

impl ScanTarget for String {
    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = match value {
            Value::Text(text) => text.clone(),
            Value::Integer(v) => v.to_string(),
            Value::Null => bail!("cannot scan NULL into a string"),
        };
        Ok(())
    }
}

impl ScanTarget for EntryId {
    fn assign(&mut self, value: &Value) -> Result<()> {
        self.0.assign(value)
    }
}

impl<T: ScanTarget + Default> ScanTarget for Option<T> {
    fn assign(&mut self, value: &Value) -> Result<()> {
        if matches!(value, Value::Null) {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}

/// Forward-only, single-pass view over the rows returned by a query.
///
/// `next` must return true before `scan` can read the current row.
pub trait RowCursor: Send {
    fn close(&mut self) -> Result<()>;
    fn columns(&self) -> Result<Vec<String>>;
    fn next(&mut self) -> bool;
    fn scan(&self, dest: &mut [&mut dyn ScanTarget]) -> Result<()>;
}

/// A cursor over rows that were fully fetched up front.
#[derive(Debug, Clone, Default)]
pub struct BufferedRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    current: Option<usize>,
    closed: bool,
}

impl BufferedRows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            current: None,
            closed: false,
        }
    }

    fn current_row(&self) -> Result<&[Value]> {
        if self.closed {
            bail!("scan called on a closed cursor");
        }
        let index = self
            .current
            .ok_or_else(|| anyhow!("scan called without calling next"))?;
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("scan called after the last row"))
    }
}

impl RowCursor for BufferedRows {
    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows.clear();
        Ok(())
    }

    fn columns(&self) -> Result<Vec<String>> {
        if self.closed {
            bail!("columns requested from a closed cursor");
        }
        Ok(self.columns.clone())
    }

    fn next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let next = self.current.map_or(0, |index| index + 1);
        self.current = Some(next.min(self.rows.len()));
        next < self.rows.len()
    }

    fn scan(&self, dest: &mut [&mut dyn ScanTarget]) -> Result<()> {
        let row = self.current_row()?;
        if dest.len() != row.len() {
            bail!(
                "expected {} destination arguments in scan, not {}",
                row.len(),
                dest.len()
            );
        }
        for (index, (target, value)) in dest.iter_mut().zip(row).enumerate() {
            target
                .assign(value)
                .map_err(|err| anyhow!("scan error on column index {index}: {err}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rows() -> BufferedRows {
        BufferedRows::new(
            vec!["id".into(), "title".into()],
            vec![
                vec![Value::Integer(1), Value::from("first")],
                vec![Value::Integer(2), Value::Null],
            ],
        )
    }

    #[test]
    fn advances_once_per_row_then_stops() {
        let mut rows = two_rows();
        assert!(rows.next());
        assert!(rows.next());
        assert!(!rows.next());
        assert!(!rows.next());
    }

    #[test]
    fn scans_typed_destinations_for_current_row() {
        let mut rows = two_rows();
        assert!(rows.next());
        let mut id = 0i64;
        let mut title = String::new();
        rows.scan(&mut [&mut id, &mut title]).expect("scan");
        assert_eq!((id, title.as_str()), (1, "first"));

        assert!(rows.next());
        let mut title: Option<String> = Some("stale".into());
        rows.scan(&mut [&mut id, &mut title]).expect("scan");
        assert_eq!(id, 2);
        assert_eq!(title, None);
    }

    #[test]
    fn scan_before_next_is_an_error() {
        let rows = two_rows();
        let mut id = 0i64;
        let mut title = String::new();
        assert!(rows.scan(&mut [&mut id, &mut title]).is_err());
    }

    #[test]
    fn scan_rejects_wrong_destination_count() {
        let mut rows = two_rows();
        assert!(rows.next());
        let mut id = 0i64;
        let err = rows.scan(&mut [&mut id]).expect_err("should fail");
        assert!(err.to_string().contains("expected 2 destination arguments"));
    }

    #[test]
    fn null_into_plain_string_is_an_error() {
        let mut rows = two_rows();
        rows.next();
        rows.next();
        let mut id = 0i64;
        let mut title = String::new();
        assert!(rows.scan(&mut [&mut id, &mut title]).is_err());
    }

    #[test]
    fn closed_cursor_yields_nothing() {
        let mut rows = two_rows();
        rows.close().expect("close");
        assert!(!rows.next());
        assert!(rows.columns().is_err());
    }

    #[test]
    fn integer_column_scans_into_string() {
        let mut rows = BufferedRows::new(vec!["date".into()], vec![vec![Value::Integer(2018)]]);
        assert!(rows.next());
        let mut date = String::new();
        rows.scan(&mut [&mut date]).expect("scan");
        assert_eq!(date, "2018");
    }
}
