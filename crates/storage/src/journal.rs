//! Journal entry persistence expressed against the generic [`DataStore`] contract.

use anyhow::Result;
use shared::domain::{Entry, EntryForm, EntryId};

use crate::{DataStore, RowCursor, Value};

pub const SELECT_BY_SLUG: &str =
    "SELECT id, slug, title, date, content FROM journal WHERE slug = ? LIMIT 1";
pub const SELECT_ALL: &str = "SELECT id, slug, title, date, content FROM journal ORDER BY id DESC";
pub const INSERT: &str = "INSERT INTO journal (slug, title, date, content) VALUES (?, ?, ?, ?)";
pub const UPDATE_BY_ID: &str = "UPDATE journal SET title = ?, date = ?, content = ? WHERE id = ?";

pub async fn find_by_slug(store: &dyn DataStore, slug: &str) -> Result<Option<Entry>> {
    let mut rows = store.query(SELECT_BY_SLUG, &[Value::from(slug)]).await?;
    let entry = if rows.next() {
        Some(scan_entry(rows.as_ref())?)
    } else {
        None
    };
    rows.close()?;
    Ok(entry)
}

pub async fn list_entries(store: &dyn DataStore) -> Result<Vec<Entry>> {
    let mut rows = store.query(SELECT_ALL, &[]).await?;
    let mut entries = Vec::new();
    while rows.next() {
        entries.push(scan_entry(rows.as_ref())?);
    }
    rows.close()?;
    Ok(entries)
}

/// Inserts a new entry. Returns `None` when another entry already owns the slug.
pub async fn insert_entry(store: &dyn DataStore, entry: &Entry) -> Result<Option<EntryId>> {
    let result = store
        .execute(
            INSERT,
            &[
                Value::from(entry.slug.as_str()),
                Value::from(entry.title.as_str()),
                Value::from(entry.date.as_str()),
                Value::from(entry.content.as_str()),
            ],
        )
        .await;
    match result {
        Ok(result) => Ok(Some(EntryId(result.last_insert_id))),
        Err(error) if is_unique_violation(&error) => Ok(None),
        Err(error) => Err(error),
    }
}

/// Overwrites the editable fields of one entry. Id and slug never change.
pub async fn update_entry(store: &dyn DataStore, id: EntryId, form: &EntryForm) -> Result<u64> {
    let result = store
        .execute(
            UPDATE_BY_ID,
            &[
                Value::from(form.title.as_str()),
                Value::from(form.date.as_str()),
                Value::from(form.content.as_str()),
                Value::from(id),
            ],
        )
        .await?;
    Ok(result.rows_affected)
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|error| error.as_database_error())
        .is_some_and(|db_error| db_error.is_unique_violation())
}

fn scan_entry(rows: &dyn RowCursor) -> Result<Entry> {
    let mut entry = Entry::default();
    rows.scan(&mut [
        &mut entry.id,
        &mut entry.slug,
        &mut entry.title,
        &mut entry.date,
        &mut entry.content,
    ])?;
    Ok(entry)
}
