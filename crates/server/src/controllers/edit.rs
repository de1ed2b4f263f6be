//! Editing an existing entry.
//!
//! Every request first loads the entry named by the slug. A GET then shows the
//! pre-filled form; a POST either bounces back with `?error=1` or saves and
//! returns to the index.

use axum::response::{IntoResponse, Response};
use shared::{
    domain::{Entry, EntryForm},
    error::JournalError,
};
use storage::{journal, DataStore};
use tracing::{error, info, warn};

use super::{not_found, redirect, server_error};
use crate::{
    request::RequestContext,
    views::{self, Page},
};

pub(crate) const SAVED_LOCATION: &str = "/?saved=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditState {
    NotFound,
    DisplayForm { entry: Entry, error: bool },
    ValidationFailed { retry_location: String },
    Saved,
    StoreFailed,
}

impl IntoResponse for EditState {
    fn into_response(self) -> Response {
        match self {
            EditState::NotFound => not_found(),
            EditState::DisplayForm { entry, error } => views::render(Page::Edit {
                entry: &entry,
                error,
            })
            .into_response(),
            EditState::ValidationFailed { retry_location } => redirect(&retry_location),
            EditState::Saved => redirect(SAVED_LOCATION),
            EditState::StoreFailed => server_error(),
        }
    }
}

pub(super) async fn run(store: &dyn DataStore, ctx: &RequestContext) -> Response {
    advance(store, ctx).await.into_response()
}

/// Decides the outcome of one edit request without writing the response.
pub(crate) async fn advance(store: &dyn DataStore, ctx: &RequestContext) -> EditState {
    let entry = match load(store, ctx).await {
        Ok(entry) => entry,
        Err(JournalError::Store(message)) => {
            error!(path = %ctx.path, %message, "failed to load entry for editing");
            return EditState::NotFound;
        }
        Err(_) => return EditState::NotFound,
    };

    if !ctx.is_post() {
        return EditState::DisplayForm {
            entry,
            error: ctx.query_flag("error"),
        };
    }

    let form = ctx.entry_form();
    if let Err(err) = form.validate() {
        info!(slug = %entry.slug, code = ?err.code(), "rejected edit submission");
        return EditState::ValidationFailed {
            retry_location: format!("{}?error=1", ctx.path),
        };
    }

    match save(store, &entry, &form).await {
        Ok(()) => {
            info!(slug = %entry.slug, "journal entry updated");
            EditState::Saved
        }
        Err(JournalError::NotFound { slug }) => {
            warn!(%slug, "entry disappeared before it could be updated");
            EditState::NotFound
        }
        Err(err) => {
            error!(slug = %entry.slug, code = ?err.code(), error = %err, "failed to update journal entry");
            EditState::StoreFailed
        }
    }
}

async fn load(store: &dyn DataStore, ctx: &RequestContext) -> Result<Entry, JournalError> {
    let slug = ctx.slug().ok_or_else(|| JournalError::NotFound {
        slug: String::new(),
    })?;
    journal::find_by_slug(store, slug)
        .await
        .map_err(JournalError::store)?
        .ok_or_else(|| JournalError::NotFound {
            slug: slug.to_string(),
        })
}

async fn save(store: &dyn DataStore, entry: &Entry, form: &EntryForm) -> Result<(), JournalError> {
    let affected = journal::update_entry(store, entry.id, form)
        .await
        .map_err(JournalError::store)?;
    if affected == 0 {
        return Err(JournalError::NotFound {
            slug: entry.slug.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/edit_tests.rs"]
mod tests;
