use axum::response::{IntoResponse, Response};
use shared::domain::Entry;
use storage::{journal, DataStore};
use tracing::{error, info, warn};

use super::{redirect, server_error};
use crate::{
    request::RequestContext,
    views::{self, Page},
};

pub(super) async fn run(store: &dyn DataStore, ctx: &RequestContext) -> Response {
    if !ctx.is_post() {
        return views::render(Page::New {
            error: ctx.query_flag("error"),
        })
        .into_response();
    }

    let entry = Entry::from_form(&ctx.entry_form());
    if entry.slug.is_empty() {
        return redirect("/new?error=1");
    }

    match journal::insert_entry(store, &entry).await {
        Ok(Some(id)) => {
            info!(entry_id = id.0, slug = %entry.slug, "journal entry created");
            redirect("/")
        }
        Ok(None) => {
            warn!(slug = %entry.slug, "slug already taken by another entry");
            redirect("/new?error=1")
        }
        Err(error) => {
            error!(slug = %entry.slug, %error, "failed to create journal entry");
            server_error()
        }
    }
}
