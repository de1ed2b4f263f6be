use axum::response::{IntoResponse, Response};
use storage::{journal, DataStore};
use tracing::error;

use super::server_error;
use crate::{
    request::RequestContext,
    views::{self, Page},
};

pub(super) async fn run(store: &dyn DataStore, ctx: &RequestContext) -> Response {
    let entries = match journal::list_entries(store).await {
        Ok(entries) => entries,
        Err(error) => {
            error!(%error, "failed to list journal entries");
            return server_error();
        }
    };
    views::render(Page::Index {
        entries: &entries,
        saved: ctx.query_flag("saved"),
    })
    .into_response()
}
