use axum::response::{IntoResponse, Response};
use storage::{journal, DataStore};
use tracing::error;

use super::not_found;
use crate::{
    request::RequestContext,
    views::{self, Page},
};

pub(super) async fn run(store: &dyn DataStore, ctx: &RequestContext) -> Response {
    let Some(slug) = ctx.slug() else {
        return not_found();
    };
    match journal::find_by_slug(store, slug).await {
        Ok(Some(entry)) => views::render(Page::View { entry: &entry }).into_response(),
        Ok(None) => not_found(),
        Err(error) => {
            error!(%slug, %error, "failed to load journal entry");
            not_found()
        }
    }
}
