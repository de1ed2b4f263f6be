use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use storage::DataStore;

use crate::{
    request::RequestContext,
    views::{self, Page},
};

pub(crate) mod edit;
mod index;
mod new;
mod view;

/// The fixed set of endpoint behaviours a route can be bound to.
///
/// Controllers hold no per-request state; everything a run needs arrives in
/// the [`RequestContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Controller {
    Index,
    New,
    View,
    Edit,
}

impl Controller {
    pub(crate) async fn run(self, store: &dyn DataStore, ctx: &RequestContext) -> Response {
        match self {
            Controller::Index => index::run(store, ctx).await,
            Controller::New => new::run(store, ctx).await,
            Controller::View => view::run(store, ctx).await,
            Controller::Edit => edit::run(store, ctx).await,
        }
    }
}

pub(crate) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, views::render(Page::NotFound)).into_response()
}

pub(crate) fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        views::render(Page::ServerError),
    )
        .into_response()
}

/// A 302 redirect to `location`.
pub(crate) fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
