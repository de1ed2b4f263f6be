use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use regex::Regex;
use shared::error::RouteError;
use tracing::{error, info, warn};

use crate::{app_state::AppState, controllers::Controller, request::RequestContext};

pub(crate) const NOT_FOUND_BODY: &str = "Page Not Found";

#[derive(Debug, Clone)]
enum RoutePattern {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    pattern: RoutePattern,
    controller: Controller,
}

impl Route {
    /// An empty request method is treated as GET.
    fn accepts_method(&self, method: &str) -> bool {
        method == self.method || (method.is_empty() && self.method == "GET")
    }
}

/// The winning route for a request together with the parameters it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteMatch {
    pub(crate) controller: Controller,
    pub(crate) params: Vec<String>,
}

/// Ordered route table. The first registered route that matches wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mux {
    routes: Vec<Route>,
}

impl Mux {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a route. A `matchable` route treats `pattern` as a regular
    /// expression searched anywhere in the path; otherwise the path must equal it.
    pub(crate) fn add(
        &mut self,
        method: &str,
        pattern: &str,
        matchable: bool,
        controller: Controller,
    ) -> Result<(), RouteError> {
        let pattern = if matchable {
            RoutePattern::Pattern(
                Regex::new(pattern).map_err(|err| RouteError::new(pattern, err.to_string()))?,
            )
        } else {
            RoutePattern::Literal(pattern.to_string())
        };
        self.routes.push(Route {
            method: method.to_string(),
            pattern,
            controller,
        });
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }

    pub(crate) fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch> {
        self.routes
            .iter()
            .filter(|route| route.accepts_method(method))
            .find_map(|route| match &route.pattern {
                RoutePattern::Literal(literal) => (literal == path).then(|| RouteMatch {
                    controller: route.controller,
                    params: Vec::new(),
                }),
                RoutePattern::Pattern(regex) => regex.is_match(path).then(|| RouteMatch {
                    controller: route.controller,
                    params: regex
                        .find_iter(path)
                        .map(|found| found.as_str().to_string())
                        .collect(),
                }),
            })
    }
}

/// Builds the journal's route table.
pub(crate) fn journal_routes() -> Result<Mux, RouteError> {
    let mut mux = Mux::new();
    mux.add("GET", "/", false, Controller::Index)?;
    mux.add("GET", "/new", false, Controller::New)?;
    mux.add("POST", "/new", false, Controller::New)?;
    mux.add("GET", r"^/[\w\-]+/edit$", true, Controller::Edit)?;
    mux.add("POST", r"^/[\w\-]+/edit$", true, Controller::Edit)?;
    mux.add("GET", r"^/[\w\-]+$", true, Controller::View)?;
    Ok(mux)
}

/// Fallback handler: every request not claimed by a fixed axum route lands here.
pub(crate) async fn dispatch(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();
    info!(%method, %path, "dispatching request");

    let Some(RouteMatch { controller, params }) = state.mux.resolve(&method, &path) else {
        warn!(%method, %path, "404 Not Found");
        return (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response();
    };

    let ctx = match RequestContext::from_request(request, params, state.max_form_bytes).await {
        Ok(ctx) => ctx,
        Err(rejection) => return rejection,
    };

    match tokio::time::timeout(state.request_timeout, controller.run(state.store.as_ref(), &ctx))
        .await
    {
        Ok(response) => response,
        Err(_) => {
            error!(%method, %path, ?controller, "request timed out");
            (StatusCode::SERVICE_UNAVAILABLE, "Request Timed Out").into_response()
        }
    }
}

#[cfg(test)]
#[path = "tests/mux_tests.rs"]
mod tests;
