use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use shared::domain::EntryForm;
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything a controller may read about one request.
///
/// Built fresh for every dispatch and never mutated afterwards, so concurrent
/// requests served by the same controller cannot observe each other.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) params: Vec<String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
}

impl RequestContext {
    pub(crate) fn new(
        method: Method,
        path: impl Into<String>,
        raw_query: Option<&str>,
        params: Vec<String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            query: raw_query.map(parse_pairs).unwrap_or_default(),
            form: Vec::new(),
        }
    }

    pub(crate) fn with_form_body(mut self, body: &[u8]) -> Self {
        self.form = form_urlencoded::parse(body).into_owned().collect();
        self
    }

    /// Reads the request head and, for form posts, up to `max_form_bytes` of body.
    pub(crate) async fn from_request(
        request: Request<Body>,
        params: Vec<String>,
        max_form_bytes: usize,
    ) -> Result<Self, Response> {
        let (parts, body) = request.into_parts();
        let ctx = Self::new(
            parts.method,
            parts.uri.path(),
            parts.uri.query(),
            params,
        );

        let is_form = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));
        if ctx.method != Method::POST || !is_form {
            return Ok(ctx);
        }

        let bytes = body::to_bytes(body, max_form_bytes)
            .await
            .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "Form Too Large").into_response())?;
        Ok(ctx.with_form_body(&bytes))
    }

    pub(crate) fn query_value(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    /// A query flag is set when present with any value other than empty, `0` or `false`.
    pub(crate) fn query_flag(&self, name: &str) -> bool {
        self.query_value(name)
            .is_some_and(|value| !matches!(value, "" | "0" | "false"))
    }

    /// Missing form fields read as empty strings.
    pub(crate) fn form_value(&self, name: &str) -> &str {
        lookup(&self.form, name).unwrap_or_default()
    }

    pub(crate) fn entry_form(&self) -> EntryForm {
        EntryForm {
            title: self.form_value("title").to_string(),
            date: self.form_value("date").to_string(),
            content: self.form_value("content").to_string(),
        }
    }

    /// The slug is the first path segment of the first captured parameter.
    pub(crate) fn slug(&self) -> Option<&str> {
        self.params
            .first()
            .and_then(|param| param.trim_start_matches('/').split('/').next())
            .filter(|slug| !slug.is_empty())
    }

    pub(crate) fn is_post(&self) -> bool {
        self.method == Method::POST
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
