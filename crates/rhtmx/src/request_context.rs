// File: src/request_context.rs
// Purpose: Per-request server context handed to middleware, loaders and API handlers

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rhtmx_router::Params;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use uuid::Uuid;

/// Largest request body read into memory
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Per-request scratch state
///
/// Created when dispatch starts and dropped when the response is produced.
/// Never shared between requests.
pub struct ServerContext {
    /// Unique id, also recorded on the request's tracing span
    pub request_id: Uuid,

    pub method: Method,

    pub uri: Uri,

    pub headers: HeaderMap,

    /// Raw request body
    pub body: Bytes,

    /// URL path without query string
    pub pathname: String,

    /// Parameters captured by the matched route
    pub params: Params,

    /// Query parameters from URL (?key=value)
    pub query: QueryParams,

    /// Parsed cookies
    pub cookies: HashMap<String, String>,

    /// Free-form values shared between middleware, loaders and error routes
    pub locals: Map<String, JsonValue>,

    /// Outgoing response under construction
    pub response: ResponseHandle,
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("pathname", &self.pathname)
            .field("params", &self.params)
            .finish()
    }
}

impl ServerContext {
    /// Builds a context from request parts and an already buffered body
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let pathname = uri.path().to_string();
        let query = QueryParams::parse(uri.query().unwrap_or(""));
        let cookies = Self::parse_cookies(&headers);

        Self {
            request_id: Uuid::new_v4(),
            method,
            uri,
            headers,
            body,
            pathname,
            params: Params::new(),
            query,
            cookies,
            locals: Map::new(),
            response: ResponseHandle::default(),
        }
    }

    /// Buffers the body of an incoming request
    pub async fn from_request(request: Request<Body>) -> Result<Self> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .context("Failed to read request body")?;
        Ok(Self::new(parts.method, parts.uri, parts.headers, body))
    }

    /// Context for a build-time render: a bodiless GET with known params
    pub fn synthetic(pathname: &str, params: Params) -> Self {
        let uri = pathname.parse::<Uri>().unwrap_or_default();
        let mut ctx = Self::new(Method::GET, uri, HeaderMap::new(), Bytes::new());
        ctx.pathname = pathname.to_string();
        ctx.params = params;
        ctx
    }

    /// Parse cookies from Cookie header
    fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
        let mut cookies = HashMap::new();

        if let Some(cookie_header) = headers.get("cookie") {
            if let Ok(cookie_str) = cookie_header.to_str() {
                for cookie in cookie_str.split(';') {
                    let cookie = cookie.trim();
                    if let Some((key, value)) = cookie.split_once('=') {
                        cookies.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        cookies
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get a cookie value
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Get a route parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Owned snapshot of the request side, for closure loaders and handlers
    pub fn request_info(&self) -> RequestInfo {
        RequestInfo {
            request_id: self.request_id,
            method: self.method.clone(),
            pathname: self.pathname.clone(),
            params: self.params.clone(),
            query: self.query.clone(),
            headers: self.headers.clone(),
            cookies: self.cookies.clone(),
            body: self.body.clone(),
            locals: self.locals.clone(),
        }
    }
}

/// Owned copy of the request side of a [`ServerContext`]
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub request_id: Uuid,
    pub method: Method,
    pub pathname: String,
    pub params: Params,
    pub query: QueryParams,
    pub headers: HeaderMap,
    pub cookies: HashMap<String, String>,
    pub body: Bytes,
    pub locals: Map<String, JsonValue>,
}

impl RequestInfo {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Query parameters from URL
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Create from HashMap
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Parses a raw query string; `+` is a space, later keys win
    pub fn parse(query: &str) -> Self {
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(k), decode_component(v))
            })
            .collect();
        Self { params }
    }

    /// Get a query parameter value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a query parameter as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key)?.parse().ok()
    }

    /// Check if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.params
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Outgoing response handle
///
/// Middleware may set headers and continue, or end the response, which
/// short-circuits the rest of the chain and the loader.
#[derive(Debug, Default)]
pub struct ResponseHandle {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
    ended: bool,
}

impl ResponseHandle {
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing earlier values
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Ends the response with a body
    pub fn end(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
        self.ended = true;
    }

    pub fn html(&mut self, body: impl Into<String>) {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        self.end(body.into());
    }

    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let body = serde_json::to_vec(value).context("Failed to serialize JSON response")?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.end(body);
        Ok(())
    }

    /// Ends the response with a 308 (permanent) or 307 redirect
    pub fn redirect(&mut self, location: &str, permanent: bool) -> Result<()> {
        let value = HeaderValue::from_str(location)
            .with_context(|| format!("Invalid redirect location: {}", location))?;
        self.headers.insert(LOCATION, value);
        self.status = Some(redirect_status(permanent));
        self.end(Bytes::new());
        Ok(())
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Converts an ended handle into the final response
    pub(crate) fn take_response(&mut self) -> Response {
        let status = self.status.unwrap_or(StatusCode::OK);
        let body = self.body.take().unwrap_or_default();
        let mut response = (status, body).into_response();
        *response.headers_mut() = std::mem::take(&mut self.headers);
        response
    }

    /// Merges headers set without ending into a response produced elsewhere
    ///
    /// Values set here replace values of the same name on `response`.
    pub(crate) fn apply_headers(&self, response: &mut Response) {
        for name in self.headers.keys() {
            response.headers_mut().remove(name);
            for value in self.headers.get_all(name) {
                response.headers_mut().append(name.clone(), value.clone());
            }
        }
    }
}

/// 308 for permanent redirects, 307 otherwise
pub fn redirect_status(permanent: bool) -> StatusCode {
    if permanent {
        StatusCode::PERMANENT_REDIRECT
    } else {
        StatusCode::TEMPORARY_REDIRECT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_and_cookies_are_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("session=abc; theme=dark"));
        let uri: Uri = "/search?q=rust+lang&page=2&_data".parse().unwrap();

        let ctx = ServerContext::new(Method::GET, uri, headers, Bytes::new());
        assert_eq!(ctx.pathname, "/search");
        assert_eq!(ctx.query.get("q").map(String::as_str), Some("rust lang"));
        assert_eq!(ctx.query.get_as::<u32>("page"), Some(2));
        assert!(ctx.query.has("_data"));
        assert_eq!(ctx.cookie("theme"), Some("dark"));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = ServerContext::synthetic("/", Params::new());
        let b = ServerContext::synthetic("/", Params::new());
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_redirect_ends_response() {
        let mut handle = ResponseHandle::default();
        handle.redirect("/login", false).unwrap();
        assert!(handle.is_ended());

        let response = handle.take_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[test]
    fn test_apply_headers_overrides_existing() {
        let mut handle = ResponseHandle::default();
        handle.set_header("x-frame-options", "DENY").unwrap();
        handle.set_header("cache-control", "no-store").unwrap();

        let mut response = (
            [("cache-control", "max-age=60")],
            "body",
        )
            .into_response();
        handle.apply_headers(&mut response);

        assert_eq!(response.headers()["cache-control"], "no-store");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(!handle.is_ended());
    }
}
