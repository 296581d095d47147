use bytes::Bytes;
use devcamper_core::axum::body::Body;
use devcamper_core::axum::Router;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use crate::path::resolve_path;

/// Drives a `Router` in-process through `oneshot`; nothing listens on a port.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            router: &self.router,
            method,
            path: path.to_owned(),
            query: form_urlencoded::Serializer::new(String::new()),
            has_query: false,
            headers: HeaderMap::new(),
            payload: None,
        }
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }
}

pub struct TestRequest<'a> {
    router: &'a Router,
    method: Method,
    path: String,
    query: form_urlencoded::Serializer<'static, String>,
    has_query: bool,
    headers: HeaderMap,
    payload: Option<Vec<u8>>,
}

impl TestRequest<'_> {
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    pub fn header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|e| panic!("bad header name {name:?}: {e}"));
        let value = HeaderValue::from_str(value.as_ref())
            .unwrap_or_else(|e| panic!("bad value for header {name}: {e}"));
        self.headers.insert(name, value);
        self
    }

    /// Adds a percent-encoded `key=value` pair to the query string.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.append_pair(key, value);
        self.has_query = true;
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Self {
        let bytes = serde_json::to_vec(body).unwrap_or_else(|e| panic!("request body is not JSON: {e}"));
        self.payload = Some(bytes);
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub async fn send(mut self) -> TestResponse {
        let uri = if self.has_query {
            let joiner = if self.path.contains('?') { "&" } else { "?" };
            format!("{}{joiner}{}", self.path, self.query.finish())
        } else {
            self.path
        };

        let mut request = Request::new(self.payload.map_or_else(Body::empty, Body::from));
        *request.method_mut() = self.method;
        *request.uri_mut() = uri.parse().unwrap_or_else(|e| panic!("bad request uri {uri:?}: {e}"));
        *request.headers_mut() = self.headers;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .unwrap_or_else(|e| panic!("response body for {uri} could not be read: {e}"))
            .to_bytes();

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// A buffered response. Every `assert_*` returns `self` so checks chain.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        if self.status != expected {
            panic!("status {} where {expected} was expected; body: {}", self.status, self.text());
        }
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    /// Compares the value at `path` (see [`resolve_path`]) with `expected`.
    ///
    /// ```ignore
    /// resp.assert_json_path("data[0].name", "Devworks Bootcamp")
    ///     .assert_json_path("data.len()", 2);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        self.assert_json_path_fn(path, |found| *found == expected)
    }

    pub fn assert_json_path_fn(self, path: &str, check: impl FnOnce(&Value) -> bool) -> Self {
        let document: Value = self.json();
        let found = resolve_path(&document, path);
        if !check(&found) {
            panic!("`{path}` is {found}, which did not match; body: {document}");
        }
        self
    }

    pub fn assert_success(self) -> Self {
        self.assert_json_path("success", true)
    }

    /// `status` plus exactly `{"success": false, "error": message}`.
    pub fn assert_error(self, status: StatusCode, message: &str) -> Self {
        let checked = self.assert_status(status);
        let envelope: Value = checked.json();
        assert_eq!(envelope, json!({"success": false, "error": message}));
        checked
    }

    /// List envelope whose `count` and `data` length both equal `expected`.
    pub fn assert_page_count(self, expected: usize) -> Self {
        self.assert_json_path("count", expected)
            .assert_json_path("data.len()", expected)
    }

    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let found = resolve_path(&self.json(), path);
        match serde_json::from_value(found.clone()) {
            Ok(typed) => typed,
            Err(e) => panic!("`{path}` holds {found}, which does not deserialize: {e}"),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        match serde_json::from_slice(&self.body) {
            Ok(parsed) => parsed,
            Err(e) => panic!("body is not JSON ({e}): {}", self.text()),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
