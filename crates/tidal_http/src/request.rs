use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tidal_core::Decoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

type ExpectFn<A> = dyn Fn(&str) -> Result<A, String> + Send + Sync;

/// Turns a raw response body into the value the caller asked for.
pub struct Expect<A> {
    run: Arc<ExpectFn<A>>,
}

impl<A> Clone for Expect<A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<A: 'static> Expect<A> {
    /// Parses the body as JSON and runs `decoder` over it. A body that is not
    /// JSON, including an empty one, fails with the parser diagnostic.
    pub fn json(decoder: Decoder<A>) -> Self {
        Self {
            run: Arc::new(move |body| decoder.decode_str(body)),
        }
    }

    pub fn map<B, F>(self, f: F) -> Expect<B>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Expect {
            run: Arc::new(move |body| (self.run)(body).map(&f)),
        }
    }

    pub fn apply(&self, body: &str) -> Result<A, String> {
        (self.run)(body)
    }
}

impl Expect<String> {
    /// Accepts any body as-is.
    pub fn string() -> Self {
        Self {
            run: Arc::new(|body| Ok(body.to_string())),
        }
    }
}

/// Immutable description of an HTTP call.
pub struct Request<A> {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub url: String,
    pub body: Option<Value>,
    pub expect: Expect<A>,
    pub timeout: Option<Duration>,
    pub with_credentials: bool,
}

impl<A> Clone for Request<A> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: self.body.clone(),
            expect: self.expect.clone(),
            timeout: self.timeout,
            with_credentials: self.with_credentials,
        }
    }
}

impl<A> fmt::Debug for Request<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("with_credentials", &self.with_credentials)
            .finish_non_exhaustive()
    }
}

impl<A: 'static> Request<A> {
    pub fn new(method: Method, url: impl Into<String>, expect: Expect<A>) -> Self {
        Self {
            method,
            headers: BTreeMap::new(),
            url: url.into(),
            body: None,
            expect,
            timeout: None,
            with_credentials: false,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }
}

pub fn get<A: 'static>(url: impl Into<String>, decoder: Decoder<A>) -> Request<A> {
    Request::new(Method::Get, url, Expect::json(decoder))
}

pub fn post<A: 'static>(url: impl Into<String>, body: Value, decoder: Decoder<A>) -> Request<A> {
    Request::new(Method::Post, url, Expect::json(decoder)).with_body(body)
}

pub fn put<A: 'static>(url: impl Into<String>, body: Value, decoder: Decoder<A>) -> Request<A> {
    Request::new(Method::Put, url, Expect::json(decoder)).with_body(body)
}

pub fn delete<A: 'static>(url: impl Into<String>, decoder: Decoder<A>) -> Request<A> {
    Request::new(Method::Delete, url, Expect::json(decoder))
}
