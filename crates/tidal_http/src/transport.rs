use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tidal_logging::tidal_trace;

use crate::{Method, Response, Status};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            user_agent: Some(concat!("tidal/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// What actually goes over the wire; the expectation stays with the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub with_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Network(String),
}

/// Performs one HTTP exchange. Any status code counts as a completed exchange.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Requests with credentials go through a client with a cookie store; the
/// others never send or keep cookies.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    plain: reqwest::Client,
    credentialed: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: HttpSettings) -> Result<Self, TransportError> {
        Ok(Self {
            plain: build_client(&settings, false)?,
            credentialed: build_client(&settings, true)?,
        })
    }
}

fn build_client(settings: &HttpSettings, cookies: bool) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .cookie_store(cookies);
    if let Some(agent) = &settings.user_agent {
        builder = builder.user_agent(agent.as_str());
    }
    builder
        .build()
        .map_err(|err| TransportError::Network(describe(&err)))
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<Response, TransportError> {
        let url = reqwest::Url::parse(&request.url).map_err(|err| TransportError::InvalidUrl {
            url: request.url.clone(),
            message: err.to_string(),
        })?;
        let client = if request.with_credentials {
            &self.credentialed
        } else {
            &self.plain
        };

        let mut builder = client.request(request.method.into(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let has_content_type = request
                .headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            let payload = serde_json::to_vec(body)
                .map_err(|err| TransportError::Network(err.to_string()))?;
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let url = response.url().to_string();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        let body = response.text().await.map_err(map_reqwest_error)?;
        tidal_trace!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());

        Ok(Response {
            url,
            status: Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            },
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout(describe(&err));
    }
    TransportError::Network(describe(&err))
}

/// The error message followed by its chain of causes.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
