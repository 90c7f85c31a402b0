use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub message: String,
}

/// A completed HTTP exchange with its body kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: Status,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Every way a request can fail. Exactly one is produced per failed request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    /// The server answered 404 for the requested url.
    #[error("bad url: {0}")]
    BadUrl(String),
    /// The request's own timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,
    /// No response was received, including urls the transport rejects and
    /// client-level timeouts.
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("bad status: {} {}", .0.status.code, .0.status.message)]
    BadStatus(Response),
    /// The body could not be parsed or did not match the expected shape.
    #[error("bad payload: {0}")]
    BadPayload(String, Response),
}

impl HttpError {
    /// The response, for the variants that received one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            HttpError::BadStatus(response) | HttpError::BadPayload(_, response) => Some(response),
            HttpError::BadUrl(_) | HttpError::Timeout | HttpError::NetworkError(_) => None,
        }
    }
}
