use std::collections::BTreeMap;

use tidal_http::{HttpError, Response, Status};

fn response(code: u16, message: &str) -> Response {
    Response {
        url: "https://example.com/todos/1".to_string(),
        status: Status {
            code,
            message: message.to_string(),
        },
        headers: BTreeMap::new(),
        body: "{}".to_string(),
    }
}

fn describe(err: &HttpError) -> String {
    match err {
        HttpError::BadUrl(url) => format!("bad url {url}"),
        HttpError::Timeout => "timeout".to_string(),
        HttpError::NetworkError(message) => format!("network {message}"),
        HttpError::BadStatus(response) => format!("status {}", response.status.code),
        HttpError::BadPayload(message, _) => format!("payload {message}"),
    }
}

#[test]
fn every_variant_has_a_readable_message() {
    let errors = [
        HttpError::BadUrl("https://example.com/404".to_string()),
        HttpError::Timeout,
        HttpError::NetworkError("connection refused".to_string()),
        HttpError::BadStatus(response(500, "Internal Server Error")),
        HttpError::BadPayload("expected value".to_string(), response(200, "OK")),
    ];
    let displayed = errors.iter().map(ToString::to_string).collect::<Vec<_>>();

    assert_eq!(
        displayed,
        vec![
            "bad url: https://example.com/404",
            "request timed out",
            "network error: connection refused",
            "bad status: 500 Internal Server Error",
            "bad payload: expected value",
        ]
    );
    assert_eq!(describe(&errors[3]), "status 500");
}

#[test]
fn only_answered_requests_carry_a_response() {
    assert!(HttpError::Timeout.response().is_none());
    assert!(HttpError::BadUrl("x".to_string()).response().is_none());
    assert_eq!(
        HttpError::BadStatus(response(418, "I'm a teapot"))
            .response()
            .map(|r| r.status.code),
        Some(418)
    );
    assert_eq!(
        HttpError::BadPayload("bad".to_string(), response(200, "OK"))
            .response()
            .map(|r| r.body.as_str()),
        Some("{}")
    );
}
