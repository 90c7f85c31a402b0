use std::sync::{Arc, OnceLock};

use tidal_core::{attempt, Cmd, Task};
use tidal_logging::{tidal_debug, tidal_info, tidal_warn};

use crate::{
    HttpError, HttpSettings, OutgoingRequest, ReqwestTransport, Request, Response, Transport,
    TransportError,
};

static DEFAULT_TRANSPORT: OnceLock<Result<Arc<ReqwestTransport>, TransportError>> =
    OnceLock::new();

fn default_transport() -> Result<Arc<dyn Transport>, HttpError> {
    match DEFAULT_TRANSPORT
        .get_or_init(|| ReqwestTransport::new(HttpSettings::default()).map(Arc::new))
    {
        Ok(transport) => {
            let transport: Arc<dyn Transport> = transport.clone();
            Ok(transport)
        }
        Err(err) => Err(HttpError::NetworkError(err.to_string())),
    }
}

/// Describes the execution of `request` on the shared default transport.
pub fn to_task<A>(request: Request<A>) -> Task<Result<A, HttpError>>
where
    A: Send + 'static,
{
    let request = Arc::new(request);
    Task::new(move || {
        let request = Arc::clone(&request);
        async move {
            let transport = default_transport()?;
            execute(transport.as_ref(), &request).await
        }
    })
}

pub fn to_task_with<A>(
    transport: Arc<dyn Transport>,
    request: Request<A>,
) -> Task<Result<A, HttpError>>
where
    A: Send + 'static,
{
    let request = Arc::new(request);
    Task::new(move || {
        let transport = Arc::clone(&transport);
        let request = Arc::clone(&request);
        async move { execute(transport.as_ref(), &request).await }
    })
}

/// Wraps `request` into an effect; `project` receives the outcome whichever
/// way it went.
pub fn send<A, Msg, F>(request: Request<A>, project: F) -> Cmd<Msg>
where
    A: Send + 'static,
    Msg: Send + 'static,
    F: Fn(Result<A, HttpError>) -> Msg + Send + Sync + 'static,
{
    attempt(to_task(request), project)
}

pub fn send_with<A, Msg, F>(transport: Arc<dyn Transport>, request: Request<A>, project: F) -> Cmd<Msg>
where
    A: Send + 'static,
    Msg: Send + 'static,
    F: Fn(Result<A, HttpError>) -> Msg + Send + Sync + 'static,
{
    attempt(to_task_with(transport, request), project)
}

/// Performs a single attempt of `request`.
///
/// When a timeout is set it races the exchange; if the timer wins the
/// exchange future is dropped, so a late response can never replace the
/// `Timeout` outcome.
pub async fn execute<A: 'static>(
    transport: &dyn Transport,
    request: &Request<A>,
) -> Result<A, HttpError> {
    tidal_debug!("{} {}", request.method, request.url);
    let exchange = transport.send(outgoing(request));

    let result = match request.timeout {
        Some(limit) => match tokio::time::timeout(limit, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tidal_info!(
                    "{} {} timed out after {:?}",
                    request.method,
                    request.url,
                    limit
                );
                return Err(HttpError::Timeout);
            }
        },
        None => exchange.await,
    };

    let response = result.map_err(|err| classify_transport_error(&request.url, err))?;
    let response = validate_status(&request.url, response)?;

    match request.expect.apply(&response.body) {
        Ok(value) => Ok(value),
        Err(message) => {
            tidal_debug!("Bad payload from {}: {}", response.url, message);
            Err(HttpError::BadPayload(message, response))
        }
    }
}

fn outgoing<A>(request: &Request<A>) -> OutgoingRequest {
    OutgoingRequest {
        method: request.method,
        url: request.url.clone(),
        headers: request.headers.clone(),
        body: request.body.clone(),
        with_credentials: request.with_credentials,
    }
}

fn classify_transport_error(url: &str, err: TransportError) -> HttpError {
    match err {
        TransportError::InvalidUrl { .. } => {
            let message = err.to_string();
            tidal_warn!("Rejected request to {}: {}", url, message);
            HttpError::NetworkError(message)
        }
        // Only the request's own timer yields `Timeout`; client-level limits
        // such as the connect timeout are network failures.
        TransportError::Timeout(message) => {
            tidal_info!("Transport timeout for {}: {}", url, message);
            HttpError::NetworkError(message)
        }
        TransportError::Network(message) => {
            tidal_warn!("Network error for {}: {}", url, message);
            HttpError::NetworkError(message)
        }
    }
}

fn validate_status(url: &str, response: Response) -> Result<Response, HttpError> {
    match response.status.code {
        200..=299 => Ok(response),
        404 => {
            tidal_debug!("{} answered 404", url);
            Err(HttpError::BadUrl(url.to_string()))
        }
        code => {
            tidal_debug!("{} answered {}", url, code);
            Err(HttpError::BadStatus(response))
        }
    }
}
