//! Tidal HTTP: request descriptions executed as tasks, with every failure
//! classified into [`HttpError`].
mod pipeline;
mod request;
mod transport;
mod types;

pub use pipeline::{execute, send, send_with, to_task, to_task_with};
pub use request::{delete, get, post, put, Expect, Method, Request};
pub use transport::{HttpSettings, OutgoingRequest, ReqwestTransport, Transport, TransportError};
pub use types::{HttpError, Response, Status};
