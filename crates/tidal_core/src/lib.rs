//! Tidal core: decoders, tasks, effects, subscriptions and their executor.
mod cmd;
pub mod decode;
mod runner;
mod schema;
mod sub;
mod task;
pub mod time;

pub use cmd::Cmd;
pub use decode::{decode_json, Decoder};
pub use runner::{execute, Dispatch, EffectRunner, RunnerError};
pub use schema::{ContextEntry, Schema, ValidationError};
pub use sub::Sub;
pub use task::{attempt, perform, sequence, Task};
