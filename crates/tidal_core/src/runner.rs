use std::sync::mpsc;
use std::thread;

use futures_util::stream::{BoxStream, FuturesUnordered, StreamExt};
use tidal_logging::{tidal_debug, tidal_trace, tidal_warn};
use tokio::sync::mpsc as async_mpsc;

use crate::{Cmd, Sub, Task};

/// Injects a message into the update loop.
pub type Dispatch<Msg> = mpsc::Sender<Msg>;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to build effect runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn effect thread: {0}")]
    Thread(#[source] std::io::Error),
}

enum RunnerCommand<Msg> {
    Run(Cmd<Msg>),
    Subscribe(Sub<Msg>),
}

/// Executes effects and subscriptions on a dedicated single-threaded runtime
/// and routes every produced message to the dispatch channel.
///
/// Dropping the runner stops the runtime, including all active subscriptions.
pub struct EffectRunner<Msg> {
    cmd_tx: async_mpsc::UnboundedSender<RunnerCommand<Msg>>,
}

impl<Msg: Send + 'static> EffectRunner<Msg> {
    pub fn new(dispatch: Dispatch<Msg>) -> Result<Self, RunnerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RunnerError::Runtime)?;
        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel::<RunnerCommand<Msg>>();

        thread::Builder::new()
            .name("tidal-effects".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(command) = cmd_rx.recv().await {
                        match command {
                            RunnerCommand::Run(cmd) => spawn_cmd(cmd, &dispatch),
                            RunnerCommand::Subscribe(sub) => spawn_sub(sub, &dispatch),
                        }
                    }
                    tidal_debug!("Effect runner shutting down");
                });
            })
            .map_err(RunnerError::Thread)?;

        Ok(Self { cmd_tx })
    }

    /// Schedules every task of `cmd` exactly once.
    pub fn run(&self, cmd: Cmd<Msg>) {
        if cmd.is_none() {
            return;
        }
        if self.cmd_tx.send(RunnerCommand::Run(cmd)).is_err() {
            tidal_warn!("Effect runner is gone; dropping command");
        }
    }

    /// Activates `sub` for the lifetime of the runner.
    pub fn subscribe(&self, sub: Sub<Msg>) {
        if sub.is_none() {
            return;
        }
        if self.cmd_tx.send(RunnerCommand::Subscribe(sub)).is_err() {
            tidal_warn!("Effect runner is gone; dropping subscription");
        }
    }
}

fn spawn_cmd<Msg: Send + 'static>(cmd: Cmd<Msg>, dispatch: &Dispatch<Msg>) {
    tidal_trace!("Spawning {} effect task(s)", cmd.len());
    for task in cmd.into_tasks() {
        tokio::spawn(run_task(task, dispatch.clone()));
    }
}

fn spawn_sub<Msg: Send + 'static>(sub: Sub<Msg>, dispatch: &Dispatch<Msg>) {
    tidal_trace!("Starting {} subscription source(s)", sub.len());
    for source in sub.start() {
        tokio::spawn(forward(source, dispatch.clone()));
    }
}

async fn run_task<Msg>(task: Task<Option<Msg>>, dispatch: Dispatch<Msg>)
where
    Msg: Send + 'static,
{
    if let Some(msg) = task.run().await {
        if dispatch.send(msg).is_err() {
            tidal_warn!("Dispatch channel closed; message dropped");
        }
    }
}

async fn forward<Msg>(mut source: BoxStream<'static, Msg>, dispatch: Dispatch<Msg>) {
    while let Some(msg) = source.next().await {
        if dispatch.send(msg).is_err() {
            tidal_warn!("Dispatch channel closed; ending subscription");
            return;
        }
    }
}

/// Runs `cmd` on the current executor, dispatching each message as soon as
/// its task completes. Resolves once every task has finished.
pub async fn execute<Msg: Send + 'static>(cmd: Cmd<Msg>, dispatch: &Dispatch<Msg>) {
    let mut pending = cmd
        .tasks()
        .iter()
        .map(Task::run)
        .collect::<FuturesUnordered<_>>();
    while let Some(msg) = pending.next().await {
        if let Some(msg) = msg {
            if dispatch.send(msg).is_err() {
                tidal_warn!("Dispatch channel closed; message dropped");
            }
        }
    }
}
