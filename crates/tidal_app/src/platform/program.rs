//! Minimal terminal driver: owns the model/update fixpoint and hands every
//! effect and subscription to the effect runner.
use std::sync::mpsc;
use std::time::Duration;

use tidal_core::{Cmd, EffectRunner, Sub};
use tidal_logging::{tidal_debug, tidal_info};

pub struct Program<Model, Msg> {
    pub init: (Model, Cmd<Msg>),
    pub update: fn(Model, Msg) -> (Model, Cmd<Msg>),
    pub subscriptions: fn(&Model) -> Sub<Msg>,
    pub view: fn(&Model) -> Vec<String>,
    pub is_done: fn(&Model) -> bool,
}

/// Runs `program` until it reports itself done, nothing can produce another
/// message, or `deadline` passes without a message. Returns the final model.
pub fn run<Model, Msg>(
    program: Program<Model, Msg>,
    deadline: Duration,
    mut render: impl FnMut(&[String]),
) -> anyhow::Result<Model>
where
    Msg: std::fmt::Debug + Send + 'static,
{
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(msg_tx)?;

    let (mut model, cmd) = program.init;
    render(&(program.view)(&model));
    runner.subscribe((program.subscriptions)(&model));
    runner.run(cmd);

    while !(program.is_done)(&model) {
        let msg = match msg_rx.recv_timeout(deadline) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tidal_info!("No message within {:?}; stopping", deadline);
                break;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        tidal_debug!("Dispatching {:?}", msg);
        let (next, cmd) = (program.update)(model, msg);
        model = next;
        render(&(program.view)(&model));
        runner.run(cmd);
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidal_core::{perform, Task};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Msg {
        Add(u32),
    }

    fn update(model: u32, msg: Msg) -> (u32, Cmd<Msg>) {
        let Msg::Add(n) = msg;
        let next = model + n;
        let cmd = if next < 3 {
            perform(Task::of(1), Msg::Add)
        } else {
            Cmd::none()
        };
        (next, cmd)
    }

    fn program(init: Cmd<Msg>) -> Program<u32, Msg> {
        Program {
            init: (0, init),
            update,
            subscriptions: |_| Sub::none(),
            view: |model| vec![format!("count: {model}")],
            is_done: |model| *model >= 3,
        }
    }

    #[test]
    fn loop_runs_effects_until_done() {
        let mut frames = Vec::new();
        let model = run(
            program(Cmd::message(Msg::Add(1))),
            Duration::from_secs(2),
            |lines| frames.push(lines.join("\n")),
        )
        .unwrap();

        assert_eq!(model, 3);
        assert_eq!(frames, vec!["count: 0", "count: 1", "count: 2", "count: 3"]);
    }

    #[test]
    fn loop_stops_when_nothing_arrives() {
        let model = run(program(Cmd::none()), Duration::from_millis(50), |_| {}).unwrap();
        assert_eq!(model, 0);
    }
}
