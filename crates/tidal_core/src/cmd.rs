use std::fmt;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::Task;

/// Declarative description of one-shot asynchronous work.
///
/// Every constituent task yields at most one message; `None` marks a
/// fire-and-forget effect. The update function returns a `Cmd` and the
/// runtime executes it, so application code never touches a future directly.
pub struct Cmd<Msg> {
    tasks: Vec<Task<Option<Msg>>>,
}

impl<Msg> Clone for Cmd<Msg> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
        }
    }
}

impl<Msg> Default for Cmd<Msg> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<Msg> fmt::Debug for Cmd<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd").field("tasks", &self.tasks.len()).finish()
    }
}

impl<Msg: Send + 'static> Cmd<Msg> {
    /// The effect that does nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_task(task: Task<Option<Msg>>) -> Self {
        Self { tasks: vec![task] }
    }

    /// Feeds `msg` straight back into the update loop.
    pub fn message(msg: Msg) -> Self
    where
        Msg: Clone + Sync,
    {
        Self::from_task(Task::of(Some(msg)))
    }

    /// Runs `task` for its side effect only.
    pub fn fire_and_forget(task: Task<()>) -> Self {
        Self::from_task(task.map(|()| None))
    }

    /// Union of all `cmds`. Nothing is deduplicated.
    pub fn batch(cmds: impl IntoIterator<Item = Cmd<Msg>>) -> Self {
        Self {
            tasks: cmds.into_iter().flat_map(|cmd| cmd.tasks).collect(),
        }
    }

    pub fn map<B, F>(self, f: F) -> Cmd<B>
    where
        B: Send + 'static,
        F: Fn(Msg) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Cmd {
            tasks: self
                .tasks
                .into_iter()
                .map(|task| {
                    let f = Arc::clone(&f);
                    task.map(move |msg| msg.map(|msg| f(msg)))
                })
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_none()
    }

    pub fn tasks(&self) -> &[Task<Option<Msg>>] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task<Option<Msg>>> {
        self.tasks
    }

    /// Runs every task concurrently on the current executor and returns the
    /// produced messages in completion order.
    pub async fn into_messages(self) -> Vec<Msg> {
        let mut pending = self
            .tasks
            .iter()
            .map(Task::run)
            .collect::<FuturesUnordered<_>>();
        let mut messages = Vec::new();
        while let Some(msg) = pending.next().await {
            messages.extend(msg);
        }
        messages
    }
}

impl<Msg: Send + 'static> FromIterator<Cmd<Msg>> for Cmd<Msg> {
    fn from_iter<I: IntoIterator<Item = Cmd<Msg>>>(iter: I) -> Self {
        Cmd::batch(iter)
    }
}
