use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::Cmd;

type Thunk<A> = dyn Fn() -> BoxFuture<'static, A> + Send + Sync;

/// Lazy, restartable asynchronous computation with exactly one result.
///
/// Nothing happens until [`Task::run`] is called, and every call starts the
/// computation afresh.
pub struct Task<A> {
    thunk: Arc<Thunk<A>>,
}

impl<A> Clone for Task<A> {
    fn clone(&self) -> Self {
        Self {
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<A> fmt::Debug for Task<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("output", &std::any::type_name::<A>())
            .finish()
    }
}

impl<A: Send + 'static> Task<A> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self {
            thunk: Arc::new(move || f().boxed()),
        }
    }

    /// A task that resolves immediately to `value`.
    pub fn of(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Task::new(move || future::ready(value.clone()))
    }

    pub fn run(&self) -> BoxFuture<'static, A> {
        (self.thunk)()
    }

    pub fn map<B, F>(self, f: F) -> Task<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move { f(pending.await) }
        })
    }

    pub fn and_then<B, F>(self, f: F) -> Task<B>
    where
        B: Send + 'static,
        F: Fn(A) -> Task<B> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let pending = self.run();
            let f = Arc::clone(&f);
            async move { f(pending.await).run().await }
        })
    }
}

/// Turns a task into an effect whose message is always present.
pub fn perform<A, Msg, F>(task: Task<A>, f: F) -> Cmd<Msg>
where
    A: Send + 'static,
    Msg: Send + 'static,
    F: Fn(A) -> Msg + Send + Sync + 'static,
{
    Cmd::from_task(task.map(move |a| Some(f(a))))
}

/// Like [`perform`] for fallible tasks: `f` sees the whole `Result`, so the
/// caller decides how a failure becomes a message.
pub fn attempt<A, E, Msg, F>(task: Task<Result<A, E>>, f: F) -> Cmd<Msg>
where
    A: Send + 'static,
    E: Send + 'static,
    Msg: Send + 'static,
    F: Fn(Result<A, E>) -> Msg + Send + Sync + 'static,
{
    perform(task, f)
}

/// Runs every task and collects the results in input order.
pub fn sequence<A: Send + 'static>(tasks: Vec<Task<A>>) -> Task<Vec<A>> {
    Task::new(move || future::join_all(tasks.iter().map(Task::run)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn task_restarts_on_every_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = Task::new(move || {
            let counter = Arc::clone(&counter);
            async move { counter.fetch_add(1, Ordering::SeqCst) + 1 }
        });

        assert_eq!(task.run().await, 1);
        assert_eq!(task.run().await, 2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn task_is_lazy_until_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = Task::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {}
        })
        .map(|()| "done");

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(task.run().await, "done");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn and_then_chains_tasks() {
        let task = Task::of(2).and_then(|n| Task::of(n * 10));
        assert_eq!(task.run().await, 20);
    }
}
