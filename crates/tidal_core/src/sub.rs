use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, BoxStream, Stream, StreamExt};

type Source<Msg> = dyn Fn() -> BoxStream<'static, Msg> + Send + Sync;

/// Declarative description of long-lived message sources.
///
/// Each source is started lazily and may emit any number of messages for as
/// long as the runtime keeps it alive.
pub struct Sub<Msg> {
    sources: Vec<Arc<Source<Msg>>>,
}

impl<Msg> Clone for Sub<Msg> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
        }
    }
}

impl<Msg> Default for Sub<Msg> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<Msg> fmt::Debug for Sub<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sub")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl<Msg: Send + 'static> Sub<Msg> {
    /// The subscription that never emits.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<F, S>(start: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = Msg> + Send + 'static,
    {
        Self {
            sources: vec![Arc::new(move || start().boxed())],
        }
    }

    pub fn batch(subs: impl IntoIterator<Item = Sub<Msg>>) -> Self {
        Self {
            sources: subs.into_iter().flat_map(|sub| sub.sources).collect(),
        }
    }

    pub fn map<B, F>(self, f: F) -> Sub<B>
    where
        B: Send + 'static,
        F: Fn(Msg) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Sub {
            sources: self
                .sources
                .into_iter()
                .map(|source| {
                    let f = Arc::clone(&f);
                    let mapped: Arc<Source<B>> = Arc::new(move || {
                        let f = Arc::clone(&f);
                        source().map(move |msg| f(msg)).boxed()
                    });
                    mapped
                })
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_none()
    }

    /// Starts every source; each stream is independent of the others.
    pub fn start(&self) -> Vec<BoxStream<'static, Msg>> {
        self.sources.iter().map(|source| source()).collect()
    }

    /// Starts every source and merges them into one stream.
    pub fn into_stream(self) -> BoxStream<'static, Msg> {
        stream::select_all(self.start()).boxed()
    }
}

impl<Msg: Send + 'static> FromIterator<Sub<Msg>> for Sub<Msg> {
    fn from_iter<I: IntoIterator<Item = Sub<Msg>>>(iter: I) -> Self {
        Sub::batch(iter)
    }
}
