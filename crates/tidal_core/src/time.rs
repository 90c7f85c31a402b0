//! Clock and timer effects.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::{Sub, Task};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

pub fn now() -> Task<Millis> {
    Task::new(|| async { now_millis() })
}

/// Emits `f(now)` once per `period`, starting one period after activation.
pub fn every<Msg, F>(period: Duration, f: F) -> Sub<Msg>
where
    Msg: Send + 'static,
    F: Fn(Millis) -> Msg + Send + Sync + 'static,
{
    // tokio rejects a zero period
    let period = period.max(Duration::from_millis(1));
    let f = Arc::new(f);
    Sub::new(move || {
        let f = Arc::clone(&f);
        stream::unfold(None::<Interval>, move |interval| {
            let f = Arc::clone(&f);
            async move {
                let mut interval = interval.unwrap_or_else(|| {
                    let mut interval = time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    interval
                });
                interval.tick().await;
                Some((f(now_millis()), Some(interval)))
            }
        })
    })
}

fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}
