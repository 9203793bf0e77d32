/*
[INPUT]:  A fetch closure and an interval
[OUTPUT]: Subscription handle exposing the latest applied snapshot
[POS]:    Core - recurring fetch with generation tagging and cancellation
[UPDATE]: When changing tick/refresh semantics or snapshot contents
*/

//! Recurring fetch primitive shared by the metrics view and the task list.
//!
//! Every fetch attempt takes a generation number when it starts. A response
//! is applied only if its generation is newer than the one already applied,
//! so the visible state always belongs to the most recently started fetch
//! that has returned. Cancellation flips a flag under the same lock that
//! guards application, so nothing lands after `cancel()` returns.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// What a view renders: last good data plus the outcome of the latest fetch.
#[derive(Debug, Clone)]
pub struct PollSnapshot<T> {
    pub data: Option<T>,
    pub last_error: Option<String>,
    /// Generation of the last fetch whose outcome was applied (0 = none yet)
    pub generation: u64,
    pub updated_at: Option<DateTime<Local>>,
}

impl<T> Default for PollSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_error: None,
            generation: 0,
            updated_at: None,
        }
    }
}

impl<T> PollSnapshot<T> {
    /// Latest fetch failed; `data` (if any) is from an earlier poll.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.generation == 0
    }
}

#[derive(Debug)]
struct Inner<T> {
    snapshot: PollSnapshot<T>,
    next_generation: u64,
    in_flight: usize,
    cancelled: bool,
}

/// Shared state behind a subscription.
#[derive(Debug)]
pub struct PollingStore<T> {
    label: &'static str,
    inner: StdMutex<Inner<T>>,
    cancel: CancellationToken,
    refresh: Notify,
}

impl<T: Clone> PollingStore<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: StdMutex::new(Inner {
                snapshot: PollSnapshot::default(),
                next_generation: 0,
                in_flight: 0,
                cancelled: false,
            }),
            cancel: CancellationToken::new(),
            refresh: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve the next generation. `None` once cancelled.
    pub fn begin_fetch(&self) -> Option<u64> {
        let mut inner = self.lock();
        if inner.cancelled {
            return None;
        }
        inner.next_generation += 1;
        inner.in_flight += 1;
        Some(inner.next_generation)
    }

    /// Apply the outcome of fetch `generation`. Returns whether it was applied.
    pub fn complete<E: Display>(&self, generation: u64, result: Result<T, E>) -> bool {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.cancelled {
            trace!(store = self.label, generation, "response after cancel dropped");
            return false;
        }
        if generation <= inner.snapshot.generation {
            debug!(
                store = self.label,
                generation,
                applied = inner.snapshot.generation,
                "stale response discarded"
            );
            return false;
        }

        inner.snapshot.generation = generation;
        match result {
            Ok(data) => {
                inner.snapshot.data = Some(data);
                inner.snapshot.last_error = None;
                inner.snapshot.updated_at = Some(Local::now());
            }
            Err(err) => {
                warn!(store = self.label, generation, error = %err, "poll failed; keeping previous snapshot");
                inner.snapshot.last_error = Some(err.to_string());
            }
        }
        true
    }

    pub fn snapshot(&self) -> PollSnapshot<T> {
        self.lock().snapshot.clone()
    }

    pub fn in_flight(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn cancel(&self) {
        let mut inner = self.lock();
        if !inner.cancelled {
            inner.cancelled = true;
            debug!(store = self.label, "polling cancelled");
        }
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Start polling `fetch` now and every `interval` until cancelled.
    pub fn start<F, Fut, E>(label: &'static str, fetch: F, interval: Duration) -> Subscription<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let store = Arc::new(Self::new(label));
        tokio::spawn(run_loop(store.clone(), fetch, interval));
        Subscription { store }
    }
}

async fn run_loop<T, F, Fut, E>(store: Arc<PollingStore<T>>, fetch: F, interval: Duration)
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = store.cancel.cancelled() => break,
            _ = store.refresh.notified() => {
                spawn_fetch(&store, &fetch);
                ticker.reset();
            }
            _ = ticker.tick() => {
                if store.in_flight() {
                    trace!(store = store.label, "tick skipped; fetch in flight");
                    continue;
                }
                spawn_fetch(&store, &fetch);
            }
        }
    }
    trace!(store = store.label, "poll loop exited");
}

fn spawn_fetch<T, F, Fut, E>(store: &Arc<PollingStore<T>>, fetch: &F)
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let Some(generation) = store.begin_fetch() else {
        return;
    };
    let request = fetch();
    let store = store.clone();
    tokio::spawn(async move {
        let cancel = store.cancel.clone();
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = request => {
                store.complete(generation, result);
            }
        }
    });
}

/// Handle to a running poll. Dropping it cancels the poll.
#[derive(Debug)]
pub struct Subscription<T: Clone> {
    store: Arc<PollingStore<T>>,
}

impl<T: Clone> Subscription<T> {
    pub fn snapshot(&self) -> PollSnapshot<T> {
        self.store.snapshot()
    }

    /// Start a new fetch now, superseding any in flight.
    pub fn refresh(&self) {
        if !self.store.is_cancelled() {
            self.store.refresh.notify_one();
        }
    }

    /// Synchronous and idempotent; no response is applied afterwards.
    pub fn cancel(&self) {
        self.store.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.store.is_cancelled()
    }
}

impl<T: Clone> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.store.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    #[test]
    fn newer_fetch_wins_even_if_older_returns_later() {
        let store = PollingStore::<u32>::new("test");
        let first = store.begin_fetch().unwrap();
        let second = store.begin_fetch().unwrap();

        assert!(store.complete::<String>(second, Ok(2)));
        assert!(!store.complete::<String>(first, Ok(1)));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.data, Some(2));
        assert_eq!(snapshot.generation, second);
    }

    #[test]
    fn responses_in_start_order_are_both_applied() {
        let store = PollingStore::<u32>::new("test");
        let first = store.begin_fetch().unwrap();
        let second = store.begin_fetch().unwrap();

        assert!(store.complete::<String>(first, Ok(1)));
        assert_eq!(store.snapshot().data, Some(1));
        assert!(store.complete::<String>(second, Ok(2)));
        assert_eq!(store.snapshot().data, Some(2));
    }

    #[test]
    fn error_keeps_previous_data_and_marks_stale() {
        let store = PollingStore::<u32>::new("test");
        let ok = store.begin_fetch().unwrap();
        store.complete::<String>(ok, Ok(7));

        let failed = store.begin_fetch().unwrap();
        store.complete(failed, Err("connection refused"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.data, Some(7));
        assert!(snapshot.is_stale());
        assert_eq!(snapshot.last_error.as_deref(), Some("connection refused"));

        let recovered = store.begin_fetch().unwrap();
        store.complete::<String>(recovered, Ok(8));
        assert!(!store.snapshot().is_stale());
    }

    #[test]
    fn older_success_after_newer_error_is_discarded() {
        let store = PollingStore::<u32>::new("test");
        let first = store.begin_fetch().unwrap();
        let second = store.begin_fetch().unwrap();

        store.complete(second, Err("timeout"));
        assert!(!store.complete::<String>(first, Ok(1)));
        assert_eq!(store.snapshot().data, None);
    }

    #[test]
    fn cancel_is_idempotent_and_blocks_late_responses() {
        let store = PollingStore::<u32>::new("test");
        let generation = store.begin_fetch().unwrap();
        store.cancel();
        store.cancel();

        assert!(!store.complete::<String>(generation, Ok(1)));
        assert!(store.begin_fetch().is_none());
        assert!(store.snapshot().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let subscription = PollingStore::start(
            "test",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, String>(n) }
            },
            Duration::from_secs(5),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscription.snapshot().data, Some(1));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(subscription.snapshot().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_skipped_while_fetch_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate_in, counter) = (gate.clone(), calls.clone());
        let subscription = PollingStore::start(
            "test",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let gate = gate_in.clone();
                async move {
                    let _permit = gate.acquire().await.map_err(|err| err.to_string())?;
                    Ok::<_, String>(())
                }
            },
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.add_permits(10);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(subscription.snapshot().data.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_starts_new_fetch_and_supersedes_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate_in, counter) = (gate.clone(), calls.clone());
        let subscription = PollingStore::start(
            "test",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let gate = gate_in.clone();
                async move {
                    // First fetch hangs until released; later ones return at once.
                    if n == 1 {
                        let _permit = gate.acquire().await.map_err(|err| err.to_string())?;
                    }
                    Ok::<_, String>(n)
                }
            },
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        subscription.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(subscription.snapshot().data, Some(2));

        gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(subscription.snapshot().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_flight_leaves_state_untouched() {
        let gate = Arc::new(Semaphore::new(0));
        let gate_in = gate.clone();
        let subscription = PollingStore::start(
            "test",
            move || {
                let gate = gate_in.clone();
                async move {
                    let _permit = gate.acquire().await.map_err(|err| err.to_string())?;
                    Ok::<_, String>(42)
                }
            },
            Duration::from_secs(5),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        subscription.cancel();
        gate.add_permits(10);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert!(subscription.is_cancelled());
        assert!(subscription.snapshot().data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let subscription = PollingStore::start(
            "test",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(()) }
            },
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(subscription);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
