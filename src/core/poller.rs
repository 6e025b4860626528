//! Periodic refresh primitive underlying every live data source
//!
//! Each attempt is tagged with a sequence number and the teardown epoch at
//! dispatch. A result is only applied if no later attempt has been applied
//! already, and never once a [`Poller::stop`] has happened since its dispatch,
//! even if the poller was started again. Failed attempts keep the last
//! successful result.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::FetchError;
use crate::metrics::Metrics;

pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Observes `(previous, new)` payloads atomically with each applied refresh
pub type RefreshHook<T> = Arc<dyn Fn(Option<&T>, &T) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct PollState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            last_fetched_at: None,
        }
    }
}

/// Outcome of a single refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Yes,
    /// A later attempt was applied first
    Superseded,
    /// The poller was stopped while the attempt was in flight
    TornDown,
}

struct Fence {
    torn_down: bool,
    last_applied: u64,
}

/// Identity of one attempt, captured at dispatch
#[derive(Debug, Clone, Copy)]
struct Ticket {
    seq: u64,
    epoch: u64,
}

struct Shared<T> {
    name: String,
    fetch: FetchFn<T>,
    state: watch::Sender<PollState<T>>,
    fence: Mutex<Fence>,
    next_seq: AtomicU64,
    /// Bumped by every `stop()`
    epoch: AtomicU64,
    on_refresh: Option<RefreshHook<T>>,
    metrics: Option<Arc<Metrics>>,
}

impl<T> Shared<T> {
    fn dispatch(&self) -> Ticket {
        if let Some(metrics) = &self.metrics {
            metrics
                .poll_attempts_total
                .with_label_values(&[self.name.as_str()])
                .inc();
        }
        Ticket {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst) + 1,
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }
}

pub struct PollerBuilder<T> {
    name: String,
    interval: Duration,
    fetch: FetchFn<T>,
    on_refresh: Option<RefreshHook<T>>,
    metrics: Option<Arc<Metrics>>,
}

impl<T: Send + Sync + 'static> PollerBuilder<T> {
    pub fn on_refresh<H>(mut self, hook: H) -> Self
    where
        H: Fn(Option<&T>, &T) + Send + Sync + 'static,
    {
        self.on_refresh = Some(Arc::new(hook));
        self
    }

    pub fn metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Poller<T> {
        let (state, _) = watch::channel(PollState::default());
        Poller {
            shared: Arc::new(Shared {
                name: self.name,
                fetch: self.fetch,
                state,
                fence: Mutex::new(Fence {
                    torn_down: false,
                    last_applied: 0,
                }),
                next_seq: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                on_refresh: self.on_refresh,
                metrics: self.metrics,
            }),
            interval: self.interval,
            handle: Arc::new(RwLock::new(None)),
        }
    }
}

pub struct Poller<T> {
    shared: Arc<Shared<T>>,
    interval: Duration,
    handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            interval: self.interval,
            handle: self.handle.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Poller<T> {
    pub fn builder<F, Fut>(name: impl Into<String>, interval: Duration, fetch: F) -> PollerBuilder<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let fetch: FetchFn<T> =
            Arc::new(move || -> BoxFuture<'static, Result<T, FetchError>> { Box::pin(fetch()) });
        PollerBuilder {
            name: name.into(),
            interval,
            fetch,
            on_refresh: None,
            metrics: None,
        }
    }

    pub fn new<F, Fut>(name: impl Into<String>, interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        Self::builder(name, interval, fetch).build()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the repeating timer; the first attempt fires immediately
    pub async fn start(&self) {
        let mut handle = self.handle.write().await;
        if handle.is_some() {
            debug!(poller = %self.shared.name, "Poller: already running");
            return;
        }

        self.shared.fence.lock().await.torn_down = false;

        let shared = self.shared.clone();
        let interval = self.interval;
        *handle = Some(tokio::spawn(run_timer(shared, interval)));

        info!(
            poller = %self.shared.name,
            interval_secs = self.interval.as_secs_f64(),
            "Poller: started {} (every {:?})",
            self.shared.name,
            self.interval
        );
    }

    /// Stop the timer and fence off any attempt still in flight
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        {
            let mut fence = self.shared.fence.lock().await;
            fence.torn_down = true;
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(h) = handle.take() {
            h.abort();
            info!(poller = %self.shared.name, "Poller: stopped {}", self.shared.name);
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }

    /// Run one attempt now, outside the timer, and report its outcome
    pub async fn refresh_now(&self) -> Result<Applied, FetchError> {
        let ticket = self.shared.dispatch();
        run_attempt(self.shared.clone(), ticket).await
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.shared.state.subscribe()
    }
}

impl<T: Clone + Send + Sync + 'static> Poller<T> {
    pub fn snapshot(&self) -> PollState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.shared.state.borrow().data.clone()
    }
}

impl<T> Poller<T> {
    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }
}

async fn run_timer<T: Send + Sync + 'static>(shared: Arc<Shared<T>>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Dropped together with this task on abort, which aborts every attempt in it
    let mut attempts = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ticket = shared.dispatch();
                let attempt_shared = shared.clone();
                attempts.spawn(async move {
                    // Failures are logged inside the attempt
                    let _ = run_attempt(attempt_shared, ticket).await;
                });
            }
            Some(joined) = attempts.join_next(), if !attempts.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!(poller = %shared.name, error = %e, "Poller: attempt panicked");
                    }
                }
            }
        }
    }
}

async fn run_attempt<T: Send + Sync + 'static>(
    shared: Arc<Shared<T>>,
    ticket: Ticket,
) -> Result<Applied, FetchError> {
    let seq = ticket.seq;
    let result = (shared.fetch)().await;

    let mut fence = shared.fence.lock().await;
    // The epoch check covers a stop() followed by start() while this was in flight
    if fence.torn_down || ticket.epoch != shared.epoch.load(Ordering::SeqCst) {
        debug!(poller = %shared.name, seq = seq, "Poller: dropping result after teardown");
        return result.map(|_| Applied::TornDown);
    }

    match result {
        Ok(data) => {
            if seq <= fence.last_applied {
                debug!(
                    poller = %shared.name,
                    seq = seq,
                    last_applied = fence.last_applied,
                    "Poller: discarding superseded result"
                );
                if let Some(metrics) = &shared.metrics {
                    metrics
                        .poll_results_discarded_total
                        .with_label_values(&[shared.name.as_str()])
                        .inc();
                }
                return Ok(Applied::Superseded);
            }
            fence.last_applied = seq;

            let hook = shared.on_refresh.clone();
            shared.state.send_modify(|state| {
                if let Some(hook) = &hook {
                    hook(state.data.as_ref(), &data);
                }
                state.data = Some(data);
                state.loading = false;
                state.last_fetched_at = Some(Utc::now());
            });
            Ok(Applied::Yes)
        }
        Err(e) => {
            warn!(
                poller = %shared.name,
                seq = seq,
                error = %e,
                "Poller: refresh failed for {}, keeping previous result",
                shared.name
            );
            if let Some(metrics) = &shared.metrics {
                metrics
                    .poll_failures_total
                    .with_label_values(&[shared.name.as_str()])
                    .inc();
            }
            shared.state.send_if_modified(|state| {
                let was_loading = state.loading;
                state.loading = false;
                was_loading
            });
            Err(e)
        }
    }
}
