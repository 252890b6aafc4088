//! Price feed store
//!
//! Owns the live snapshot plus its loading/refetching/error flags,
//! refreshes it on a fixed schedule, and publishes every state change
//! to subscribers.

use crate::snapshot::{build_snapshot, PriceSnapshot};
use crate::source::PriceSource;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Capacity of the state change channel; slow subscribers lag, they
/// never block the store.
const STATE_CHANNEL_CAPACITY: usize = 32;

/// Read-only view of the feed at one point in time.
///
/// Clones are cheap: the snapshot itself sits behind an `Arc` and is
/// replaced wholesale on each successful refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Latest published snapshot (empty until the first successful refresh)
    pub prices: Arc<PriceSnapshot>,
    /// True until the very first fetch attempt completes, then permanently false
    pub is_loading: bool,
    /// True while a refresh attempt after the first is in flight
    pub is_refetching: bool,
    /// Message of the most recent failed attempt; cleared when a new attempt starts
    pub error: Option<String>,
}

impl FeedState {
    fn initial() -> Self {
        Self {
            prices: Arc::new(PriceSnapshot::new()),
            is_loading: true,
            is_refetching: false,
            error: None,
        }
    }
}

struct StoreInner {
    source: Arc<dyn PriceSource>,
    state: RwLock<FeedState>,
    updates: broadcast::Sender<FeedState>,
    /// Attempt-in-progress flag; at most one upstream fetch at a time
    in_flight: AtomicBool,
    /// Wakes refresh callers that coalesced onto a running attempt
    cycle_done: Notify,
    first_attempt_done: AtomicBool,
    /// Cleared on teardown; checked by `publish` so a late cycle mutates nothing
    active: AtomicBool,
}

impl StoreInner {
    /// Mutate the state and broadcast the result. Returns false without
    /// touching anything once the store has been torn down.
    fn publish(&self, mutate: impl FnOnce(&mut FeedState)) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return false;
        }

        let updated = {
            let mut state = self.state.write();
            mutate(&mut state);
            state.clone()
        };

        // Err here only means nobody is subscribed right now
        let _ = self.updates.send(updated);
        true
    }

    /// One fetch-reduce-publish attempt.
    async fn run_cycle(&self) {
        let first = !self.first_attempt_done.load(Ordering::Acquire);

        if !self.publish(|state| {
            state.error = None;
            if !first {
                state.is_refetching = true;
            }
        }) {
            return;
        }

        let fetched = self.source.fetch_records().await;

        match &fetched {
            Ok(records) => debug!("Fetched {} price records", records.len()),
            Err(err) => warn!("Price refresh failed: {err}"),
        }

        let published = self.publish(|state| {
            match fetched {
                Ok(records) => {
                    // Replace wholesale; a failed attempt below keeps the
                    // last-known-good prices visible instead.
                    state.prices = Arc::new(build_snapshot(&records));
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                }
            }
            if first {
                state.is_loading = false;
            } else {
                state.is_refetching = false;
            }
        });

        if published {
            self.first_attempt_done.store(true, Ordering::Release);
        }
    }

    async fn refresh(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        // Register for completion before the flag check so a finishing
        // attempt cannot slip its wakeup past us.
        let done = self.cycle_done.notified();
        tokio::pin!(done);
        done.as_mut().enable();

        if self.in_flight.swap(true, Ordering::AcqRel) {
            // An attempt is already in flight; await it instead of
            // issuing a second upstream fetch.
            done.await;
            return;
        }

        self.run_cycle().await;

        self.in_flight.store(false, Ordering::Release);
        self.cycle_done.notify_waiters();
    }
}

/// Owns the live price snapshot and its refresh schedule.
///
/// Construction fetches immediately and then refreshes at the fixed
/// interval until [`PriceFeedStore::shutdown`] (or drop) tears the
/// schedule down. Must be created inside a tokio runtime.
pub struct PriceFeedStore {
    inner: Arc<StoreInner>,
    scheduler: JoinHandle<()>,
}

impl PriceFeedStore {
    /// Start the store: an immediate initial refresh plus a recurring
    /// schedule at `refresh_interval`.
    pub fn start(source: Arc<dyn PriceSource>, refresh_interval: Duration) -> Self {
        let (updates, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);

        let inner = Arc::new(StoreInner {
            source,
            state: RwLock::new(FeedState::initial()),
            updates,
            in_flight: AtomicBool::new(false),
            cycle_done: Notify::new(),
            first_attempt_done: AtomicBool::new(false),
            active: AtomicBool::new(true),
        });

        let scheduler = tokio::spawn(Self::run_schedule(
            Arc::clone(&inner),
            refresh_interval,
        ));

        Self { inner, scheduler }
    }

    /// Scheduler task. The first tick fires immediately (the initial
    /// refresh); later ticks hold the fixed cadence measured from
    /// construction. A tick landing while an attempt is pending coalesces
    /// onto it instead of launching an overlapping fetch.
    async fn run_schedule(inner: Arc<StoreInner>, refresh_interval: Duration) {
        let mut ticker = interval(refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            inner.refresh().await;
        }
    }

    /// Current state.
    pub fn state(&self) -> FeedState {
        self.inner.state.read().clone()
    }

    /// Subscribe to state changes; the full state is broadcast after
    /// every published mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedState> {
        self.inner.updates.subscribe()
    }

    /// Trigger one fetch-reduce-publish cycle.
    ///
    /// If an attempt is already in flight, the call awaits that attempt
    /// instead of starting a second fetch. After shutdown this is a no-op.
    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }

    /// Tear the store down: stop the schedule and invalidate any state
    /// write from a cycle still in flight.
    pub fn shutdown(&self) {
        self.inner.active.store(false, Ordering::Release);
        self.scheduler.abort();
        // Release anyone coalesced onto an attempt that will never publish
        self.inner.cycle_done.notify_waiters();
    }
}

impl Drop for PriceFeedStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
