use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::application::ports::{LoadError, Recognizer, RecognizerLoader};

type FlightOutcome = Option<Result<Arc<dyn Recognizer>, LoadError>>;

/// Lifecycle owner of the expensive recognition handle.
///
/// The handle is loaded lazily, at most once per flight regardless of request
/// concurrency, and considered fresh for `ttl` after a successful load. Expiry
/// is checked on acquire only; handles already given out stay usable because
/// callers hold their own `Arc`.
///
/// State transitions happen under a plain mutex with short critical sections;
/// the slow load itself runs outside the lock, its outcome fanned out to
/// waiters through a `watch` channel.
pub struct ModelCache {
    loader: Arc<dyn RecognizerLoader>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

enum CacheState {
    Empty,
    /// A load is in flight; observers subscribe to its outcome instead of
    /// starting a second one.
    Loading(watch::Receiver<FlightOutcome>),
    Ready {
        recognizer: Arc<dyn Recognizer>,
        loaded_at: Instant,
    },
}

/// What the acquiring caller must do once the state lock is released.
enum Acquire {
    Use(Arc<dyn Recognizer>),
    Wait(watch::Receiver<FlightOutcome>),
    Load(watch::Sender<FlightOutcome>),
}

impl ModelCache {
    pub fn new(loader: Arc<dyn RecognizerLoader>, ttl: Duration) -> Self {
        Self {
            loader,
            ttl,
            state: Mutex::new(CacheState::Empty),
        }
    }

    /// Returns a ready-to-use recognizer, loading it if the cache is cold or
    /// stale.
    ///
    /// A failed load leaves the cache empty: the failure is returned to the
    /// initiating caller and to every waiter of that flight, and the next
    /// acquire retries unconditionally.
    pub async fn acquire(&self) -> Result<Arc<dyn Recognizer>, LoadError> {
        let action = {
            let mut state = self.lock_state();
            match &*state {
                CacheState::Ready {
                    recognizer,
                    loaded_at,
                } if loaded_at.elapsed() < self.ttl => Acquire::Use(Arc::clone(recognizer)),
                CacheState::Loading(rx) => Acquire::Wait(rx.clone()),
                // Empty, or Ready but past its TTL: this caller becomes the
                // loader for a new flight.
                _ => {
                    let (tx, rx) = watch::channel(None);
                    *state = CacheState::Loading(rx);
                    Acquire::Load(tx)
                }
            }
        };

        match action {
            Acquire::Use(recognizer) => Ok(recognizer),
            Acquire::Wait(mut rx) => Self::await_flight(&mut rx).await,
            Acquire::Load(tx) => self.run_flight(tx).await,
        }
    }

    async fn run_flight(
        &self,
        flight_tx: watch::Sender<FlightOutcome>,
    ) -> Result<Arc<dyn Recognizer>, LoadError> {
        // If this future is dropped mid-load (client disconnect), the guard
        // rolls the state back to Empty so the cache cannot stay stuck in
        // Loading; dropping `flight_tx` unblocks the waiters.
        let mut guard = AbandonedFlightGuard {
            cache: self,
            armed: true,
        };

        tracing::info!("Loading recognition model");
        let started = Instant::now();
        let outcome = self.loader.load().await;

        {
            let mut state = self.lock_state();
            match &outcome {
                Ok(recognizer) => {
                    tracing::info!(
                        elapsed_secs = started.elapsed().as_secs_f32(),
                        "Recognition model loaded"
                    );
                    *state = CacheState::Ready {
                        recognizer: Arc::clone(recognizer),
                        loaded_at: Instant::now(),
                    };
                }
                Err(e) => {
                    tracing::error!(error = %e, "Recognition model load failed");
                    *state = CacheState::Empty;
                }
            }
        }
        guard.disarm();

        // Waiters only see the outcome through the channel; ignore the send
        // result when none remain.
        let _ = flight_tx.send(Some(outcome.clone()));

        outcome
    }

    async fn await_flight(
        rx: &mut watch::Receiver<FlightOutcome>,
    ) -> Result<Arc<dyn Recognizer>, LoadError> {
        let outcome = rx
            .wait_for(|v| v.is_some())
            .await
            .map_err(|_| LoadError("model load was abandoned".to_string()))?;
        outcome
            .clone()
            .unwrap_or_else(|| Err(LoadError("model load produced no outcome".to_string())))
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        // Nothing in a critical section can panic; recover the data anyway
        // rather than propagating a poison error.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct AbandonedFlightGuard<'a> {
    cache: &'a ModelCache,
    armed: bool,
}

impl AbandonedFlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonedFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.cache.lock_state();
        if matches!(*state, CacheState::Loading(_)) {
            tracing::warn!("Model load abandoned before completion; resetting cache");
            *state = CacheState::Empty;
        }
    }
}
