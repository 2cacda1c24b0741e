//! Background countdown for an active test session.
//!
//! The countdown is the only thing that changes a session without user input.
//! It ticks the shared session once per period, stops as soon as the session
//! is no longer active, and is aborted when its handle is dropped so it never
//! touches a discarded session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::scoring::TestResult;
use crate::session::TestSession;

/// A session shared between the presentation layer and the countdown.
pub type SharedSession = Arc<Mutex<TestSession>>;

/// Wrap a session for sharing with a [`Countdown`].
pub fn share(session: TestSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Handle to a running countdown task.
pub struct Countdown {
    handle: JoinHandle<()>,
    expired: oneshot::Receiver<TestResult>,
}

impl Countdown {
    /// Start ticking `session` once per `period`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn(session: SharedSession, period: Duration) -> Self {
        assert!(!period.is_zero(), "countdown period must be non-zero");
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let outcome = {
                    let Ok(mut guard) = session.lock() else {
                        tracing::warn!("session lock poisoned, stopping countdown");
                        break;
                    };
                    if !guard.is_active() {
                        break;
                    }
                    guard.tick()
                };
                if let Some(result) = outcome {
                    let _ = tx.send(result);
                    break;
                }
            }
            tracing::debug!("countdown stopped");
        });

        Self {
            handle,
            expired: rx,
        }
    }

    /// Wait for the countdown to submit the session.
    ///
    /// Resolves to `None` if the countdown stopped without submitting, which
    /// happens when the session was submitted by other means.
    pub async fn expired(&mut self) -> Option<TestResult> {
        (&mut self.expired).await.ok()
    }

    /// Stop the countdown. Safe to call more than once.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
