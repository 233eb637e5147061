//! Circuit breaker for the generation backend.
//!
//! One instance is shared by every concurrent rewrite. Counters live behind a
//! mutex; no lock is held across await points. Time is passed in as epoch
//! seconds so the transition logic is testable without sleeping.

use ark_common::ResilienceSnapshot;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
struct Inner {
    fail_count: u32,
    disabled_until: u64,
    last_ok: bool,
}

/// Failure counters and cooldown window for the backend.
pub struct Resilience {
    fails_before_cooldown: u32,
    cooldown_seconds: u64,
    inner: Mutex<Inner>,
}

/// Current epoch seconds.
pub fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Resilience {
    pub fn new(fails_before_cooldown: u32, cooldown_seconds: u64) -> Self {
        Self {
            fails_before_cooldown,
            cooldown_seconds,
            inner: Mutex::new(Inner {
                last_ok: true,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock still holds consistent counters; keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a backend call may be attempted now. While the cooldown is
    /// active this returns false and marks the last call as not ok - the
    /// open-circuit short path.
    pub fn permit(&self) -> bool {
        self.permit_at(epoch_now())
    }

    pub fn permit_at(&self, now: u64) -> bool {
        let mut inner = self.lock();
        if now < inner.disabled_until {
            inner.last_ok = false;
            false
        } else {
            true
        }
    }

    /// A successful call fully closes the circuit.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.fail_count = 0;
        inner.last_ok = true;
    }

    /// Count a failure; once the threshold is reached the cooldown window
    /// opens. Returns the updated (fail_count, disabled_until) for auditing.
    pub fn record_failure(&self) -> (u32, u64) {
        self.record_failure_at(epoch_now())
    }

    pub fn record_failure_at(&self, now: u64) -> (u32, u64) {
        let mut inner = self.lock();
        inner.fail_count += 1;
        inner.last_ok = false;
        if inner.fail_count >= self.fails_before_cooldown {
            inner.disabled_until = now + self.cooldown_seconds;
        }
        (inner.fail_count, inner.disabled_until)
    }

    pub fn snapshot(&self) -> ResilienceSnapshot {
        let inner = self.lock();
        ResilienceSnapshot {
            last_ok: inner.last_ok,
            fail_count: inner.fail_count,
            disabled_until: inner.disabled_until,
        }
    }
}
