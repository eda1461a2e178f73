//! Fixed-window rate limiting keyed by client identity.
//!
//! Each key gets a counter and a reset instant. The first request of a window
//! opens it; requests are allowed until the counter reaches the limit, and the
//! next request after the reset instant opens a fresh window. State lives in
//! process memory behind one mutex: not durable and not shared between
//! instances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub const DEFAULT_LIMIT: u32 = 5;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
    /// Longest accepted window (7 days); longer values are clamped.
    pub const MAX_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window: window.min(Self::MAX_WINDOW),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `key`; returns whether it is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// [`Self::check`] against an explicit clock reading.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.lock();

        if let Some(w) = windows.get_mut(key).filter(|w| now <= w.reset_at) {
            if w.count >= self.limit {
                return false;
            }
            w.count += 1;
            return true;
        }

        windows.insert(
            key.to_string(),
            Window {
                count: 1,
                reset_at: now + self.window,
            },
        );
        true
    }

    /// Drop every window whose reset instant has passed. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);
        before - windows.len()
    }

    /// Number of keys currently holding a window.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave a window half-updated, so
    // the map is still usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_WINDOW)
    }
}
