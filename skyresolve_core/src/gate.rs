//! Per-family request sequencing.
//!
//! Each upstream family gets one [`RateLimitGate`]. Holders are served in
//! FIFO order; a new holder is released only once the previous one has
//! finished and the configured spacing has elapsed since then. Gates of
//! different families are independent.

use crate::error::ResolveError;
use crate::model::Family;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default spacing between consecutive calls within one family.
pub const DEFAULT_GATE_SPACING_MS: u64 = 200;

/// Start instants kept per gate.
pub const RECENT_STARTS: usize = 16;

#[derive(Debug, Default)]
struct GateState {
    last_release: Option<Instant>,
    recent_starts: VecDeque<Instant>,
}

pub struct RateLimitGate {
    family: Family,
    spacing: Duration,
    state: Mutex<GateState>,
}

impl RateLimitGate {
    pub fn new(family: Family, spacing: Duration) -> Self {
        Self {
            family,
            spacing,
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Wait for the gate. The returned permit must be held for the duration
    /// of the upstream call; dropping it releases the gate.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GatePermit<'_>, ResolveError> {
        let mut guard = tokio::select! {
            _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            guard = self.state.lock() => guard,
        };

        if let Some(last) = guard.last_release {
            let ready_at = last + self.spacing;
            if ready_at > Instant::now() {
                debug!(
                    target: "skyresolve.gate",
                    family = self.family.as_str(),
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Spacing upstream call"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                    _ = sleep_until(ready_at) => {}
                }
            }
        }

        if guard.recent_starts.len() == RECENT_STARTS {
            guard.recent_starts.pop_front();
        }
        guard.recent_starts.push_back(Instant::now());
        Ok(GatePermit { guard })
    }

    /// Start instants of the last [`RECENT_STARTS`] calls admitted through
    /// this gate, oldest first. Waits for any call in flight.
    pub async fn call_starts(&self) -> Vec<Instant> {
        self.state.lock().await.recent_starts.iter().copied().collect()
    }
}

/// Held while an upstream call is in flight.
pub struct GatePermit<'a> {
    guard: MutexGuard<'a, GateState>,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.guard.last_release = Some(Instant::now());
    }
}

/// One gate per upstream family. Built once and shared by every connector.
pub struct GateRegistry {
    cds: RateLimitGate,
    ned: RateLimitGate,
    mpc: RateLimitGate,
}

impl GateRegistry {
    pub fn new(spacing: Duration) -> Self {
        Self {
            cds: RateLimitGate::new(Family::Cds, spacing),
            ned: RateLimitGate::new(Family::Ned, spacing),
            mpc: RateLimitGate::new(Family::Mpc, spacing),
        }
    }

    pub fn gate(&self, family: Family) -> &RateLimitGate {
        match family {
            Family::Cds => &self.cds,
            Family::Ned => &self.ned,
            Family::Mpc => &self.mpc,
        }
    }
}

impl Default for GateRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_GATE_SPACING_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_holders_are_spaced() {
        let gate = RateLimitGate::new(Family::Cds, Duration::from_millis(200));
        let cancel = CancellationToken::new();

        for _ in 0..3 {
            let _permit = gate.acquire(&cancel).await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let starts = gate.call_starts().await;
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(200));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_history_is_bounded() {
        let gate = RateLimitGate::new(Family::Ned, Duration::from_millis(200));
        let cancel = CancellationToken::new();

        for _ in 0..RECENT_STARTS + 5 {
            let _permit = gate.acquire(&cancel).await.unwrap();
        }
        let last = Instant::now();

        let starts = gate.call_starts().await;
        assert_eq!(starts.len(), RECENT_STARTS);
        assert_eq!(starts.last().copied(), Some(last));
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(200));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_families_do_not_block_each_other() {
        let registry = Arc::new(GateRegistry::default());
        let cancel = CancellationToken::new();

        let _cds = registry.gate(Family::Cds).acquire(&cancel).await.unwrap();
        let before = Instant::now();
        let _ned = registry.gate(Family::Ned).acquire(&cancel).await.unwrap();
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_is_cancellable() {
        let gate = Arc::new(RateLimitGate::new(Family::Mpc, Duration::from_millis(200)));
        let cancel = CancellationToken::new();
        let held = gate.acquire(&cancel).await.unwrap();

        let waiter = {
            let gate = Arc::clone(&gate);
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.acquire(&cancel).await.map(|_| ()) })
        };
        tokio::task::yield_now().await;
        cancel.cancel();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(ResolveError::Cancelled)));
        drop(held);
    }
}
