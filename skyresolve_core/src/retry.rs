//! Bounded retry around one gated upstream call.

use crate::error::ResolveError;
use crate::gate::GateRegistry;
use crate::model::Family;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, used for availability probes.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Runs upstream calls through the family gate with bounded retry.
#[derive(Clone)]
pub struct RetryExecutor {
    gates: Arc<GateRegistry>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(gates: Arc<GateRegistry>, policy: RetryPolicy) -> Self {
        Self { gates, policy }
    }

    pub async fn run<F, Fut, T>(
        &self,
        family: Family,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<T, ResolveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolveError>>,
    {
        self.run_with_policy(family, cancel, self.policy, op).await
    }

    /// Each attempt holds the family gate for its duration. Network and
    /// upstream errors are retried; parse errors and cancellation are not.
    pub async fn run_with_policy<F, Fut, T>(
        &self,
        family: Family,
        cancel: &CancellationToken,
        policy: RetryPolicy,
        mut op: F,
    ) -> Result<T, ResolveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolveError>>,
    {
        let gate = self.gates.gate(family);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }

            let result = {
                let _permit = gate.acquire(cancel).await?;
                tokio::select! {
                    _ = cancel.cancelled() => Err(ResolveError::Cancelled),
                    result = op() => result,
                }
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                    attempt += 1;
                    warn!(
                        target: "skyresolve.retry",
                        family = family.as_str(),
                        attempt,
                        error = %err,
                        "Retrying upstream call"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                        _ = sleep(policy.delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}
