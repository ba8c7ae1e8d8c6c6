//! Observation hooks invoked after every transport round trip.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What happened on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequestOutcome {
    /// JSON-RPC method or compiler endpoint.
    pub method: String,
    pub elapsed: Duration,
    pub success: bool,
    /// Configured request timeout.
    pub timeout: Duration,
    /// JSON-RPC error code or HTTP status on failure.
    pub error_code: Option<i64>,
}

type Hook = Arc<dyn Fn(&RpcRequestOutcome) + Send + Sync>;

/// Callbacks shared by the node and compiler clients.
#[derive(Clone, Default)]
pub struct RpcClientHooks {
    on_complete: Vec<Hook>,
}

impl RpcClientHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callback run after each request, successful or not.
    #[must_use]
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RpcRequestOutcome) + Send + Sync + 'static,
    {
        self.on_complete.push(Arc::new(hook));
        self
    }

    /// Hooks that emit one `debug!` event per request.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new().on_complete(|outcome| {
            tracing::debug!(
                target: "harness_rpc",
                method = %outcome.method,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                success = outcome.success,
                error_code = ?outcome.error_code,
                "rpc round trip"
            );
        })
    }

    pub(crate) fn notify(&self, outcome: &RpcRequestOutcome) {
        for hook in &self.on_complete {
            hook(outcome);
        }
    }
}

impl fmt::Debug for RpcClientHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClientHooks")
            .field("on_complete", &self.on_complete.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn every_hook_sees_each_outcome() {
        let seen = Arc::new(AtomicUsize::new(0));
        let a = Arc::clone(&seen);
        let b = Arc::clone(&seen);
        let hooks = RpcClientHooks::new()
            .on_complete(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })
            .on_complete(move |o| {
                if !o.success {
                    b.fetch_add(10, Ordering::SeqCst);
                }
            });

        hooks.notify(&RpcRequestOutcome {
            method: "getstatus".into(),
            elapsed: Duration::from_millis(3),
            success: false,
            timeout: Duration::from_secs(1),
            error_code: Some(-32603),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 11);
    }
}
