use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{domain::FormValues, error::GatewayError, protocol::SubmissionAck};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_FAILURE_RATE: f64 = 0.5;
pub const SERVER_ERROR_MESSAGE: &str = "Server error occurred. Please try again.";

/// The backend boundary a form submits to.
///
/// Implementations may take arbitrarily long and may fail for any reason; the
/// caller only ever sees the echoed values or a message.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, values: FormValues) -> Result<SubmissionAck, GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutcomePolicy {
    Random { failure_rate: f64 },
    AlwaysSucceed,
    AlwaysFail,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        OutcomePolicy::Random {
            failure_rate: DEFAULT_FAILURE_RATE,
        }
    }
}

impl OutcomePolicy {
    fn normalized(self) -> Self {
        match self {
            OutcomePolicy::Random { failure_rate } if !failure_rate.is_finite() => {
                OutcomePolicy::default()
            }
            OutcomePolicy::Random { failure_rate } => OutcomePolicy::Random {
                failure_rate: failure_rate.clamp(0.0, 1.0),
            },
            other => other,
        }
    }
}

/// Stand-in backend: waits a fixed delay, then accepts or rejects according
/// to its [`OutcomePolicy`].
pub struct SimulatedGateway {
    delay: Duration,
    policy: OutcomePolicy,
    rng: Mutex<StdRng>,
    calls: AtomicU64,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, OutcomePolicy::default())
    }
}

impl SimulatedGateway {
    pub fn new(delay: Duration, policy: OutcomePolicy) -> Self {
        Self {
            delay,
            policy: policy.normalized(),
            rng: Mutex::new(StdRng::from_entropy()),
            calls: AtomicU64::new(0),
        }
    }

    /// Makes the random outcome sequence reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn policy(&self) -> OutcomePolicy {
        self.policy
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn should_fail(&self) -> bool {
        match self.policy {
            OutcomePolicy::AlwaysSucceed => false,
            OutcomePolicy::AlwaysFail => true,
            OutcomePolicy::Random { failure_rate } => {
                self.rng.lock().await.gen_bool(failure_rate)
            }
        }
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedGateway {
    async fn submit(&self, values: FormValues) -> Result<SubmissionAck, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(call, delay_ms = self.delay.as_millis() as u64, "gateway: submission received");

        tokio::time::sleep(self.delay).await;

        if self.should_fail().await {
            info!(call, "gateway: rejecting submission");
            return Err(GatewayError::new(SERVER_ERROR_MESSAGE));
        }

        info!(call, "gateway: accepted submission");
        Ok(SubmissionAck::accepted(values))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
