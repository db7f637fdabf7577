use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures::FutureExt;
use gateway::SubmissionGateway;
use shared::{
    domain::{FormValues, Hobby, HobbyKey},
    error::{FormError, GatewayError},
    field_errors::FieldErrors,
    path::{FieldPath, FieldUpdate},
    protocol::{SettledOutcome, SubmissionAck, SubmissionState},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

pub mod validation;

pub use validation::{ValidationStrategy, Validator};

const EVENT_CHANNEL_CAPACITY: usize = 64;
pub const GATEWAY_PANIC_MESSAGE: &str = "Submission failed unexpectedly. Please try again.";
pub const NOT_ACCEPTED_MESSAGE: &str = "Submission was not accepted.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    ValidationFailed { error_count: usize },
    SubmissionStarted,
    SubmissionSucceeded(SubmissionAck),
    SubmissionFailed { message: String },
    SubmissionDiscarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InFlight,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was validated or sent.
    Rejected(RejectReason),
    Invalid(FieldErrors),
    Succeeded(SubmissionAck),
    Failed(String),
    /// The gateway answered after the form was torn down; nothing was applied.
    Discarded,
}

struct FormState {
    values: FormValues,
    hobby_keys: Vec<HobbyKey>,
    errors: FieldErrors,
    last_outcome: Option<SettledOutcome>,
}

/// Marks a submission as in flight until dropped.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns one open form: its values, the last stored errors and the in-flight
/// submission flag.
///
/// The validation strategy and gateway are fixed at construction. At most one
/// submission runs at a time; a second `submit` while one is pending is
/// rejected without touching the gateway.
pub struct FormController {
    validator: Arc<dyn Validator>,
    gateway: Arc<dyn SubmissionGateway>,
    inner: Mutex<FormState>,
    submitting: Arc<AtomicBool>,
    closed: AtomicBool,
    events: broadcast::Sender<FormEvent>,
}

impl FormController {
    pub fn new(
        validator: Arc<dyn Validator>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Arc<Self> {
        Self::with_values(FormValues::default(), validator, gateway)
    }

    pub fn with_strategy(
        strategy: ValidationStrategy,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Arc<Self> {
        Self::new(strategy.build(), gateway)
    }

    pub fn with_values(
        mut values: FormValues,
        validator: Arc<dyn Validator>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Arc<Self> {
        if values.hobbies.is_empty() {
            debug!("form: seeding empty hobby list with one entry");
            values.hobbies.push(Hobby::default());
        }
        let hobby_keys = values.hobbies.iter().map(|_| HobbyKey::new()).collect();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Arc::new(Self {
            validator,
            gateway,
            inner: Mutex::new(FormState {
                values,
                hobby_keys,
                errors: FieldErrors::new(),
                last_outcome: None,
            }),
            submitting: Arc::new(AtomicBool::new(false)),
            closed: AtomicBool::new(false),
            events,
        })
    }

    pub fn strategy_name(&self) -> &'static str {
        self.validator.name()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tears the form down. A submission still in flight settles into
    /// [`SubmitOutcome::Discarded`] and writes nothing back.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!(strategy = self.strategy_name(), "form: closed");
        }
    }

    pub async fn values(&self) -> FormValues {
        self.inner.lock().await.values.clone()
    }

    /// Errors stored by the last submit attempt.
    pub async fn errors(&self) -> FieldErrors {
        self.inner.lock().await.errors.clone()
    }

    pub async fn hobby_keys(&self) -> Vec<HobbyKey> {
        self.inner.lock().await.hobby_keys.clone()
    }

    pub async fn submission_state(&self) -> SubmissionState {
        let state = self.inner.lock().await;
        if self.is_submitting() {
            return SubmissionState::Submitting;
        }
        state
            .last_outcome
            .clone()
            .map_or(SubmissionState::Idle, SubmissionState::Settled)
    }

    pub async fn set_field(&self, update: FieldUpdate) -> Result<(), FormError> {
        let path = update.path();
        let mut state = self.inner.lock().await;
        update.apply_to(&mut state.values)?;
        debug!(field = %path, "form: field updated");
        Ok(())
    }

    /// Like [`set_field`](Self::set_field) but addressed by input name, e.g.
    /// `address.city` or `hobbies.1.years`.
    pub async fn set_field_raw(&self, path: &str, raw: &str) -> Result<(), FormError> {
        let path: FieldPath = path.parse()?;
        self.set_field(FieldUpdate::parse(path, raw)?).await
    }

    pub async fn add_hobby(&self) -> HobbyKey {
        let mut state = self.inner.lock().await;
        let key = HobbyKey::new();
        state.values.hobbies.push(Hobby::default());
        state.hobby_keys.push(key);
        debug!(count = state.values.hobbies.len(), "form: hobby added");
        key
    }

    /// Returns `Ok(false)` without changing anything when `index` is the only
    /// remaining hobby.
    pub async fn remove_hobby(&self, index: usize) -> Result<bool, FormError> {
        let mut state = self.inner.lock().await;
        let len = state.values.hobbies.len();
        if index >= len {
            return Err(FormError::HobbyIndexOutOfRange { index, len });
        }
        if len == 1 {
            debug!(index, "form: refusing to remove the last hobby");
            return Ok(false);
        }
        state.values.hobbies.remove(index);
        state.hobby_keys.remove(index);
        debug!(index, count = len - 1, "form: hobby removed");
        Ok(true)
    }

    /// Runs the strategy over the current values. Nothing is stored.
    pub async fn validate(&self) -> FieldErrors {
        let state = self.inner.lock().await;
        self.validator.validate(&state.values)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (snapshot, in_flight) = match self.begin_submission().await {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };
        let result = call_gateway(self.gateway.as_ref(), snapshot).await;
        self.settle(result, in_flight).await
    }

    /// Submits on the runtime while holding the form only weakly, so dropping
    /// every handle mid-flight discards the gateway's answer.
    pub fn spawn_submit(self: &Arc<Self>) -> JoinHandle<SubmitOutcome> {
        let form = Arc::downgrade(self);
        let gateway = Arc::clone(&self.gateway);

        tokio::spawn(async move {
            let Some(controller) = form.upgrade() else {
                return SubmitOutcome::Discarded;
            };
            let (snapshot, in_flight) = match controller.begin_submission().await {
                Ok(started) => started,
                Err(outcome) => return outcome,
            };
            drop(controller);

            let result = call_gateway(gateway.as_ref(), snapshot).await;

            match form.upgrade() {
                Some(controller) => controller.settle(result, in_flight).await,
                None => {
                    info!("form: dropped before submission settled; discarding result");
                    SubmitOutcome::Discarded
                }
            }
        })
    }

    async fn begin_submission(&self) -> Result<(FormValues, InFlight), SubmitOutcome> {
        if self.is_closed() {
            return Err(SubmitOutcome::Rejected(RejectReason::Closed));
        }

        let mut state = self.inner.lock().await;
        if self.is_submitting() {
            warn!("form: submit ignored, a submission is already in flight");
            return Err(SubmitOutcome::Rejected(RejectReason::InFlight));
        }

        let errors = self.validator.validate(&state.values);
        if !errors.is_empty() {
            let error_count = errors.field_error_count();
            info!(
                strategy = self.strategy_name(),
                error_count, "form: validation failed, submission aborted"
            );
            state.errors = errors.clone();
            drop(state);
            let _ = self
                .events
                .send(FormEvent::ValidationFailed { error_count });
            return Err(SubmitOutcome::Invalid(errors));
        }

        self.submitting.store(true, Ordering::SeqCst);
        let in_flight = InFlight(Arc::clone(&self.submitting));
        state.errors = FieldErrors::new();
        let snapshot = state.values.clone();
        drop(state);

        info!(strategy = self.strategy_name(), "form: submission started");
        let _ = self.events.send(FormEvent::SubmissionStarted);
        Ok((snapshot, in_flight))
    }

    async fn settle(
        &self,
        result: Result<SubmissionAck, GatewayError>,
        in_flight: InFlight,
    ) -> SubmitOutcome {
        let mut state = self.inner.lock().await;

        if self.is_closed() {
            drop(in_flight);
            drop(state);
            info!("form: closed before submission settled; discarding result");
            let _ = self.events.send(FormEvent::SubmissionDiscarded);
            return SubmitOutcome::Discarded;
        }

        let (outcome, event) = match result {
            Ok(ack) => {
                state.errors = FieldErrors::new();
                state.last_outcome = Some(SettledOutcome::Succeeded);
                info!("form: submission succeeded");
                (
                    SubmitOutcome::Succeeded(ack.clone()),
                    FormEvent::SubmissionSucceeded(ack),
                )
            }
            Err(err) => {
                warn!(message = %err.message, "form: submission failed");
                state.errors.set_root(err.message.clone());
                state.last_outcome = Some(SettledOutcome::Failed(err.message.clone()));
                (
                    SubmitOutcome::Failed(err.message.clone()),
                    FormEvent::SubmissionFailed {
                        message: err.message,
                    },
                )
            }
        };
        drop(in_flight);
        drop(state);

        let _ = self.events.send(event);
        outcome
    }
}

async fn call_gateway(
    gateway: &dyn SubmissionGateway,
    snapshot: FormValues,
) -> Result<SubmissionAck, GatewayError> {
    match AssertUnwindSafe(gateway.submit(snapshot)).catch_unwind().await {
        Ok(Ok(ack)) if !ack.success => Err(GatewayError::new(NOT_ACCEPTED_MESSAGE)),
        Ok(result) => result,
        Err(_) => {
            error!("form: submission gateway panicked");
            Err(GatewayError::new(GATEWAY_PANIC_MESSAGE))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
