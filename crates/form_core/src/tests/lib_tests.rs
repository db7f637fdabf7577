use super::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::domain::Address;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Notify;

use crate::validation::rules::{CITY_REQUIRED, FIRST_NAME_REQUIRED, HOBBY_NAME_REQUIRED};

const SERVER_ERROR: &str = "Server error occurred. Please try again.";

/// Answers immediately with a fixed outcome and records what it was sent.
struct TestGateway {
    fail_with: Option<String>,
    calls: AtomicUsize,
    received: Mutex<Vec<FormValues>>,
}

impl TestGateway {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.into()),
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionGateway for TestGateway {
    async fn submit(&self, values: FormValues) -> Result<SubmissionAck, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().await.push(values.clone());
        match &self.fail_with {
            Some(message) => Err(GatewayError::new(message.clone())),
            None => Ok(SubmissionAck::accepted(values)),
        }
    }
}

/// Parks every call until the test releases it.
struct HeldGateway {
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl HeldGateway {
    fn new(fail_with: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            fail_with: fail_with.map(str::to_string),
        })
    }
}

#[async_trait]
impl SubmissionGateway for HeldGateway {
    async fn submit(&self, values: FormValues) -> Result<SubmissionAck, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        match &self.fail_with {
            Some(message) => Err(GatewayError::new(message.clone())),
            None => Ok(SubmissionAck::accepted(values)),
        }
    }
}

struct PanickingGateway;

#[async_trait]
impl SubmissionGateway for PanickingGateway {
    async fn submit(&self, _values: FormValues) -> Result<SubmissionAck, GatewayError> {
        panic!("backend exploded");
    }
}

fn valid_values() -> FormValues {
    FormValues {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "a@b.com".into(),
        age: 18,
        gender: "female".into(),
        address: Address {
            city: "London".into(),
            state: "N/A".into(),
        },
        hobbies: vec![Hobby::named("math", 5)],
        start_date: NaiveDate::from_ymd_opt(1843, 7, 1).expect("date"),
        subscribe: false,
        referral: String::new(),
    }
}

fn valid_form(gateway: Arc<dyn SubmissionGateway>) -> Arc<FormController> {
    FormController::with_values(valid_values(), ValidationStrategy::Schema.build(), gateway)
}

#[tokio::test]
async fn set_field_reaches_nested_paths_without_validating() {
    let controller = FormController::with_strategy(ValidationStrategy::Manual, TestGateway::ok());

    controller
        .set_field(FieldUpdate::AddressCity("Paris".into()))
        .await
        .expect("set city");
    controller
        .set_field_raw("hobbies.0.name", "fencing")
        .await
        .expect("set hobby name");
    controller
        .set_field_raw("age", "40")
        .await
        .expect("set age");

    let values = controller.values().await;
    assert_eq!(values.address.city, "Paris");
    assert_eq!(values.hobbies[0].name, "fencing");
    assert_eq!(values.age, 40);
    assert!(controller.errors().await.is_empty());
}

#[tokio::test]
async fn raw_updates_reject_unknown_paths_and_bad_values() {
    let controller = FormController::with_strategy(ValidationStrategy::Manual, TestGateway::ok());

    assert!(matches!(
        controller.set_field_raw("nickname", "x").await,
        Err(FormError::UnknownField(_))
    ));
    assert!(matches!(
        controller.set_field_raw("age", "old").await,
        Err(FormError::InvalidValue { .. })
    ));
    assert_eq!(
        controller.set_field_raw("hobbies.3.name", "x").await,
        Err(FormError::HobbyIndexOutOfRange { index: 3, len: 1 })
    );
}

#[tokio::test]
async fn hobby_list_never_drops_below_one_entry() {
    let controller = FormController::with_strategy(ValidationStrategy::Manual, TestGateway::ok());

    assert_eq!(controller.remove_hobby(0).await, Ok(false));
    assert_eq!(controller.values().await.hobbies.len(), 1);

    let second = controller.add_hobby().await;
    controller.add_hobby().await;
    assert_eq!(controller.values().await.hobbies.len(), 3);

    assert_eq!(controller.remove_hobby(0).await, Ok(true));
    assert_eq!(controller.hobby_keys().await[0], second);
    assert_eq!(
        controller.remove_hobby(5).await,
        Err(FormError::HobbyIndexOutOfRange { index: 5, len: 2 })
    );
}

#[tokio::test]
async fn empty_hobby_list_is_seeded_on_open() {
    let mut values = valid_values();
    values.hobbies.clear();

    let controller =
        FormController::with_values(values, ValidationStrategy::Manual.build(), TestGateway::ok());

    assert_eq!(controller.values().await.hobbies, vec![Hobby::default()]);
    assert_eq!(controller.hobby_keys().await.len(), 1);
}

#[tokio::test]
async fn validate_reports_without_storing() {
    let controller = FormController::with_strategy(ValidationStrategy::Manual, TestGateway::ok());

    let first = controller.validate().await;
    let second = controller.validate().await;

    assert_eq!(first, second);
    assert_eq!(first.get(&FieldPath::FirstName), Some(FIRST_NAME_REQUIRED));
    assert!(controller.errors().await.is_empty());
}

#[tokio::test]
async fn invalid_submit_stores_errors_and_skips_gateway() {
    let gateway = TestGateway::ok();
    let controller = FormController::with_strategy(ValidationStrategy::Registered, gateway.clone());

    let outcome = controller.submit().await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(errors.get(&FieldPath::HobbyName(0)), Some(HOBBY_NAME_REQUIRED));
    assert_eq!(controller.errors().await, errors);
    assert_eq!(gateway.calls(), 0);
    assert!(!controller.is_submitting());
    assert_eq!(controller.submission_state().await, SubmissionState::Idle);
}

#[tokio::test]
async fn successful_submit_clears_errors_and_keeps_values() {
    let gateway = TestGateway::ok();
    let controller = valid_form(gateway.clone());

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Succeeded(SubmissionAck::accepted(valid_values())));
    assert!(controller.errors().await.is_empty());
    assert_eq!(controller.values().await, valid_values());
    assert_eq!(
        controller.submission_state().await,
        SubmissionState::Settled(SettledOutcome::Succeeded)
    );
    assert_eq!(*gateway.received.lock().await, vec![valid_values()]);
}

#[tokio::test]
async fn failed_submit_sets_only_the_root_error() {
    let controller = valid_form(TestGateway::failing(SERVER_ERROR));

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Failed(SERVER_ERROR.to_string()));
    let errors = controller.errors().await;
    assert_eq!(errors.root.as_deref(), Some(SERVER_ERROR));
    assert_eq!(errors.field_error_count(), 0);
    assert!(!controller.is_submitting());
    assert_eq!(
        controller.submission_state().await,
        SubmissionState::Settled(SettledOutcome::Failed(SERVER_ERROR.to_string()))
    );
}

#[tokio::test]
async fn later_validation_failure_replaces_stale_root_error() {
    let controller = valid_form(TestGateway::failing(SERVER_ERROR));
    controller.submit().await;

    controller
        .set_field(FieldUpdate::AddressCity(String::new()))
        .await
        .expect("clear city");
    controller.submit().await;

    let errors = controller.errors().await;
    assert_eq!(errors.root, None);
    assert_eq!(errors.get(&FieldPath::AddressCity), Some(CITY_REQUIRED));
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let gateway = HeldGateway::new(None);
    let controller = valid_form(gateway.clone());

    let first = controller.spawn_submit();
    gateway.entered.notified().await;

    assert!(controller.is_submitting());
    assert_eq!(controller.submission_state().await, SubmissionState::Submitting);
    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Rejected(RejectReason::InFlight)
    );

    gateway.release.notify_one();
    let outcome = first.await.expect("join submission");

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn panicking_gateway_settles_as_failure() {
    let controller = valid_form(Arc::new(PanickingGateway));

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Failed(GATEWAY_PANIC_MESSAGE.to_string()));
    assert!(!controller.is_submitting());
    assert_eq!(
        controller.errors().await.root.as_deref(),
        Some(GATEWAY_PANIC_MESSAGE)
    );
}

#[tokio::test(start_paused = true)]
async fn abandoned_submit_releases_the_in_flight_flag() {
    let gateway = HeldGateway::new(None);
    let controller = valid_form(gateway.clone());

    let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.submit()).await;

    assert!(timed_out.is_err());
    assert!(!controller.is_submitting());

    let retry = controller.spawn_submit();
    gateway.entered.notified().await;
    gateway.release.notify_one();
    assert!(matches!(
        retry.await.expect("join retry"),
        SubmitOutcome::Succeeded(_)
    ));
}

#[tokio::test]
async fn closing_mid_flight_discards_the_result() {
    let gateway = HeldGateway::new(Some(SERVER_ERROR));
    let controller = valid_form(gateway.clone());

    let pending = controller.spawn_submit();
    gateway.entered.notified().await;
    controller.close();
    gateway.release.notify_one();

    assert_eq!(pending.await.expect("join"), SubmitOutcome::Discarded);
    assert_eq!(controller.errors().await.root, None);
    assert_eq!(controller.submission_state().await, SubmissionState::Idle);
    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Rejected(RejectReason::Closed)
    );
}

#[tokio::test]
async fn dropping_the_form_mid_flight_discards_the_result() {
    let gateway = HeldGateway::new(None);
    let controller = valid_form(gateway.clone());

    let pending = controller.spawn_submit();
    gateway.entered.notified().await;
    drop(controller);
    gateway.release.notify_one();

    assert_eq!(pending.await.expect("join"), SubmitOutcome::Discarded);
}

#[tokio::test]
async fn events_trace_the_submission_lifecycle() {
    let controller = valid_form(TestGateway::failing(SERVER_ERROR));
    let mut events = controller.subscribe_events();

    controller.submit().await;

    assert_eq!(events.recv().await.expect("started"), FormEvent::SubmissionStarted);
    assert_eq!(
        events.recv().await.expect("failed"),
        FormEvent::SubmissionFailed {
            message: SERVER_ERROR.to_string()
        }
    );
}

#[tokio::test]
async fn validation_failure_is_announced() {
    let controller = FormController::with_strategy(ValidationStrategy::Schema, TestGateway::ok());
    let mut events = controller.subscribe_events();

    controller.submit().await;

    assert!(matches!(
        events.recv().await.expect("event"),
        FormEvent::ValidationFailed { error_count } if error_count > 0
    ));
}
