use serde::{Deserialize, Serialize};

use crate::domain::FormValues;

/// Successful gateway response, echoing the submitted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub success: bool,
    pub data: FormValues,
}

impl SubmissionAck {
    pub fn accepted(data: FormValues) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum SettledOutcome {
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Settled(SettledOutcome),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_submitting_reports_in_flight() {
        assert!(!SubmissionState::Idle.is_submitting());
        assert!(SubmissionState::Submitting.is_submitting());
        assert!(!SubmissionState::Settled(SettledOutcome::Failed("x".into())).is_submitting());
    }

    #[test]
    fn settled_state_serializes_with_its_message() {
        let state = SubmissionState::Settled(SettledOutcome::Failed("nope".into()));
        let json = serde_json::to_value(&state).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "state": "settled",
                "detail": { "outcome": "failed", "message": "nope" }
            })
        );
    }
}
