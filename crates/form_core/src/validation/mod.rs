//! Validation strategies. Each one maps a snapshot of the form to
//! [`FieldErrors`], recomputed from scratch on every call.

use std::{fmt, str::FromStr, sync::Arc};

use shared::{domain::FormValues, field_errors::FieldErrors};
use thiserror::Error;

mod manual;
mod registered;
pub mod rules;
mod schema;

pub use manual::ManualValidator;
pub use registered::{RegisterRule, RegisteredValidator};
pub use schema::{Check, Constraint, FieldSchema, FormSchema, SchemaValidator};

pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, values: &FormValues) -> FieldErrors;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStrategy {
    /// Imperative checks written out field by field.
    #[default]
    Manual,
    /// Rules attached to each input as it is registered.
    Registered,
    /// A declarative schema with stricter email, gender and hobby rules.
    Schema,
}

impl ValidationStrategy {
    pub const ALL: [ValidationStrategy; 3] = [
        ValidationStrategy::Manual,
        ValidationStrategy::Registered,
        ValidationStrategy::Schema,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStrategy::Manual => "manual",
            ValidationStrategy::Registered => "registered",
            ValidationStrategy::Schema => "schema",
        }
    }

    pub fn build(self) -> Arc<dyn Validator> {
        match self {
            ValidationStrategy::Manual => Arc::new(ManualValidator),
            ValidationStrategy::Registered => Arc::new(RegisteredValidator::new()),
            ValidationStrategy::Schema => Arc::new(SchemaValidator::default()),
        }
    }
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown validation strategy '{0}', expected manual, registered or schema")]
pub struct UnknownStrategy(pub String);

impl FromStr for ValidationStrategy {
    type Err = UnknownStrategy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        ValidationStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownStrategy(raw.to_string()))
    }
}
