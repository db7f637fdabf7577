use std::sync::LazyLock;

use regex::Regex;
use shared::{domain::FormValues, field_errors::FieldErrors, path::FieldPath};

use super::{rules::*, Validator};

/// One option passed when an input is registered with the form.
#[derive(Clone, Copy)]
pub enum RegisterRule {
    Required(&'static str),
    Pattern {
        regex: &'static LazyLock<Regex>,
        message: &'static str,
    },
    Min {
        value: u32,
        message: &'static str,
    },
}

impl RegisterRule {
    fn passes(&self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (RegisterRule::Required(_), FieldValue::Text(text)) => !text.is_empty(),
            (RegisterRule::Required(_), FieldValue::Absent) => false,
            (RegisterRule::Required(_), _) => true,
            (RegisterRule::Pattern { regex, .. }, FieldValue::Text(text)) => {
                // An empty input is left to `Required`.
                text.is_empty() || regex.is_match(text)
            }
            (RegisterRule::Min { value: min, .. }, FieldValue::Number(number)) => number >= *min,
            _ => true,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RegisterRule::Required(message) => *message,
            RegisterRule::Pattern { message, .. } | RegisterRule::Min { message, .. } => *message,
        }
    }
}

struct Registration {
    target: Target,
    rules: Vec<RegisterRule>,
}

/// Rules attached per input at registration time, evaluated in registration
/// order with the first failure per input reported.
pub struct RegisteredValidator {
    registrations: Vec<Registration>,
}

impl Default for RegisteredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisteredValidator {
    pub fn new() -> Self {
        let mut validator = Self {
            registrations: Vec::new(),
        };
        validator
            .register(
                Target::Field(FieldPath::FirstName),
                [RegisterRule::Required(FIRST_NAME_REQUIRED)],
            )
            .register(
                Target::Field(FieldPath::LastName),
                [RegisterRule::Required(LAST_NAME_REQUIRED)],
            )
            .register(
                Target::Field(FieldPath::Email),
                [
                    RegisterRule::Required(EMAIL_REQUIRED),
                    RegisterRule::Pattern {
                        regex: &LOOSE_EMAIL,
                        message: EMAIL_INVALID,
                    },
                ],
            )
            .register(
                Target::Field(FieldPath::Age),
                [
                    RegisterRule::Required(AGE_REQUIRED),
                    RegisterRule::Min {
                        value: MINIMUM_AGE,
                        message: AGE_TOO_YOUNG,
                    },
                ],
            )
            .register(
                Target::Field(FieldPath::Gender),
                [RegisterRule::Required(GENDER_REQUIRED)],
            )
            .register(
                Target::Field(FieldPath::AddressCity),
                [RegisterRule::Required(CITY_REQUIRED)],
            )
            .register(
                Target::Field(FieldPath::AddressState),
                [RegisterRule::Required(STATE_REQUIRED)],
            )
            .register(
                Target::EachHobby(HobbyField::Name),
                [RegisterRule::Required(HOBBY_NAME_REQUIRED)],
            );
        validator
    }

    pub fn register(
        &mut self,
        target: Target,
        rules: impl IntoIterator<Item = RegisterRule>,
    ) -> &mut Self {
        self.registrations.push(Registration {
            target,
            rules: rules.into_iter().collect(),
        });
        self
    }
}

impl Validator for RegisteredValidator {
    fn name(&self) -> &'static str {
        "registered"
    }

    fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for registration in &self.registrations {
            for path in registration.target.resolve(values) {
                let value = read_field(values, path);
                if let Some(failed) = registration.rules.iter().find(|rule| !rule.passes(value)) {
                    errors.insert(path, failed.message());
                }
            }
        }
        // The referral input only exists while subscribed, so its `required`
        // option is the conditional rule.
        REFERRAL_WHEN_SUBSCRIBED.check(values, &mut errors);

        errors
    }
}
