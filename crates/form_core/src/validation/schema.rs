use shared::{
    domain::{FormValues, Gender},
    field_errors::FieldErrors,
    path::FieldPath,
};

use super::{rules::*, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    MinLength(usize),
    Email,
    AtLeast(u32),
    OneOf(&'static [&'static str]),
    MinItems(usize),
}

impl Constraint {
    fn holds(self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (_, FieldValue::Absent) => false,
            (Constraint::MinLength(min), FieldValue::Text(text)) => text.chars().count() >= min,
            (Constraint::Email, FieldValue::Text(text)) => is_valid_email(text),
            (Constraint::AtLeast(min), FieldValue::Number(number)) => number >= min,
            (Constraint::OneOf(allowed), FieldValue::Text(text)) => {
                allowed.iter().any(|candidate| *candidate == text)
            }
            (Constraint::MinItems(min), FieldValue::Count(count)) => count >= min,
            // A constraint declared against the wrong kind of field never passes.
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub constraint: Constraint,
    pub message: &'static str,
}

const fn check(constraint: Constraint, message: &'static str) -> Check {
    Check {
        constraint,
        message,
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub target: Target,
    pub checks: Vec<Check>,
}

const GENDERS: &[&str] = &[
    Gender::Male.as_str(),
    Gender::Female.as_str(),
    Gender::Other.as_str(),
];

/// Declarative description of a valid form: per-field checks plus
/// whole-snapshot refinements.
#[derive(Clone)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
    refinements: Vec<ConditionalRule>,
}

impl Default for FormSchema {
    fn default() -> Self {
        use Target::{EachHobby, Field};

        Self {
            fields: vec![
                FieldSchema {
                    target: Field(FieldPath::FirstName),
                    checks: vec![check(Constraint::MinLength(1), FIRST_NAME_REQUIRED)],
                },
                FieldSchema {
                    target: Field(FieldPath::LastName),
                    checks: vec![check(Constraint::MinLength(1), LAST_NAME_REQUIRED)],
                },
                FieldSchema {
                    target: Field(FieldPath::Email),
                    checks: vec![check(Constraint::Email, EMAIL_INVALID)],
                },
                FieldSchema {
                    target: Field(FieldPath::Age),
                    checks: vec![check(Constraint::AtLeast(MINIMUM_AGE), AGE_TOO_YOUNG)],
                },
                FieldSchema {
                    target: Field(FieldPath::Gender),
                    checks: vec![check(Constraint::OneOf(GENDERS), GENDER_REQUIRED)],
                },
                FieldSchema {
                    target: Field(FieldPath::AddressCity),
                    checks: vec![check(Constraint::MinLength(1), CITY_REQUIRED)],
                },
                FieldSchema {
                    target: Field(FieldPath::AddressState),
                    checks: vec![check(Constraint::MinLength(1), STATE_REQUIRED)],
                },
                FieldSchema {
                    target: Field(FieldPath::Hobbies),
                    checks: vec![check(Constraint::MinItems(1), HOBBIES_EMPTY)],
                },
                FieldSchema {
                    target: EachHobby(HobbyField::Name),
                    checks: vec![check(Constraint::MinLength(1), HOBBY_NAME_REQUIRED)],
                },
                FieldSchema {
                    target: EachHobby(HobbyField::Years),
                    checks: vec![check(Constraint::AtLeast(1), HOBBY_YEARS_TOO_FEW)],
                },
            ],
            refinements: vec![REFERRAL_WHEN_SUBSCRIBED],
        }
    }
}

impl FormSchema {
    pub fn field(mut self, target: Target, checks: impl IntoIterator<Item = Check>) -> Self {
        self.fields.push(FieldSchema {
            target,
            checks: checks.into_iter().collect(),
        });
        self
    }

    pub fn refine(mut self, rule: ConditionalRule) -> Self {
        self.refinements.push(rule);
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}

/// Validates against a [`FormSchema`]. Every failing check is evaluated; the
/// first message per field is the one kept.
#[derive(Clone, Default)]
pub struct SchemaValidator {
    schema: FormSchema,
}

impl SchemaValidator {
    pub fn new(schema: FormSchema) -> Self {
        Self { schema }
    }
}

impl Validator for SchemaValidator {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for field in &self.schema.fields {
            for path in field.target.resolve(values) {
                let value = read_field(values, path);
                for check in &field.checks {
                    if !check.constraint.holds(value) {
                        errors.insert(path, check.message);
                    }
                }
            }
        }
        for rule in &self.schema.refinements {
            rule.check(values, &mut errors);
        }

        errors
    }
}
