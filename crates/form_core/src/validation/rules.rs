//! Messages, field accessors and the cross-field rule every strategy shares.

use std::sync::LazyLock;

use regex::Regex;
use shared::{domain::FormValues, field_errors::FieldErrors, path::FieldPath};

pub const FIRST_NAME_REQUIRED: &str = "First Name is required";
pub const LAST_NAME_REQUIRED: &str = "Last Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Invalid email address";
pub const AGE_REQUIRED: &str = "Age is required";
pub const AGE_TOO_YOUNG: &str = "You must be at least 18 years old";
pub const GENDER_REQUIRED: &str = "Gender is required";
pub const CITY_REQUIRED: &str = "City is required";
pub const STATE_REQUIRED: &str = "State is required";
pub const HOBBY_NAME_REQUIRED: &str = "Hobby name is required";
pub const HOBBY_YEARS_TOO_FEW: &str = "Must be at least 1 year";
pub const HOBBIES_EMPTY: &str = "At least one hobby is required";
pub const REFERRAL_REQUIRED: &str = "Referral source is required if subscribing";

pub const MINIMUM_AGE: u32 = 18;

/// `text@text` with no whitespace, as the hand-written and registered forms check.
pub(crate) static LOOSE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+$").expect("loose email pattern compiles"));

static STRICT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("strict email pattern compiles")
});

pub fn looks_like_email(raw: &str) -> bool {
    LOOSE_EMAIL.is_match(raw)
}

/// Address shape enforced by the schema strategy: a dotted domain with an
/// alphabetic TLD and a local part that neither starts with nor repeats dots.
pub fn is_valid_email(raw: &str) -> bool {
    let local = raw.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !local.contains("..") && STRICT_EMAIL.is_match(raw)
}

/// Borrowed view of one field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(u32),
    Flag(bool),
    Count(usize),
    /// Dates always hold a value once the form exists.
    Date,
    Absent,
}

pub fn read_field(values: &FormValues, path: FieldPath) -> FieldValue<'_> {
    match path {
        FieldPath::FirstName => FieldValue::Text(&values.first_name),
        FieldPath::LastName => FieldValue::Text(&values.last_name),
        FieldPath::Email => FieldValue::Text(&values.email),
        FieldPath::Age => FieldValue::Number(values.age),
        FieldPath::Gender => FieldValue::Text(&values.gender),
        FieldPath::AddressCity => FieldValue::Text(&values.address.city),
        FieldPath::AddressState => FieldValue::Text(&values.address.state),
        FieldPath::Hobbies => FieldValue::Count(values.hobbies.len()),
        FieldPath::HobbyName(index) => values
            .hobbies
            .get(index)
            .map_or(FieldValue::Absent, |hobby| FieldValue::Text(&hobby.name)),
        FieldPath::HobbyYears(index) => values
            .hobbies
            .get(index)
            .map_or(FieldValue::Absent, |hobby| FieldValue::Number(hobby.years)),
        FieldPath::StartDate => FieldValue::Date,
        FieldPath::Subscribe => FieldValue::Flag(values.subscribe),
        FieldPath::Referral => FieldValue::Text(&values.referral),
        FieldPath::Root => FieldValue::Absent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HobbyField {
    Name,
    Years,
}

/// Where a declared rule applies: one field, or the same field of every hobby row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Field(FieldPath),
    EachHobby(HobbyField),
}

impl Target {
    pub fn resolve(self, values: &FormValues) -> Vec<FieldPath> {
        match self {
            Target::Field(path) => vec![path],
            Target::EachHobby(HobbyField::Name) => {
                (0..values.hobbies.len()).map(FieldPath::HobbyName).collect()
            }
            Target::EachHobby(HobbyField::Years) => {
                (0..values.hobbies.len()).map(FieldPath::HobbyYears).collect()
            }
        }
    }
}

/// A requirement on `target` that only holds while `applies` is true for the
/// snapshot.
#[derive(Clone, Copy)]
pub struct ConditionalRule {
    pub target: FieldPath,
    pub message: &'static str,
    pub applies: fn(&FormValues) -> bool,
    pub satisfied: fn(&FormValues) -> bool,
}

impl ConditionalRule {
    pub fn check(&self, values: &FormValues, errors: &mut FieldErrors) {
        if (self.applies)(values) && !(self.satisfied)(values) {
            errors.insert(self.target, self.message);
        }
    }
}

pub const REFERRAL_WHEN_SUBSCRIBED: ConditionalRule = ConditionalRule {
    target: FieldPath::Referral,
    message: REFERRAL_REQUIRED,
    applies: |values| values.subscribe,
    satisfied: |values| !values.referral.is_empty(),
};
