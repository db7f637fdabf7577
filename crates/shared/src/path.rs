//! Typed addressing of form fields.
//!
//! Paths render with the dotted naming form libraries register inputs under
//! (`address.city`, `hobbies.0.name`) and parse back from it, so a renderer
//! can bind inputs by name while the controller only ever sees the typed form.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::{domain::FormValues, error::FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    FirstName,
    LastName,
    Email,
    Age,
    Gender,
    AddressCity,
    AddressState,
    /// The hobby list as a whole (e.g. "at least one entry").
    Hobbies,
    HobbyName(usize),
    HobbyYears(usize),
    StartDate,
    Subscribe,
    Referral,
    /// Submission-level slot not attributable to any input.
    Root,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::FirstName => f.write_str("firstName"),
            FieldPath::LastName => f.write_str("lastName"),
            FieldPath::Email => f.write_str("email"),
            FieldPath::Age => f.write_str("age"),
            FieldPath::Gender => f.write_str("gender"),
            FieldPath::AddressCity => f.write_str("address.city"),
            FieldPath::AddressState => f.write_str("address.state"),
            FieldPath::Hobbies => f.write_str("hobbies"),
            FieldPath::HobbyName(index) => write!(f, "hobbies.{index}.name"),
            FieldPath::HobbyYears(index) => write!(f, "hobbies.{index}.years"),
            FieldPath::StartDate => f.write_str("startDate"),
            FieldPath::Subscribe => f.write_str("subscribe"),
            FieldPath::Referral => f.write_str("referral"),
            FieldPath::Root => f.write_str("root"),
        }
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = raw.trim().split('.').collect();
        let path = match segments.as_slice() {
            ["firstName"] => FieldPath::FirstName,
            ["lastName"] => FieldPath::LastName,
            ["email"] => FieldPath::Email,
            ["age"] => FieldPath::Age,
            ["gender"] => FieldPath::Gender,
            ["address", "city"] => FieldPath::AddressCity,
            ["address", "state"] => FieldPath::AddressState,
            ["hobbies"] => FieldPath::Hobbies,
            ["hobbies", index, field] => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| FormError::UnknownField(raw.to_string()))?;
                match *field {
                    "name" => FieldPath::HobbyName(index),
                    "years" => FieldPath::HobbyYears(index),
                    _ => return Err(FormError::UnknownField(raw.to_string())),
                }
            }
            ["startDate"] => FieldPath::StartDate,
            ["subscribe"] => FieldPath::Subscribe,
            ["referral"] => FieldPath::Referral,
            ["root"] => FieldPath::Root,
            _ => return Err(FormError::UnknownField(raw.to_string())),
        };
        Ok(path)
    }
}

/// A single typed edit. Each variant carries exactly the value type its field
/// holds, so a mismatched update cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FirstName(String),
    LastName(String),
    Email(String),
    Age(u32),
    Gender(String),
    AddressCity(String),
    AddressState(String),
    HobbyName { index: usize, name: String },
    HobbyYears { index: usize, years: u32 },
    StartDate(NaiveDate),
    Subscribe(bool),
    Referral(String),
}

impl FieldUpdate {
    pub fn path(&self) -> FieldPath {
        match self {
            FieldUpdate::FirstName(_) => FieldPath::FirstName,
            FieldUpdate::LastName(_) => FieldPath::LastName,
            FieldUpdate::Email(_) => FieldPath::Email,
            FieldUpdate::Age(_) => FieldPath::Age,
            FieldUpdate::Gender(_) => FieldPath::Gender,
            FieldUpdate::AddressCity(_) => FieldPath::AddressCity,
            FieldUpdate::AddressState(_) => FieldPath::AddressState,
            FieldUpdate::HobbyName { index, .. } => FieldPath::HobbyName(*index),
            FieldUpdate::HobbyYears { index, .. } => FieldPath::HobbyYears(*index),
            FieldUpdate::StartDate(_) => FieldPath::StartDate,
            FieldUpdate::Subscribe(_) => FieldPath::Subscribe,
            FieldUpdate::Referral(_) => FieldPath::Referral,
        }
    }

    /// Builds an update from raw input text, the way an input element hands
    /// its value over.
    pub fn parse(path: FieldPath, raw: &str) -> Result<Self, FormError> {
        let invalid = |reason: &str| FormError::InvalidValue {
            path: path.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let update = match path {
            FieldPath::FirstName => FieldUpdate::FirstName(raw.to_string()),
            FieldPath::LastName => FieldUpdate::LastName(raw.to_string()),
            FieldPath::Email => FieldUpdate::Email(raw.to_string()),
            FieldPath::Age => FieldUpdate::Age(
                raw.trim()
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?,
            ),
            FieldPath::Gender => FieldUpdate::Gender(raw.to_string()),
            FieldPath::AddressCity => FieldUpdate::AddressCity(raw.to_string()),
            FieldPath::AddressState => FieldUpdate::AddressState(raw.to_string()),
            FieldPath::HobbyName(index) => FieldUpdate::HobbyName {
                index,
                name: raw.to_string(),
            },
            FieldPath::HobbyYears(index) => FieldUpdate::HobbyYears {
                index,
                years: raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?,
            },
            FieldPath::StartDate => FieldUpdate::StartDate(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| invalid("expected a YYYY-MM-DD date"))?,
            ),
            FieldPath::Subscribe => FieldUpdate::Subscribe(match raw.trim() {
                "true" | "on" | "1" => true,
                "false" | "off" | "0" | "" => false,
                _ => return Err(invalid("expected true or false")),
            }),
            FieldPath::Referral => FieldUpdate::Referral(raw.to_string()),
            FieldPath::Hobbies | FieldPath::Root => {
                return Err(FormError::NotEditable(path.to_string()))
            }
        };
        Ok(update)
    }

    pub fn apply_to(self, values: &mut FormValues) -> Result<(), FormError> {
        match self {
            FieldUpdate::FirstName(v) => values.first_name = v,
            FieldUpdate::LastName(v) => values.last_name = v,
            FieldUpdate::Email(v) => values.email = v,
            FieldUpdate::Age(v) => values.age = v,
            FieldUpdate::Gender(v) => values.gender = v,
            FieldUpdate::AddressCity(v) => values.address.city = v,
            FieldUpdate::AddressState(v) => values.address.state = v,
            FieldUpdate::HobbyName { index, name } => {
                let len = values.hobbies.len();
                values
                    .hobbies
                    .get_mut(index)
                    .ok_or(FormError::HobbyIndexOutOfRange { index, len })?
                    .name = name;
            }
            FieldUpdate::HobbyYears { index, years } => {
                let len = values.hobbies.len();
                values
                    .hobbies
                    .get_mut(index)
                    .ok_or(FormError::HobbyIndexOutOfRange { index, len })?
                    .years = years;
            }
            FieldUpdate::StartDate(v) => values.start_date = v,
            FieldUpdate::Subscribe(v) => values.subscribe = v,
            FieldUpdate::Referral(v) => values.referral = v,
        }
        Ok(())
    }
}
