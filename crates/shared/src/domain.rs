use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UnknownGender;

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

key_newtype!(HobbyKey);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str() == s)
            .ok_or_else(|| UnknownGender(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hobby {
    pub name: String,
    /// Only the schema strategy constrains this; the other strategies ignore it.
    pub years: u32,
}

impl Hobby {
    pub fn named(name: impl Into<String>, years: u32) -> Self {
        Self {
            name: name.into(),
            years,
        }
    }
}

/// Everything a user can enter into the form.
///
/// `gender` stays raw text because the manual and registered strategies only
/// require it to be non-empty; use [`FormValues::gender`] for the parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub gender: String,
    pub address: Address,
    pub hobbies: Vec<Hobby>,
    pub start_date: NaiveDate,
    pub subscribe: bool,
    pub referral: String,
}

impl FormValues {
    pub const DEFAULT_AGE: u32 = 18;

    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            age: Self::DEFAULT_AGE,
            gender: String::new(),
            address: Address::default(),
            hobbies: vec![Hobby::default()],
            start_date,
            subscribe: false,
            referral: String::new(),
        }
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender.parse().ok()
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_freshly_opened_form() {
        let values = FormValues::default();
        assert_eq!(values.age, 18);
        assert_eq!(values.hobbies, vec![Hobby::default()]);
        assert!(values.gender().is_none());
        assert!(!values.subscribe);
    }

    #[test]
    fn gender_parses_only_the_closed_set() {
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert!("Female".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
    }

    #[test]
    fn values_serialize_with_form_field_names() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        let json = serde_json::to_value(FormValues::new(date)).expect("json");
        assert_eq!(json["firstName"], "");
        assert_eq!(json["startDate"], "2024-05-01");
        assert_eq!(json["hobbies"][0]["years"], 0);
    }
}
