use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AddressErrors {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HobbyErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
}

impl HobbyErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.years.is_none()
    }
}

/// Error messages shaped like [`FormValues`](crate::domain::FormValues).
///
/// Hobby errors are keyed by row index and only present for rows that failed.
/// The first message written to a slot wins, so strategies can evaluate rules
/// in priority order without checking whether a slot is already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "AddressErrors::is_empty")]
    pub address: AddressErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hobby_list: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hobbies: BTreeMap<usize, HobbyErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(message: impl Into<String>) -> Self {
        Self {
            root: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.field_error_count() == 0
    }

    /// Number of input-level messages, ignoring the root slot.
    pub fn field_error_count(&self) -> usize {
        self.iter()
            .filter(|(path, _)| *path != FieldPath::Root)
            .count()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        let slot = match path {
            FieldPath::FirstName => &self.first_name,
            FieldPath::LastName => &self.last_name,
            FieldPath::Email => &self.email,
            FieldPath::Age => &self.age,
            FieldPath::Gender => &self.gender,
            FieldPath::AddressCity => &self.address.city,
            FieldPath::AddressState => &self.address.state,
            FieldPath::Hobbies => &self.hobby_list,
            FieldPath::HobbyName(index) => return self.hobbies.get(index)?.name.as_deref(),
            FieldPath::HobbyYears(index) => return self.hobbies.get(index)?.years.as_deref(),
            FieldPath::StartDate => &self.start_date,
            FieldPath::Subscribe => &self.subscribe,
            FieldPath::Referral => &self.referral,
            FieldPath::Root => &self.root,
        };
        slot.as_deref()
    }

    /// Records `message` for `path` unless that slot already holds one.
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) {
        let slot = self.slot_mut(path);
        if slot.is_none() {
            *slot = Some(message.into());
        }
    }

    pub fn set_root(&mut self, message: impl Into<String>) {
        self.root = Some(message.into());
    }

    /// All recorded messages in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &str)> + '_ {
        let top = [
            (FieldPath::FirstName, &self.first_name),
            (FieldPath::LastName, &self.last_name),
            (FieldPath::Email, &self.email),
            (FieldPath::Age, &self.age),
            (FieldPath::Gender, &self.gender),
            (FieldPath::AddressCity, &self.address.city),
            (FieldPath::AddressState, &self.address.state),
            (FieldPath::Hobbies, &self.hobby_list),
        ];
        let hobbies = self.hobbies.iter().flat_map(|(index, errors)| {
            [
                (FieldPath::HobbyName(*index), &errors.name),
                (FieldPath::HobbyYears(*index), &errors.years),
            ]
        });
        let tail = [
            (FieldPath::StartDate, &self.start_date),
            (FieldPath::Subscribe, &self.subscribe),
            (FieldPath::Referral, &self.referral),
            (FieldPath::Root, &self.root),
        ];

        top.into_iter()
            .chain(hobbies)
            .chain(tail)
            .filter_map(|(path, slot)| slot.as_deref().map(|message| (path, message)))
    }

    fn slot_mut(&mut self, path: FieldPath) -> &mut Option<String> {
        match path {
            FieldPath::FirstName => &mut self.first_name,
            FieldPath::LastName => &mut self.last_name,
            FieldPath::Email => &mut self.email,
            FieldPath::Age => &mut self.age,
            FieldPath::Gender => &mut self.gender,
            FieldPath::AddressCity => &mut self.address.city,
            FieldPath::AddressState => &mut self.address.state,
            FieldPath::Hobbies => &mut self.hobby_list,
            FieldPath::HobbyName(index) => &mut self.hobbies.entry(index).or_default().name,
            FieldPath::HobbyYears(index) => &mut self.hobbies.entry(index).or_default().years,
            FieldPath::StartDate => &mut self.start_date,
            FieldPath::Subscribe => &mut self.subscribe,
            FieldPath::Referral => &mut self.referral,
            FieldPath::Root => &mut self.root,
        }
    }
}
