use shared::{domain::FormValues, field_errors::FieldErrors, path::FieldPath};

use super::{rules::*, Validator};

/// Hand-written field-by-field checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualValidator;

impl Validator for ManualValidator {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if values.first_name.is_empty() {
            errors.insert(FieldPath::FirstName, FIRST_NAME_REQUIRED);
        }
        if values.last_name.is_empty() {
            errors.insert(FieldPath::LastName, LAST_NAME_REQUIRED);
        }
        if !looks_like_email(&values.email) {
            errors.insert(FieldPath::Email, EMAIL_INVALID);
        }
        if values.age < MINIMUM_AGE {
            errors.insert(FieldPath::Age, AGE_TOO_YOUNG);
        }
        if values.gender.is_empty() {
            errors.insert(FieldPath::Gender, GENDER_REQUIRED);
        }
        // City and state are reported independently; a valid city never hides
        // a missing state.
        if values.address.city.is_empty() {
            errors.insert(FieldPath::AddressCity, CITY_REQUIRED);
        }
        if values.address.state.is_empty() {
            errors.insert(FieldPath::AddressState, STATE_REQUIRED);
        }
        for (index, hobby) in values.hobbies.iter().enumerate() {
            if hobby.name.is_empty() {
                errors.insert(FieldPath::HobbyName(index), HOBBY_NAME_REQUIRED);
            }
        }
        REFERRAL_WHEN_SUBSCRIBED.check(values, &mut errors);

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::tests::valid_values;
    use shared::domain::Hobby;

    #[test]
    fn accepts_a_complete_form() {
        assert!(ManualValidator.validate(&valid_values()).is_empty());
    }

    #[test]
    fn reports_every_missing_field_of_an_untouched_form() {
        let errors = ManualValidator.validate(&FormValues::default());

        assert_eq!(errors.get(&FieldPath::FirstName), Some(FIRST_NAME_REQUIRED));
        assert_eq!(errors.get(&FieldPath::LastName), Some(LAST_NAME_REQUIRED));
        assert_eq!(errors.get(&FieldPath::Email), Some(EMAIL_INVALID));
        assert_eq!(errors.get(&FieldPath::Gender), Some(GENDER_REQUIRED));
        assert_eq!(errors.get(&FieldPath::AddressCity), Some(CITY_REQUIRED));
        assert_eq!(errors.get(&FieldPath::AddressState), Some(STATE_REQUIRED));
        assert_eq!(errors.get(&FieldPath::HobbyName(0)), Some(HOBBY_NAME_REQUIRED));
        assert_eq!(errors.get(&FieldPath::Age), None);
        assert_eq!(errors.field_error_count(), 7);
    }

    #[test]
    fn state_error_survives_a_valid_city() {
        let mut values = valid_values();
        values.address.state.clear();

        let errors = ManualValidator.validate(&values);

        assert_eq!(errors.get(&FieldPath::AddressCity), None);
        assert_eq!(errors.get(&FieldPath::AddressState), Some(STATE_REQUIRED));
    }

    #[test]
    fn flags_only_the_unnamed_hobby_rows() {
        let mut values = valid_values();
        values.hobbies = vec![
            Hobby::named("chess", 2),
            Hobby::default(),
            Hobby::named("rowing", 1),
        ];

        let errors = ManualValidator.validate(&values);

        assert_eq!(errors.hobbies.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn free_text_gender_and_zero_years_pass() {
        let mut values = valid_values();
        values.gender = "nonbinary".into();
        values.hobbies[0].years = 0;

        assert!(ManualValidator.validate(&values).is_empty());
    }

    #[test]
    fn underage_is_rejected() {
        let mut values = valid_values();
        values.age = 17;
        assert_eq!(
            ManualValidator.validate(&values).get(&FieldPath::Age),
            Some(AGE_TOO_YOUNG)
        );
    }
}
