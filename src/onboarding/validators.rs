// src/onboarding/validators.rs

use super::models::*;
use crate::common::{ValidationResult, Validator};
use chrono::NaiveDate;

const MIN_HEIGHT_CM: i64 = 50;
const MAX_HEIGHT_CM: i64 = 300;

// ============================================================================
// Onboarding Screen Validators
// ============================================================================

pub struct OnboardingValidator;

impl Validator<IntentRequest> for OnboardingValidator {
    fn validate(&self, data: &IntentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.intent.trim().is_empty() {
            result.add_error("intent", "intent is required");
        }

        result
    }
}

impl Validator<PreferenceRequest> for OnboardingValidator {
    fn validate(&self, data: &PreferenceRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.preferred_genders.iter().all(|g| g.trim().is_empty()) {
            result.add_error("preferredGenders", "at least one gender is required");
        }

        result
    }
}

impl Validator<WhoAreYouInput> for OnboardingValidator {
    fn validate(&self, data: &WhoAreYouInput) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.display_name.trim().is_empty() {
            result.add_error("displayName", "displayName is required");
        } else if data.display_name.len() > 100 {
            result.add_error("displayName", "displayName must be less than 100 characters");
        }

        if !data.birthdate.is_empty() && validate_date_format(&data.birthdate).is_err() {
            result.add_error("birthdate", "birthdate must be in YYYY-MM-DD format");
        }

        result
    }
}

impl Validator<ConnectionStyleRequest> for OnboardingValidator {
    fn validate(&self, data: &ConnectionStyleRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.connection_style.trim().is_empty() {
            result.add_error("connectionStyle", "connectionStyle is required");
        }

        result
    }
}

impl Validator<LifestyleInput> for OnboardingValidator {
    fn validate(&self, data: &LifestyleInput) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Zero means "not answered"
        if data.height_cm != 0 && !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&data.height_cm) {
            result.add_error(
                "heightCm",
                &format!("heightCm must be between {} and {}", MIN_HEIGHT_CM, MAX_HEIGHT_CM),
            );
        }

        result
    }
}

impl Validator<InterestsRequest> for OnboardingValidator {
    fn validate(&self, data: &InterestsRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.interests.iter().all(|i| i.trim().is_empty()) {
            result.add_error("interests", "at least one interest is required");
        }

        result
    }
}

impl Validator<LocationInput> for OnboardingValidator {
    fn validate(&self, data: &LocationInput) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !(-90.0..=90.0).contains(&data.lat) {
            result.add_error("lat", "lat must be between -90 and 90");
        }

        if !(-180.0..=180.0).contains(&data.lng) {
            result.add_error("lng", "lng must be between -180 and 180");
        }

        if data.accuracy.is_nan() || data.accuracy < 0.0 {
            result.add_error("accuracy", "accuracy must not be negative");
        }

        result
    }
}

fn validate_date_format(date: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
}
