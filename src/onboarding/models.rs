// src/onboarding/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Models (one per onboarding screen)
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct IntentRequest {
    #[serde(default)]
    pub intent: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    #[serde(default)]
    pub preferred_genders: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WhoAreYouInput {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub pronouns: String,
    /// ISO date, `YYYY-MM-DD`
    #[serde(default)]
    pub birthdate: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStyleRequest {
    #[serde(default)]
    pub connection_style: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleInput {
    #[serde(default)]
    pub height_cm: i64,
    #[serde(default)]
    pub drinks: String,
    #[serde(default)]
    pub smokes: String,
    #[serde(default)]
    pub exercise_level: String,
    #[serde(default)]
    pub relationship_style: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct InterestsRequest {
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct LocationInput {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub accuracy: f64,
}

// ============================================================================
// Profile Snapshot
// ============================================================================

/// Everything collected so far for one user
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub user_id: String,
    pub intent: Option<String>,
    pub preferred_genders: Vec<String>,
    pub display_name: Option<String>,
    pub gender: Option<String>,
    pub pronouns: Option<String>,
    pub birthdate: Option<String>,
    pub connection_style: Option<String>,
    pub height_cm: Option<i64>,
    pub drinks: Option<String>,
    pub smokes: Option<String>,
    pub exercise_level: Option<String>,
    pub relationship_style: Option<String>,
    pub interests: Vec<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub accuracy: Option<f64>,
    pub onboarded_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileSnapshot {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            updated_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn onboarding_completed(&self) -> bool {
        self.onboarded_at.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
