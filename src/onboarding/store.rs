// src/onboarding/store.rs
//! Persistence interface for onboarding answers

use async_trait::async_trait;
use thiserror::Error;

use super::models::{LifestyleInput, LocationInput, ProfileSnapshot, WhoAreYouInput};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user id is required")]
    MissingUser,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// One write per onboarding screen. Each write creates the profile on first
/// touch and replaces only the fields that screen owns.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn upsert_intent(&self, user_id: &str, intent: &str) -> Result<(), StoreError>;

    async fn upsert_preference(&self, user_id: &str, genders: &[String]) -> Result<(), StoreError>;

    async fn upsert_who_are_you(&self, user_id: &str, input: &WhoAreYouInput) -> Result<(), StoreError>;

    async fn upsert_connection_style(&self, user_id: &str, style: &str) -> Result<(), StoreError>;

    async fn upsert_lifestyle(&self, user_id: &str, input: &LifestyleInput) -> Result<(), StoreError>;

    async fn replace_interests(&self, user_id: &str, interests: &[String]) -> Result<(), StoreError>;

    async fn update_location(&self, user_id: &str, input: &LocationInput) -> Result<(), StoreError>;

    async fn mark_onboarding_complete(&self, user_id: &str) -> Result<(), StoreError>;

    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>, StoreError>;
}
