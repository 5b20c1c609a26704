// src/onboarding/store_memory.rs
//! In-memory onboarding store, used when no database is configured

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::models::{LifestyleInput, LocationInput, ProfileSnapshot, WhoAreYouInput};
use super::store::{OnboardingStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryOnboardingStore {
    profiles: Mutex<HashMap<String, ProfileSnapshot>>,
}

impl InMemoryOnboardingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` to the user's profile, creating it first if needed
    async fn with_profile<F>(&self, user_id: &str, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ProfileSnapshot) + Send,
    {
        if user_id.is_empty() {
            return Err(StoreError::MissingUser);
        }

        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| ProfileSnapshot::new(user_id));

        update(profile);
        profile.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl OnboardingStore for InMemoryOnboardingStore {
    async fn upsert_intent(&self, user_id: &str, intent: &str) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| p.intent = Some(intent.to_string()))
            .await
    }

    async fn upsert_preference(&self, user_id: &str, genders: &[String]) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| p.preferred_genders = genders.to_vec())
            .await
    }

    async fn upsert_who_are_you(&self, user_id: &str, input: &WhoAreYouInput) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| {
            p.display_name = Some(input.display_name.clone());
            p.gender = Some(input.gender.clone());
            p.pronouns = Some(input.pronouns.clone());
            p.birthdate = Some(input.birthdate.clone()).filter(|b| !b.is_empty());
        })
        .await
    }

    async fn upsert_connection_style(&self, user_id: &str, style: &str) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| p.connection_style = Some(style.to_string()))
            .await
    }

    async fn upsert_lifestyle(&self, user_id: &str, input: &LifestyleInput) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| {
            p.height_cm = Some(input.height_cm);
            p.drinks = Some(input.drinks.clone());
            p.smokes = Some(input.smokes.clone());
            p.exercise_level = Some(input.exercise_level.clone());
            p.relationship_style = Some(input.relationship_style.clone());
        })
        .await
    }

    async fn replace_interests(&self, user_id: &str, interests: &[String]) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| {
            let mut kept: Vec<String> = Vec::with_capacity(interests.len());
            for key in interests.iter().filter(|k| !k.is_empty()) {
                if !kept.contains(key) {
                    kept.push(key.clone());
                }
            }
            p.interests = kept;
        })
        .await
    }

    async fn update_location(&self, user_id: &str, input: &LocationInput) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| {
            p.lat = Some(input.lat);
            p.lng = Some(input.lng);
            p.accuracy = Some(input.accuracy);
        })
        .await
    }

    async fn mark_onboarding_complete(&self, user_id: &str) -> Result<(), StoreError> {
        self.with_profile(user_id, |p| p.onboarded_at = Some(Utc::now()))
            .await
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>, StoreError> {
        Ok(self.profiles.lock().await.get(user_id).cloned())
    }
}
