// src/onboarding/store_sqlite.rs
//! SQLite-backed onboarding store
//!
//! Expects the `users`, `profiles` and `user_interests` tables created by
//! `common::migrations::run_migrations`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, error};

use super::models::{LifestyleInput, LocationInput, ProfileSnapshot, WhoAreYouInput};
use super::store::{OnboardingStore, StoreError};

#[derive(Debug, Clone)]
pub struct SqliteOnboardingStore {
    db: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    intent: Option<String>,
    preferred_genders: Option<String>,
    display_name: Option<String>,
    gender: Option<String>,
    pronouns: Option<String>,
    birthdate: Option<String>,
    connection_style: Option<String>,
    height_cm: Option<i64>,
    drinks: Option<String>,
    smokes: Option<String>,
    exercise_level: Option<String>,
    relationship_style: Option<String>,
    location_lat: Option<f64>,
    location_lng: Option<f64>,
    location_accuracy: Option<f64>,
    onboarded_at: Option<String>,
    updated_at: Option<String>,
}

impl SqliteOnboardingStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Creates the users row on first touch
    async fn ensure_user(&self, user_id: &str) -> Result<(), StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUser);
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, created_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(now())
        .bind(now())
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "Database error ensuring user row");
            StoreError::DatabaseError(e)
        })?;

        Ok(())
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl OnboardingStore for SqliteOnboardingStore {
    async fn upsert_intent(&self, user_id: &str, intent: &str) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, intent, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                intent = excluded.intent,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(intent)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_preference(&self, user_id: &str, genders: &[String]) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        let genders_json = serde_json::to_string(genders)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, preferred_genders, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                preferred_genders = excluded.preferred_genders,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(genders_json)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_who_are_you(&self, user_id: &str, input: &WhoAreYouInput) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        // Stored only when it is a real calendar date
        let birthdate = NaiveDate::parse_from_str(&input.birthdate, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string());

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, gender, pronouns, birthdate, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                gender = excluded.gender,
                pronouns = excluded.pronouns,
                birthdate = excluded.birthdate,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.display_name)
        .bind(&input.gender)
        .bind(&input.pronouns)
        .bind(birthdate)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_connection_style(&self, user_id: &str, style: &str) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, connection_style, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                connection_style = excluded.connection_style,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(style)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_lifestyle(&self, user_id: &str, input: &LifestyleInput) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id, height_cm, drinks, smokes, exercise_level, relationship_style, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                height_cm = excluded.height_cm,
                drinks = excluded.drinks,
                smokes = excluded.smokes,
                exercise_level = excluded.exercise_level,
                relationship_style = excluded.relationship_style,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.height_cm)
        .bind(&input.drinks)
        .bind(&input.smokes)
        .bind(&input.exercise_level)
        .bind(&input.relationship_style)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn replace_interests(&self, user_id: &str, interests: &[String]) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM user_interests WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for key in interests.iter().filter(|k| !k.is_empty()) {
            sqlx::query(
                "INSERT OR IGNORE INTO user_interests (user_id, interest_key) VALUES (?, ?)",
            )
            .bind(user_id)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, updated_at)
            VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(user_id = %user_id, count = interests.len(), "Interests replaced");
        Ok(())
    }

    async fn update_location(&self, user_id: &str, input: &LocationInput) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, location_lat, location_lng, location_accuracy, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                location_lat = excluded.location_lat,
                location_lng = excluded.location_lng,
                location_accuracy = excluded.location_accuracy,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.lat)
        .bind(input.lng)
        .bind(input.accuracy)
        .bind(now())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn mark_onboarding_complete(&self, user_id: &str) -> Result<(), StoreError> {
        self.ensure_user(user_id).await?;

        let ts = now();
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, onboarded_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                onboarded_at = excluded.onboarded_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, intent, preferred_genders, display_name, gender, pronouns,
                   birthdate, connection_style, height_cm, drinks, smokes, exercise_level,
                   relationship_style, location_lat, location_lng, location_accuracy,
                   onboarded_at, updated_at
            FROM profiles WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let interests: Vec<String> = sqlx::query_scalar(
            "SELECT interest_key FROM user_interests WHERE user_id = ? ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let preferred_genders = match row.preferred_genders.as_deref() {
            Some(raw) => serde_json::from_str(raw)?,
            None => Vec::new(),
        };

        Ok(Some(ProfileSnapshot {
            user_id: row.user_id,
            intent: row.intent,
            preferred_genders,
            display_name: row.display_name,
            gender: row.gender,
            pronouns: row.pronouns,
            birthdate: row.birthdate,
            connection_style: row.connection_style,
            height_cm: row.height_cm,
            drinks: row.drinks,
            smokes: row.smokes,
            exercise_level: row.exercise_level,
            relationship_style: row.relationship_style,
            interests,
            lat: row.location_lat,
            lng: row.location_lng,
            accuracy: row.location_accuracy,
            onboarded_at: parse_timestamp(row.onboarded_at),
            updated_at: parse_timestamp(row.updated_at),
        }))
    }
}
