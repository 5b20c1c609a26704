//! Tests for onboarding module
//!
//! Covers both store implementations, the per-screen validators and the
//! HTTP endpoints behind the session middleware.

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::super::store::{OnboardingStore, StoreError};
    use super::super::validators::OnboardingValidator;
    use super::super::{InMemoryOnboardingStore, SqliteOnboardingStore};
    use crate::auth::test_support::{authed_request, send, test_app, test_state, TEST_SECRET};
    use crate::auth::tokens::SessionTokenIssuer;
    use crate::common::dev_mode::DevModeConfig;
    use crate::common::migrations::run_migrations;
    use crate::common::Validator;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    const USER: &str = "google:1234";

    async fn sqlite_store() -> SqliteOnboardingStore {
        // Every connection to sqlite::memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("memory database should open");
        run_migrations(&pool).await.expect("migrations should run");
        SqliteOnboardingStore::new(pool)
    }

    fn who(name: &str, birthdate: &str) -> WhoAreYouInput {
        WhoAreYouInput {
            display_name: name.to_string(),
            gender: "woman".to_string(),
            pronouns: "she/her".to_string(),
            birthdate: birthdate.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Shared behaviour both stores must satisfy
    async fn exercise_store(store: &dyn OnboardingStore) {
        assert!(store.load_profile(USER).await.unwrap().is_none());

        store.upsert_intent(USER, "friends").await.unwrap();
        store.upsert_intent(USER, "dating").await.unwrap();
        store
            .upsert_preference(USER, &strings(&["women", "nonbinary"]))
            .await
            .unwrap();
        store
            .upsert_who_are_you(USER, &who("Sam", "1994-05-17"))
            .await
            .unwrap();
        store.upsert_connection_style(USER, "slow-burn").await.unwrap();
        store
            .upsert_lifestyle(
                USER,
                &LifestyleInput {
                    height_cm: 172,
                    drinks: "socially".to_string(),
                    smokes: "never".to_string(),
                    exercise_level: "often".to_string(),
                    relationship_style: "monogamous".to_string(),
                },
            )
            .await
            .unwrap();
        store
            .replace_interests(USER, &strings(&["hiking", "cooking"]))
            .await
            .unwrap();
        store
            .replace_interests(USER, &strings(&["climbing", "", "climbing", "jazz"]))
            .await
            .unwrap();
        store
            .update_location(USER, &LocationInput { lat: 52.52, lng: 13.405, accuracy: 15.0 })
            .await
            .unwrap();

        let profile = store.load_profile(USER).await.unwrap().expect("profile exists");
        assert_eq!(profile.user_id, USER);
        assert_eq!(profile.intent.as_deref(), Some("dating"));
        assert_eq!(profile.preferred_genders, strings(&["women", "nonbinary"]));
        assert_eq!(profile.display_name.as_deref(), Some("Sam"));
        assert_eq!(profile.birthdate.as_deref(), Some("1994-05-17"));
        assert_eq!(profile.connection_style.as_deref(), Some("slow-burn"));
        assert_eq!(profile.height_cm, Some(172));
        assert_eq!(profile.smokes.as_deref(), Some("never"));
        assert_eq!(profile.interests, strings(&["climbing", "jazz"]));
        assert_eq!(profile.lat, Some(52.52));
        assert_eq!(profile.lng, Some(13.405));
        assert!(!profile.onboarding_completed());
        assert!(profile.updated_at.is_some());

        // Later screens never clobber earlier answers
        store.upsert_connection_style(USER, "spontaneous").await.unwrap();
        let profile = store.load_profile(USER).await.unwrap().unwrap();
        assert_eq!(profile.intent.as_deref(), Some("dating"));
        assert_eq!(profile.display_name.as_deref(), Some("Sam"));
        assert_eq!(profile.connection_style.as_deref(), Some("spontaneous"));

        store.mark_onboarding_complete(USER).await.unwrap();
        store.mark_onboarding_complete(USER).await.unwrap();
        let profile = store.load_profile(USER).await.unwrap().unwrap();
        assert!(profile.onboarding_completed());

        // Other users are untouched
        assert!(store.load_profile("apple:other").await.unwrap().is_none());

        assert!(matches!(
            store.upsert_intent("", "dating").await,
            Err(StoreError::MissingUser)
        ));
    }

    // ---- Stores ----

    #[tokio::test]
    async fn test_memory_store_upserts_are_idempotent_and_last_write_wins() {
        let store = InMemoryOnboardingStore::new();
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_upserts_are_idempotent_and_last_write_wins() {
        let store = sqlite_store().await;
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_repeated_who_are_you_write_is_stable() {
        let store = InMemoryOnboardingStore::new();
        store.upsert_who_are_you(USER, &who("Sam", "")).await.unwrap();
        let first = store.load_profile(USER).await.unwrap().unwrap();

        store.upsert_who_are_you(USER, &who("Sam", "")).await.unwrap();
        let second = store.load_profile(USER).await.unwrap().unwrap();

        assert_eq!(first.display_name, second.display_name);
        assert_eq!(second.birthdate, None);
    }

    #[tokio::test]
    async fn test_sqlite_store_blank_birthdate_is_null() {
        let store = sqlite_store().await;
        store.upsert_who_are_you(USER, &who("Sam", "")).await.unwrap();

        let profile = store.load_profile(USER).await.unwrap().unwrap();

        assert_eq!(profile.birthdate, None);
        assert!(profile.preferred_genders.is_empty());
        assert!(profile.interests.is_empty());
    }

    // ---- Validators ----

    #[test]
    fn test_who_are_you_validation() {
        assert!(OnboardingValidator.validate(&who("Sam", "1994-05-17")).is_valid);
        assert!(OnboardingValidator.validate(&who("Sam", "")).is_valid);

        let result = OnboardingValidator.validate(&who("  ", "1994-05-17"));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "displayName");

        let result = OnboardingValidator.validate(&who("Sam", "17/05/1994"));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "birthdate");

        assert!(!OnboardingValidator.validate(&who("Sam", "1994-02-30")).is_valid);
    }

    #[test]
    fn test_lifestyle_height_bounds() {
        let mut input = LifestyleInput::default();
        assert!(OnboardingValidator.validate(&input).is_valid);

        input.height_cm = 172;
        assert!(OnboardingValidator.validate(&input).is_valid);

        input.height_cm = 49;
        assert!(!OnboardingValidator.validate(&input).is_valid);

        input.height_cm = 301;
        assert!(!OnboardingValidator.validate(&input).is_valid);
    }

    #[test]
    fn test_location_bounds() {
        let ok = LocationInput { lat: -90.0, lng: 180.0, accuracy: 0.0 };
        assert!(OnboardingValidator.validate(&ok).is_valid);

        let bad = LocationInput { lat: 91.0, lng: -181.0, accuracy: -1.0 };
        let result = OnboardingValidator.validate(&bad);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_list_screens_require_a_real_entry() {
        let empty = InterestsRequest { interests: strings(&["", " "]) };
        assert!(!OnboardingValidator.validate(&empty).is_valid);

        let genders = PreferenceRequest { preferred_genders: vec![] };
        assert!(!OnboardingValidator.validate(&genders).is_valid);

        let intent = IntentRequest { intent: "dating".to_string() };
        assert!(OnboardingValidator.validate(&intent).is_valid);
    }

    // ---- HTTP ----

    fn access_token(user: &str) -> String {
        SessionTokenIssuer::new(TEST_SECRET)
            .issue(user)
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_full_onboarding_flow_over_http() {
        let app = test_app(test_state(DevModeConfig::production()));
        let token = access_token(USER);

        let screens = [
            ("/v1/onboarding/intent", json!({ "intent": "dating" })),
            ("/v1/onboarding/preference", json!({ "preferredGenders": ["men"] })),
            (
                "/v1/onboarding/who-are-you",
                json!({ "displayName": "Sam", "gender": "woman", "pronouns": "she/her", "birthdate": "1994-05-17" }),
            ),
            ("/v1/onboarding/connection-style", json!({ "connectionStyle": "slow-burn" })),
            ("/v1/onboarding/lifestyle", json!({ "heightCm": 165, "drinks": "never" })),
            ("/v1/onboarding/interests", json!({ "interests": ["hiking", "jazz"] })),
            ("/v1/onboarding/location", json!({ "lat": 40.7, "lng": -74.0, "accuracy": 10.0 })),
        ];

        for (uri, body) in screens {
            let (status, response) = send(&app, authed_request("PUT", uri, &token, Some(body))).await;
            assert_eq!(status, StatusCode::OK, "{} should succeed", uri);
            assert_eq!(response["success"], true);
        }

        let (status, _) = send(&app, authed_request("POST", "/v1/onboarding/complete", &token, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, profile) = send(&app, authed_request("GET", "/v1/onboarding/profile", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["userId"], USER);
        assert_eq!(profile["preferredGenders"], json!(["men"]));
        assert_eq!(profile["heightCm"], 165);
        assert_eq!(profile["interests"], json!(["hiking", "jazz"]));
        assert!(profile["onboardedAt"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_screen_payload_is_bad_request() {
        let app = test_app(test_state(DevModeConfig::production()));
        let token = access_token(USER);

        let (status, body) = send(
            &app,
            authed_request("PUT", "/v1/onboarding/lifestyle", &token, Some(json!({ "heightCm": 20 }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("heightCm"));

        let (status, _) = send(
            &app,
            authed_request("PUT", "/v1/onboarding/intent", &token, Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_not_found_before_any_answer() {
        let app = test_app(test_state(DevModeConfig::production()));
        let token = access_token("phone:+15550000000");

        let (status, body) = send(&app, authed_request("GET", "/v1/onboarding/profile", &token, None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "profile not found");
    }

    #[tokio::test]
    async fn test_onboarding_wrong_method() {
        let app = test_app(test_state(DevModeConfig::production()));
        let token = access_token(USER);

        let (status, _) = send(
            &app,
            authed_request("POST", "/v1/onboarding/intent", &token, Some(json!({ "intent": "x" }))),
        )
        .await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
