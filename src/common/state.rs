// Application state shared across all modules

use std::sync::Arc;

use crate::auth::oidc::IdTokenVerifier;
use crate::auth::otp::OtpStore;
use crate::auth::tokens::SessionTokenIssuer;
use crate::common::dev_mode::DevModeConfig;
use crate::onboarding::store::OnboardingStore;

/// Handle passed to handlers through an `Extension` layer
pub type SharedState = Arc<AppState>;

/// Application state containing the credential pipeline and the onboarding store
#[derive(Clone)]
pub struct AppState {
    pub tokens: SessionTokenIssuer,
    pub otp_store: Arc<dyn OtpStore>,
    /// `None` when `GOOGLE_CLIENT_ID` is unset; the endpoint then answers 500
    pub google_verifier: Option<Arc<dyn IdTokenVerifier>>,
    /// `None` when `APPLE_CLIENT_ID` is unset
    pub apple_verifier: Option<Arc<dyn IdTokenVerifier>>,
    pub onboarding_store: Arc<dyn OnboardingStore>,
    pub dev_mode: DevModeConfig,
}
