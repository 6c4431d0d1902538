use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::client::{ApiClient, AuthResponse};
use crate::core::config::{AuthConfig, AuthMode};
use crate::core::session::Session;
use crate::core::state::AppState;
use crate::models::profile::Identity;

/// Where the user lands after sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// No skills yet: collect them first
    Onboarding,
    Dashboard,
}

// runs once per sign-in
pub async fn authenticate(client: &ApiClient, auth: &AuthConfig) -> Result<Session> {
    let email = auth.email.as_deref().unwrap_or_default();
    let password = auth.password.as_deref().unwrap_or_default();

    let response: AuthResponse = match auth.mode {
        AuthMode::Login => client
            .login(email, password)
            .await
            .context("Login failed")?,
        AuthMode::Register => client
            .register(auth.username.as_deref().unwrap_or_default(), email, password)
            .await
            .context("Registration failed")?,
        AuthMode::Guest => client.guest().await.context("Guest sign-in failed")?,
    };

    let identity = Identity {
        user_id: response.user_id,
        username: response.username,
    };

    info!(
        user_id = identity.user_id,
        username = %identity.username,
        guest = identity.is_guest(),
        "Signed in"
    );

    let backend = Arc::new(client.with_token(response.access_token));
    Ok(Session::new(identity, backend))
}

/// Load the confirmed skill set and the first dashboard snapshot, then pick
/// the landing view.
///
/// A failed first dashboard fetch is not fatal; the profile skills are
/// enough to decide between onboarding and the dashboard.
pub async fn bootstrap(state: &AppState) -> Result<Landing> {
    let backend = state.session.backend()?;

    let profile = state
        .session
        .track(backend.fetch_profile().await)
        .context("Failed to load profile")?;

    state.skill_store.replace_confirmed(&profile.skill_set());

    info!(
        user_id = profile.id,
        skills = state.skill_store.len(),
        "Profile loaded"
    );

    if let Err(e) = state.dashboard.refresh().await {
        if e.is_session_expired() {
            return Err(e.into());
        }
        warn!(error = %e, "Initial dashboard refresh failed, continuing with profile data");
    }

    let landing = if state.skill_store.is_empty() {
        Landing::Onboarding
    } else {
        Landing::Dashboard
    };

    info!(?landing, "Bootstrap complete");

    Ok(landing)
}
