use serde::Serialize;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::identity::token_manager::IdentityTokenManager;

/// Profile attributes mirrored to the identity provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuspendRequest {
    is_suspended: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateRequest {
    profile: ProfileUpdate,
}

/// Client for the identity provider's user-management API.
///
/// Callers invoke these only after their own transaction has committed; a
/// failure here leaves the provider briefly out of sync, which the caller
/// logs and tolerates.
pub struct IdentityAdminClient {
    token_manager: Arc<IdentityTokenManager>,
    http_client: reqwest::Client,
}

impl IdentityAdminClient {
    pub fn new(token_manager: Arc<IdentityTokenManager>) -> Self {
        Self {
            token_manager,
            http_client: reqwest::Client::new(),
        }
    }

    /// Update the user's name attributes
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<()> {
        let url = format!(
            "{}/api/users/{}/profile",
            self.token_manager.api_base_url(),
            user_id
        );

        self.send_patch(&url, &ProfileUpdateRequest { profile: update })
            .await
    }

    /// Enable or disable the user's ability to sign in
    pub async fn set_active(&self, user_id: &str, active: bool) -> Result<()> {
        let url = format!(
            "{}/api/users/{}/is-suspended",
            self.token_manager.api_base_url(),
            user_id
        );

        self.send_patch(
            &url,
            &SuspendRequest {
                is_suspended: !active,
            },
        )
        .await
    }

    /// Remove the user from the identity provider
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let token = self
            .token_manager
            .get_access_token()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Failed to get access token: {}", e)))?;

        let url = format!(
            "{}/api/users/{}",
            self.token_manager.api_base_url(),
            user_id
        );

        tracing::debug!("Deleting user in identity provider: {}", url);

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Identity provider request failed: {}", e))
            })?;

        Self::check_status(response).await
    }

    async fn send_patch<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let token = self
            .token_manager
            .get_access_token()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Failed to get access token: {}", e)))?;

        tracing::debug!("Patching identity provider resource: {}", url);

        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&token.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Identity provider request failed: {}", e))
            })?;

        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalServiceError(format!(
            "Identity provider API error: HTTP {} - {}",
            status, body
        )))
    }
}
