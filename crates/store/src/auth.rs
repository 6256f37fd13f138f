//! Administrator verification against the hosted auth provider.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use dripcast_common::{AppError, AppResult};

use crate::traits::AuthVerifier;

/// [`AuthVerifier`] backed by the hosted auth provider's user-info endpoint.
///
/// The caller's bearer token is forwarded as-is; a successful lookup means
/// the token belongs to a signed-in user of the admin console. No session
/// state is kept locally.
#[derive(Debug, Clone)]
pub struct RestAuthVerifier {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RestAuthVerifier {
    /// Create a verifier for the given auth provider base URL.
    #[must_use]
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AuthVerifier for RestAuthVerifier {
    async fn verify_admin(&self, bearer_token: &str) -> AppResult<()> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {bearer_token}"))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("auth provider unreachable: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.is_client_error() {
            return Err(AppError::Unauthorized(
                "auth provider rejected the token".to_string(),
            ));
        }
        Err(AppError::ExternalService(format!(
            "auth provider returned {status}"
        )))
    }
}
