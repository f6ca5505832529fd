//! Google sign-in
//!
//! The client obtains an ID token from Google and posts it to
//! `/api/v1/auth/google`; we ask Google's tokeninfo endpoint to validate it
//! and check that it was issued for our client id.

use crate::config::GoogleConfig;
use crate::error::ApiError;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const TOKENINFO_TIMEOUT_SECS: u64 = 10;

/// Identity asserted by a verified Google ID token
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

/// Subset of the tokeninfo response we rely on
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    /// Google returns this as the string "true"/"false"
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies Google ID tokens against the tokeninfo endpoint
#[derive(Clone)]
pub struct GoogleVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: String,
}

impl GoogleVerifier {
    pub fn new(config: &GoogleConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TOKENINFO_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            tokeninfo_url: config.tokeninfo_url.clone(),
            client_id: config.client_id.clone(),
        })
    }

    /// Whether a client id is configured
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty()
    }

    /// Validate an ID token and return the identity it asserts
    pub async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, ApiError> {
        if !self.is_enabled() {
            return Err(ApiError::ServiceUnavailable(
                "Google sign-in is not configured".to_string(),
            ));
        }
        if id_token.trim().is_empty() {
            return Err(ApiError::Validation("id_token cannot be empty".to_string()));
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Google tokeninfo request failed: {}", e);
                ApiError::ServiceUnavailable("Could not reach Google".to_string())
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Unauthorized("Invalid Google token".to_string()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|_| ApiError::Unauthorized("Invalid Google token".to_string()))?;

        if info.aud != self.client_id {
            return Err(ApiError::Unauthorized(
                "Google token was issued for another client".to_string(),
            ));
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(ApiError::Unauthorized("Google email is not verified".to_string()));
        }
        let email = info
            .email
            .ok_or_else(|| ApiError::Unauthorized("Google token has no email".to_string()))?;

        Ok(GoogleIdentity {
            subject: info.sub,
            email: email.to_lowercase(),
            name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn verifier(server: &MockServer, client_id: &str) -> GoogleVerifier {
        GoogleVerifier::new(&GoogleConfig {
            client_id: client_id.to_string(),
            tokeninfo_url: format!("{}/tokeninfo", server.uri()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_verify_accepts_matching_audience() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .and(query_param("id_token", "good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aud": "client-123",
                "sub": "google-sub-1",
                "email": "Ana@Example.com",
                "email_verified": "true",
                "name": "Ana"
            })))
            .mount(&server)
            .await;

        let identity = verifier(&server, "client-123").await.verify("good-token").await.unwrap();
        assert_eq!(identity.subject, "google-sub-1");
        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_verify_rejects_foreign_audience() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aud": "someone-else",
                "sub": "google-sub-1",
                "email": "ana@example.com",
                "email_verified": "true"
            })))
            .mount(&server)
            .await;

        let result = verifier(&server, "client-123").await.verify("token").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_verify_rejects_unverified_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aud": "client-123",
                "sub": "google-sub-1",
                "email": "ana@example.com",
                "email_verified": "false"
            })))
            .mount(&server)
            .await;

        let result = verifier(&server, "client-123").await.verify("token").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_verify_maps_google_rejection_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_token"
            })))
            .mount(&server)
            .await;

        let result = verifier(&server, "client-123").await.verify("expired").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_disabled_without_client_id() {
        let server = MockServer::start().await;
        let result = verifier(&server, "").await.verify("token").await;
        assert!(matches!(result, Err(ApiError::ServiceUnavailable(_))));
    }
}
