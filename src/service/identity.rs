use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

pub const PROVIDER_GOOGLE: &str = "google";

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity asserted by an external provider after its token was verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub subject: String,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn verify(&self, id_token: &str) -> ServiceResult<VerifiedIdentity>;
}

#[derive(Deserialize)]
struct TokenInfoResponse {
    aud: String,
    iss: String,
    sub: String,
    email: Option<String>,
    /// tokeninfo reports this as the string `"true"` or `"false"`.
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens through the `tokeninfo` endpoint.
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(tokeninfo_url: String, client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokeninfo_url,
            client_id,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    fn provider(&self) -> &'static str {
        PROVIDER_GOOGLE
    }

    async fn verify(&self, id_token: &str) -> ServiceResult<VerifiedIdentity> {
        let Some(client_id) = &self.client_id else {
            return Err(ServiceError::Upstream(
                "GOOGLE_CLIENT_ID is not set".to_string(),
            ));
        };

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| ServiceError::Upstream(format!("tokeninfo request failed: {err}")))?;

        if !response.status().is_success() {
            tracing::info!(status = %response.status(), "google rejected id token");
            return Err(ServiceError::unauthenticated("invalid Google ID token"));
        }

        let info = response.json::<TokenInfoResponse>().await.map_err(|err| {
            ServiceError::Upstream(format!("tokeninfo response parse failed: {err}"))
        })?;

        if info.aud != *client_id {
            return Err(ServiceError::unauthenticated(
                "Google ID token was issued for another client",
            ));
        }
        if !GOOGLE_ISSUERS.contains(&info.iss.as_str()) {
            return Err(ServiceError::unauthenticated("unexpected Google token issuer"));
        }
        let Some(email) = info.email.filter(|email| !email.is_empty()) else {
            return Err(ServiceError::unauthenticated(
                "Google ID token carries no email",
            ));
        };
        if info.email_verified.as_deref() != Some("true") {
            return Err(ServiceError::unauthenticated(
                "Google account email is not verified",
            ));
        }

        Ok(VerifiedIdentity {
            email: email.to_lowercase(),
            display_name: info.name,
            avatar_url: info.picture,
            subject: info.sub,
        })
    }
}
