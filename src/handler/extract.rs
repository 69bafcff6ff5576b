use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::{error::ServiceError, state::AppState};

/// Caller identified by a valid `Authorization: Bearer` session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub email: String,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedAccount {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ServiceError::unauthenticated("missing bearer token"))?;

        let email = state.tokens().subject(bearer.token())?;
        Ok(Self {
            email,
            token: bearer.token().to_string(),
        })
    }
}
