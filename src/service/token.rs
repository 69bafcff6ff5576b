use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless session tokens bound to an account email.
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &str) -> ServiceResult<String>;
    fn subject(&self, token: &str) -> ServiceResult<String>;
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 30;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    fn encode_claims(&self, claims: &Claims) -> ServiceResult<String> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &str) -> ServiceResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };
        self.encode_claims(&claims)
    }

    fn subject(&self, token: &str) -> ServiceResult<String> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::unauthenticated("token expired"),
                _ => ServiceError::unauthenticated("invalid token"),
            }
        })?;
        if data.claims.sub.is_empty() {
            return Err(ServiceError::unauthenticated("invalid token"));
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    #[test]
    fn issued_token_yields_subject() {
        let tokens = JwtTokenService::new(SECRET, 3600);
        let token = tokens.issue("jane@x.com").unwrap();

        assert_eq!(tokens.subject(&token).unwrap(), "jane@x.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = JwtTokenService::new(SECRET, 3600);
        let now = Utc::now().timestamp();
        let token = tokens
            .encode_claims(&Claims {
                sub: "jane@x.com".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        let err = tokens.subject(&token).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref msg) if msg == "token expired"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtTokenService::new(b"another-secret-key-of-enough-size", 3600);
        let tokens = JwtTokenService::new(SECRET, 3600);
        let token = issuer.issue("jane@x.com").unwrap();

        assert!(matches!(
            tokens.subject(&token),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = JwtTokenService::new(SECRET, 3600);
        assert!(tokens.subject("not.a.jwt").is_err());
    }
}
