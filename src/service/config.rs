use std::{env, sync::Arc};

use crate::config::Config;

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            let last = bytes[value.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            let normalized = Self::strip_wrapping_quotes(trimmed).trim();
            if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_string())
            }
        })
    }

    fn env_u16(key: &str) -> Option<u16> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u16>().ok())
    }

    fn env_u64(key: &str) -> Option<u64> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u64>().ok())
    }

    pub fn new() -> Self {
        let port = Self::env_u16("PORT").unwrap_or(8080);
        let database_url = Self::env_nonempty("DATABASE_URL");
        let jwt_secret = Self::env_nonempty("JWT_SECRET");
        let jwt_ttl_seconds = Self::env_u64("JWT_TTL_SECONDS").unwrap_or(60 * 60 * 24);
        let google_client_id = Self::env_nonempty("GOOGLE_CLIENT_ID");
        let google_tokeninfo_url = Self::env_nonempty("GOOGLE_TOKENINFO_URL")
            .unwrap_or_else(|| "https://oauth2.googleapis.com/tokeninfo".to_string());
        let broadcast_base_url = Self::env_nonempty("BROADCAST_BASE_URL")
            .unwrap_or_else(|| "https://www.tbn.or.kr/onair/tbnlive.tbn".to_string());
        let broadcast_timeout_seconds =
            Self::env_u64("BROADCAST_TIMEOUT_SECONDS").unwrap_or(10);
        let broadcast_user_agent = Self::env_nonempty("BROADCAST_USER_AGENT").unwrap_or_else(|| {
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
        });

        Self::from_config(Config {
            port,
            database_url,
            jwt_secret,
            jwt_ttl_seconds,
            google_client_id,
            google_tokeninfo_url,
            broadcast_base_url,
            broadcast_timeout_seconds,
            broadcast_user_agent,
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for ConfigServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_quotes_only() {
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\"abc\""), "abc");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("'abc'"), "abc");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\"abc'"), "\"abc'");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\""), "\"");
    }
}
