use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Subtracted from the advertised lifetime so a token is never sent right as it expires
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Lifetime assumed when the token endpoint does not send `expires_in`
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Client-credentials access token held in memory
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Turn the response into a token, `None` when no access token was sent
    pub fn into_token(self, now: DateTime<Utc>) -> Option<BearerToken> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let lifetime = self.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);

        Some(BearerToken {
            access_token,
            expires_at: now + Duration::seconds(lifetime - EXPIRY_LEEWAY_SECS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lifetime_respects_leeway() {
        let now = Utc::now();
        let token = TokenResponse {
            access_token: Some("abc".into()),
            expires_in: Some(120),
        }
        .into_token(now)
        .unwrap();

        assert!(!token.is_expired(now + Duration::seconds(89)));
        assert!(token.is_expired(now + Duration::seconds(90)));
    }

    #[test]
    fn missing_lifetime_defaults_to_an_hour() {
        let now = Utc::now();
        let token = TokenResponse {
            access_token: Some("abc".into()),
            expires_in: None,
        }
        .into_token(now)
        .unwrap();

        assert!(!token.is_expired(now + Duration::minutes(59)));
    }

    #[test]
    fn missing_access_token_yields_none() {
        let response: TokenResponse = serde_json::from_str(r#"{"token_type": "bearer"}"#).unwrap();
        assert!(response.into_token(Utc::now()).is_none());
    }
}
