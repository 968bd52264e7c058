use crate::error::ClientError;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the Canary backend embeds in its HS256 tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn subject(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Decode token claims without validation.
///
/// The client holds no signing key; the backend verifies the signature on
/// every request. Decoding here only answers "has this token expired", and
/// any token that cannot be decoded is treated as expired by callers.
pub fn decode_token_claims(token: &str) -> Result<TokenClaims, ClientError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(ClientError::InvalidToken("expected three segments".to_string()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(format!("failed to decode payload: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| ClientError::InvalidToken(format!("failed to parse claims: {}", e)))
}

/// Whether `token` is unexpired at `now`. Undecodable tokens are not valid.
pub fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    decode_token_claims(token)
        .map(|claims| !claims.is_expired_at(now))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.signature",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_backend_claims() {
        let token = token_with_payload(r#"{"userId":"user_123","email":"test@example.com","exp":9999999999}"#);

        let claims = decode_token_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("user_123"));
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), 9_999_999_999);
    }

    #[test]
    fn test_sub_is_used_when_user_id_missing() {
        let token = token_with_payload(r#"{"sub":"abc","exp":1}"#);
        assert_eq!(decode_token_claims(&token).unwrap().subject(), Some("abc"));
    }

    #[test]
    fn test_expiry_comparison() {
        let now = Utc::now();
        let past = token_with_payload(&format!(r#"{{"exp":{}}}"#, (now - Duration::seconds(1)).timestamp()));
        let future = token_with_payload(&format!(r#"{{"exp":{}}}"#, (now + Duration::hours(1)).timestamp()));

        assert!(!is_token_valid_at(&past, now));
        assert!(is_token_valid_at(&future, now));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in ["", "t1", "a.b", "a.!!!.c", "a.b.c.d"] {
            assert!(
                matches!(decode_token_claims(token), Err(ClientError::InvalidToken(_))),
                "{token} should not decode"
            );
            assert!(!is_token_valid_at(token, Utc::now()));
        }

        let no_exp = token_with_payload(r#"{"userId":"u1"}"#);
        assert!(decode_token_claims(&no_exp).is_err());
    }
}
