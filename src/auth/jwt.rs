//! JWT issue and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::User;

/// Public identity embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub avatar: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    pub exp: i64,
    pub iat: i64,
}

/// Signs and verifies HS256 tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: String, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn issue(&self, identity: Identity) -> AppResult<String> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Signing("token expiry out of range".to_string()))?;
        let claims = Claims {
            identity,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Signing(e.to_string()))
    }

    /// Rejects tampered, foreign-key and expired tokens.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-min-32-chars!!!!";

    fn alice() -> Identity {
        Identity {
            id: 7,
            username: "alice".to_string(),
            avatar: "https://robohash.org/alice?set=set1&size=150x150".to_string(),
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::hours(1));
        let token = issuer.issue(alice()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.identity, alice());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::hours(1));
        let other = TokenIssuer::new("another-secret-that-is-32-chars-long".to_string(), Duration::hours(1));
        let token = other.issue(alice()).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn rejects_tampered_token() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::hours(1));
        let token = issuer.issue(alice()).unwrap();
        let forged = issuer.issue(Identity { id: 1, ..alice() }).unwrap();
        let header = token.split('.').next().unwrap();
        let signature = token.split('.').nth(2).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", header, forged_payload, signature);
        assert!(matches!(issuer.verify(&tampered), Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::hours(-2));
        let token = issuer.issue(alice()).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn out_of_range_ttl_is_a_signing_error() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::days(100_000_000_000));
        assert!(matches!(issuer.issue(alice()), Err(AppError::Signing(_))));
    }

    #[test]
    fn rejects_garbage() {
        let issuer = TokenIssuer::new(SECRET.to_string(), Duration::hours(1));
        assert!(issuer.verify("not-a-token").is_err());
    }
}
