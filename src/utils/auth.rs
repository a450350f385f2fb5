use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{middleware::CurrentUser, models::Role};

pub const SESSION_HOURS: i64 = 24;

/// Everything the session cookie remembers about the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Bearer handed to the expense backend.
    pub token: String,
    /// Per-login id keying server-side view state.
    pub sid: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &CurrentUser) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(SESSION_HOURS);

        Self {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            token: user.token.clone(),
            sid: user.session_id.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(user: &CurrentUser, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        &Claims::new(user),
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: "1".to_string(),
            name: "manager".to_string(),
            email: "manager@example.com".to_string(),
            role: Role::Manager,
            token: "fake-jwt-token".to_string(),
            session_id: "sid-1".to_string(),
        }
    }

    #[test]
    fn token_carries_the_session_user() {
        let token = create_token(&user(), "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.token, "fake-jwt-token");
        assert_eq!(claims.sid, "sid-1");
        assert_eq!(claims.exp - claims.iat, SESSION_HOURS * 3600);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = create_token(&user(), "secret").unwrap();
        assert!(verify_token(&token, "other").is_err());
    }
}
