use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::core::config::Settings;
use crate::db::types::UserRole;

const ARGON2_MEMORY_KIB: u32 = 102_400;
const ARGON2_TIME: u32 = 2;
const ARGON2_PARALLELISM: u32 = 8;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("password hashing failed")]
    Hashing,
    #[error("jwt encoding failed")]
    JwtEncoding,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("unsupported jwt algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub(crate) token: String,
    /// Lifetime in seconds.
    pub(crate) expires_in: i64,
}

fn hasher() -> Result<Argon2<'static>, argon2::Error> {
    let params = argon2::Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME, ARGON2_PARALLELISM, None)?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
}

pub(crate) fn hash_password(password: &str) -> Result<String, SecurityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = hasher().map_err(|_| SecurityError::Hashing)?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| SecurityError::Hashing)?
        .to_string();

    Ok(hash)
}

/// Returns false for a wrong password and for anything that is not a valid
/// PHC hash string.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    let Ok(argon2) = hasher() else {
        return false;
    };

    argon2.verify_password(password.as_bytes(), &parsed).is_ok()
}

pub(crate) fn issue_token(
    user_id: &str,
    email: &str,
    role: UserRole,
    settings: &Settings,
    ttl: Option<Duration>,
) -> Result<IssuedToken, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let ttl = ttl.unwrap_or_else(|| {
        Duration::minutes(settings.security().access_token_expire_minutes as i64)
    });
    let issued_at = OffsetDateTime::now_utc();

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + ttl).unix_timestamp(),
    };

    let token = encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(settings.security().secret_key.as_bytes()),
    )
    .map_err(|_| SecurityError::JwtEncoding)?;

    Ok(IssuedToken { token, expires_in: ttl.whole_seconds() })
}

/// Every failure (bad signature, malformed token, expiry) maps to
/// `SecurityError::InvalidToken`.
pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.security().secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| SecurityError::InvalidToken)?;

    // jsonwebtoken accepts exp == now; a token must expire strictly in the future.
    if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
        return Err(SecurityError::InvalidToken);
    }

    Ok(claims)
}

fn algorithm_from_settings(settings: &Settings) -> Result<Algorithm, SecurityError> {
    match settings.security().algorithm.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        other => Err(SecurityError::UnsupportedAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    async fn load_settings() -> (tokio::sync::OwnedMutexGuard<()>, Settings) {
        let guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");
        (guard, settings)
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct-horse-battery-staple").expect("hash");
        assert!(verify_password("correct-horse-battery-staple", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn hashing_is_salted() {
        let first = hash_password("secret123").expect("hash");
        let second = hash_password("secret123").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_not_an_error() {
        assert!(!verify_password("secret123", "not-a-phc-string"));
        assert!(!verify_password("secret123", ""));
    }

    #[tokio::test]
    async fn issued_token_carries_identity_and_role() {
        let (_guard, settings) = load_settings().await;

        let issued =
            issue_token("user-123", "ada@example.com", UserRole::Supervisor, &settings, None)
                .expect("token");
        let claims = verify_token(&issued.token, &settings).expect("claims");

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, UserRole::Supervisor);
        assert_eq!(issued.expires_in, 30 * 60);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn zero_ttl_token_is_immediately_invalid() {
        let (_guard, settings) = load_settings().await;

        let issued = issue_token(
            "user-123",
            "ada@example.com",
            UserRole::User,
            &settings,
            Some(Duration::ZERO),
        )
        .expect("token");

        assert!(matches!(
            verify_token(&issued.token, &settings),
            Err(SecurityError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn expired_and_tampered_tokens_are_rejected() {
        let (_guard, settings) = load_settings().await;

        let expired = issue_token(
            "user-123",
            "ada@example.com",
            UserRole::User,
            &settings,
            Some(Duration::minutes(-5)),
        )
        .expect("token");
        assert!(matches!(verify_token(&expired.token, &settings), Err(SecurityError::InvalidToken)));

        let valid = issue_token("user-123", "ada@example.com", UserRole::User, &settings, None)
            .expect("token");
        let mut tampered = valid.token.clone();
        tampered.push('x');
        assert!(matches!(verify_token(&tampered, &settings), Err(SecurityError::InvalidToken)));
        assert!(matches!(verify_token("garbage", &settings), Err(SecurityError::InvalidToken)));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let (_guard, settings) = load_settings().await;
        std::env::set_var("SECRET_KEY", "another-secret");
        let other = Settings::load().expect("settings");
        test_support::set_test_env();

        let issued = issue_token("user-123", "ada@example.com", UserRole::Admin, &other, None)
            .expect("token");

        assert!(matches!(verify_token(&issued.token, &settings), Err(SecurityError::InvalidToken)));
    }
}
