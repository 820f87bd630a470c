//! Access-token issuing and verification.
//!
//! A login produces a single HS256-signed JWT. The [`Claims`] payload carries
//! identity, role and managed-company ids, so request handling never has to
//! load the user row again; role or assignment changes become visible on the
//! next login.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylane_core::types::DbId;

/// Payload of every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (token subject).
    pub sub: DbId,
    /// Lowercased account email.
    pub email: String,
    /// Role name at issue time.
    pub role: String,
    /// Ids of companies this user manages. Empty for regular users; admins
    /// get fleet access from their role rather than from assignments.
    #[serde(default)]
    pub company_ids: Vec<DbId>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Random token id, useful when correlating logs.
    pub jti: String,
}

/// Signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Token lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Reads `JWT_SECRET` (required, non-empty) and
    /// `JWT_ACCESS_EXPIRY_MINS` (default 60).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or when the expiry is not
    /// an integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(!secret.is_empty(), "JWT_SECRET is empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be an integer"),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Issue a token for `user_id` with the given role and company scope.
pub fn generate_access_token(
    user_id: DbId,
    email: &str,
    role: &str,
    company_ids: Vec<DbId>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.to_string(),
        company_ids,
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    // Header::default() selects HS256.
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims on success.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 30,
        }
    }

    #[test]
    fn claims_survive_a_round_trip() {
        let config = config_with("unit-test-signing-secret");
        let token =
            generate_access_token(4100, "ops@skylane.test", "admin", vec![], &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 4100);
        assert_eq!(claims.email, "ops@skylane.test");
        assert_eq!(claims.role, "admin");
        assert!(claims.company_ids.is_empty());
        assert_eq!(claims.exp - claims.iat, 30 * 60, "lifetime should match config");
        assert!(!claims.jti.is_empty(), "jti should be populated");
    }

    #[test]
    fn company_scope_is_carried() {
        let config = config_with("unit-test-signing-secret");
        let token = generate_access_token(
            7,
            "mgr@skylane.test",
            "company_manager",
            vec![3, 5],
            &config,
        )
        .unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.company_ids, vec![3, 5]);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config_with("unit-test-signing-secret");

        // Expired beyond the validator's default 60s leeway.
        let iat = chrono::Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: 9,
            email: "late@skylane.test".to_string(),
            role: "user".to_string(),
            company_ids: vec![],
            exp: iat + 60,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issued = config_with("secret-one");
        let verifier = config_with("secret-two");

        let token = generate_access_token(1, "u@skylane.test", "user", vec![], &issued).unwrap();
        assert!(validate_token(&token, &verifier).is_err());
    }
}
