//! Identity-provider token verification.
//!
//! Users sign in with an external identity provider; every request carries
//! the provider's token as a Bearer credential. [`IdentityVerifier`] turns a
//! token into [`IdentityClaims`]. [`JwtIdentityVerifier`] checks HS256
//! tokens minted by the provider bridge, validating expiry and, when
//! configured, issuer and audience.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Claims carried by an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider subject (stored as `users.firebase_uid`).
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Verifies identity tokens. Implementations may call out to the provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError>;
}

/// HS256 verifier for provider-bridge tokens.
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = vec!["exp", "sub"];
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::Invalid(e.to_string()),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(IdentityError::Invalid("empty subject".into()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    fn config(issuer: Option<&str>, audience: Option<&str>) -> AuthConfig {
        AuthConfig {
            secret: SECRET.to_string(),
            issuer: issuer.map(str::to_string),
            audience: audience.map(str::to_string),
        }
    }

    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let verifier = JwtIdentityVerifier::new(&config(None, None));
        let token = sign(json!({
            "sub": "uid-ada",
            "email": "ada@example.com",
            "name": "Ada",
            "email_verified": true,
            "exp": in_one_hour(),
        }));

        let claims = verifier.verify(&token).await.unwrap();
        assert_eq!(claims.sub, "uid-ada");
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert!(claims.email_verified);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let verifier = JwtIdentityVerifier::new(&config(None, None));
        let token = sign(json!({"sub": "uid", "exp": chrono::Utc::now().timestamp() - 3600}));
        assert_matches!(verifier.verify(&token).await, Err(IdentityError::Expired));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let verifier = JwtIdentityVerifier::new(&config(None, None));
        let token = encode(
            &Header::default(),
            &json!({"sub": "uid", "exp": in_one_hour()}),
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();
        assert_matches!(verifier.verify(&token).await, Err(IdentityError::Invalid(_)));
    }

    #[tokio::test]
    async fn issuer_and_audience_are_checked_when_configured() {
        let verifier = JwtIdentityVerifier::new(&config(Some("collabbridge"), Some("web")));

        let good = sign(json!({"sub": "uid", "exp": in_one_hour(), "iss": "collabbridge", "aud": "web"}));
        assert!(verifier.verify(&good).await.is_ok());

        let wrong_aud = sign(json!({"sub": "uid", "exp": in_one_hour(), "iss": "collabbridge", "aud": "mobile"}));
        assert!(verifier.verify(&wrong_aud).await.is_err());

        let missing_iss = sign(json!({"sub": "uid", "exp": in_one_hour(), "aud": "web"}));
        assert!(verifier.verify(&missing_iss).await.is_err());
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let verifier = JwtIdentityVerifier::new(&config(None, None));
        assert_matches!(verifier.verify("not.a.jwt").await, Err(IdentityError::Invalid(_)));
    }
}
