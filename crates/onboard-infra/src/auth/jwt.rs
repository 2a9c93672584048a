//! Verification of HS256 access tokens signed by the identity provider.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use onboard_core::ports::{AuthError, TokenClaims, TokenVerifier};

pub const DEFAULT_SECRET: &str = "change-me-in-production";

/// Value of the `token_type` claim on access tokens. Refresh tokens share
/// the signing key and must not authenticate API calls.
pub const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            issuer: "onboard-identity".to_string(),
            leeway_seconds: 30,
        }
    }
}

/// Claim set of an access token as the identity provider signs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub token_type: String,
    pub iss: String,
    pub exp: i64,
}

impl From<AccessClaims> for TokenClaims {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            exp: claims.exp,
        }
    }
}

pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        if config.secret == DEFAULT_SECRET {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = config.leeway_seconds;

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(classify)?
            .claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AuthError::InvalidToken(format!(
                "expected an access token, got '{}'",
                claims.token_type
            )));
        }

        Ok(claims.into())
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer => AuthError::InvalidToken("unexpected issuer".to_string()),
        ErrorKind::InvalidSignature => AuthError::InvalidToken("signature mismatch".to_string()),
        _ => AuthError::InvalidToken(err.to_string()),
    }
}
