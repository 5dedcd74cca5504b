//! Local cryptographic verification of provider-issued access tokens.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use stratix_core::config::IdentityConfig;

use super::SessionVerifier;
use crate::credentials::{PendingCookies, SessionCredentials};
use crate::error::AuthError;
use crate::principal::Principal;

/// Claims carried by a provider access token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
}

/// Verifies access tokens against the provider's signing key.
#[derive(Clone)]
pub struct JwtSessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtSessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtSessionVerifier {
    /// Creates a verifier from identity configuration.
    ///
    /// An RSA public key takes precedence over a shared secret.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let (decoding_key, algorithm) = match (&config.jwt_public_key_pem, &config.jwt_secret) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AuthError::ProviderUnavailable(format!("invalid JWT public key: {e}"))
                })?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(AuthError::ProviderUnavailable(
                    "no JWT key material configured".to_string(),
                ));
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    fn decode_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidCredentials("invalid token signature".to_string())
                }
                _ => AuthError::InvalidCredentials(format!("token validation failed: {e}")),
            })
    }
}

#[async_trait]
impl SessionVerifier for JwtSessionVerifier {
    async fn verify(
        &self,
        credentials: &SessionCredentials,
        _pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError> {
        let token = credentials
            .access_token()
            .ok_or(AuthError::MissingCredentials)?;

        let claims = self.decode_token(token)?;

        let tenant_id = claims
            .app_metadata
            .get("tenant_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Principal {
            user_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            verified: !claims.is_anonymous.unwrap_or(false),
            tenant_id,
        })
    }
}
