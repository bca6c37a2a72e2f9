use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwks::JwksCache;
use crate::config::AuthConfig;
use crate::models::users::Role;

/// Claims the identity provider puts in an access token.
///
/// The `sub` field is the user's UUID. `app_metadata.role` is server-controlled and
/// decides whether the account is a customer, business or admin.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    pub preferred_username: Option<String>,
    pub app_metadata: Option<AppMetadata>,
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppMetadata {
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// Best-effort email: prefer top-level, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }

    /// Username for a freshly provisioned account: explicit claim, metadata,
    /// the email's local part, then the subject itself.
    pub fn username(&self) -> String {
        self.preferred_username
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.username.clone()))
            .or_else(|| {
                self.user_email()
                    .and_then(|e| e.split('@').next().map(str::to_string))
            })
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.sub.clone())
    }

    /// Role requested for a freshly provisioned account. `None` if the claim
    /// is present but unrecognised.
    pub fn role(&self) -> Option<Role> {
        match self.app_metadata.as_ref().and_then(|m| m.role.as_deref()) {
            Some(raw) => Role::from_claim(raw),
            None => Some(Role::Customer),
        }
    }
}

/// Verifies bearer tokens against either a shared HS256 secret or a JWKS endpoint.
#[derive(Clone)]
pub enum TokenVerifier {
    SharedSecret(DecodingKey),
    Jwks(JwksCache),
}

impl TokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Self {
        match config {
            AuthConfig::SharedSecret(secret) => Self::shared_secret(secret),
            AuthConfig::Jwks { url } => TokenVerifier::Jwks(JwksCache::new(url)),
        }
    }

    pub fn shared_secret(secret: &str) -> Self {
        TokenVerifier::SharedSecret(DecodingKey::from_secret(secret.as_bytes()))
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, String> {
        match self {
            TokenVerifier::SharedSecret(key) => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.validate_aud = false;
                decode::<Claims>(token, key, &validation)
                    .map(|td| td.claims)
                    .map_err(|e| format!("{:?}", e.kind()))
            }
            TokenVerifier::Jwks(cache) => {
                let header =
                    decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
                let kid = header.kid.ok_or("No 'kid' in token header")?;
                let resolved = cache.resolve(&kid).await?;

                let mut validation = Validation::new(resolved.algorithm);
                validation.validate_aud = false;
                decode::<Claims>(token, &resolved.key, &validation)
                    .map(|td| td.claims)
                    .map_err(|e| format!("Token validation failed: {e}"))
            }
        }
    }
}

/// Validate a bearer token and return the decoded claims.
pub async fn validate_token(token: &str, verifier: &TokenVerifier) -> Result<Claims, String> {
    verifier.verify(token).await
}
