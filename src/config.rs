use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Who may read an individual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewVisibility {
    /// Any authenticated actor.
    #[default]
    Authenticated,
    /// Only the reviewer, the reviewed business and admins.
    Parties,
}

impl FromStr for ReviewVisibility {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authenticated" => Ok(ReviewVisibility::Authenticated),
            "parties" => Ok(ReviewVisibility::Parties),
            other => Err(ConfigError::Invalid("REVIEW_READ_VISIBILITY", other.to_string())),
        }
    }
}

/// How tiers in an offer update are matched against stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailMatchKey {
    #[default]
    OfferType,
    Id,
}

impl FromStr for DetailMatchKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offer_type" | "tier" => Ok(DetailMatchKey::OfferType),
            "id" => Ok(DetailMatchKey::Id),
            other => Err(ConfigError::Invalid("OFFER_DETAIL_MATCH_KEY", other.to_string())),
        }
    }
}

/// Source of token verification keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    SharedSecret(String),
    Jwks { url: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Policy knobs the services consult. Cheap to clone into app data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub review_visibility: ReviewVisibility,
    pub detail_match_key: DetailMatchKey,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub run_migrations: bool,
    pub media_root: PathBuf,
    pub media_url: String,
    pub auth: AuthConfig,
    pub policy: Policy,
}

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let auth = match (env::var("AUTH_JWT_SECRET"), env::var("AUTH_JWKS_URL")) {
            (Ok(secret), _) if !secret.is_empty() => AuthConfig::SharedSecret(secret),
            (_, Ok(url)) if !url.is_empty() => AuthConfig::Jwks { url },
            _ => return Err(ConfigError::Missing("AUTH_JWT_SECRET or AUTH_JWKS_URL")),
        };

        Ok(Self {
            database_url,
            port: parse_var("PORT", 8080)?,
            run_migrations: parse_var("RUN_MIGRATIONS", false)?,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            auth,
            policy: Policy {
                review_visibility: parse_var("REVIEW_READ_VISIBILITY", ReviewVisibility::default())?,
                detail_match_key: parse_var("OFFER_DETAIL_MATCH_KEY", DetailMatchKey::default())?,
                max_image_bytes: parse_var("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            },
        })
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            review_visibility: ReviewVisibility::default(),
            detail_match_key: DetailMatchKey::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        _ => Ok(default),
    }
}
