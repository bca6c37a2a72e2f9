use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A verification key resolved from the identity provider's JWKS document.
#[derive(Clone)]
pub struct ResolvedKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

/// Fetches and caches the identity provider's signing keys by `kid`.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, ResolvedKey>>,
    jwks_url: String,
    client: reqwest::Client,
}

impl JwksCache {
    pub fn new(jwks_url: &str) -> Self {
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(16)
                .build(),
        );

        Self {
            cache,
            jwks_url: jwks_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, String> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| format!("Failed to parse JWKS JSON: {e}"))
    }

    /// Resolve the key for `kid`, refreshing the key set on a cache miss.
    pub async fn resolve(&self, kid: &str) -> Result<ResolvedKey, String> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks
            .find(kid)
            .ok_or(format!("Key with kid={kid} not found in JWKS"))?;

        let algorithm = jwk
            .common
            .key_algorithm
            .as_ref()
            .and_then(|alg| format!("{alg:?}").parse::<Algorithm>().ok())
            .unwrap_or(Algorithm::RS256);
        let key =
            DecodingKey::from_jwk(jwk).map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let resolved = ResolvedKey { key, algorithm };
        self.cache.insert(kid.to_string(), resolved.clone()).await;
        Ok(resolved)
    }
}
