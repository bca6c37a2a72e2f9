use actix_web::web;
use sea_orm::DatabaseConnection;

use crate::auth::jwt::TokenVerifier;
use crate::config::Policy;
use crate::error::json_error_handler;
use crate::storage::{BlobStore, SharedBlobStore};

/// Everything the handlers pull out of app data.
///
/// Built once in `main` (or a test) and registered on every worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub verifier: web::Data<TokenVerifier>,
    pub policy: Policy,
    pub blob_store: SharedBlobStore,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        verifier: TokenVerifier,
        policy: Policy,
        blob_store: SharedBlobStore,
    ) -> Self {
        Self {
            db,
            verifier: web::Data::new(verifier),
            policy,
            blob_store,
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        let store: web::Data<dyn BlobStore> = web::Data::from(self.blob_store.clone());

        cfg.app_data(web::Data::new(self.db.clone()))
            .app_data(self.verifier.clone())
            .app_data(web::Data::new(self.policy))
            .app_data(store)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PayloadConfig::new(self.policy.max_image_bytes));
    }
}
