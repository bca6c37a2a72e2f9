//! Shared fixtures for the integration tests: an in-memory SQLite database with
//! the application schema, seeded accounts and locally minted HS256 tokens.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use async_trait::async_trait;
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Set,
};
use uuid::Uuid;

use marketplace_backend::AppState;
use marketplace_backend::auth::Actor;
use marketplace_backend::auth::jwt::{AppMetadata, Claims, TokenVerifier};
use marketplace_backend::config::Policy;
use marketplace_backend::models::money::Money;
use marketplace_backend::models::offer_details::{self, CreateOfferDetail, OfferType};
use marketplace_backend::models::offers::{self, CreateOffer};
use marketplace_backend::models::users::{self, Role};
use marketplace_backend::models::{orders, reviews};
use marketplace_backend::storage::{BlobStore, LocalBlobStore, StorageError};

/// Test-only signing secret.
pub const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// Fresh in-memory database with the full schema, built from the entities.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory SQLite");
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children so the foreign keys resolve.
    let tables = [
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(offers::Entity),
        schema.create_table_from_entity(offer_details::Entity),
        schema.create_table_from_entity(orders::Entity),
        schema.create_table_from_entity(reviews::Entity),
    ];
    for table in &tables {
        db.execute_unprepared(&backend.build(table).sql)
            .await
            .expect("Failed to create test table");
    }

    let unique_indexes = [
        Index::create()
            .name("uq_offer_details_offer_id_offer_type")
            .table(offer_details::Entity)
            .col(offer_details::Column::OfferId)
            .col(offer_details::Column::OfferType)
            .unique()
            .to_owned(),
        Index::create()
            .name("uq_reviews_business_user_id_reviewer_id")
            .table(reviews::Entity)
            .col(reviews::Column::BusinessUserId)
            .col(reviews::Column::ReviewerId)
            .unique()
            .to_owned(),
    ];
    for index in &unique_indexes {
        db.execute_unprepared(&backend.build(index).sql)
            .await
            .expect("Failed to create test index");
    }
    db
}

/// Insert an account and return it as an actor.
pub async fn seed_user(db: &DatabaseConnection, username: &str, role: Role) -> Actor {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(Some(format!("{username}@example.com"))),
        role: Set(role),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        location: Set(String::new()),
        tel: Set(String::new()),
        description: Set(String::new()),
        working_hours: Set(String::new()),
        file: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed user");
    Actor::from(user)
}

/// Mint an HS256 token for `sub` carrying `role` in `app_metadata`.
pub fn mint_token(sub: Uuid, username: &str, role: Option<&str>) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://auth.example.com".to_string()),
        email: Some(format!("{username}@example.com")),
        preferred_username: Some(username.to_string()),
        app_metadata: Some(AppMetadata {
            role: role.map(str::to_string),
        }),
        user_metadata: None,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

pub fn bearer(actor: &Actor) -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}", mint_token(actor.id, &actor.username, Some(actor.role.as_str()))),
    )
}

/// Scratch directory for the blob store of one test.
pub fn media_dir() -> PathBuf {
    std::env::temp_dir().join(format!("marketplace-test-{}", Uuid::new_v4()))
}

/// In-memory blob store that records its contents. Deletes can be made to fail.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: bool,
}

impl MemoryBlobStore {
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Io(std::io::Error::other("disk unavailable")));
        }
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn app_state(db: DatabaseConnection, policy: Policy) -> AppState {
    AppState::new(
        db,
        TokenVerifier::shared_secret(TEST_SECRET),
        policy,
        Arc::new(LocalBlobStore::new(media_dir())),
    )
}

pub fn tier(offer_type: OfferType, cents: i64, days: i32) -> CreateOfferDetail {
    CreateOfferDetail {
        title: format!("{} package", offer_type.as_str()),
        revisions: 2,
        delivery_time_in_days: days,
        price: Money::from_cents(cents).expect("valid price"),
        features: vec!["Logo design".to_string(), "Business card".to_string()],
        offer_type,
    }
}

/// A complete offer: basic 50.00 / 7 days, standard 100.00 / 5 days, premium 200.00 / 2 days.
pub fn full_offer(title: &str) -> CreateOffer {
    CreateOffer {
        title: title.to_string(),
        description: "Professional graphic design".to_string(),
        details: vec![
            tier(OfferType::Basic, 5000, 7),
            tier(OfferType::Standard, 10000, 5),
            tier(OfferType::Premium, 20000, 2),
        ],
    }
}

/// Build the HTTP service the way `main` does.
#[allow(unused_macros)]
macro_rules! test_app {
    ($state:expr) => {{
        let state = $state;
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(move |cfg| state.register(cfg))
                .service(
                    actix_web::web::scope("/api")
                        .configure(marketplace_backend::handlers::init_routes),
                ),
        )
        .await
    }};
}
