//! Profile editing and pictures against an in-memory database.
mod common;

use marketplace_backend::error::AppError;
use marketplace_backend::models::users::{Role, UpdateProfile};
use marketplace_backend::services::profiles as profile_service;

use common::{MemoryBlobStore, seed_user, setup_db};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let db = setup_db().await;
    let business = seed_user(&db, "studio", Role::Business).await;

    profile_service::update_profile(
        &db,
        &business,
        business.id,
        UpdateProfile {
            description: Some("Print and web design".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = profile_service::update_profile(
        &db,
        &business,
        business.id,
        UpdateProfile {
            last_name: Some("Mustermann".into()),
            email: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.last_name, "Mustermann");
    let info = updated.business.expect("business accounts expose business fields");
    assert_eq!(info.description, "Print and web design");
}

#[tokio::test]
async fn test_overlong_fields_are_rejected() {
    let db = setup_db().await;
    let business = seed_user(&db, "studio", Role::Business).await;

    let err = profile_service::update_profile(
        &db,
        &business,
        business.id,
        UpdateProfile {
            tel: Some("0".repeat(26)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(e) if e.field.as_deref() == Some("tel")));
}

#[tokio::test]
async fn test_missing_profile_is_not_found() {
    let db = setup_db().await;
    let admin = seed_user(&db, "root", Role::Admin).await;

    let err = profile_service::get_profile(&db, &admin, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_new_picture_replaces_the_old_one() {
    let db = setup_db().await;
    let store = MemoryBlobStore::default();
    let customer = seed_user(&db, "buyer", Role::Customer).await;

    let first = profile_service::set_profile_file(
        &db, &store, &customer, customer.id, "image/png", PNG_BYTES, 1024,
    )
    .await
    .unwrap();
    let first_key = first.file.expect("file key stored");
    assert_eq!(first_key, format!("user_{}_buyer_profile.png", customer.id));

    let second = profile_service::set_profile_file(
        &db, &store, &customer, customer.id, "image/jpeg", JPEG_BYTES, 1024,
    )
    .await
    .unwrap();
    let second_key = second.file.expect("file key stored");

    assert!(store.contains(&second_key));
    assert!(!store.contains(&first_key));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_only_owner_or_admin_uploads_a_picture() {
    let db = setup_db().await;
    let store = MemoryBlobStore::default();
    let customer = seed_user(&db, "buyer", Role::Customer).await;
    let other = seed_user(&db, "other", Role::Customer).await;
    let admin = seed_user(&db, "root", Role::Admin).await;

    let err = profile_service::set_profile_file(
        &db, &store, &other, customer.id, "image/png", PNG_BYTES, 1024,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(store.len(), 0);

    let err = profile_service::set_profile_file(
        &db, &store, &admin, customer.id, "image/png", PNG_BYTES, 4,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::PayloadTooLarge(_)));

    profile_service::set_profile_file(
        &db, &store, &admin, customer.id, "image/png", PNG_BYTES, 1024,
    )
    .await
    .unwrap();
    assert_eq!(store.len(), 1);
}
