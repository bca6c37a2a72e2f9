//! Offer catalog behaviour against an in-memory database.
mod common;

use marketplace_backend::config::DetailMatchKey;
use marketplace_backend::db::offers as offer_db;
use marketplace_backend::error::AppError;
use marketplace_backend::models::money::Money;
use marketplace_backend::models::offer_details::{OfferType, UpdateOfferDetail};
use marketplace_backend::models::offers::{self, UpdateOffer};
use marketplace_backend::models::users::Role;
use marketplace_backend::services::offers as offer_service;
use marketplace_backend::storage::LocalBlobStore;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, SqlErr};

use common::{MemoryBlobStore, full_offer, media_dir, seed_user, setup_db, tier};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn field_of(err: &AppError) -> Option<&str> {
    match err {
        AppError::Validation(e) => e.field.as_deref(),
        _ => None,
    }
}

#[tokio::test]
async fn test_create_offer_with_three_tiers() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;

    let offer = offer_service::create_offer(&db, &business, full_offer("Grafikdesign-Paket"))
        .await
        .expect("offer should be created");

    assert_eq!(offer.user, business.id);
    assert_eq!(offer.details.len(), 3);
    let tiers: Vec<OfferType> = offer.details.iter().map(|d| d.offer_type).collect();
    assert_eq!(tiers, vec![OfferType::Basic, OfferType::Standard, OfferType::Premium]);
    assert_eq!(offer.details[0].price, Money::from_cents(5000).unwrap());
}

#[tokio::test]
async fn test_missing_tier_is_rejected_and_nothing_persists() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;

    let mut input = full_offer("Incomplete");
    input.details.retain(|d| d.offer_type != OfferType::Premium);

    let err = offer_service::create_offer(&db, &business, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("premium"));
    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_tier_field_rolls_back_everything() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;

    let mut input = full_offer("Bad delivery time");
    input.details[2] = tier(OfferType::Premium, 20000, 0);

    let err = offer_service::create_offer(&db, &business, input)
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("details.premium.delivery_time_in_days"));
    assert_eq!(offers::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_customers_cannot_create_offers() {
    let db = setup_db().await;
    let customer = seed_user(&db, "buyer", Role::Customer).await;

    let err = offer_service::create_offer(&db, &customer, full_offer("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_minimums_are_derived_from_current_tiers() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Logo"))
        .await
        .unwrap();

    let summary = offer_service::get_offer(&db, created.id).await.unwrap();
    assert_eq!(summary.min_price, Some(Money::from_cents(5000).unwrap()));
    assert_eq!(summary.min_delivery_time, Some(2));
    assert_eq!(summary.user_details.username, "designer");
    assert_eq!(summary.details.len(), 3);
    assert!(summary.details[0].url.starts_with("/api/offerdetails/"));

    // Cheaper premium tier moves the minimum.
    offer_service::update_offer(
        &db,
        &business,
        created.id,
        UpdateOffer {
            details: Some(vec![UpdateOfferDetail {
                offer_type: Some(OfferType::Premium),
                price: Some(Money::from_cents(1999).unwrap()),
                ..Default::default()
            }]),
            ..Default::default()
        },
        DetailMatchKey::OfferType,
    )
    .await
    .unwrap();

    let listed = offer_service::list_offers(&db).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].min_price.unwrap().to_string(), "19.99");
}

#[tokio::test]
async fn test_partial_update_is_all_or_nothing() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Original"))
        .await
        .unwrap();

    let err = offer_service::update_offer(
        &db,
        &business,
        created.id,
        UpdateOffer {
            title: Some("Renamed".into()),
            description: None,
            details: Some(vec![
                UpdateOfferDetail {
                    offer_type: Some(OfferType::Basic),
                    price: Some(Money::from_cents(100).unwrap()),
                    ..Default::default()
                },
                UpdateOfferDetail {
                    offer_type: Some(OfferType::Standard),
                    delivery_time_in_days: Some(0),
                    ..Default::default()
                },
            ]),
        },
        DetailMatchKey::OfferType,
    )
    .await
    .unwrap_err();
    assert_eq!(field_of(&err), Some("details.standard.delivery_time_in_days"));

    let summary = offer_service::get_offer(&db, created.id).await.unwrap();
    assert_eq!(summary.title, "Original");
    assert_eq!(summary.min_price, Some(Money::from_cents(5000).unwrap()));
    assert!(summary.updated_at.is_none());
}

#[tokio::test]
async fn test_update_matches_tiers_by_id_when_configured() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("By id"))
        .await
        .unwrap();
    let basic_id = created.details[0].id;

    let updated = offer_service::update_offer(
        &db,
        &business,
        created.id,
        UpdateOffer {
            details: Some(vec![UpdateOfferDetail {
                id: Some(basic_id),
                title: Some("Starter".into()),
                ..Default::default()
            }]),
            ..Default::default()
        },
        DetailMatchKey::Id,
    )
    .await
    .unwrap();
    assert_eq!(updated.details[0].title, "Starter");
    assert!(updated.updated_at.is_some());

    let err = offer_service::update_offer(
        &db,
        &business,
        created.id,
        UpdateOffer {
            details: Some(vec![UpdateOfferDetail {
                id: Some(uuid::Uuid::new_v4()),
                title: Some("Ghost".into()),
                ..Default::default()
            }]),
            ..Default::default()
        },
        DetailMatchKey::Id,
    )
    .await
    .unwrap_err();
    assert_eq!(field_of(&err), Some("details.id"));
}

#[tokio::test]
async fn test_only_owner_or_admin_may_modify() {
    let db = setup_db().await;
    let owner = seed_user(&db, "owner", Role::Business).await;
    let rival = seed_user(&db, "rival", Role::Business).await;
    let admin = seed_user(&db, "admin", Role::Admin).await;
    let created = offer_service::create_offer(&db, &owner, full_offer("Mine"))
        .await
        .unwrap();

    let rename = || UpdateOffer {
        title: Some("Taken over".into()),
        ..Default::default()
    };

    let err = offer_service::update_offer(&db, &rival, created.id, rename(), DetailMatchKey::OfferType)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated =
        offer_service::update_offer(&db, &admin, created.id, rename(), DetailMatchKey::OfferType)
            .await
            .unwrap();
    assert_eq!(updated.title, "Taken over");
}

#[tokio::test]
async fn test_delete_cascades_to_tiers_and_image() {
    let db = setup_db().await;
    let dir = media_dir();
    let store = LocalBlobStore::new(dir.clone());
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Short lived"))
        .await
        .unwrap();
    let detail_id = created.details[1].id;

    let with_image = offer_service::set_offer_image(
        &db,
        &store,
        &business,
        created.id,
        "image/png",
        PNG_BYTES,
        1024,
    )
    .await
    .unwrap();
    let key = with_image.image.expect("image key stored");
    assert_eq!(key, format!("user_{}_designer_offer_{}.png", business.id, created.id));
    assert!(dir.join(&key).exists());

    offer_service::delete_offer(&db, &store, &business, created.id)
        .await
        .unwrap();

    assert!(matches!(
        offer_service::get_offer(&db, created.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        offer_service::get_offer_detail(&db, detail_id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(!dir.join(&key).exists());
}

#[tokio::test]
async fn test_one_tier_per_type_is_enforced_by_the_schema() {
    let db = setup_db().await;
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Three tiers"))
        .await
        .unwrap();

    let err = offer_db::insert_offer_detail(&db, created.id, tier(OfferType::Basic, 900, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn test_delete_succeeds_when_image_delete_fails() {
    let db = setup_db().await;
    let store = MemoryBlobStore::failing_deletes();
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Stubborn image"))
        .await
        .unwrap();
    let detail_id = created.details[0].id;

    let with_image = offer_service::set_offer_image(
        &db, &store, &business, created.id, "image/png", PNG_BYTES, 1024,
    )
    .await
    .unwrap();
    let key = with_image.image.expect("image key stored");

    offer_service::delete_offer(&db, &store, &business, created.id)
        .await
        .expect("a storage failure must not fail the delete");

    assert!(matches!(
        offer_service::get_offer(&db, created.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        offer_service::get_offer_detail(&db, detail_id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    // The blob is left behind, nothing else.
    assert!(store.contains(&key));
}

#[tokio::test]
async fn test_failed_image_update_removes_new_blob() {
    let db = setup_db().await;
    let store = MemoryBlobStore::default();
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Locked"))
        .await
        .unwrap();

    db.execute_unprepared(
        "CREATE TRIGGER offers_image_locked BEFORE UPDATE OF image ON offers
         BEGIN SELECT RAISE(ABORT, 'image column locked'); END",
    )
    .await
    .unwrap();

    let err = offer_service::set_offer_image(
        &db, &store, &business, created.id, "image/png", PNG_BYTES, 1024,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    assert_eq!(store.len(), 0);
    let offer = offer_service::get_offer(&db, created.id).await.unwrap();
    assert_eq!(offer.image, None);
}

#[tokio::test]
async fn test_image_upload_validates_type_and_size() {
    let db = setup_db().await;
    let store = LocalBlobStore::new(media_dir());
    let business = seed_user(&db, "designer", Role::Business).await;
    let created = offer_service::create_offer(&db, &business, full_offer("Pictured"))
        .await
        .unwrap();

    let err = offer_service::set_offer_image(
        &db, &store, &business, created.id, "image/gif", PNG_BYTES, 1024,
    )
    .await
    .unwrap_err();
    assert_eq!(field_of(&err), Some("image"));

    let err = offer_service::set_offer_image(
        &db, &store, &business, created.id, "image/png", PNG_BYTES, 4,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::PayloadTooLarge(_)));
}
