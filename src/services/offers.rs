use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{Action, OFFER_RULES};
use crate::config::DetailMatchKey;
use crate::db::offers as offer_db;
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::offer_details::{
    self, CreateOfferDetail, Features, OfferDetailResponse, OfferType, UNLIMITED_REVISIONS,
    UpdateOfferDetail,
};
use crate::models::offers::{
    self, CreateOffer, OfferSummary, OfferWithDetails, UpdateOffer, DESCRIPTION_MAX_LEN,
    TITLE_MAX_LEN,
};
use crate::services::{check_image, require_text};
use crate::storage::{BlobStore, offer_image_key};

/// List every offer with its tier links and derived minimums.
pub async fn list_offers(db: &DatabaseConnection) -> AppResult<Vec<OfferSummary>> {
    let rows = offer_db::get_all_offers(db).await?;
    let ids = rows.iter().map(|(o, _)| o.id).collect();
    let mut by_offer: HashMap<Uuid, Vec<offer_details::Model>> = HashMap::new();
    for detail in offer_db::get_details_for_offers(db, ids).await? {
        by_offer.entry(detail.offer_id).or_default().push(detail);
    }

    Ok(rows
        .into_iter()
        .map(|(offer, owner)| {
            let mut details = by_offer.remove(&offer.id).unwrap_or_default();
            details.sort_by_key(|d| d.offer_type);
            let username = owner.map(|u| u.username).unwrap_or_default();
            offers::summary(offer, username, &details)
        })
        .collect())
}

/// Retrieve one offer. Open to anyone.
pub async fn get_offer(db: &DatabaseConnection, offer_id: Uuid) -> AppResult<OfferSummary> {
    let offer = load_offer(db, offer_id).await?;
    let details = offer_db::get_details_for_offer(db, offer.id).await?;
    let username = user_db::get_user_by_id(db, offer.user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();
    Ok(offers::summary(offer, username, &details))
}

/// Retrieve one pricing tier. Open to anyone.
pub async fn get_offer_detail(
    db: &DatabaseConnection,
    detail_id: Uuid,
) -> AppResult<OfferDetailResponse> {
    offer_db::get_offer_detail_by_id(db, detail_id)
        .await?
        .map(OfferDetailResponse::from)
        .ok_or_else(|| AppError::not_found(format!("OfferDetail {detail_id} not found")))
}

/// Create an offer owned by `actor` together with its three tiers.
///
/// Either the offer and every tier are stored, or nothing is.
pub async fn create_offer(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreateOffer,
) -> AppResult<OfferWithDetails> {
    OFFER_RULES.authorize(actor, Action::Create)?;

    require_text("title", &input.title, TITLE_MAX_LEN)?;
    require_text("description", &input.description, DESCRIPTION_MAX_LEN)?;
    validate_tier_set(&input.details)?;
    for detail in &input.details {
        validate_new_detail(detail)?;
    }

    let txn = db.begin().await?;
    let offer = offer_db::insert_offer(&txn, actor.id, input.title, input.description).await?;
    let mut details = Vec::with_capacity(input.details.len());
    for detail in input.details {
        details.push(offer_db::insert_offer_detail(&txn, offer.id, detail).await?);
    }
    txn.commit().await?;

    details.sort_by_key(|d| d.offer_type);
    info!(offer_id = %offer.id, user_id = %actor.id, "Offer created");
    Ok(offers::with_details(offer, details))
}

/// Apply a partial update to an offer and, optionally, some of its tiers.
///
/// Tier entries are matched to stored rows by `match_key`. An entry that matches
/// nothing fails the whole update before anything is written.
pub async fn update_offer(
    db: &DatabaseConnection,
    actor: &Actor,
    offer_id: Uuid,
    input: UpdateOffer,
    match_key: DetailMatchKey,
) -> AppResult<OfferWithDetails> {
    OFFER_RULES.authorize(actor, Action::Update)?;
    let offer = load_offer(db, offer_id).await?;
    OFFER_RULES.authorize_object(actor, Action::Update, &offer)?;

    if let Some(title) = &input.title {
        require_text("title", title, TITLE_MAX_LEN)?;
    }
    if let Some(description) = &input.description {
        require_text("description", description, DESCRIPTION_MAX_LEN)?;
    }

    let txn = db.begin().await?;
    let existing = offer_db::get_details_for_offer(&txn, offer.id).await?;
    let changes = match &input.details {
        Some(updates) => plan_detail_updates(&existing, updates, match_key)?,
        None => Vec::new(),
    };

    let mut active: offers::ActiveModel = offer.into();
    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));
    let offer = offer_db::save_offer(&txn, active).await?;

    for change in changes {
        offer_db::save_offer_detail(&txn, change).await?;
    }
    let details = offer_db::get_details_for_offer(&txn, offer.id).await?;
    txn.commit().await?;

    info!(offer_id = %offer.id, user_id = %actor.id, "Offer updated");
    Ok(offers::with_details(offer, details))
}

/// Delete an offer, its tiers and, best-effort, its stored image.
pub async fn delete_offer(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    actor: &Actor,
    offer_id: Uuid,
) -> AppResult<()> {
    OFFER_RULES.authorize(actor, Action::Delete)?;
    let offer = load_offer(db, offer_id).await?;
    OFFER_RULES.authorize_object(actor, Action::Delete, &offer)?;

    let txn = db.begin().await?;
    let result = offer_db::delete_offer(&txn, offer.id).await?;
    txn.commit().await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!("Offer {offer_id} not found")));
    }

    if let Some(key) = &offer.image {
        if let Err(e) = store.delete(key).await {
            warn!(offer_id = %offer.id, key = %key, "Failed to delete offer image: {e}");
        }
    }

    info!(offer_id = %offer.id, user_id = %actor.id, "Offer deleted");
    Ok(())
}

/// Store a new image for an offer, replacing the previous one.
pub async fn set_offer_image(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    actor: &Actor,
    offer_id: Uuid,
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> AppResult<OfferWithDetails> {
    OFFER_RULES.authorize(actor, Action::Update)?;
    let offer = load_offer(db, offer_id).await?;
    OFFER_RULES.authorize_object(actor, Action::Update, &offer)?;

    let format = check_image("image", content_type, bytes, max_bytes)?;

    let owner = user_db::get_user_by_id(db, offer.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))?;
    let key = offer_image_key(owner.id, &owner.username, offer.id, format);
    store
        .put(&key, bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let previous = offer.image.clone();
    let offer = match offer_db::set_offer_image(db, offer, Some(key.clone())).await {
        Ok(offer) => offer,
        Err(e) => {
            // The row still points at `previous`; a different new key is now orphaned.
            if previous.as_deref() != Some(key.as_str()) {
                if let Err(cleanup) = store.delete(&key).await {
                    warn!(offer_id = %offer_id, key = %key, "Failed to delete orphaned offer image: {cleanup}");
                }
            }
            return Err(e.into());
        }
    };
    if let Some(old) = previous.filter(|old| *old != key) {
        if let Err(e) = store.delete(&old).await {
            warn!(offer_id = %offer.id, key = %old, "Failed to delete replaced offer image: {e}");
        }
    }

    let details = offer_db::get_details_for_offer(db, offer.id).await?;
    info!(offer_id = %offer.id, key = %key, "Offer image stored");
    Ok(offers::with_details(offer, details))
}

async fn load_offer(db: &DatabaseConnection, offer_id: Uuid) -> AppResult<offers::Model> {
    offer_db::get_offer_by_id(db, offer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))
}

/// The payload must name each of basic, standard and premium exactly once.
fn validate_tier_set(details: &[CreateOfferDetail]) -> AppResult<()> {
    let mut seen = BTreeSet::new();
    for detail in details {
        if !seen.insert(detail.offer_type) {
            return Err(AppError::validation(
                "details",
                format!("Duplicate tier: {}.", detail.offer_type.as_str()),
            ));
        }
    }
    let missing: Vec<&str> = OfferType::ALL
        .iter()
        .filter(|t| !seen.contains(*t))
        .map(OfferType::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::validation(
            "details",
            format!("Missing required tier(s): {}.", missing.join(", ")),
        ));
    }
    Ok(())
}

fn validate_new_detail(detail: &CreateOfferDetail) -> AppResult<()> {
    let tier = detail.offer_type.as_str();
    require_text(
        &format!("details.{tier}.title"),
        &detail.title,
        offer_details::TITLE_MAX_LEN,
    )?;
    validate_revisions(tier, detail.revisions)?;
    validate_delivery_time(tier, detail.delivery_time_in_days)
}

fn validate_revisions(tier: &str, revisions: i32) -> AppResult<()> {
    if revisions < UNLIMITED_REVISIONS {
        return Err(AppError::validation(
            format!("details.{tier}.revisions"),
            "Use -1 for unlimited revisions or a non-negative count.",
        ));
    }
    Ok(())
}

fn validate_delivery_time(tier: &str, days: i32) -> AppResult<()> {
    if days < 1 {
        return Err(AppError::validation(
            format!("details.{tier}.delivery_time_in_days"),
            "Delivery time must be at least one day.",
        ));
    }
    Ok(())
}

/// Resolve every tier entry against the stored rows and build the updates.
/// Nothing is written here; any invalid entry rejects the whole set.
fn plan_detail_updates(
    existing: &[offer_details::Model],
    updates: &[UpdateOfferDetail],
    match_key: DetailMatchKey,
) -> AppResult<Vec<offer_details::ActiveModel>> {
    let mut touched = BTreeSet::new();
    let mut planned = Vec::with_capacity(updates.len());

    for update in updates {
        let target = match match_key {
            DetailMatchKey::OfferType => {
                let tier = update.offer_type.ok_or_else(|| {
                    AppError::validation(
                        "details.offer_type",
                        "Each tier update must name its offer_type.",
                    )
                })?;
                existing.iter().find(|d| d.offer_type == tier).ok_or_else(|| {
                    AppError::validation(
                        "details.offer_type",
                        format!("This offer has no {} tier.", tier.as_str()),
                    )
                })?
            }
            DetailMatchKey::Id => {
                let id = update.id.ok_or_else(|| {
                    AppError::validation("details.id", "Each tier update must name its id.")
                })?;
                let found = existing.iter().find(|d| d.id == id).ok_or_else(|| {
                    AppError::validation(
                        "details.id",
                        format!("OfferDetail {id} does not belong to this offer."),
                    )
                })?;
                if update.offer_type.is_some_and(|t| t != found.offer_type) {
                    return Err(AppError::validation(
                        "details.offer_type",
                        "The tier of an existing detail cannot be changed.",
                    ));
                }
                found
            }
        };

        if !touched.insert(target.id) {
            return Err(AppError::validation(
                "details",
                format!("The {} tier appears more than once.", target.offer_type.as_str()),
            ));
        }

        let tier = target.offer_type.as_str();
        let mut active: offer_details::ActiveModel = target.clone().into();
        if let Some(title) = &update.title {
            require_text(&format!("details.{tier}.title"), title, offer_details::TITLE_MAX_LEN)?;
            active.title = Set(title.clone());
        }
        if let Some(revisions) = update.revisions {
            validate_revisions(tier, revisions)?;
            active.revisions = Set(revisions);
        }
        if let Some(days) = update.delivery_time_in_days {
            validate_delivery_time(tier, days)?;
            active.delivery_time_in_days = Set(days);
        }
        if let Some(price) = update.price {
            active.price = Set(price.cents());
        }
        if let Some(features) = &update.features {
            active.features = Set(Features(features.clone()));
        }
        planned.push(active);
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::money::Money;

    fn tier(offer_type: OfferType) -> CreateOfferDetail {
        CreateOfferDetail {
            title: format!("{} package", offer_type.as_str()),
            revisions: 1,
            delivery_time_in_days: 3,
            price: Money::from_cents(5000).unwrap(),
            features: vec!["Logo".into()],
            offer_type,
        }
    }

    fn stored(offer_type: OfferType) -> offer_details::Model {
        offer_details::Model {
            id: Uuid::new_v4(),
            offer_id: Uuid::nil(),
            title: "t".into(),
            revisions: 1,
            delivery_time_in_days: 3,
            price: 100,
            features: Features::default(),
            offer_type,
        }
    }

    #[test]
    fn tier_set_requires_all_three() {
        let full: Vec<_> = OfferType::ALL.into_iter().map(tier).collect();
        assert!(validate_tier_set(&full).is_ok());

        let partial = vec![tier(OfferType::Basic), tier(OfferType::Standard)];
        let err = validate_tier_set(&partial).unwrap_err();
        assert!(err.to_string().contains("premium"));

        let dup = vec![
            tier(OfferType::Basic),
            tier(OfferType::Basic),
            tier(OfferType::Premium),
        ];
        assert!(validate_tier_set(&dup).unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn revisions_accept_unlimited_marker() {
        let mut detail = tier(OfferType::Basic);
        detail.revisions = -1;
        assert!(validate_new_detail(&detail).is_ok());
        detail.revisions = -2;
        assert!(validate_new_detail(&detail).is_err());
    }

    #[test]
    fn unmatched_tier_rejects_the_whole_plan() {
        let existing = vec![stored(OfferType::Basic), stored(OfferType::Standard)];
        let updates = vec![
            UpdateOfferDetail {
                offer_type: Some(OfferType::Basic),
                revisions: Some(4),
                ..Default::default()
            },
            UpdateOfferDetail {
                offer_type: Some(OfferType::Premium),
                revisions: Some(4),
                ..Default::default()
            },
        ];
        assert!(plan_detail_updates(&existing, &updates, DetailMatchKey::OfferType).is_err());
    }

    #[test]
    fn id_matching_keeps_tier_fixed() {
        let existing = vec![stored(OfferType::Basic)];
        let ok = vec![UpdateOfferDetail {
            id: Some(existing[0].id),
            title: Some("Renamed".into()),
            ..Default::default()
        }];
        assert_eq!(
            plan_detail_updates(&existing, &ok, DetailMatchKey::Id).unwrap().len(),
            1
        );

        let retier = vec![UpdateOfferDetail {
            id: Some(existing[0].id),
            offer_type: Some(OfferType::Premium),
            ..Default::default()
        }];
        assert!(plan_detail_updates(&existing, &retier, DetailMatchKey::Id).is_err());
    }
}
