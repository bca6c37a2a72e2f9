use sea_orm::*;
use uuid::Uuid;

use crate::models::offer_details::{self, CreateOfferDetail, Features};
use crate::models::offers;
use crate::models::users;

/// Insert the offer row itself. Details are inserted separately in the same transaction.
pub async fn insert_offer<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    title: String,
    description: String,
) -> Result<offers::Model, DbErr> {
    let new_offer = offers::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title),
        description: Set(description),
        image: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_offer.insert(db).await
}

/// Insert one pricing tier for an offer.
pub async fn insert_offer_detail<C: ConnectionTrait>(
    db: &C,
    offer_id: Uuid,
    input: CreateOfferDetail,
) -> Result<offer_details::Model, DbErr> {
    let new_detail = offer_details::ActiveModel {
        id: Set(Uuid::new_v4()),
        offer_id: Set(offer_id),
        title: Set(input.title),
        revisions: Set(input.revisions),
        delivery_time_in_days: Set(input.delivery_time_in_days),
        price: Set(input.price.cents()),
        features: Set(Features(input.features)),
        offer_type: Set(input.offer_type),
    };

    new_detail.insert(db).await
}

/// Fetch all offers, newest first, with their owners.
pub async fn get_all_offers<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<(offers::Model, Option<users::Model>)>, DbErr> {
    offers::Entity::find()
        .find_also_related(users::Entity)
        .order_by_desc(offers::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single offer by ID.
pub async fn get_offer_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<offers::Model>, DbErr> {
    offers::Entity::find_by_id(id).one(db).await
}

/// Fetch the tiers of one offer in basic → standard → premium order.
pub async fn get_details_for_offer<C: ConnectionTrait>(
    db: &C,
    offer_id: Uuid,
) -> Result<Vec<offer_details::Model>, DbErr> {
    let mut details = offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.eq(offer_id))
        .all(db)
        .await?;
    details.sort_by_key(|d| d.offer_type);
    Ok(details)
}

/// Fetch the tiers of many offers at once.
pub async fn get_details_for_offers<C: ConnectionTrait>(
    db: &C,
    offer_ids: Vec<Uuid>,
) -> Result<Vec<offer_details::Model>, DbErr> {
    if offer_ids.is_empty() {
        return Ok(Vec::new());
    }
    offer_details::Entity::find()
        .filter(offer_details::Column::OfferId.is_in(offer_ids))
        .all(db)
        .await
}

/// Fetch a single tier by ID.
pub async fn get_offer_detail_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<offer_details::Model>, DbErr> {
    offer_details::Entity::find_by_id(id).one(db).await
}

/// Fetch a tier and its parent offer, holding a shared row lock until the
/// surrounding transaction ends so the offer cannot vanish mid-operation.
pub async fn get_offer_detail_with_offer_for_share<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(offer_details::Model, offers::Model)>, DbErr> {
    let mut query = offer_details::Entity::find_by_id(id).find_also_related(offers::Entity);
    // SQLite has no row locks; its write transactions lock the whole database.
    if db.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_shared();
    }
    let found = query.one(db).await?;

    Ok(found.and_then(|(detail, offer)| offer.map(|o| (detail, o))))
}

/// Overwrite the editable columns of an offer.
pub async fn save_offer<C: ConnectionTrait>(
    db: &C,
    active: offers::ActiveModel,
) -> Result<offers::Model, DbErr> {
    active.update(db).await
}

/// Overwrite the editable columns of one tier.
pub async fn save_offer_detail<C: ConnectionTrait>(
    db: &C,
    active: offer_details::ActiveModel,
) -> Result<offer_details::Model, DbErr> {
    active.update(db).await
}

/// Point an offer at a newly stored image.
pub async fn set_offer_image<C: ConnectionTrait>(
    db: &C,
    offer: offers::Model,
    image: Option<String>,
) -> Result<offers::Model, DbErr> {
    let mut active: offers::ActiveModel = offer.into();
    active.image = Set(image);
    active.updated_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}

/// Delete an offer and its tiers.
pub async fn delete_offer<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<DeleteResult, DbErr> {
    offer_details::Entity::delete_many()
        .filter(offer_details::Column::OfferId.eq(id))
        .exec(db)
        .await?;
    offers::Entity::delete_by_id(id).exec(db).await
}
