use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::offer_details::{self, CreateOfferDetail, OfferDetailResponse, UpdateOfferDetail};

/// SeaORM entity for the `offers` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    /// Blob-storage key of the offer image, if one was uploaded.
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offer_details::Entity")]
    Details,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::offer_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 255;

// ── Request DTOs ──

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOffer {
    pub title: String,
    pub description: String,
    pub details: Vec<CreateOfferDetail>,
}

/// Partial update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOffer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub details: Option<Vec<UpdateOfferDetail>>,
}

// ── Response DTOs ──

#[derive(Debug, Clone, Serialize)]
pub struct OwnerDetails {
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailLink {
    pub id: Uuid,
    pub url: String,
}

/// Offer shape used by list and retrieve: tiers are linked, not embedded.
#[derive(Debug, Clone, Serialize)]
pub struct OfferSummary {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub details: Vec<DetailLink>,
    pub min_price: Option<Money>,
    pub min_delivery_time: Option<i32>,
    pub user_details: OwnerDetails,
}

/// Offer shape returned by create and update, with every tier embedded.
#[derive(Debug, Clone, Serialize)]
pub struct OfferWithDetails {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub details: Vec<OfferDetailResponse>,
}

/// Cheapest tier price, computed from the current rows.
pub fn min_price(details: &[offer_details::Model]) -> Option<Money> {
    details
        .iter()
        .filter_map(|d| Money::from_cents(d.price).ok())
        .min()
}

/// Fastest tier delivery time, computed from the current rows.
pub fn min_delivery_time(details: &[offer_details::Model]) -> Option<i32> {
    details.iter().map(|d| d.delivery_time_in_days).min()
}

pub fn summary(
    offer: Model,
    owner_username: String,
    details: &[offer_details::Model],
) -> OfferSummary {
    OfferSummary {
        id: offer.id,
        user: offer.user_id,
        title: offer.title,
        image: offer.image,
        description: offer.description,
        created_at: offer.created_at,
        updated_at: offer.updated_at,
        details: details
            .iter()
            .map(|d| DetailLink {
                id: d.id,
                url: format!("/api/offerdetails/{}", d.id),
            })
            .collect(),
        min_price: min_price(details),
        min_delivery_time: min_delivery_time(details),
        user_details: OwnerDetails {
            username: owner_username,
        },
    }
}

pub fn with_details(offer: Model, details: Vec<offer_details::Model>) -> OfferWithDetails {
    OfferWithDetails {
        id: offer.id,
        user: offer.user_id,
        title: offer.title,
        image: offer.image,
        description: offer.description,
        created_at: offer.created_at,
        updated_at: offer.updated_at,
        details: details.into_iter().map(OfferDetailResponse::from).collect(),
    }
}
