use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Pricing tier of an offer. Every offer carries exactly one detail per tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "premium")]
    Premium,
}

impl OfferType {
    pub const ALL: [OfferType; 3] = [OfferType::Basic, OfferType::Standard, OfferType::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Basic => "basic",
            OfferType::Standard => "standard",
            OfferType::Premium => "premium",
        }
    }
}

/// Ordered feature list, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Features(pub Vec<String>);

/// SeaORM entity for the `offer_details` table.
///
/// `revisions == -1` means unlimited revisions. `price` is stored in cents.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offer_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub offer_id: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: i64,
    #[sea_orm(column_type = "Json")]
    pub features: Features,
    pub offer_type: OfferType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offers::Entity",
        from = "Column::OfferId",
        to = "super::offers::Column::Id",
        on_delete = "Cascade"
    )]
    Offer,
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const TITLE_MAX_LEN: usize = 30;
pub const UNLIMITED_REVISIONS: i32 = -1;

// ── Request DTOs ──

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOfferDetail {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: Money,
    #[serde(default)]
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// One tier inside an offer update. `id` or `offer_type` selects the stored row,
/// depending on the configured match key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOfferDetail {
    pub id: Option<Uuid>,
    pub offer_type: Option<OfferType>,
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    pub price: Option<Money>,
    pub features: Option<Vec<String>>,
}

// ── Response DTOs ──

#[derive(Debug, Clone, Serialize)]
pub struct OfferDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: Money,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl From<Model> for OfferDetailResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            revisions: m.revisions,
            delivery_time_in_days: m.delivery_time_in_days,
            // Stored prices are validated on write.
            price: Money::from_cents(m.price).unwrap_or_default(),
            features: m.features.0,
            offer_type: m.offer_type,
        }
    }
}
