use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `reviews` table.
///
/// At most one row per `(business_user_id, reviewer_id)`; the migration backs this
/// with a unique index but the service checks it first.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_user_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i16,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessUserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    BusinessUser,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Reviewer,
}

impl ActiveModelBehavior for ActiveModel {}

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

// ── Request DTOs ──

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReview {
    pub business_user: Uuid,
    pub rating: i16,
    pub description: String,
}

/// Only `rating` and `description` may change after creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateReview {
    pub rating: Option<i16>,
    pub description: Option<String>,
}

// ── Response DTOs ──

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub business_user: Uuid,
    pub reviewer: Uuid,
    pub rating: i16,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for ReviewResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            business_user: m.business_user_id,
            reviewer: m.reviewer_id,
            rating: m.rating,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
