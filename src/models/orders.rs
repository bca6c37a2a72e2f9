use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::money::Money;
use super::offer_details::{Features, OfferType};

/// Order status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// `completed` and `cancelled` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (
                OrderStatus::InProgress,
                OrderStatus::Completed | OrderStatus::Cancelled
            )
        )
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!(
                "\"{other}\" is not a valid status; expected one of in_progress, completed, cancelled"
            )),
        }
    }
}

/// SeaORM entity for the `orders` table.
///
/// Everything between `title` and `offer_type` is copied from the offer detail when
/// the order is placed and never rewritten afterwards. The party columns are
/// nullable so orders outlive deleted accounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_user_id: Option<Uuid>,
    pub business_user_id: Option<Uuid>,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: i64,
    #[sea_orm(column_type = "Json")]
    pub features: Features,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CustomerUserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessUserId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Business,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.customer_user_id == Some(user_id) || self.business_user_id == Some(user_id)
    }
}

// ── Request DTOs ──

/// Body of `POST /api/orders`. Nothing but the tier reference is accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrder {
    pub offer_detail_id: Uuid,
}

/// Body of `PATCH /api/orders/{id}`. `status` is the only mutable field.
///
/// The value stays a string until the service parses it so the error can name it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrder {
    pub status: String,
}

// ── Response DTOs ──

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_user: Option<Uuid>,
    pub business_user: Option<Uuid>,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: Money,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for OrderResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            customer_user: m.customer_user_id,
            business_user: m.business_user_id,
            title: m.title,
            revisions: m.revisions,
            delivery_time_in_days: m.delivery_time_in_days,
            price: Money::from_cents(m.price).unwrap_or_default(),
            features: m.features.0,
            offer_type: m.offer_type,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_moves_to_either_terminal_state() {
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn terminal_states_are_one_way() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in [
                OrderStatus::InProgress,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn parse_names_the_invalid_value() {
        assert_eq!("completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert!(err.contains("shipped"));
    }

    #[test]
    fn update_body_rejects_fields_other_than_status() {
        assert!(serde_json::from_str::<UpdateOrder>(r#"{"status":"completed"}"#).is_ok());
        assert!(serde_json::from_str::<UpdateOrder>(r#"{"title":"x"}"#).is_err());
        assert!(
            serde_json::from_str::<UpdateOrder>(r#"{"status":"completed","price":1}"#).is_err()
        );
    }

    #[test]
    fn create_body_rejects_preseeded_fields() {
        let id = Uuid::new_v4();
        let ok = format!(r#"{{"offer_detail_id":"{id}"}}"#);
        assert!(serde_json::from_str::<CreateOrder>(&ok).is_ok());
        let seeded = format!(r#"{{"offer_detail_id":"{id}","status":"completed"}}"#);
        assert!(serde_json::from_str::<CreateOrder>(&seeded).is_err());
    }
}
