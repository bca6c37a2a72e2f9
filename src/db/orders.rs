use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::offer_details;
use crate::models::orders::{self, OrderStatus};

/// Insert a new order whose terms are copied from `detail`.
pub async fn insert_order_from_detail<C: ConnectionTrait>(
    db: &C,
    detail: &offer_details::Model,
    customer_user_id: Uuid,
    business_user_id: Uuid,
) -> Result<orders::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_user_id: Set(Some(customer_user_id)),
        business_user_id: Set(Some(business_user_id)),
        title: Set(detail.title.clone()),
        revisions: Set(detail.revisions),
        delivery_time_in_days: Set(detail.delivery_time_in_days),
        price: Set(detail.price),
        features: Set(detail.features.clone()),
        offer_type: Set(detail.offer_type),
        status: Set(OrderStatus::InProgress),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_order.insert(db).await
}

/// Fetch every order, newest first.
pub async fn get_all_orders<C: ConnectionTrait>(db: &C) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .order_by_desc(orders::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch the orders where `user_id` is the customer or the business party.
pub async fn get_orders_for_party<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(
            Condition::any()
                .add(orders::Column::CustomerUserId.eq(user_id))
                .add(orders::Column::BusinessUserId.eq(user_id)),
        )
        .order_by_desc(orders::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single order by ID.
pub async fn get_order_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(id).one(db).await
}

/// Move an order from `from` to `to`. No other column is touched.
///
/// The current status is part of the filter, so of two racing transitions only
/// one matches. Returns the number of rows changed (0 or 1).
pub async fn transition_order_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<u64, DbErr> {
    let result = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(to))
        .col_expr(orders::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(orders::Column::Id.eq(id))
        .filter(orders::Column::Status.eq(from))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Delete an order by ID.
pub async fn delete_order<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<DeleteResult, DbErr> {
    orders::Entity::delete_by_id(id).exec(db).await
}
