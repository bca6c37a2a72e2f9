use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{Action, ORDER_RULES};
use crate::db::offers as offer_db;
use crate::db::orders as order_db;
use crate::error::{AppError, AppResult};
use crate::models::orders::{self, CreateOrder, OrderResponse, OrderStatus, UpdateOrder};

/// Orders visible to `actor`: all of them for admins, otherwise those where the
/// actor is the customer or the business party.
pub async fn list_orders(db: &DatabaseConnection, actor: &Actor) -> AppResult<Vec<OrderResponse>> {
    ORDER_RULES.authorize(actor, Action::List)?;

    let orders = if actor.is_admin() {
        order_db::get_all_orders(db).await?
    } else {
        order_db::get_orders_for_party(db, actor.id).await?
    };
    Ok(orders.into_iter().map(OrderResponse::from).collect())
}

pub async fn get_order(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: Uuid,
) -> AppResult<OrderResponse> {
    ORDER_RULES.authorize(actor, Action::Retrieve)?;
    let order = load_order(db, order_id).await?;
    ORDER_RULES.authorize_object(actor, Action::Retrieve, &order)?;
    Ok(order.into())
}

/// Place an order against one pricing tier.
///
/// The business party is the owner of the tier's offer, and the tier's terms are
/// copied into the order. The tier is read under a shared lock in the same
/// transaction as the insert, so a concurrently deleted offer yields NotFound.
pub async fn create_order(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreateOrder,
) -> AppResult<OrderResponse> {
    ORDER_RULES.authorize(actor, Action::Create)?;

    let txn = db.begin().await?;
    let (detail, offer) = offer_db::get_offer_detail_with_offer_for_share(&txn, input.offer_detail_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("OfferDetail {} not found", input.offer_detail_id))
        })?;

    let order = order_db::insert_order_from_detail(&txn, &detail, actor.id, offer.user_id).await?;
    txn.commit().await?;

    info!(
        order_id = %order.id,
        customer_id = %actor.id,
        business_id = %offer.user_id,
        offer_detail_id = %detail.id,
        "Order placed"
    );
    Ok(order.into())
}

/// Change the status of an order. `status` is the only field that may change and
/// only `in_progress → completed | cancelled` is allowed.
pub async fn update_order(
    db: &DatabaseConnection,
    actor: &Actor,
    order_id: Uuid,
    input: UpdateOrder,
) -> AppResult<OrderResponse> {
    ORDER_RULES.authorize(actor, Action::Update)?;
    let order = load_order(db, order_id).await?;
    ORDER_RULES.authorize_object(actor, Action::Update, &order)?;

    let next: OrderStatus = input
        .status
        .parse()
        .map_err(|msg: String| AppError::validation("status", msg))?;
    check_transition(order.status, next)?;

    let changed = order_db::transition_order_status(db, order.id, order.status, next).await?;
    let updated = load_order(db, order_id).await?;
    if changed == 0 {
        // Another request moved the order first.
        check_transition(updated.status, next)?;
    }

    info!(
        order_id = %updated.id,
        user_id = %actor.id,
        from = order.status.as_str(),
        to = next.as_str(),
        "Order status changed"
    );
    Ok(updated.into())
}

/// Delete an order. Admins only.
pub async fn delete_order(db: &DatabaseConnection, actor: &Actor, order_id: Uuid) -> AppResult<()> {
    ORDER_RULES.authorize(actor, Action::Delete)?;
    let order = load_order(db, order_id).await?;
    ORDER_RULES.authorize_object(actor, Action::Delete, &order)?;

    let result = order_db::delete_order(db, order.id).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!("Order {order_id} not found")));
    }

    info!(order_id = %order_id, user_id = %actor.id, "Order deleted");
    Ok(())
}

fn check_transition(current: OrderStatus, next: OrderStatus) -> AppResult<()> {
    if current.is_terminal() {
        return Err(AppError::validation(
            "status",
            format!("Order is already {} and can no longer change.", current.as_str()),
        ));
    }
    if !current.can_transition_to(next) {
        return Err(AppError::validation(
            "status",
            format!(
                "Cannot change status from {} to {}.",
                current.as_str(),
                next.as_str()
            ),
        ));
    }
    Ok(())
}

async fn load_order(db: &DatabaseConnection, order_id: Uuid) -> AppResult<orders::Model> {
    order_db::get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))
}
