use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::error::AppResult;
use crate::models::orders::{CreateOrder, UpdateOrder};
use crate::services::orders as order_service;

/// GET /api/orders: orders where the caller is customer or business (all for admins).
pub async fn get_orders(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let orders = order_service::list_orders(db.get_ref(), &actor.0).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// POST /api/orders: a customer orders one tier; its terms are copied onto the order.
pub async fn create_order(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateOrder>,
) -> AppResult<HttpResponse> {
    let order = order_service::create_order(db.get_ref(), &actor.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

/// GET /api/orders/{id}
pub async fn get_order(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let order = order_service::get_order(db.get_ref(), &actor.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// PATCH /api/orders/{id}: only `status` is accepted.
pub async fn update_order(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrder>,
) -> AppResult<HttpResponse> {
    let order = order_service::update_order(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// DELETE /api/orders/{id}: admins only.
pub async fn delete_order(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    order_service::delete_order(db.get_ref(), &actor.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
