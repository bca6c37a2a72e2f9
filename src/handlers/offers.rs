use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::config::Policy;
use crate::error::AppResult;
use crate::models::offers::{CreateOffer, UpdateOffer};
use crate::services::offers as offer_service;
use crate::storage::BlobStore;

/// GET /api/offers: catalog with the cheapest price and fastest delivery per offer.
pub async fn get_offers(db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let offers = offer_service::list_offers(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(offers))
}

/// GET /api/offers/{id}
pub async fn get_offer(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let offer = offer_service::get_offer(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(offer))
}

/// POST /api/offers: a business account publishes an offer with its three tiers.
pub async fn create_offer(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateOffer>,
) -> AppResult<HttpResponse> {
    let offer = offer_service::create_offer(db.get_ref(), &actor.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(offer))
}

/// PATCH /api/offers/{id}: partial update of the offer and any of its tiers.
pub async fn update_offer(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOffer>,
) -> AppResult<HttpResponse> {
    let offer = offer_service::update_offer(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        body.into_inner(),
        policy.detail_match_key,
    )
    .await?;
    Ok(HttpResponse::Ok().json(offer))
}

/// DELETE /api/offers/{id}
pub async fn delete_offer(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn BlobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    offer_service::delete_offer(db.get_ref(), store.get_ref(), &actor.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/offers/{id}/image: raw PNG or JPEG body.
pub async fn upload_offer_image(
    req: HttpRequest,
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn BlobStore>,
    policy: web::Data<Policy>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let offer = offer_service::set_offer_image(
        db.get_ref(),
        store.get_ref(),
        &actor.0,
        path.into_inner(),
        content_type,
        &body,
        policy.max_image_bytes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(offer))
}

/// GET /api/offerdetails/{id}
pub async fn get_offer_detail(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = offer_service::get_offer_detail(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}
