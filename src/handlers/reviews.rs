use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::config::Policy;
use crate::error::AppResult;
use crate::models::reviews::{CreateReview, UpdateReview};
use crate::services::reviews as review_service;

/// GET /api/reviews
pub async fn get_reviews(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
) -> AppResult<HttpResponse> {
    let reviews =
        review_service::list_reviews(db.get_ref(), &actor.0, policy.review_visibility).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /api/reviews: a customer reviews a business account, at most once.
pub async fn create_review(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
    body: web::Json<CreateReview>,
) -> AppResult<HttpResponse> {
    let review = review_service::create_review(
        db.get_ref(),
        &actor.0,
        body.into_inner(),
        policy.review_visibility,
    )
    .await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /api/reviews/{id}
pub async fn get_review(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let review = review_service::get_review(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        policy.review_visibility,
    )
    .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// PATCH /api/reviews/{id}: rating and description, reviewer only.
pub async fn update_review(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReview>,
) -> AppResult<HttpResponse> {
    let review = review_service::update_review(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        body.into_inner(),
        policy.review_visibility,
    )
    .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<Policy>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    review_service::delete_review(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        policy.review_visibility,
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}
