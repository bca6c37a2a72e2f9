use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::config::Policy;
use crate::error::AppResult;
use crate::models::users::{Role, UpdateProfile};
use crate::services::profiles as profile_service;
use crate::storage::BlobStore;

/// GET /api/users/{id}: profile of any account (requires authentication).
pub async fn get_user(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let profile = profile_service::get_profile(db.get_ref(), &actor.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PATCH /api/users/{id}: owner or admin edits the profile.
pub async fn update_user(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProfile>,
) -> AppResult<HttpResponse> {
    let profile = profile_service::update_profile(
        db.get_ref(),
        &actor.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/users/{id}/file: raw PNG or JPEG profile picture.
pub async fn upload_user_file(
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

    let profile = profile_service::set_profile_file(
        db.get_ref(),
        store.get_ref(),
        &actor.0,
        path.into_inner(),
        content_type,
        &body,
        policy.max_image_bytes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/profiles/business
pub async fn get_business_profiles(
    _actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let profiles = profile_service::list_profiles(db.get_ref(), Role::Business).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

/// GET /api/profiles/customer
pub async fn get_customer_profiles(
    _actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let profiles = profile_service::list_profiles(db.get_ref(), Role::Customer).await?;
    Ok(HttpResponse::Ok().json(profiles))
}
