use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::CurrentActor;
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::users::UserResponse;

/// GET /api/auth/me: the account behind the bearer token.
pub async fn me(
    actor: CurrentActor,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let user = user_db::get_user_by_id(db.get_ref(), actor.0.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", actor.0.id)))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
