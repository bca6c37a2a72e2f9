use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;

use crate::auth::actor::Actor;
use crate::auth::jwt::{self, TokenVerifier};
use crate::db::users::find_or_create_from_auth;
use crate::error::AppError;
use crate::models::users::CreateUserFromAuth;

/// Extractor that resolves the bearer token into an [`Actor`].
///
/// Handlers that take this argument reject unauthenticated requests with 401.
pub struct CurrentActor(pub Actor);

impl FromRequest for CurrentActor {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req).await.map_err(|_| {
                AppError::Unauthenticated("Authorization header must be: Bearer <token>".into())
            })?;

            // 2. Verify it with the configured key source.
            let verifier = req
                .app_data::<web::Data<TokenVerifier>>()
                .ok_or_else(|| AppError::Internal("Token verifier not configured".into()))?;

            let claims = jwt::validate_token(bearer.token(), verifier.get_ref())
                .await
                .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {e}")))?;

            let user_id = claims.user_id().map_err(AppError::Unauthenticated)?;
            let role = claims
                .role()
                .ok_or_else(|| AppError::Unauthenticated("Unknown role in token claims".into()))?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| AppError::Internal("Database not configured".into()))?;

            // 3. Find or provision the account. A stored role always wins.
            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    username: claims.username(),
                    email: claims.user_email(),
                    role,
                },
            )
            .await?;

            Ok(CurrentActor(Actor::from(user)))
        })
    }
}
