use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{Action, PROFILE_RULES};
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::users::{
    self, DESCRIPTION_MAX_LEN, LOCATION_MAX_LEN, NAME_MAX_LEN, Role, TEL_MAX_LEN, UpdateProfile,
    UserResponse, WORKING_HOURS_MAX_LEN,
};
use crate::services::{check_image, limit_text};
use crate::storage::{BlobStore, profile_file_key};

/// Profiles of every account with `role`. Business and customer lists are separate endpoints.
pub async fn list_profiles(db: &DatabaseConnection, role: Role) -> AppResult<Vec<UserResponse>> {
    let rows = user_db::get_users_by_role(db, role).await?;
    Ok(rows.into_iter().map(UserResponse::from).collect())
}

pub async fn get_profile(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: Uuid,
) -> AppResult<UserResponse> {
    PROFILE_RULES.authorize(actor, Action::Retrieve)?;
    let user = load_user(db, user_id).await?;
    PROFILE_RULES.authorize_object(actor, Action::Retrieve, &user)?;
    Ok(user.into())
}

/// Partial profile update by the owner or an admin.
///
/// Customer profiles carry no business fields; supplying one is a 400 naming it.
pub async fn update_profile(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: Uuid,
    input: UpdateProfile,
) -> AppResult<UserResponse> {
    PROFILE_RULES.authorize(actor, Action::Update)?;
    let user = load_user(db, user_id).await?;
    PROFILE_RULES.authorize_object(actor, Action::Update, &user)?;

    if user.role != Role::Business {
        if let Some(field) = input.business_fields().first() {
            return Err(AppError::validation(
                *field,
                "Only business profiles have this field.",
            ));
        }
    }
    validate_profile(&input)?;

    let updated = user_db::update_profile(db, user, input).await?;
    info!(user_id = %updated.id, actor_id = %actor.id, "Profile updated");
    Ok(updated.into())
}

/// Store a new profile picture, replacing the previous one.
pub async fn set_profile_file(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    actor: &Actor,
    user_id: Uuid,
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> AppResult<UserResponse> {
    PROFILE_RULES.authorize(actor, Action::Update)?;
    let user = load_user(db, user_id).await?;
    PROFILE_RULES.authorize_object(actor, Action::Update, &user)?;

    let format = check_image("file", content_type, bytes, max_bytes)?;
    let key = profile_file_key(user.id, &user.username, format);
    store
        .put(&key, bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let previous = user.file.clone();
    let user = match user_db::set_profile_file(db, user, Some(key.clone())).await {
        Ok(user) => user,
        Err(e) => {
            if previous.as_deref() != Some(key.as_str()) {
                if let Err(cleanup) = store.delete(&key).await {
                    warn!(user_id = %user_id, key = %key, "Failed to delete orphaned profile file: {cleanup}");
                }
            }
            return Err(e.into());
        }
    };
    if let Some(old) = previous.filter(|old| *old != key) {
        if let Err(e) = store.delete(&old).await {
            warn!(user_id = %user.id, key = %old, "Failed to delete replaced profile file: {e}");
        }
    }

    info!(user_id = %user.id, key = %key, "Profile file stored");
    Ok(user.into())
}

fn validate_profile(input: &UpdateProfile) -> AppResult<()> {
    let limits = [
        ("first_name", &input.first_name, NAME_MAX_LEN),
        ("last_name", &input.last_name, NAME_MAX_LEN),
        ("location", &input.location, LOCATION_MAX_LEN),
        ("tel", &input.tel, TEL_MAX_LEN),
        ("description", &input.description, DESCRIPTION_MAX_LEN),
        ("working_hours", &input.working_hours, WORKING_HOURS_MAX_LEN),
    ];
    for (field, value, max) in limits {
        if let Some(value) = value {
            limit_text(field, value, max)?;
        }
    }
    if let Some(email) = input.email.as_deref().filter(|e| !e.is_empty()) {
        if !email.contains('@') {
            return Err(AppError::validation("email", "Enter a valid email address."));
        }
    }
    Ok(())
}

async fn load_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<users::Model> {
    user_db::get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
}
