use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CreateUserFromAuth, Role, UpdateProfile};

/// Find the account for a verified token, provisioning it on first sight.
///
/// An existing row is returned untouched, so the stored role never changes.
pub async fn find_or_create_from_auth<C: ConnectionTrait>(
    db: &C,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    // Usernames are unique; a clash gets the id prefix appended.
    let taken = users::Entity::find()
        .filter(users::Column::Username.eq(input.username.as_str()))
        .count(db)
        .await?
        > 0;
    let username = if taken {
        format!("{}_{}", input.username, &input.id.simple().to_string()[..8])
    } else {
        input.username
    };

    insert_user_from_auth(db, CreateUserFromAuth { username, ..input }).await
}

/// Insert a freshly seen account.
///
/// A concurrent first request may have inserted the same id in the meantime; that
/// row is returned instead of the unique violation.
pub async fn insert_user_from_auth<C: ConnectionTrait>(
    db: &C,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    let id = input.id;
    let new_user = users::ActiveModel {
        id: Set(input.id),
        username: Set(input.username),
        email: Set(input.email),
        role: Set(input.role),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        location: Set(String::new()),
        tel: Set(String::new()),
        description: Set(String::new()),
        working_hours: Set(String::new()),
        file: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    match new_user.insert(db).await {
        Ok(user) => Ok(user),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            users::Entity::find_by_id(id).one(db).await?.ok_or(err)
        }
        Err(err) => Err(err),
    }
}

/// Fetch a single user by ID.
pub async fn get_user_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// All accounts of one role, oldest first.
pub async fn get_users_by_role<C: ConnectionTrait>(
    db: &C,
    role: Role,
) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Role.eq(role))
        .order_by_asc(users::Column::CreatedAt)
        .all(db)
        .await
}

/// Apply the supplied profile fields.
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user: users::Model,
    input: UpdateProfile,
) -> Result<users::Model, DbErr> {
    let mut active: users::ActiveModel = user.into();

    if let Some(first_name) = input.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = input.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(email) = input.email {
        active.email = Set((!email.is_empty()).then_some(email));
    }
    if let Some(location) = input.location {
        active.location = Set(location);
    }
    if let Some(tel) = input.tel {
        active.tel = Set(tel);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(working_hours) = input.working_hours {
        active.working_hours = Set(working_hours);
    }

    active.update(db).await
}

/// Point the profile at a new picture key.
pub async fn set_profile_file<C: ConnectionTrait>(
    db: &C,
    user: users::Model,
    file: Option<String>,
) -> Result<users::Model, DbErr> {
    let mut active: users::ActiveModel = user.into();
    active.file = Set(file);
    active.update(db).await
}
