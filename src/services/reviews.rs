use sea_orm::{DatabaseConnection, SqlErr};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{Action, review_rules};
use crate::config::ReviewVisibility;
use crate::db::reviews as review_db;
use crate::db::users as user_db;
use crate::error::{AppError, AppResult};
use crate::models::reviews::{
    self, CreateReview, DESCRIPTION_MAX_LEN, MAX_RATING, MIN_RATING, ReviewResponse, UpdateReview,
};
use crate::models::users::Role;
use crate::services::require_text;

const DUPLICATE_REVIEW: &str = "You have already reviewed this business user.";

/// Reviews readable by `actor` under the configured visibility, newest edits first.
pub async fn list_reviews(
    db: &DatabaseConnection,
    actor: &Actor,
    visibility: ReviewVisibility,
) -> AppResult<Vec<ReviewResponse>> {
    review_rules(visibility).authorize(actor, Action::List)?;

    let rows = match visibility {
        ReviewVisibility::Parties if !actor.is_admin() => {
            review_db::get_reviews_for_party(db, actor.id).await?
        }
        _ => review_db::get_all_reviews(db).await?,
    };
    Ok(rows.into_iter().map(ReviewResponse::from).collect())
}

pub async fn get_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: Uuid,
    visibility: ReviewVisibility,
) -> AppResult<ReviewResponse> {
    let rules = review_rules(visibility);
    rules.authorize(actor, Action::Retrieve)?;
    let review = load_review(db, review_id).await?;
    rules.authorize_object(actor, Action::Retrieve, &review)?;
    Ok(review.into())
}

/// Record `actor`'s review of a business. One review per (business, reviewer).
pub async fn create_review(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CreateReview,
    visibility: ReviewVisibility,
) -> AppResult<ReviewResponse> {
    review_rules(visibility).authorize(actor, Action::Create)?;

    validate_rating(input.rating)?;
    require_text("description", &input.description, DESCRIPTION_MAX_LEN)?;

    match user_db::get_user_by_id(db, input.business_user).await? {
        Some(user) if user.role == Role::Business => {}
        _ => {
            return Err(AppError::validation(
                "business_user",
                format!("{} is not a business account.", input.business_user),
            ));
        }
    }

    if review_db::review_exists(db, input.business_user, actor.id).await? {
        return Err(AppError::validation("business_user", DUPLICATE_REVIEW));
    }

    // The unique index still catches a concurrent duplicate that slipped past the check.
    let review = match review_db::insert_review(db, input, actor.id).await {
        Ok(review) => review,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::validation("business_user", DUPLICATE_REVIEW));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        review_id = %review.id,
        reviewer_id = %actor.id,
        business_user_id = %review.business_user_id,
        "Review created"
    );
    Ok(review.into())
}

/// Change the rating and/or description. Only the reviewer may do this.
pub async fn update_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: Uuid,
    input: UpdateReview,
    visibility: ReviewVisibility,
) -> AppResult<ReviewResponse> {
    let rules = review_rules(visibility);
    rules.authorize(actor, Action::Update)?;
    let review = load_review(db, review_id).await?;
    rules.authorize_object(actor, Action::Update, &review)?;

    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }
    if let Some(description) = &input.description {
        require_text("description", description, DESCRIPTION_MAX_LEN)?;
    }

    let updated = review_db::update_review(db, review, input).await?;
    info!(review_id = %updated.id, reviewer_id = %actor.id, "Review updated");
    Ok(updated.into())
}

/// Delete a review. The reviewer or an admin may do this.
pub async fn delete_review(
    db: &DatabaseConnection,
    actor: &Actor,
    review_id: Uuid,
    visibility: ReviewVisibility,
) -> AppResult<()> {
    let rules = review_rules(visibility);
    rules.authorize(actor, Action::Delete)?;
    let review = load_review(db, review_id).await?;
    rules.authorize_object(actor, Action::Delete, &review)?;

    review_db::delete_review(db, review.id).await?;
    info!(review_id = %review_id, user_id = %actor.id, "Review deleted");
    Ok(())
}

fn validate_rating(rating: i16) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation(
            "rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}."),
        ));
    }
    Ok(())
}

async fn load_review(db: &DatabaseConnection, review_id: Uuid) -> AppResult<reviews::Model> {
    review_db::get_review_by_id(db, review_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Review {review_id} not found")))
}
