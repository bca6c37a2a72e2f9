use sea_orm::*;
use uuid::Uuid;

use crate::models::reviews::{self, CreateReview, UpdateReview};

/// Insert a new review authored by `reviewer_id`.
pub async fn insert_review<C: ConnectionTrait>(
    db: &C,
    input: CreateReview,
    reviewer_id: Uuid,
) -> Result<reviews::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_user_id: Set(input.business_user),
        reviewer_id: Set(reviewer_id),
        rating: Set(input.rating),
        description: Set(input.description),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_review.insert(db).await
}

/// Whether `reviewer_id` already reviewed `business_user_id`.
pub async fn review_exists<C: ConnectionTrait>(
    db: &C,
    business_user_id: Uuid,
    reviewer_id: Uuid,
) -> Result<bool, DbErr> {
    let count = reviews::Entity::find()
        .filter(reviews::Column::BusinessUserId.eq(business_user_id))
        .filter(reviews::Column::ReviewerId.eq(reviewer_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Fetch every review, most recently updated first.
pub async fn get_all_reviews<C: ConnectionTrait>(db: &C) -> Result<Vec<reviews::Model>, DbErr> {
    reviews::Entity::find()
        .order_by_desc(reviews::Column::UpdatedAt)
        .all(db)
        .await
}

/// Fetch the reviews written by or about `user_id`.
pub async fn get_reviews_for_party<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<reviews::Model>, DbErr> {
    reviews::Entity::find()
        .filter(
            Condition::any()
                .add(reviews::Column::ReviewerId.eq(user_id))
                .add(reviews::Column::BusinessUserId.eq(user_id)),
        )
        .order_by_desc(reviews::Column::UpdatedAt)
        .all(db)
        .await
}

/// Fetch a single review by ID.
pub async fn get_review_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<reviews::Model>, DbErr> {
    reviews::Entity::find_by_id(id).one(db).await
}

/// Apply a rating/description change.
pub async fn update_review<C: ConnectionTrait>(
    db: &C,
    review: reviews::Model,
    input: UpdateReview,
) -> Result<reviews::Model, DbErr> {
    let mut active: reviews::ActiveModel = review.into();

    if let Some(rating) = input.rating {
        active.rating = Set(rating);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// Delete a review by ID.
pub async fn delete_review<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<DeleteResult, DbErr> {
    reviews::Entity::delete_by_id(id).exec(db).await
}
