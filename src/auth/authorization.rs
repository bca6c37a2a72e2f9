//! Access rules for profiles, offers, orders and reviews.
//!
//! Every entity has two ordered predicate lists. `before_load` runs on role alone,
//! before the target is fetched; `after_load` runs against the loaded row. The
//! first predicate that does not allow the action decides the outcome.

use crate::auth::actor::Actor;
use crate::config::ReviewVisibility;
use crate::error::{AppError, AppResult};
use crate::models::{offers, orders, reviews, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Refuse with 403; the target's existence is not secret.
    Forbid(&'static str),
    /// Refuse as if the target did not exist.
    Hide,
}

pub type RoleCheck = fn(&Actor, Action) -> Decision;
pub type ObjectCheck<T> = fn(&Actor, Action, &T) -> Decision;

pub struct AccessRules<T: 'static> {
    pub entity: &'static str,
    pub before_load: &'static [RoleCheck],
    pub after_load: &'static [ObjectCheck<T>],
}

impl<T> AccessRules<T> {
    pub fn check_role(&self, actor: &Actor, action: Action) -> Decision {
        self.before_load
            .iter()
            .map(|check| check(actor, action))
            .find(|d| *d != Decision::Allow)
            .unwrap_or(Decision::Allow)
    }

    pub fn check_object(&self, actor: &Actor, action: Action, target: &T) -> Decision {
        self.after_load
            .iter()
            .map(|check| check(actor, action, target))
            .find(|d| *d != Decision::Allow)
            .unwrap_or(Decision::Allow)
    }

    /// Pre-object gate, evaluated before anything is loaded.
    pub fn authorize(&self, actor: &Actor, action: Action) -> AppResult<()> {
        self.into_result(self.check_role(actor, action))
    }

    /// Post-object gate, evaluated against the loaded target.
    pub fn authorize_object(&self, actor: &Actor, action: Action, target: &T) -> AppResult<()> {
        self.into_result(self.check_object(actor, action, target))
    }

    fn into_result(&self, decision: Decision) -> AppResult<()> {
        match decision {
            Decision::Allow => Ok(()),
            Decision::Forbid(reason) => Err(AppError::forbidden(reason)),
            Decision::Hide => Err(AppError::not_found(format!("{} not found", self.entity))),
        }
    }
}

// ── Profiles ──

fn profile_owner_or_admin(actor: &Actor, action: Action, user: &users::Model) -> Decision {
    if action == Action::Update && user.id != actor.id && !actor.is_admin() {
        return Decision::Forbid("Only the profile owner can modify this profile");
    }
    Decision::Allow
}

pub static PROFILE_RULES: AccessRules<users::Model> = AccessRules {
    entity: "Profile",
    before_load: &[],
    after_load: &[profile_owner_or_admin],
};

// ── Offers ──

fn offer_create_requires_business(actor: &Actor, action: Action) -> Decision {
    if action == Action::Create && !(actor.is_business() || actor.is_admin()) {
        return Decision::Forbid("Only business accounts can create offers");
    }
    Decision::Allow
}

fn offer_owner_or_admin(actor: &Actor, action: Action, offer: &offers::Model) -> Decision {
    let mutating = matches!(action, Action::Update | Action::Delete);
    if mutating && offer.user_id != actor.id && !actor.is_admin() {
        return Decision::Forbid("Only the offer owner can modify this offer");
    }
    Decision::Allow
}

pub static OFFER_RULES: AccessRules<offers::Model> = AccessRules {
    entity: "Offer",
    before_load: &[offer_create_requires_business],
    after_load: &[offer_owner_or_admin],
};

// ── Orders ──

fn order_create_requires_customer(actor: &Actor, action: Action) -> Decision {
    if action == Action::Create && !actor.is_customer() {
        return Decision::Forbid("Only customers can place orders");
    }
    Decision::Allow
}

fn order_delete_requires_admin(actor: &Actor, action: Action) -> Decision {
    if action == Action::Delete && !actor.is_admin() {
        return Decision::Forbid("Only admins can delete orders");
    }
    Decision::Allow
}

fn order_parties_only(actor: &Actor, action: Action, order: &orders::Model) -> Decision {
    if action != Action::Create && !actor.is_admin() && !order.is_party(actor.id) {
        return Decision::Hide;
    }
    Decision::Allow
}

fn order_status_by_business(actor: &Actor, action: Action, order: &orders::Model) -> Decision {
    if action == Action::Update && !actor.is_admin() && order.business_user_id != Some(actor.id) {
        return Decision::Forbid("Only the business party can change the order status");
    }
    Decision::Allow
}

pub static ORDER_RULES: AccessRules<orders::Model> = AccessRules {
    entity: "Order",
    before_load: &[order_create_requires_customer, order_delete_requires_admin],
    after_load: &[order_parties_only, order_status_by_business],
};

// ── Reviews ──

fn review_create_requires_customer(actor: &Actor, action: Action) -> Decision {
    if action == Action::Create && !actor.is_customer() {
        return Decision::Forbid("Only customers can write reviews");
    }
    Decision::Allow
}

fn review_parties_only(actor: &Actor, action: Action, review: &reviews::Model) -> Decision {
    let party = review.reviewer_id == actor.id || review.business_user_id == actor.id;
    if action != Action::Create && !actor.is_admin() && !party {
        return Decision::Hide;
    }
    Decision::Allow
}

fn review_update_by_reviewer(actor: &Actor, action: Action, review: &reviews::Model) -> Decision {
    if action == Action::Update && review.reviewer_id != actor.id {
        return Decision::Forbid("Only the reviewer can edit this review");
    }
    Decision::Allow
}

fn review_delete_by_reviewer_or_admin(
    actor: &Actor,
    action: Action,
    review: &reviews::Model,
) -> Decision {
    if action == Action::Delete && review.reviewer_id != actor.id && !actor.is_admin() {
        return Decision::Forbid("Only the reviewer or an admin can delete this review");
    }
    Decision::Allow
}

pub static REVIEW_RULES: AccessRules<reviews::Model> = AccessRules {
    entity: "Review",
    before_load: &[review_create_requires_customer],
    after_load: &[review_update_by_reviewer, review_delete_by_reviewer_or_admin],
};

pub static REVIEW_RULES_PARTIES_ONLY: AccessRules<reviews::Model> = AccessRules {
    entity: "Review",
    before_load: &[review_create_requires_customer],
    after_load: &[
        review_parties_only,
        review_update_by_reviewer,
        review_delete_by_reviewer_or_admin,
    ],
};

pub fn review_rules(visibility: ReviewVisibility) -> &'static AccessRules<reviews::Model> {
    match visibility {
        ReviewVisibility::Authenticated => &REVIEW_RULES,
        ReviewVisibility::Parties => &REVIEW_RULES_PARTIES_ONLY,
    }
}
