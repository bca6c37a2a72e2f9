use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `Role` enum maps to a Postgres TEXT column stored as lowercase strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Business => "business",
            Role::Admin => "admin",
        }
    }

    /// Parse the role carried in identity-provider claims.
    pub fn from_claim(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "business" => Some(Role::Business),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// SeaORM entity for the `users` table.
///
/// `role` is written once when the account is provisioned and never updated.
/// The profile columns are empty strings until the owner fills them in;
/// `location`, `tel`, `description` and `working_hours` only apply to business accounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    /// Blob key of the profile picture.
    pub file: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offers::Entity")]
    Offers,
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB) ──

/// Used internally by the auth extractor to provision a user from token claims.
#[derive(Debug, Clone)]
pub struct CreateUserFromAuth {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

pub const NAME_MAX_LEN: usize = 150;
pub const LOCATION_MAX_LEN: usize = 30;
pub const TEL_MAX_LEN: usize = 25;
pub const DESCRIPTION_MAX_LEN: usize = 250;
pub const WORKING_HOURS_MAX_LEN: usize = 15;

/// Partial profile update. Omitted fields are left alone; an empty string clears one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
}

impl UpdateProfile {
    /// Names of the supplied fields that only business profiles carry.
    pub fn business_fields(&self) -> Vec<&'static str> {
        [
            ("location", self.location.is_some()),
            ("tel", self.tel.is_some()),
            ("description", self.description.is_some()),
            ("working_hours", self.working_hours.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Business-only part of a profile.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessInfo {
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
}

/// A safe user representation for API responses. `business` is present for business accounts only.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub business: Option<BusinessInfo>,
    pub created_at: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        let business = (m.role == Role::Business).then(|| BusinessInfo {
            location: m.location,
            tel: m.tel,
            description: m.description,
            working_hours: m.working_hours,
        });
        Self {
            id: m.id,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            file: m.file,
            role: m.role,
            business,
            created_at: m.created_at,
        }
    }
}
