pub mod actor;
pub mod authorization;
pub mod jwks;
pub mod jwt;
pub mod middleware;

pub use actor::Actor;
pub use middleware::CurrentActor;
