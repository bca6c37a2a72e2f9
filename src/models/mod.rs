pub mod money;
pub mod offer_details;
pub mod offers;
pub mod orders;
pub mod reviews;
pub mod users;
