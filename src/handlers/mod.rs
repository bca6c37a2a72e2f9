pub mod auth;
pub mod offers;
pub mod orders;
pub mod reviews;
pub mod users;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the CurrentActor extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Profile routes (all protected) ──
    cfg.service(
        web::scope("/users")
            .route("/{id}", web::get().to(users::get_user))
            .route("/{id}", web::patch().to(users::update_user))
            .route("/{id}/file", web::put().to(users::upload_user_file)),
    );
    cfg.service(
        web::scope("/profiles")
            .route("/business", web::get().to(users::get_business_profiles))
            .route("/customer", web::get().to(users::get_customer_profiles)),
    );

    // ── Offer routes (list and retrieve are public) ──
    cfg.service(
        web::scope("/offers")
            .route("", web::get().to(offers::get_offers))
            .route("", web::post().to(offers::create_offer))
            .route("/{id}", web::get().to(offers::get_offer))
            .route("/{id}", web::patch().to(offers::update_offer))
            .route("/{id}", web::delete().to(offers::delete_offer))
            .route("/{id}/image", web::put().to(offers::upload_offer_image)),
    );
    cfg.service(
        web::resource("/offerdetails/{id}").route(web::get().to(offers::get_offer_detail)),
    );

    // ── Order routes (all protected) ──
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(orders::get_orders))
            .route("", web::post().to(orders::create_order))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_order))
            .route("/{id}", web::delete().to(orders::delete_order)),
    );

    // ── Review routes (all protected) ──
    cfg.service(
        web::scope("/reviews")
            .route("", web::get().to(reviews::get_reviews))
            .route("", web::post().to(reviews::create_review))
            .route("/{id}", web::get().to(reviews::get_review))
            .route("/{id}", web::patch().to(reviews::update_review))
            .route("/{id}", web::delete().to(reviews::delete_review)),
    );
}
