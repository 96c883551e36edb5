//! HTTP handlers and route configuration.

mod fruits;
mod health;
mod users;

use actix_web::web;

use crate::middleware::error::json_config;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/v1")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/users", web::post().to(users::create))
            // Authenticated user
            .route("/me", web::get().to(users::me))
            .route("/user", web::get().to(users::me))
            // Fruits
            .service(
                web::resource("/fruits")
                    .route(web::get().to(fruits::list))
                    .route(web::post().to(fruits::create)),
            )
            .service(
                web::resource("/fruits/{fruit_id}")
                    .route(web::get().to(fruits::get))
                    .route(web::put().to(fruits::update))
                    .route(web::delete().to(fruits::delete)),
            ),
    );
}
