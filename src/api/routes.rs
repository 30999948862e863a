// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/games")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::list_games))
                        .route(web::post().to(handlers::create_game)),
                )
                // fixed segments before the {id} matcher
                .route("/populate", web::get().to(handlers::populate_games))
                .route("/search", web::post().to(handlers::search_games))
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(handlers::update_game))
                        .route(web::delete().to(handlers::delete_game)),
                ),
        );
}
