//! Route table of the HTTP interface.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest};

use crate::error::ApiError;
use crate::handlers::{auth, health, items, sales, users};

/// Registers every route under `/api`, plus body and query extractor
/// configuration so malformed input answers `INVALID_INPUT`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .service(
                    web::scope("/auth")
                        .route("/bootstrap", web::post().to(auth::bootstrap))
                        .route("/login", web::post().to(auth::login)),
                )
                .service(
                    web::scope("/users")
                        .route("/me", web::get().to(users::me))
                        .route("", web::get().to(users::list_users))
                        .route("", web::post().to(users::create_user))
                        .route("/{id}", web::put().to(users::update_user))
                        .route("/{id}", web::delete().to(users::delete_user)),
                )
                .service(
                    web::scope("/items")
                        .route("", web::get().to(items::list_items))
                        .route("", web::post().to(items::create_item))
                        .route("/{id}", web::get().to(items::get_item))
                        .route("/{id}", web::put().to(items::update_item))
                        .route("/{id}", web::delete().to(items::delete_item)),
                )
                .service(
                    web::scope("/sales")
                        .route("", web::get().to(sales::list_sales))
                        .route("", web::post().to(sales::create_sale))
                        .route("/{id}", web::get().to(sales::get_sale)),
                ),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid_input(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid_input(format!("Invalid query string: {}", err)).into()
}
