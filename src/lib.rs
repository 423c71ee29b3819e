pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

#[cfg(test)]
mod test_support;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};
pub use state::AppState;

use handlers::{admin_orders, auth, cart, catalog, coupons, notifications, orders, payment, ApiDoc};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

/// Registers the JSON error handler, every `/api` route and the Swagger UI.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(errors::json_error_handler))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login)),
                )
                .service(
                    web::scope("/orders")
                        .route("", web::post().to(orders::create_order))
                        .route("", web::get().to(orders::list_my_orders))
                        .route("/{order_number}", web::get().to(orders::get_my_order)),
                )
                .service(
                    web::resource("/payment")
                        .route(web::get().to(payment::gateway_status))
                        .route(web::post().to(payment::process_payment))
                        .route(web::put().to(payment::verify_payment)),
                )
                .route("/products", web::get().to(catalog::list_products))
                .route("/products/{slug}", web::get().to(catalog::get_product))
                .route("/categories", web::get().to(catalog::list_categories))
                .route("/artisans", web::get().to(catalog::list_artisans))
                .route("/banners", web::get().to(catalog::list_banners))
                .service(
                    web::scope("/cart")
                        .route("", web::get().to(cart::get_cart))
                        .route("", web::post().to(cart::add_to_cart))
                        .route("", web::put().to(cart::update_cart))
                        .route("", web::delete().to(cart::remove_from_cart))
                        .route("/add", web::post().to(cart::add_to_cart))
                        .route("/count", web::get().to(cart::cart_count))
                        .route("/clear", web::delete().to(cart::clear_cart)),
                )
                .service(
                    web::scope("/wishlist")
                        .route("", web::get().to(cart::get_wishlist))
                        .route("", web::post().to(cart::add_to_wishlist))
                        .route("", web::delete().to(cart::remove_from_wishlist))
                        .route("/count", web::get().to(cart::wishlist_count))
                        .route("/clear", web::delete().to(cart::clear_wishlist)),
                )
                .route("/coupons", web::get().to(coupons::list_coupons))
                .route("/coupons/apply", web::post().to(coupons::apply_coupon))
                .service(
                    web::scope("/notifications")
                        .route("", web::get().to(notifications::list_notifications))
                        .route("", web::post().to(notifications::create_notification))
                        .route("", web::put().to(notifications::mark_notifications))
                        .route("", web::delete().to(notifications::delete_notifications))
                        .route("/mark-all-read", web::post().to(notifications::mark_all_read)),
                )
                .service(
                    web::scope("/admin")
                        .route("/orders", web::get().to(admin_orders::list_orders))
                        .route("/orders/{id}", web::get().to(admin_orders::get_order))
                        .route("/orders/{id}", web::put().to(admin_orders::update_order))
                        .route("/products", web::post().to(catalog::create_product))
                        .route("/products/{id}", web::put().to(catalog::update_product))
                        .route("/products/{id}", web::delete().to(catalog::delete_product))
                        .route("/categories", web::post().to(catalog::create_category))
                        .route("/categories/{id}", web::put().to(catalog::update_category))
                        .route("/categories/{id}", web::delete().to(catalog::delete_category))
                        .route("/artisans", web::post().to(catalog::create_artisan))
                        .route("/artisans/{id}", web::put().to(catalog::update_artisan))
                        .route("/artisans/{id}", web::delete().to(catalog::delete_artisan))
                        .route("/banners", web::post().to(catalog::create_banner))
                        .route("/banners/{id}", web::put().to(catalog::update_banner))
                        .route("/banners/{id}", web::delete().to(catalog::delete_banner))
                        .route("/coupons", web::post().to(coupons::create_coupon)),
                ),
        )
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind((host.to_string(), port))?
    .run())
}
