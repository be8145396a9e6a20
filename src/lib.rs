pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod mailer;
pub mod openapi;
pub mod payments;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::OrderWorkflow;
use domain::ports::Mailer;
use infrastructure::{DieselInventoryLedger, DieselOrderRepository};
use payments::{MidtransClient, StripeClient};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The workflow as wired in production: Diesel-backed repository and ledger.
pub type AppWorkflow = OrderWorkflow<DieselOrderRepository, DieselInventoryLedger>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// All collaborators (pool, payment clients, mailer) are constructed by the
/// caller and injected here; nothing is process-global. The caller is
/// responsible for `.await`-ing (or `tokio::spawn`-ing) the returned server.
pub fn build_server(
    pool: DbPool,
    stripe: StripeClient,
    midtrans: MidtransClient,
    mailer: Arc<dyn Mailer>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let workflow = web::Data::new(OrderWorkflow::new(
        DieselOrderRepository::new(pool.clone()),
        DieselInventoryLedger::new(pool.clone()),
    ));
    let stripe = web::Data::new(stripe);
    let midtrans = web::Data::new(midtrans);
    let mailer: web::Data<dyn Mailer> = web::Data::from(mailer);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(workflow.clone())
            .app_data(stripe.clone())
            .app_data(midtrans.clone())
            .app_data(mailer.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(handlers::users::register))
                    .route("/login", web::post().to(handlers::users::login))
                    .route(
                        "/forgot-password",
                        web::post().to(handlers::users::forgot_password),
                    )
                    .route(
                        "/reset-password/{token}",
                        web::post().to(handlers::users::reset_password),
                    )
                    .route("", web::get().to(handlers::users::list_users))
                    .route("/{id}", web::get().to(handlers::users::get_user))
                    .route("/{id}", web::put().to(handlers::users::update_user))
                    .route("/{id}", web::delete().to(handlers::users::delete_user)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(handlers::categories::list_categories))
                    .route("", web::post().to(handlers::categories::create_category))
                    .route("/{id}", web::get().to(handlers::categories::get_category))
                    .route("/{id}", web::put().to(handlers::categories::update_category))
                    .route(
                        "/{id}",
                        web::delete().to(handlers::categories::delete_category),
                    ),
            )
            .service(
                web::scope("/posters")
                    .route("", web::get().to(handlers::posters::list_posters))
                    .route("", web::post().to(handlers::posters::create_poster))
                    .route("/{id}", web::get().to(handlers::posters::get_poster))
                    .route("/{id}", web::put().to(handlers::posters::update_poster))
                    .route("/{id}", web::delete().to(handlers::posters::delete_poster)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                web::scope("/orders")
                    .route(
                        "/by-user/{user_id}",
                        web::get().to(handlers::orders::list_orders_by_user),
                    )
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::put().to(handlers::orders::update_order))
                    .route("/{id}", web::delete().to(handlers::orders::delete_order)),
            )
            .service(
                web::scope("/payments")
                    .route("/stripe", web::post().to(handlers::payments::stripe_payment))
                    .route(
                        "/midtrans",
                        web::post().to(handlers::payments::midtrans_payment),
                    )
                    .route(
                        "/midtrans/check-status",
                        web::post().to(handlers::payments::midtrans_status),
                    ),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
