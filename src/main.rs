use std::env;
use std::sync::Arc;

use commerce_service::mailer::LogMailer;
use commerce_service::payments::{MidtransClient, StripeClient};
use commerce_service::{build_server, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let stripe_secret = env::var("STRIPE_SECRET_KEY").unwrap_or_default();
    if stripe_secret.is_empty() {
        log::warn!("STRIPE_SECRET_KEY is not set; Stripe payments will fail");
    }
    let stripe = StripeClient::new(
        stripe_secret,
        env::var("STRIPE_PUBLISHABLE_KEY").unwrap_or_default(),
    );

    let midtrans_key = env::var("MIDTRANS_SERVER_KEY").unwrap_or_default();
    if midtrans_key.is_empty() {
        log::warn!("MIDTRANS_SERVER_KEY is not set; Midtrans payments will fail");
    }
    let midtrans = MidtransClient::new(
        midtrans_key,
        env::var("MIDTRANS_IS_PRODUCTION")
            .map(|v| v == "true")
            .unwrap_or(false),
    );

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, stripe, midtrans, Arc::new(LogMailer), &host, port)?.await
}
