use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bottega::config::Config;
use bottega::modules::clients::{controllers::client_controller, ClientRepository};
use bottega::modules::delivery::{Mailer, SmtpMailer};
use bottega::modules::invoices::{
    controllers::invoice_controller, InvoiceRepository, InvoiceService,
};
use bottega::modules::quotes::{controllers::quote_controller, QuoteRepository, QuoteService};
use bottega::modules::settings::{controllers::settings_controller, SettingsRepository};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bottega=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting Bottega Billing Service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool and apply pending migrations
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Shared collaborators
    let mailer: Arc<dyn Mailer> =
        Arc::new(SmtpMailer::new(&config.smtp).expect("Failed to create SMTP transport"));
    let http = reqwest::Client::new();

    let client_repo = ClientRepository::new(db_pool.clone());
    let settings_repo = SettingsRepository::new(db_pool.clone());
    let quote_repo = QuoteRepository::new(db_pool.clone());
    let invoice_repo = InvoiceRepository::new(db_pool.clone());

    let quote_service = QuoteService::new(
        quote_repo.clone(),
        invoice_repo.clone(),
        client_repo.clone(),
        settings_repo.clone(),
        mailer.clone(),
        http.clone(),
    );
    let invoice_service = InvoiceService::new(
        invoice_repo,
        client_repo.clone(),
        settings_repo.clone(),
        mailer,
        http,
    );

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(client_repo.clone()))
            .app_data(web::Data::new(settings_repo.clone()))
            .app_data(web::Data::new(quote_service.clone()))
            .app_data(web::Data::new(invoice_service.clone()))
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
            .configure(client_controller::configure)
            .configure(settings_controller::configure)
            .configure(quote_controller::configure)
            .configure(invoice_controller::configure)
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bottega"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "Bottega Billing Service",
        "version": "0.1.0",
        "status": "running"
    }))
}
