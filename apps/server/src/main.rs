//! Attendance server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use attendance_server::api::{self, ApiDoc, UploadLimits};
use attendance_server::auth::AdminKey;
use attendance_server::config::{Config, StorageBackend};
use attendance_server::db::DbPool;
use attendance_server::middleware::RequestLogger;
use attendance_server::services::{
    BlobStore, HttpRecognitionService, MemoryBlobStore, RecognitionService, S3BlobStore,
};

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", context, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and ATTEND_JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Attendance Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = DbPool::new(&config.database)
        .await
        .unwrap_or_else(|e| fail("Failed to initialize database", e));
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        fail("Failed to run migrations", e);
    }
    info!("Database migrations complete");

    let blob_store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::S3 => Arc::new(
            S3BlobStore::new(&config.storage)
                .await
                .unwrap_or_else(|e| fail("Failed to initialize S3 storage", e)),
        ),
        StorageBackend::Memory => {
            warn!("Using in-memory blob storage; photos are lost on restart");
            Arc::new(MemoryBlobStore::new(config.storage.public_base_url()))
        }
    };

    let recognition: Arc<dyn RecognitionService> = Arc::new(
        HttpRecognitionService::new(&config.recognition)
            .unwrap_or_else(|e| fail("Failed to build recognition client", e)),
    );
    info!("Recognition service at {}", config.recognition.base_url);

    let bind_address = config.bind_address();
    let admin_key = AdminKey::new(config.auth.admin_key.clone());
    let auth_settings = config.auth.clone();
    let upload_limits = UploadLimits {
        max_upload_size: config.max_upload_size,
    };
    let is_development = config.is_development();

    // Built once so every worker shares the same per-IP buckets
    let login_governor = GovernorConfigBuilder::default()
        .seconds_per_request(config.login_limit.replenish_secs)
        .burst_size(config.login_limit.burst)
        .finish()
        .unwrap_or_else(|| fail("Invalid login rate limit", "burst and period must be non-zero"));
    info!(
        "Login throttle: burst {} per IP, one more every {}s",
        config.login_limit.burst, config.login_limit.replenish_secs
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let server = HttpServer::new(move || {
        let allowed_headers = vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-admin-key"),
        ];
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .max_age(3600)
        } else {
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .max_age(3600)
        };

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(auth_settings.clone()))
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(web::Data::from(blob_store.clone()))
            .app_data(web::Data::from(recognition.clone()))
            .app_data(web::Data::new(upload_limits))
            // Multipart streams are capped in the handler; leave headroom here
            .app_data(web::PayloadConfig::new(upload_limits.max_upload_size * 2))
            .service(
                web::scope("/api/v1")
                    .service(api::auth::login_resource().wrap(Governor::new(&login_governor)))
                    .configure(api::configure_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
