//! TalentCircle Platform Server
//!
//! Serves the user, relationship, community and overview REST APIs.
//!
//! Configuration comes from a TOML file (see `tc-config`) with `TC_*`
//! environment overrides:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TALENTCIRCLE_CONFIG` | - | Explicit config file path |
//! | `TC_HTTP_PORT` | `8080` | HTTP API port |
//! | `TC_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URI |
//! | `TC_MONGODB_DATABASE` | `talentcircle` | MongoDB database name |
//! | `TC_STORE_BACKEND` | `mongo` | `mongo` or `memory` |
//! | `TC_JWT_SECRET` | - | HS256 signing secret (required outside dev mode) |
//! | `TC_SIGNUP_SECRET` | - | Shared secret for signup and password reset |
//! | `TC_DEV_MODE` | `false` | Allow an ephemeral signing secret |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_swagger_ui::SwaggerUi;

use tc_config::{AppConfig, ConfigLoader, StoreBackend};
use tc_platform::auth::{Argon2Config, AuthConfig, PasswordService, TokenService};
use tc_platform::{initialize_indexes, platform_router, AppState, AuthLayer, PlatformServices, Stores};

#[tokio::main]
async fn main() -> Result<()> {
    tc_common::logging::init_logging("tc-platform-server");

    info!("Starting TalentCircle Platform Server");

    let mut config = ConfigLoader::new().load()?;
    if config.auth.jwt_secret.is_empty() {
        // validate() only lets this through in dev mode
        warn!("No JWT secret configured, using an ephemeral one; tokens will not survive a restart");
        config.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
    }

    let stores = build_stores(&config).await?;

    let passwords = Arc::new(PasswordService::new(Argon2Config {
        memory_cost: config.auth.argon2.memory_kib,
        time_cost: config.auth.argon2.time_cost,
        parallelism: config.auth.argon2.parallelism,
        ..Argon2Config::default()
    })?);
    let tokens = Arc::new(TokenService::new(AuthConfig {
        secret_key: config.auth.jwt_secret.clone(),
        issuer: config.auth.jwt_issuer.clone(),
        token_expiry_secs: config.auth.token_expiry_secs,
    }));

    let app_state = AppState {
        token_service: tokens.clone(),
        signup_secret: config.auth.signup_secret.as_deref().map(Arc::from),
    };
    if app_state.signup_secret.is_none() {
        warn!("No signup secret configured, signup and password reset are open");
    }

    let services = PlatformServices::new(&stores, passwords, tokens);

    let (router, mut openapi) = platform_router(&services).split_for_parts();

    openapi.info.title = "TalentCircle Platform API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Accounts, relationships, communities and profile overviews".to_string());
    if let Some(components) = openapi.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("TalentCircle Platform Server shutdown complete");
    Ok(())
}

async fn build_stores(config: &AppConfig) -> Result<Stores> {
    match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store backend; data is lost on shutdown");
            Ok(Stores::in_memory())
        }
        StoreBackend::Mongo => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);

            initialize_indexes(&db).await?;

            Ok(Stores::mongo(&db, Duration::from_millis(config.store.timeout_ms)))
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
