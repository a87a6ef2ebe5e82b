use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod cache;
mod config;
mod error;
mod features;
mod live;
mod middleware;
mod state;

use cache::LeaderboardCache;
use config::Config;
use live::UpdateChannel;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::classes::handlers::create_class,
        features::classes::handlers::get_class,
        features::classes::handlers::delete_class,
        features::classes::handlers::create_student,
        features::classes::handlers::get_student,
        features::classes::handlers::enroll_student,
        features::classes::handlers::unenroll_student,
        features::classes::handlers::class_roster,
        features::points::handlers::adjust_points,
        features::points::handlers::bulk_adjust_points,
        features::points::handlers::points_history,
        features::leaderboard::handlers::get_leaderboard,
        features::leaderboard::handlers::get_public_leaderboard,
        features::leaderboard::handlers::live_leaderboard,
        features::leaderboard::handlers::student_progress,
    ),
    components(
        schemas(
            storage::models::Class,
            storage::models::Student,
            storage::models::LedgerEntry,
            storage::models::ClassPointsTotal,
            storage::dto::class::CreateClassRequest,
            storage::dto::class::CreateStudentRequest,
            storage::dto::class::EnrollStudentRequest,
            storage::dto::points::AdjustPointsRequest,
            storage::dto::points::BulkAdjustPointsRequest,
            storage::dto::points::AdjustPointsResponse,
            storage::dto::leaderboard::Badge,
            storage::dto::leaderboard::StudentInfo,
            storage::dto::leaderboard::LeaderboardEntry,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::leaderboard::PublicClassInfo,
            storage::dto::leaderboard::PublicLeaderboardResponse,
            storage::dto::progress::TrendDirection,
            storage::dto::progress::ClassProgress,
            storage::dto::progress::StudentProgressResponse,
            storage::dto::common::PaginationMeta,
        )
    ),
    tags(
        (name = "classes", description = "Class and roster management"),
        (name = "students", description = "Student directory and progress"),
        (name = "points", description = "Point adjustments and audit history"),
        (name = "leaderboards", description = "Ranked, badge-decorated leaderboards"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Classpoints API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    let cache = LeaderboardCache::new(Duration::from_secs(config.cache_ttl_secs));
    let state = AppState::new(db, cache);

    let class_scoped = features::classes::routes::class_routes(api_keys.clone())
        .merge(features::points::routes::routes(api_keys.clone()))
        .merge(features::leaderboard::routes::class_routes(api_keys.clone()));

    let student_scoped = features::classes::routes::student_routes(api_keys.clone())
        .merge(features::leaderboard::routes::student_routes(api_keys));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api/classes", class_scoped)
        .nest("/api/students", student_scoped)
        .nest(
            "/api/leaderboards",
            features::leaderboard::routes::public_routes(),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state.clone());

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.updates.clone()))
        .await?;

    Ok(())
}

async fn shutdown_signal(updates: Arc<UpdateChannel>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down, closing live update channels");
    updates.close_all().await;
}
