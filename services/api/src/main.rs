use anyhow::Result;
use aws_config::BehaviorVersion;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use api::{
    AppState,
    analytics::AnalyticsRecorder,
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{AccountRepository, AnalyticsRepository, ProfileRepository},
    routes,
    session::SessionConfig,
    storage::{MediaStorage, StorageConfig},
};
use common::database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Tapfolio API service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Configuration is resolved once here; nothing below reads the
    // environment after startup.
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let session_config = SessionConfig::from_env();
    let storage_config = StorageConfig::from_env();

    // Initialize S3 client for profile images
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let storage = MediaStorage::new(s3_client, storage_config);

    let account_repository = AccountRepository::new(pool.clone());
    let profile_repository = ProfileRepository::new(pool.clone());
    let analytics = AnalyticsRecorder::new(AnalyticsRepository::new(pool.clone()));
    let rate_limiter = RateLimiter::in_memory(RateLimiterConfig::default());

    info!("Tapfolio API service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        session_config,
        account_repository,
        profile_repository,
        analytics,
        storage,
        rate_limiter,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Tapfolio API listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
