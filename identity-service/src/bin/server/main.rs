use std::sync::Arc;

use auth::PasswordHasher;
use auth::TokenIssuer;
use identity_service::account::credentials::AccountDomain;
use identity_service::account::service::AuthService;
use identity_service::config::Config;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        jwt_audience = %config.jwt.audience,
        token_lifetime_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    // A missing signing secret halts startup.
    let tokens = TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
    )?
    .with_lifetime(config.jwt.token_lifetime()?);

    let hasher = PasswordHasher::with_params(config.hashing.params())?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let credential_store = Arc::new(PostgresCredentialStore::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(
        credential_store,
        AccountDomain::new(Arc::new(hasher)),
        Arc::new(tokens),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_service)).await?;

    tracing::info!("Server exited");
    Ok(())
}
