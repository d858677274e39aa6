//! Wild Trails HTTP server.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wildtrails_auth::constants::identity_provider::JWKS_CACHE_TTL_SECS;
use wildtrails_auth::providers::{Argon2PasswordHasher, RemoteJwks};
use wildtrails_auth::{IdentityProviderConfig, IdentityProviderVerifier, SessionTokenConfig};
use wildtrails_bookings::providers::{ConsoleNotifier, SmtpNotifier};
use wildtrails_bookings::{Notifier, SystemClock};
use wildtrails_web::config::Config;
use wildtrails_web::{AppState, Backends, bootstrap, build_router, cors_layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wildtrails=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wild Trails server");

    let config = Config::from_env().context("loading configuration")?;
    info!(?config, "Configuration loaded");

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(settings) => Arc::new(SmtpNotifier::new(settings).context("configuring SMTP")?),
        None => {
            warn!("SMTP_HOST not set, confirmations will be logged instead of sent");
            Arc::new(ConsoleNotifier::new())
        }
    };

    let backends = storage(&config, notifier).await?;

    bootstrap::ensure_admin(
        backends.identities.as_ref(),
        backends.hasher.as_ref(),
        &config.admin.email,
        &config.admin.password,
    )
    .await
    .context("seeding admin account")?;

    let session = SessionTokenConfig::new(config.auth.session_secret.clone())
        .with_issuer(config.auth.session_issuer.clone())
        .with_ttl(chrono::Duration::seconds(config.auth.session_ttl_secs));

    let provider = config.auth.firebase_project_id.as_ref().map(|project| {
        info!(%project, "Identity provider sign-in enabled");
        IdentityProviderVerifier::new(
            IdentityProviderConfig::new(project.clone())
                .with_provisioning(config.auth.firebase_provisioning),
            Arc::new(RemoteJwks::new(
                config.auth.firebase_jwks_url.clone(),
                Duration::from_secs(JWKS_CACHE_TTL_SECS),
            )),
            Arc::clone(&backends.identities),
        )
    });

    let app = build_router(
        AppState::new(backends, session, provider),
        cors_layer(&config.server.cors_allowed_origins),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn storage(config: &Config, notifier: Arc<dyn Notifier>) -> anyhow::Result<Backends> {
    let Some(url) = &config.database_url else {
        return Ok(in_memory(notifier));
    };

    info!("Connecting to database...");
    let pool = sqlx::PgPool::connect(url).await.context("connecting to database")?;

    let identities = wildtrails_auth::stores::PostgresIdentityStore::new(pool.clone());
    identities.migrate().await?;
    wildtrails_bookings::stores::migrate(&pool).await?;
    info!("Database ready");

    Ok(Backends {
        identities: Arc::new(identities),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        bookings: Arc::new(wildtrails_bookings::stores::PostgresBookingStore::new(pool.clone())),
        drivers: Arc::new(wildtrails_bookings::stores::PostgresDriverDirectory::new(pool)),
        notifier,
        clock: Arc::new(SystemClock),
    })
}

#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
async fn storage(config: &Config, notifier: Arc<dyn Notifier>) -> anyhow::Result<Backends> {
    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but this build has no postgres support");
    }
    Ok(in_memory(notifier))
}

fn in_memory(notifier: Arc<dyn Notifier>) -> Backends {
    use wildtrails_auth::mocks::InMemoryIdentityStore;
    use wildtrails_bookings::mocks::{InMemoryBookingStore, InMemoryDriverDirectory};

    warn!("Using in-memory storage, data is lost on shutdown");
    let bookings = InMemoryBookingStore::new();
    Backends {
        identities: Arc::new(InMemoryIdentityStore::new()),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        drivers: Arc::new(InMemoryDriverDirectory::new(bookings.clone())),
        bookings: Arc::new(bookings),
        notifier,
        clock: Arc::new(SystemClock),
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
