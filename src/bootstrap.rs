use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    application::user_service::UserService,
    config::AppConfig,
    domain::{identity::IdentityProvider, user::UserRepository},
    infrastructure::{
        clerk::{ClerkClient, UnconfiguredClerk},
        postgres::{build_pg_pool, repositories::PgUserRepository, run_migrations},
        svix::SvixVerifier,
    },
    interfaces::http::router::build_router,
    state::AppState,
};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;

    let pg_pool = build_pg_pool(&config.postgres).await?;
    if config.postgres.run_migrations {
        run_migrations(&pg_pool).await?;
    }

    let verifier = match config.webhook.signing_secret.as_deref() {
        Some(secret) => Some(Arc::new(
            SvixVerifier::new(secret, config.webhook.tolerance_seconds)
                .map_err(|e| anyhow::anyhow!("invalid webhook signing secret: {e}"))?,
        )),
        None => {
            warn!("WEBHOOK_SECRET is not set; webhook deliveries will be rejected with 500");
            None
        }
    };

    let identity: Arc<dyn IdentityProvider> = match config.clerk.secret_key.clone() {
        Some(secret_key) => Arc::new(ClerkClient::new(&config.clerk, secret_key)?),
        None => {
            warn!("CLERK_SECRET_KEY is not set; user ids will not be written to Clerk metadata");
            Arc::new(UnconfiguredClerk)
        }
    };

    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(user_repo, identity));

    let shared_state = Arc::new(AppState::new(verifier, user_service));

    let router: Router = build_router(shared_state);
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .from_env_lossy()
    });

    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_env_filter(filter).finish(),
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
