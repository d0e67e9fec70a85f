use anyhow::{bail, Context};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

mod config;
mod db;
mod error;
mod forms;
mod models;
mod quiz;
mod services;
mod web;

use config::Config;
use db::Repository;
use models::User;
use services::storage::ObjectStorage;
use web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("prep_portal=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let config = Config::load().context("failed to load configuration")?;
    let repository = Repository::new(&config.db_path)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_path))?;

    // Management commands run against the database and exit.
    match args.get(1).map(String::as_str) {
        Some("--create-user") => {
            let (Some(username), Some(email)) = (args.get(2), args.get(3)) else {
                bail!("usage: prep-portal --create-user <username> <email>");
            };
            let user = repository
                .create_user(User::new(username.clone(), email.clone()))
                .await?;
            println!("Created user {} ({})", user.username, user.id);
            return Ok(());
        }
        Some("--make-admin") => {
            let Some(username) = args.get(2) else {
                bail!("usage: prep-portal --make-admin <username>");
            };
            let Some(mut user) = repository.find_user(username).await? else {
                bail!("User {username} does not exist");
            };
            user.promote();
            repository.update(user).await?;
            println!("User {username} has been granted admin access.");
            return Ok(());
        }
        Some(other) => bail!("unknown argument `{other}`"),
        None => {}
    }

    let storage = match &config.storage {
        Some(storage) => Some(ObjectStorage::new(storage)?),
        None => {
            info!("No [storage] section configured; file uploads are disabled");
            None
        }
    };

    let address = config.bind_address.clone();
    let state = AppState::new(repository, storage, config);
    let app = web::router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
}
