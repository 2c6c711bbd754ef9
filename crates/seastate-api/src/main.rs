// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seastate results HTTP service.
//! Serves analysis documents and merges summary-result updates into them.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use clap::Parser;
use seastate_api::{app, load_service_config, AppState, Authorizer, Environment};
use seastate_store::{DocumentStore, FsStore, MemoryStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Seastate analysis results service")]
struct Args {
    /// TCP listener (e.g. 0.0.0.0:8000)
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,
    /// Service settings (JSON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document directory. Defaults to the platform data directory.
    #[arg(long, conflicts_with = "memory")]
    data_dir: Option<PathBuf>,
    /// Keep documents in memory only.
    #[arg(long)]
    memory: bool,
    /// TLS certificate (PEM). If provided, key must also be provided.
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    /// TLS private key (PEM). If provided, cert must also be provided.
    #[arg(long)]
    tls_key: Option<PathBuf>,
    /// Overrides the configured environment.
    #[arg(long, value_enum)]
    environment: Option<Environment>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut config = load_service_config(args.config.as_deref())
        .context("load service config")?
        .with_env(|key| std::env::var(key).ok())
        .context("apply environment overrides")?;
    if let Some(environment) = args.environment {
        config.environment = environment;
    }

    let store: Arc<dyn DocumentStore> = if args.memory {
        info!("documents kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        let store = match args.data_dir {
            Some(dir) => FsStore::open(dir),
            None => FsStore::open_default(),
        }
        .context("open document store")?;
        info!(root = %store.root().display(), "documents stored on disk");
        Arc::new(store)
    };

    let auth = Authorizer::from_config(&config).context("configure authorization")?;
    if auth.is_development() {
        warn!("development environment: bearer tokens are not verified");
    }

    let app = app(Arc::new(AppState::new(store, auth, config.update_retries)));

    let handle = Handle::new();
    // graceful shutdown on Ctrl+C
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(?err, "failed to install ctrl-c handler");
            return;
        }
        shutdown.shutdown();
    });

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                warn!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(cert, key)
                .await
                .context("load tls config")?;
            info!("seastate api listening (TLS) on {}", args.listen);
            axum_server::bind_rustls(args.listen, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        (None, None) => {
            info!("seastate api listening on {}", args.listen);
            axum_server::bind(args.listen)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            return Err(anyhow!(
                "must provide both --tls-cert and --tls-key or neither"
            ))
        }
    }

    Ok(())
}
