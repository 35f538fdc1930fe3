//! album-mirror: incremental local mirror of a user's online photo albums.
//!
//! Exchanges a long-lived refresh token for access tokens, pages through each
//! album's photo feed and downloads whatever the local archive is missing.
//! Incremental passes abandon an album once they keep running into photos
//! that are already archived. Passes repeat on a fixed interval until the
//! process is signalled.

#![warn(clippy::all)]

mod archive;
mod auth;
mod cli;
mod config;
mod download;
mod picasa;
mod shutdown;
mod sync;
mod types;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use archive::{ArchiveLayout, FsArchiveIndex};
use auth::endpoints::Endpoints;
use auth::OAuthCredentials;
use config::Config;
use download::HttpTransfer;
use picasa::{ListingSource, PicasaClient};
use sync::{SyncEngine, SyncOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprintln!("{}", config::USAGE_GUIDE);
            std::process::exit(2);
        }
    };
    tracing::debug!(?config, "Resolved configuration");

    let endpoints = Endpoints::default();
    let http = reqwest::Client::builder()
        .user_agent(concat!("album-mirror/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let credentials = OAuthCredentials {
        client_id: config.client_id.clone(),
        client_secret: config.client_secret.clone(),
        refresh_token: config.refresh_token.clone(),
    };
    let oauth_http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let provider = auth::authenticate(oauth_http, &endpoints.token, credentials).await?;
    tracing::info!("Authentication completed successfully");

    let source = Arc::new(PicasaClient::new(
        http.clone(),
        endpoints.feed_api.clone(),
        Arc::new(provider),
    ));

    if config.list_albums {
        let albums = source.list_albums(&config.user_id).await?;
        println!("Albums:");
        for album in &albums {
            println!("  {}", album.title);
        }
        return Ok(());
    }

    let layout = ArchiveLayout::new(config.data_path.clone());
    let options = SyncOptions {
        dry_run: config.dry_run,
        albums: config.albums.clone(),
        ..SyncOptions::default()
    };
    let engine = SyncEngine::new(
        source,
        Arc::new(FsArchiveIndex::new(layout.clone())),
        Arc::new(HttpTransfer::new(http)),
        layout,
        options,
    );

    let shutdown_token = shutdown::install_signal_handler()?;

    loop {
        if shutdown_token.is_cancelled() {
            tracing::info!("Shutdown requested, exiting...");
            break;
        }

        match engine.run_once(&config.user_id, config.mode).await {
            Ok(summary) => summary.log(config.dry_run),
            Err(e) if config.once => return Err(e.into()),
            Err(e) => {
                tracing::error!("Pass failed: {}", e);
                tracing::info!("Will retry at the next interval");
            }
        }

        if config.once {
            break;
        }
        if shutdown_token.is_cancelled() {
            tracing::info!("Shutdown requested, exiting...");
            break;
        }

        tracing::info!(
            "Waiting {} seconds...",
            config.watch_interval.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(config.watch_interval) => {}
            _ = shutdown_token.cancelled() => {
                tracing::info!("Shutdown during wait, exiting...");
                break;
            }
        }
    }

    Ok(())
}
