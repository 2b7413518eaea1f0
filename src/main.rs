// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use site_check::app::{create_router, AppState, VERSION};
use site_check::config::AppConfig;
use site_check::models::category::Category;
use site_check::services::fetcher::normalize_url;
use site_check::services::logging::init_tracing;
use site_check::services::site_check::SiteChecker;
use tracing::info;

/// Website quality analyzer: performance, SEO, security, accessibility and mobile checks
#[derive(Parser, Debug)]
#[command(name = "site-check")]
#[command(author, version = VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Analyze one URL and print the JSON result to stdout
    Check {
        url: String,

        /// Run only this analyzer
        #[arg(long, short, value_enum)]
        category: Option<Category>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level);

    let checker = SiteChecker::from_config(&config.fetcher, config.cache_ttl)
        .context("failed to build HTTP client")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, checker).await,
        Command::Check {
            url,
            category,
            pretty,
        } => check(&checker, &url, category, pretty).await,
    }
}

async fn serve(config: &AppConfig, checker: SiteChecker) -> Result<()> {
    let app = create_router(AppState::new(checker));
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(version = VERSION, %addr, "site-check listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn check(
    checker: &SiteChecker,
    url: &str,
    category: Option<Category>,
    pretty: bool,
) -> Result<()> {
    let url = normalize_url(url)?;

    let value = match category {
        Some(category) => serde_json::to_value(checker.check(category, url.as_str()).await)?,
        None => serde_json::to_value(checker.check_all(url.as_str()).await)?,
    };

    let output = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{output}");
    Ok(())
}
