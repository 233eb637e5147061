//! arkctl - operator CLI for the ARK support daemon.

use anyhow::{bail, Context, Result};
use ark_common::HealthResponse;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "arkctl", version, about = "Operator CLI for arkd")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show daemon health and the backend circuit-breaker state
    Status {
        /// Diagnostics endpoint base URL
        #[arg(long, default_value = "http://127.0.0.1:18080")]
        url: String,
        /// Diagnostics token (defaults to $HEALTH_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Status { url, token } => status(&url, token).await,
    }
}

async fn status(url: &str, token: Option<String>) -> Result<()> {
    let token = token
        .or_else(|| std::env::var("HEALTH_TOKEN").ok())
        .unwrap_or_default();

    let response = reqwest::Client::new()
        .get(format!("{}/health", url))
        .query(&[("token", token.as_str())])
        .send()
        .await
        .with_context(|| format!("cannot reach {}", url))?;

    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        bail!("unauthorized - pass --token or set HEALTH_TOKEN");
    }
    if !response.status().is_success() {
        bail!("daemon returned {}", response.status());
    }

    let health: HealthResponse = response.json().await?;

    println!(
        "{} pid={} uptime={}s",
        "arkd".green().bold(),
        health.pid,
        health.uptime_sec
    );
    println!("  backend: {} ({})", health.ollama.url, health.ollama.model);

    let r = &health.ollama.resilience;
    if r.disabled_until > 0 && !r.last_ok {
        println!(
            "  circuit: {} (fail_count={}, disabled_until={})",
            "open".red().bold(),
            r.fail_count,
            r.disabled_until
        );
    } else if r.last_ok {
        println!("  circuit: {} (fail_count={})", "closed".green(), r.fail_count);
    } else {
        println!(
            "  circuit: {} (fail_count={})",
            "degraded".yellow(),
            r.fail_count
        );
    }

    Ok(())
}
