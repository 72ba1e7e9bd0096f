//! `statline` - fetch Warzone player stats from the command line.
//!
//! Each player is fetched through the provider fallback chain and printed as
//! one JSON line on stdout. Logs go to stderr.

mod config;
mod main_lib;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use config::Config;
use main_lib::{build_registry, init_tracing};
use serde_json::json;
use statline_player_stats::{FallbackMode, FetchDiagnostics, PlayerHandle};

/// Fetch player statistics with automatic provider fallback
#[derive(Parser)]
#[command(name = "statline", version, about)]
struct Args {
    /// Player names, e.g. `alpha#1234`
    #[arg(required = true, value_name = "NAME")]
    names: Vec<String>,

    /// Platform: battlenet (or battle), psn, xbl, steam, uno
    #[arg(short, long, default_value = "battlenet")]
    platform: String,

    /// Return nothing instead of synthetic stats when every provider fails
    #[arg(long)]
    strict: bool,

    /// Include the per-provider attempt summary in the output
    #[arg(long)]
    diagnostics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    init_tracing(&config.log_format);

    if args.strict {
        config.fallback_mode = FallbackMode::Strict;
    }

    let handles = args
        .names
        .iter()
        .map(|name| PlayerHandle::parse(name.clone(), &args.platform))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid player handle")?;

    let registry = Arc::new(build_registry(&config)?);

    // Fetches share the rate limiter, so they can run concurrently
    let tasks: Vec<_> = handles
        .into_iter()
        .map(|handle| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let (record, diagnostics) = registry.fetch_with_diagnostics(&handle).await;
                (handle, record, diagnostics)
            })
        })
        .collect();

    for task in tasks {
        let (handle, record, diagnostics) = task.await?;

        if let Some(record) = &record {
            if record.is_synthetic {
                tracing::warn!("No provider answered for {}, stats are synthetic", handle);
            }
        } else {
            tracing::warn!("Stats unavailable for {}", handle);
        }

        let mut line = json!({
            "handle": handle,
            "available": record.is_some(),
            "record": record,
        });
        if args.diagnostics {
            line["attempts"] = json!(diagnostics.summary());
            line["errors"] = diagnostics_errors(&diagnostics);
        }
        println!("{}", line);
    }

    Ok(())
}

/// Per-provider failure reasons, in call order.
fn diagnostics_errors(diagnostics: &FetchDiagnostics) -> serde_json::Value {
    diagnostics
        .errors()
        .into_iter()
        .map(|(provider, error)| {
            json!({
                "provider": provider,
                "kind": error.label(),
                "message": error.to_string(),
            })
        })
        .collect()
}
