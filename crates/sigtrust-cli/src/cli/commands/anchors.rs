//! `sigtrust anchors` - List the trusted roots loaded from the trust list.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sigtrust::{AnchorInfo, LoadStats};

use super::Context;
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct AnchorListing {
    stats: LoadStats,
    anchors: Vec<AnchorInfo>,
}

pub async fn execute(ctx: Context) -> Result<()> {
    let gate = ctx.trust_gate().await?;
    let store = gate.store()?;

    let listing = AnchorListing {
        stats: store.stats(),
        anchors: store.describe(),
    };

    match ctx.output_format {
        OutputFormat::Json => print_json(&listing)?,
        OutputFormat::Pretty => {
            let stats = listing.stats;
            println!(
                "{} {} of {} certificates ({} not roots, {} undecodable)",
                "Loaded:".bold(),
                stats.loaded.to_string().cyan().bold(),
                stats.candidates,
                stats.skipped_non_root.to_string().yellow(),
                stats.failed.to_string().red(),
            );
            println!();

            for anchor in &listing.anchors {
                let cert = &anchor.certificate;
                println!("{} {}", anchor.alias.green().bold(), cert.subject);
                println!("  {} {}", "Serial:".dimmed(), cert.serial);
                println!(
                    "  {} {} .. {}",
                    "Valid:".dimmed(),
                    cert.not_before.format("%Y-%m-%d"),
                    cert.not_after.format("%Y-%m-%d"),
                );
                println!("  {} {}", "SHA-256:".dimmed(), cert.fingerprint);
            }

            if listing.anchors.is_empty() {
                println!("{}", "No trusted roots in this trust list.".yellow());
            }
        }
    }

    Ok(())
}
