//! `sigtrust attachments` - List the files embedded in the trust-list container.

use anyhow::{Context as _, Result};
use colored::Colorize;
use sigtrust::{list_attachments, TRUST_LIST_ATTACHMENT};

use super::Context;
use crate::output::{print_json, OutputFormat};

pub async fn execute(ctx: Context) -> Result<()> {
    let container = ctx.read_container().await?;
    let names = list_attachments(&container).context("failed to read trust-list container")?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&names)?,
        OutputFormat::Pretty => {
            for name in &names {
                if name == TRUST_LIST_ATTACHMENT {
                    println!("{} {}", name.green().bold(), "(trust list)".dimmed());
                } else {
                    println!("{name}");
                }
            }
            if !names.iter().any(|n| n == TRUST_LIST_ATTACHMENT) {
                println!(
                    "{}",
                    format!("No {TRUST_LIST_ATTACHMENT} attachment found.").yellow()
                );
            }
        }
    }

    Ok(())
}
