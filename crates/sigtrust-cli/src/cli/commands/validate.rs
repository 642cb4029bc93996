//! `sigtrust validate` - Validate a signer certificate against the trust list.

use anyhow::{Context as _, Result};
use colored::Colorize;
use sigtrust::{decode_certificate, Certificate, ValidationOptions, ValidationResult};
use std::path::Path;
use tracing::debug;

use super::Context;
use crate::cli::args::ValidateArgs;
use crate::output::{print_json, OutputFormat};

pub async fn execute(ctx: Context, args: ValidateArgs) -> Result<()> {
    let signer = read_certificate(&args.signer).await?;

    let mut intermediates = Vec::with_capacity(args.intermediates.len());
    for path in &args.intermediates {
        intermediates.push(read_certificate(path).await?);
    }

    let custom = match &args.custom {
        Some(path) => Some(read_certificate(path).await?),
        None => None,
    };

    let gate = ctx.trust_gate().await?;
    let validator = gate.validator()?;

    let options = ValidationOptions {
        intermediates,
        signing_time: args.signing_time,
        ..ValidationOptions::default()
    };
    debug!(
        signer = signer.subject(),
        intermediates = options.intermediates.len(),
        custom = custom.is_some(),
        "validating"
    );

    let result = match &custom {
        Some(custom) => validator.validate_with_custom_cert_opts(&signer, custom, &options),
        None => validator.validate_with(&signer, &options),
    };

    match ctx.output_format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Pretty => print_pretty(&signer, &result, args.signing_time.is_some()),
    }

    anyhow::ensure!(result.valid, "certificate is not trusted");
    Ok(())
}

async fn read_certificate(path: &Path) -> Result<Certificate> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    decode_certificate(&bytes).with_context(|| format!("decoding {}", path.display()))
}

fn print_pretty(signer: &Certificate, result: &ValidationResult, has_signing_time: bool) {
    println!("{} {}", "Signer:".bold(), signer.subject());
    println!("{} {}", "Issuer:".bold(), signer.issuer().dimmed());

    if result.valid {
        println!("{} {}", "Status:".bold(), "TRUSTED".green().bold());
    } else {
        println!("{} {}", "Status:".bold(), "NOT TRUSTED".red().bold());
    }

    if result.expired {
        println!(
            "{} {}",
            "Validity:".bold(),
            format!("outside validity window (not after {})", signer.not_after().format("%Y-%m-%d")).yellow()
        );
    }

    if has_signing_time {
        let at_signing = if result.valid_at_signing_time {
            "valid".green()
        } else {
            "not valid".red()
        };
        println!("{} {}", "At signing time:".bold(), at_signing);
    }

    if let Some(message) = &result.error_message {
        println!("{} {}", "Reason:".bold(), message.red());
    }
}
