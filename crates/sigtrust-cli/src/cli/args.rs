//! Command-line argument definitions using clap.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Validate document-signing certificates against an AATL-style trust list.
///
/// The trust list is a PDF carrying a SecuritySettings.xml attachment.
#[derive(Parser, Debug)]
#[command(name = "sigtrust")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Trust-list container (PDF); overrides the config file
    #[arg(short = 't', long, env = "SIGTRUST_TRUST_LIST", global = true)]
    pub trust_list: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Require trust-list roots to verify their own signature
    #[arg(long, global = true)]
    pub strict_roots: bool,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the trusted root certificates loaded from the trust list
    Anchors,

    /// List every attachment embedded in the trust-list container
    Attachments,

    /// Validate a signer certificate
    Validate(ValidateArgs),
}

// ============================================================================
// Validate command
// ============================================================================

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Signer certificate (DER, PEM or Base64)
    pub signer: PathBuf,

    /// Additional untrusted intermediate certificates
    #[arg(short, long = "intermediate")]
    pub intermediates: Vec<PathBuf>,

    /// Accept the signer if this certificate is in, or issued, its chain
    #[arg(short, long)]
    pub custom: Option<PathBuf>,

    /// Claimed signing time (RFC 3339)
    #[arg(long)]
    pub signing_time: Option<DateTime<Utc>>,
}
