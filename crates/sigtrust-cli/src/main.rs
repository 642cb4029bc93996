//! sigtrust - signer certificate trust validation
//!
//! Inspect an AATL-style trust list and validate certificates against it.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sigtrust_cli::run().await
}
