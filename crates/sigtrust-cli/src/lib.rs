//! # sigtrust-cli
//!
//! Command-line front end for the `sigtrust` library.
//!
//! ## Features
//!
//! - **Trust-list inspection**: list the roots loaded from a trust-list PDF
//! - **Attachment listing**: show every file embedded in the container
//! - **Validation**: check a signer certificate against the trust list, or
//!   against an operator-supplied certificate
//! - **Output formats**: pretty or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
