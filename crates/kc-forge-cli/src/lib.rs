//! # kc-forge-cli
//!
//! Command-line front end for the Keycloak realm to Terragrunt generator.
//!
//! This crate provides:
//! - Conversion of realm export files into a module tree on disk
//! - Validation and complexity analysis of realm exports
//! - An HTTP client for a delegated conversion backend
//! - Persistent CLI configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::format_push_string)]

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod writer;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
