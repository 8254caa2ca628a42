//! # kc-forge
//!
//! Converts a Keycloak realm export into a Terraform/Terragrunt module tree.
//!
//! The conversion is a pure function of the realm document:
//! - [`validate`] decides whether a document is a realm export
//! - [`plan`] picks the modules that apply to it
//! - [`emit`] writes each module's resource definitions
//! - [`wiring`] writes the Terragrunt files that connect the modules
//! - [`naming`] derives every file path and resource label
//!
//! Anything the generator cannot express is reported as a [`Diagnostic`]
//! rather than silently dropped.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]

pub mod analysis;
pub mod api;
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod emit;
pub mod error;
pub mod generator;
pub mod model;
pub mod naming;
pub mod plan;
pub mod validate;
pub mod wiring;

pub use analysis::{analyze, ComplexityLevel, RealmAnalysis};
pub use batch::{convert_batch, BatchReport, FileOutcome};
pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{ForgeError, ForgeResult};
pub use generator::{generate, generate_with, Conversion, GenerateOptions, GeneratedFile};
pub use plan::{plan, ModuleKind};
pub use validate::is_valid;
