//! End-to-End Integration Tests
//!
//! These tests convert complete realm exports, write them through the CLI
//! layer, and exercise the delegated backend client against a local mock.

mod backend;
mod cli;
mod common;
mod conversion;
