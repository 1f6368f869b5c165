//! CLI module for tandem - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for loading the dashboard
//! and inspecting the effective configuration.

pub mod commands;

pub use commands::Cli;
