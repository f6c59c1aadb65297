//! CLI module for stackmatch - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
