//! `mantis2github` - Mantis-to-GitHub issue migration library
//!
//! This crate provides the core functionality for the `m2g` CLI tool: it
//! reads a Mantis CSV database export, converts the BBCode ticket bodies to
//! GitHub-flavored Markdown, and submits the results to the GitHub issues
//! API.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`bbcode`] - BBCode to Markdown conversion engine
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Credentials, settings, and lookup-map loading
//! - [`error`] - Error types and handling
//! - [`github`] - Blocking GitHub REST client
//! - [`logging`] - tracing subscriber setup
//! - [`record`] - Mantis CSV records and issue payload rendering

#![allow(clippy::module_name_repetitions)]

pub mod bbcode;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod record;

pub use bbcode::BbcodeConverter;
pub use error::{MigrateError, Result};
