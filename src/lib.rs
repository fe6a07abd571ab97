//! # RSBBS - a Really Simple BBS for packet radio
//!
//! RSBBS is a line-oriented bulletin board reachable over a character session such as an
//! AX.25 connection. The invoking environment starts one process per connected caller and
//! hands it the caller's callsign; the process talks to the caller over stdin/stdout.
//!
//! ## Features
//!
//! - **Public and private messages**: `send`/`sendp`, `list`/`listm`, `read`/`readm`/`readnew`
//! - **Read tracking**: per-user read receipts drive `readnew`
//! - **Pluggable commands**: every command is a descriptor registered at start-up
//! - **Concurrent sessions**: SQLite in WAL mode, one short transaction per operation
//! - **Station utilities**: heard-stations log, uptime and an operator info text
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rsbbs::bbs::commands::builtin_registry;
//! use rsbbs::bbs::io::SessionIo;
//! use rsbbs::bbs::SessionEngine;
//! use rsbbs::config::Config;
//! use rsbbs::storage::Store;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = Store::open(&config.storage.db_path)?;
//!     let io = SessionIo::new(tokio::io::BufReader::new(tokio::io::stdin()), tokio::io::stdout());
//!     let engine = SessionEngine::new(
//!         config.session_config("N1ABC", false),
//!         config.collaborators(),
//!         store,
//!         builtin_registry()?,
//!         io,
//!     );
//!     engine.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bbs`] - session engine, line I/O, command registry and the built-in commands
//! - [`storage`] - message, user and read-receipt persistence
//! - [`config`] - configuration loading and the per-session view
//! - [`cli`] - process start-up arguments
//! - [`errors`] - error taxonomy shared by the store and the commands
//! - [`validation`] - callsign normalization and validation
//! - [`logutil`] - log-safe rendering of caller-supplied text

pub mod bbs;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logutil;
pub mod storage;
pub mod validation;
