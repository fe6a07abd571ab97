//! # BBS Core Module
//!
//! The interactive session engine and everything it drives.
//!
//! ## Components
//!
//! - [`io`] - line framing, prompts and `/ex` multi-line capture
//! - [`args`] - command-line tokenizing and argument binding
//! - [`registry`] - command descriptors and verb/alias resolution
//! - [`session`] - the session state machine and its dispatch boundary
//! - [`commands`] - the built-in command set
//! - [`render`] - output formatting
//! - [`collaborators`] - external utilities and the info text
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  SessionIo      │ ← caller bytes in, CR+LF lines out
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  SessionEngine  │ ← prompt, tokenize, dispatch, recover
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ CommandRegistry │ ← verb/alias to handler
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Store          │ ← SQLite, one transaction per call
//! └─────────────────┘
//! ```

pub mod args;
pub mod collaborators;
pub mod commands;
pub mod io;
pub mod registry;
pub mod render;
pub mod session;

pub use registry::{CommandDescriptor, CommandHandler, CommandRegistry, Flow};
pub use session::{SessionContext, SessionEngine, SessionState};
