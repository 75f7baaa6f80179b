//! Envelope Core - Shared functionality for the Envelope tool
//!
//! Pick a 1Password item, get a `.env` file. This crate holds everything that
//! does not need a terminal: the item model returned by the `op` CLI, the
//! `.env` generator, and the error taxonomy.

pub mod env;
pub mod error;
pub mod format;
pub mod op;
pub mod process;

pub use env::{EnvDocument, EnvGroup};
pub use error::{EnvelopeError, Result};
pub use op::{Field, ItemDetail, ListItem, Section};
