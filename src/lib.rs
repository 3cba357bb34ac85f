//! # Comping
//!
//! Interactive front end for `comping-core`: a REPL that plays chord symbols,
//! shows predictions and substitutions, edits voicings and exchanges history
//! files. All file I/O lives here; the core stays pure.
//!
//! ## Modules
//!
//! - `commands`: the command registry and its handlers.
//! - `repl`: the read-eval-print loop.
//! - `setup`: session construction from config files and environment variables.

pub mod commands;
pub mod repl;
pub mod setup;

pub use crate::repl::{start, Repl};
pub use crate::setup::session_from_env;
