//! # Comping Core
//!
//! Harmony engine for a real-time jazz comping assistant: chord model,
//! progression rules, n-gram prediction, transition hints and voice leading.
//! Free of audio and UI dependencies so it runs natively and in WASM.
//!
//! ## Features
//!
//! - **serde**: JSON config, history documents and the built-in n-gram table
//! - **wasm**: WASM bindings via wasm-bindgen
//! - **colored**: Coloured transition hints for terminals
//!
//! ## Example
//!
//! ```ignore
//! use comping_core::{HarmonySession, SessionConfig};
//! use comping_core::parser::parse_chord_symbol;
//!
//! let mut session = HarmonySession::new(SessionConfig::default())?;
//! let played = session.play(parse_chord_symbol("Dm7").unwrap())?;
//! println!("{} -> {:?}", played.chord, played.voicing);
//! ```

pub mod error;
pub mod harmony;
pub mod parser;
pub mod types;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{HarmonyError, Result};
pub use harmony::{HarmonySession, NgramTable, TransitionHint, VoiceLeader};
pub use types::{
    Chord, HistoryDocument, HistoryEntry, MidiNote, Quality, SessionConfig, Song, Voicing,
    VoicingBounds,
};
