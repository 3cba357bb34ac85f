// comping-core/src/types/mod.rs

pub mod chord;
pub mod config;
pub mod history;
pub mod note;
pub mod quality;
pub mod song;
pub mod voicing;

pub use chord::Chord;
pub use config::{SessionConfig, VoicingBounds};
pub use history::{HistoryDocument, HistoryEntry};
pub use note::MidiNote;
pub use quality::{Alteration, Category, Quality, Seventh, Triad};
pub use song::{Section, Song};
pub use voicing::{VoiceMovement, Voicing};
