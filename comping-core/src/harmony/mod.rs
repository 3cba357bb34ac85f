// comping-core/src/harmony/mod.rs

pub mod analysis;
pub mod classify;
pub mod ngram;
pub mod progression;
pub mod session;
pub mod voice_controller;
pub mod voice_leading;

pub use analysis::{analyze, TransitionHint};
pub use classify::{detect, detect_scored, ChordClassifier, Classified, ClassifierChain, Detection};
pub use ngram::{NgramOrder, NgramTable, Prediction};
pub use progression::{
    common_progressions, next_chords, random_chords, CommonProgressions, HarmonicFunction,
    NextChord, RuleCategory, ScaleDegree,
};
pub use session::{HarmonySession, Played, Suggestion, SuggestionSource, Suggestions};
pub use voice_controller::VoiceController;
pub use voice_leading::VoiceLeader;
