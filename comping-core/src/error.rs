use thiserror::Error;

/// Errors surfaced by the harmony engine.
///
/// Everything data-quality related (unknown qualities, corrupt chord keys,
/// nothing detected) is modelled as a domain value instead; only misuse of
/// the voice-leading optimizer and malformed documents end up here.
#[derive(Debug, Error)]
pub enum HarmonyError {
    #[error("voicing has {voices} voices but the target chord has {targets} pitch classes")]
    InvalidInput { voices: usize, targets: usize },

    #[error("no note within bounds for voice {voice} (previous note {previous})")]
    UnresolvableVoicing { voice: usize, previous: u8 },

    #[error("invalid voicing bounds: min note {min} is above max note {max}")]
    InvalidBounds { min: u8, max: u8 },

    #[cfg(feature = "serde")]
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarmonyError>;
