//! Labels for a specific chord-to-chord move
//!
//! The checks form a strict cascade: the first rule that matches decides the
//! hint, so a ii-V setup with three common tones is still `classic`.

use crate::types::quality::Seventh;
use crate::types::quality::Triad;
use crate::types::Chord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransitionHint {
    Classic,
    Safe,
    Interesting,
}

impl TransitionHint {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionHint::Classic => "classic",
            TransitionHint::Safe => "safe",
            TransitionHint::Interesting => "interesting",
        }
    }

    /// Terminal label with the hint's colour
    #[cfg(feature = "colored")]
    pub fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            TransitionHint::Classic => self.name().green(),
            TransitionHint::Safe => self.name().blue(),
            TransitionHint::Interesting => self.name().magenta(),
        }
    }
}

impl fmt::Display for TransitionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Roots a borrowed chord typically sits on: iv, bVII, bVI, bIII
fn borrowed_roots(key: u8) -> [u8; 4] {
    [(key + 5) % 12, (key + 10) % 12, (key + 8) % 12, (key + 3) % 12]
}

/// Minor-seventh family on the second degree (m7, m9, m11, m7b9), half-diminished included
fn is_two_chord(chord: &Chord, key: u8) -> bool {
    let quality = chord.quality();
    chord.root() == (key + 2) % 12
        && matches!(quality.triad, Triad::Minor | Triad::Diminished)
        && quality.seventh == Some(Seventh::Minor)
}

fn is_five_chord(chord: &Chord, key: u8) -> bool {
    chord.root() == (key + 7) % 12 && chord.quality().is_dominant()
}

/// Classify the move `from -> to` in `key`; `None` when nothing notable happens.
///
/// Playing the same chord again is not a transition and always gives `None`.
pub fn analyze(from: &Chord, to: &Chord, key: u8) -> Option<TransitionHint> {
    if from == to {
        return None;
    }
    let key = key % 12;
    let common = from.common_tones(to);
    let motion = from.root_motion_to(to);

    if is_two_chord(to, key)
        || (is_five_chord(from, key) && to.root() == key)
        || (matches!(motion, 5 | 7) && common >= 2)
    {
        return Some(TransitionHint::Classic);
    }

    if common >= 3
        || (from.root() == to.root() && from.quality_key() != to.quality_key())
        || (matches!(motion, 1 | 2 | 10 | 11) && common >= 2)
    {
        return Some(TransitionHint::Safe);
    }

    if motion == 6
        || matches!(motion, 3 | 4 | 8 | 9)
        || (borrowed_roots(key).contains(&to.root()) && common <= 1)
        || to.quality().is_tense()
    {
        return Some(TransitionHint::Interesting);
    }

    None
}
