//! The chord quality table
//!
//! Every quality the engine knows is a literal row below: its key (the string
//! stored in encoded chords), display symbol, interval list and a handful of
//! precomputed facets. Runtime classification reads those facets instead of
//! pattern matching on the key text, so `maj7` can never be mistaken for a
//! minor chord because it happens to contain an `m`.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Broad family of a quality, used for grouping in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Triad,
    Seventh,
    Sixth,
    Dominant,
    Extended,
    Altered,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Triad => "triad",
            Category::Seventh => "seventh",
            Category::Sixth => "sixth",
            Category::Dominant => "dominant",
            Category::Extended => "extended",
            Category::Altered => "altered",
        }
    }
}

/// The three-note shape a quality is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Triad {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

impl Triad {
    pub fn intervals(&self) -> [u8; 3] {
        match self {
            Triad::Major => [0, 4, 7],
            Triad::Minor => [0, 3, 7],
            Triad::Diminished => [0, 3, 6],
            Triad::Augmented => [0, 4, 8],
            Triad::Sus2 => [0, 2, 7],
            Triad::Sus4 => [0, 5, 7],
        }
    }
}

/// The seventh stacked on the triad, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seventh {
    /// 11 semitones
    Major,
    /// 10 semitones
    Minor,
    /// 9 semitones (dim7)
    Diminished,
}

impl Seventh {
    pub fn interval(&self) -> u8 {
        match self {
            Seventh::Major => 11,
            Seventh::Minor => 10,
            Seventh::Diminished => 9,
        }
    }
}

/// A chromatic alteration applied to the basic shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alteration {
    FlatFive,
    SharpFive,
    FlatNine,
    SharpNine,
    SharpEleven,
    FlatThirteen,
}

impl Alteration {
    /// Interval the alteration contributes
    pub fn interval(&self) -> u8 {
        match self {
            Alteration::FlatFive => 6,
            Alteration::SharpFive => 8,
            Alteration::FlatNine => 13,
            Alteration::SharpNine => 15,
            Alteration::SharpEleven => 18,
            Alteration::FlatThirteen => 20,
        }
    }
}

/// One row of the quality table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality {
    pub key: &'static str,
    pub symbol: &'static str,
    pub category: Category,
    pub triad: Triad,
    pub seventh: Option<Seventh>,
    /// Ascending semitone offsets from the root; may exceed 11 for extensions
    pub intervals: &'static [u8],
    pub alterations: &'static [Alteration],
    /// Marks the `alt` dominant, which implies altered tensions without naming them
    pub altered: bool,
}

impl Quality {
    const fn new(
        key: &'static str,
        symbol: &'static str,
        category: Category,
        triad: Triad,
        seventh: Option<Seventh>,
        intervals: &'static [u8],
    ) -> Self {
        Quality {
            key,
            symbol,
            category,
            triad,
            seventh,
            intervals,
            alterations: &[],
            altered: false,
        }
    }

    const fn alter(self, alterations: &'static [Alteration]) -> Self {
        Quality {
            alterations,
            ..self
        }
    }

    const fn alt(self) -> Self {
        Quality {
            altered: true,
            ..self
        }
    }

    /// Minor third in the shape (minor and diminished families)
    pub fn is_minor(&self) -> bool {
        matches!(self.triad, Triad::Minor | Triad::Diminished)
    }

    /// Minor seventh over a major, suspended or augmented shape
    pub fn is_dominant(&self) -> bool {
        self.seventh == Some(Seventh::Minor) && !self.is_minor()
    }

    /// Diminished triad without a minor seventh (`dim`, `dim7`)
    pub fn is_diminished(&self) -> bool {
        self.triad == Triad::Diminished && self.seventh != Some(Seventh::Minor)
    }

    pub fn has_seventh(&self) -> bool {
        self.seventh.is_some()
    }

    pub fn has_alteration(&self, alteration: Alteration) -> bool {
        self.alterations.contains(&alteration)
    }

    /// ♭9, ♯9, ♯11 or the altered-dominant marker
    pub fn is_tense(&self) -> bool {
        self.altered
            || self.has_alteration(Alteration::FlatNine)
            || self.has_alteration(Alteration::SharpNine)
            || self.has_alteration(Alteration::SharpEleven)
    }

    /// Intervals reduced into a single octave, in table order
    pub fn reduced_intervals(&self) -> impl Iterator<Item = u8> + '_ {
        self.intervals.iter().map(|i| i % 12)
    }

    /// Look up a quality by its exact key
    pub fn lookup(key: &str) -> Option<&'static Quality> {
        index().get(key).copied()
    }

    /// Look up a quality, falling back to the major triad for unknown keys
    pub fn resolve(key: &str) -> &'static Quality {
        Self::lookup(key).unwrap_or_else(Quality::major)
    }

    pub fn major() -> &'static Quality {
        &QUALITIES[0]
    }

    /// All qualities in declaration order
    pub fn all() -> &'static [Quality] {
        QUALITIES
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

use Alteration::*;
use Category as C;
use Triad as T;

const MAJ: Option<Seventh> = Some(Seventh::Major);
const MIN: Option<Seventh> = Some(Seventh::Minor);
const DIM: Option<Seventh> = Some(Seventh::Diminished);

/// Declaration order matters: detection ties resolve to the earlier row.
pub static QUALITIES: &[Quality] = &[
    Quality::new("", "", C::Triad, T::Major, None, &[0, 4, 7]),
    Quality::new("m", "m", C::Triad, T::Minor, None, &[0, 3, 7]),
    Quality::new("dim", "°", C::Triad, T::Diminished, None, &[0, 3, 6]),
    Quality::new("aug", "+", C::Triad, T::Augmented, None, &[0, 4, 8]),
    Quality::new("sus2", "sus2", C::Triad, T::Sus2, None, &[0, 2, 7]),
    Quality::new("sus4", "sus4", C::Triad, T::Sus4, None, &[0, 5, 7]),
    Quality::new("sus", "sus", C::Triad, T::Sus4, None, &[0, 5, 7]),
    Quality::new("maj7", "Δ7", C::Seventh, T::Major, MAJ, &[0, 4, 7, 11]),
    Quality::new("7", "7", C::Dominant, T::Major, MIN, &[0, 4, 7, 10]),
    Quality::new("m7", "m7", C::Seventh, T::Minor, MIN, &[0, 3, 7, 10]),
    Quality::new("m7b5", "ø7", C::Seventh, T::Diminished, MIN, &[0, 3, 6, 10]),
    Quality::new("dim7", "°7", C::Seventh, T::Diminished, DIM, &[0, 3, 6, 9]),
    Quality::new("mMaj7", "mΔ7", C::Seventh, T::Minor, MAJ, &[0, 3, 7, 11]),
    Quality::new("7sus4", "7sus4", C::Dominant, T::Sus4, MIN, &[0, 5, 7, 10]),
    Quality::new("7sus", "7sus", C::Dominant, T::Sus4, MIN, &[0, 5, 7, 10]),
    Quality::new("add9", "add9", C::Triad, T::Major, None, &[0, 4, 7, 14]),
    Quality::new("madd9", "m(add9)", C::Triad, T::Minor, None, &[0, 3, 7, 14]),
    Quality::new("6", "6", C::Sixth, T::Major, None, &[0, 4, 7, 9]),
    Quality::new("m6", "m6", C::Sixth, T::Minor, None, &[0, 3, 7, 9]),
    Quality::new("69", "6/9", C::Sixth, T::Major, None, &[0, 4, 7, 9, 14]),
    Quality::new("m69", "m6/9", C::Sixth, T::Minor, None, &[0, 3, 7, 9, 14]),
    Quality::new("maj7#11", "Δ7♯11", C::Extended, T::Major, MAJ, &[0, 4, 7, 11, 18])
        .alter(&[SharpEleven]),
    Quality::new("maj7#5", "Δ7♯5", C::Extended, T::Augmented, MAJ, &[0, 4, 8, 11])
        .alter(&[SharpFive]),
    Quality::new("maj9", "Δ9", C::Extended, T::Major, MAJ, &[0, 4, 7, 11, 14]),
    Quality::new("maj9#11", "Δ9♯11", C::Extended, T::Major, MAJ, &[0, 4, 7, 11, 14, 18])
        .alter(&[SharpEleven]),
    Quality::new("maj13", "Δ13", C::Extended, T::Major, MAJ, &[0, 4, 7, 11, 14, 21]),
    Quality::new("9", "9", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 14]),
    Quality::new("m9", "m9", C::Extended, T::Minor, MIN, &[0, 3, 7, 10, 14]),
    Quality::new("9sus", "9sus", C::Dominant, T::Sus4, MIN, &[0, 5, 7, 10, 14]),
    Quality::new("9#11", "9♯11", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 14, 18])
        .alter(&[SharpEleven]),
    Quality::new("9#5", "9♯5", C::Altered, T::Augmented, MIN, &[0, 4, 8, 10, 14])
        .alter(&[SharpFive]),
    Quality::new("9b5", "9♭5", C::Altered, T::Major, MIN, &[0, 4, 6, 10, 14])
        .alter(&[FlatFive]),
    Quality::new("11", "11", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 14, 17]),
    Quality::new("m11", "m11", C::Extended, T::Minor, MIN, &[0, 3, 7, 10, 14, 17]),
    Quality::new("13", "13", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 14, 21]),
    Quality::new("13#11", "13♯11", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 14, 18, 21])
        .alter(&[SharpEleven]),
    Quality::new("13#9", "13♯9", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 15, 21])
        .alter(&[SharpNine]),
    Quality::new("13b9", "13♭9", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 13, 21])
        .alter(&[FlatNine]),
    Quality::new("13sus", "13sus", C::Dominant, T::Sus4, MIN, &[0, 5, 7, 10, 14, 21]),
    Quality::new("7b5", "7♭5", C::Altered, T::Major, MIN, &[0, 4, 6, 10]).alter(&[FlatFive]),
    Quality::new("7#5", "7♯5", C::Altered, T::Augmented, MIN, &[0, 4, 8, 10])
        .alter(&[SharpFive]),
    Quality::new("7b9", "7♭9", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 13]).alter(&[FlatNine]),
    Quality::new("7#9", "7♯9", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 15])
        .alter(&[SharpNine]),
    Quality::new("7#11", "7♯11", C::Dominant, T::Major, MIN, &[0, 4, 7, 10, 18])
        .alter(&[SharpEleven]),
    Quality::new("7b13", "7♭13", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 20])
        .alter(&[FlatThirteen]),
    Quality::new("7b9#11", "7♭9♯11", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 13, 18])
        .alter(&[FlatNine, SharpEleven]),
    Quality::new("7#9#11", "7♯9♯11", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 15, 18])
        .alter(&[SharpNine, SharpEleven]),
    Quality::new("7b5#9", "7♭5♯9", C::Altered, T::Major, MIN, &[0, 4, 6, 10, 15])
        .alter(&[FlatFive, SharpNine]),
    Quality::new("7b5b9", "7♭5♭9", C::Altered, T::Major, MIN, &[0, 4, 6, 10, 13])
        .alter(&[FlatFive, FlatNine]),
    Quality::new("7#5#9", "7♯5♯9", C::Altered, T::Augmented, MIN, &[0, 4, 8, 10, 15])
        .alter(&[SharpFive, SharpNine]),
    Quality::new("7b9#5", "7♭9♯5", C::Altered, T::Augmented, MIN, &[0, 4, 8, 10, 13])
        .alter(&[SharpFive, FlatNine]),
    Quality::new("7b9b13", "7♭9♭13", C::Altered, T::Major, MIN, &[0, 4, 7, 10, 13, 20])
        .alter(&[FlatNine, FlatThirteen]),
    Quality::new("7b9sus", "7♭9sus", C::Altered, T::Sus4, MIN, &[0, 5, 7, 10, 13])
        .alter(&[FlatNine]),
    Quality::new("7b13sus", "7♭13sus", C::Altered, T::Sus4, MIN, &[0, 5, 7, 10, 20])
        .alter(&[FlatThirteen]),
    // b5 replaces the fifth, so the #5 has nothing left to raise
    Quality::new("7alt", "7alt", C::Altered, T::Major, MIN, &[0, 4, 6, 10, 13, 15])
        .alter(&[FlatFive, FlatNine, SharpNine])
        .alt(),
    Quality::new("m7b9", "m7♭9", C::Extended, T::Minor, MIN, &[0, 3, 7, 10, 13])
        .alter(&[FlatNine]),
    Quality::new("mb6", "m♭6", C::Triad, T::Minor, None, &[0, 3, 7, 8]).alter(&[FlatThirteen]),
    Quality::new("maug", "m+", C::Triad, T::Minor, None, &[0, 3, 8]).alter(&[SharpFive]),
];

/// Problems the table self-check can find
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityTableError {
    #[error("duplicate quality key {0:?}")]
    DuplicateKey(&'static str),
    #[error("quality {0:?} must start at the root and have at least three intervals")]
    MissingRoot(&'static str),
    #[error("quality {0:?} intervals are not strictly ascending")]
    Unsorted(&'static str),
    #[error("quality {0:?} repeats a pitch class")]
    RepeatedPitchClass(&'static str),
}

/// Check the invariants every consumer of the table relies on
pub fn validate_table(table: &[Quality]) -> Result<(), QualityTableError> {
    let mut keys = std::collections::HashSet::new();
    for quality in table {
        if !keys.insert(quality.key) {
            return Err(QualityTableError::DuplicateKey(quality.key));
        }
        if quality.intervals.len() < 3 || quality.intervals[0] != 0 {
            return Err(QualityTableError::MissingRoot(quality.key));
        }
        if quality.intervals.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QualityTableError::Unsorted(quality.key));
        }
        let mut seen = [false; 12];
        for pc in quality.reduced_intervals() {
            if std::mem::replace(&mut seen[pc as usize], true) {
                return Err(QualityTableError::RepeatedPitchClass(quality.key));
            }
        }
    }
    Ok(())
}

fn index() -> &'static HashMap<&'static str, &'static Quality> {
    static INDEX: OnceLock<HashMap<&'static str, &'static Quality>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let check = validate_table(QUALITIES);
        if let Err(e) = &check {
            tracing::warn!("quality table self-check failed: {}", e);
        }
        debug_assert_eq!(check, Ok(()));
        QUALITIES.iter().map(|q| (q.key, q)).collect()
    })
}
