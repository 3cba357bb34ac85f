use crate::types::note::{self, note_name};
use crate::types::quality::{Category, Quality};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

/// A chord symbol: root pitch class plus a quality from the quality table.
///
/// Chords are small `Copy` values. Two chords are equal exactly when their
/// encoded `"root:quality"` keys are equal.
#[derive(Debug, Clone, Copy)]
pub struct Chord {
    root: u8,
    quality: &'static Quality,
}

impl Chord {
    /// Build a chord, wrapping the root into 0-11 and falling back to the
    /// major triad for unknown quality keys
    pub fn new(root: i32, quality: &str) -> Self {
        Self::with_quality(root, Quality::resolve(quality))
    }

    pub fn with_quality(root: i32, quality: &'static Quality) -> Self {
        Chord {
            root: note::pitch_class(root),
            quality,
        }
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn quality(&self) -> &'static Quality {
        self.quality
    }

    /// The table key of the quality (`""` for a major triad)
    pub fn quality_key(&self) -> &'static str {
        self.quality.key
    }

    pub fn intervals(&self) -> &'static [u8] {
        self.quality.intervals
    }

    /// Pitch classes in interval-table order (not sorted).
    ///
    /// Callers index into this positionally: element 0 is always the root.
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.quality
            .reduced_intervals()
            .map(|i| (self.root + i) % 12)
            .collect()
    }

    /// Display symbol, e.g. `D♭Δ7`
    pub fn symbol(&self) -> String {
        format!("{}{}", note_name(self.root), self.quality.symbol)
    }

    pub fn category(&self) -> Category {
        self.quality.category
    }

    /// Stable `"root:quality"` key used for persistence and set membership
    pub fn encode(&self) -> String {
        format!("{}:{}", self.root, self.quality.key)
    }

    /// Inverse of [`Chord::encode`]. Never fails: an unreadable root becomes C
    /// and an unknown quality becomes the major triad.
    pub fn decode(encoded: &str) -> Self {
        let encoded = encoded.trim();
        let (root_text, quality) = encoded.split_once(':').unwrap_or((encoded, ""));
        let root = match root_text.trim().parse::<i32>() {
            Ok(root) => root,
            Err(_) => {
                tracing::debug!("unreadable chord key {:?}, using C", encoded);
                0
            }
        };
        Chord::new(root, quality)
    }

    /// Move the root by a number of semitones, keeping the quality
    pub fn transpose(self, semitones: i32) -> Self {
        Chord::with_quality(self.root as i32 + semitones.rem_euclid(12), self.quality)
    }

    /// Number of pitch classes shared with another chord (as sets)
    pub fn common_tones(&self, other: &Chord) -> usize {
        let mine: BTreeSet<u8> = self.pitch_classes().into_iter().collect();
        let theirs: BTreeSet<u8> = other.pitch_classes().into_iter().collect();
        mine.intersection(&theirs).count()
    }

    /// Upward root motion to another chord, 0-11
    pub fn root_motion_to(&self, other: &Chord) -> u8 {
        (other.root + 12 - self.root) % 12
    }

    /// Same-root alternatives from the variation group this chord belongs to
    pub fn variations(&self) -> Vec<Chord> {
        let group: &[&str] = if self.quality.is_minor() {
            &MINOR_VARIATIONS
        } else if matches!(self.category(), Category::Dominant | Category::Altered) {
            &DOMINANT_VARIATIONS
        } else {
            &MAJOR_VARIATIONS
        };
        group
            .iter()
            .map(|key| Chord::new(self.root as i32, key))
            .collect()
    }
}

const MAJOR_VARIATIONS: [&str; 7] = ["", "maj7", "maj9", "6", "add9", "sus2", "sus4"];
const MINOR_VARIATIONS: [&str; 6] = ["m", "m7", "m9", "m6", "madd9", "m11"];
const DOMINANT_VARIATIONS: [&str; 8] = ["7", "9", "11", "13", "7sus4", "7b9", "7#9", "7alt"];

impl Default for Chord {
    fn default() -> Self {
        Chord::with_quality(0, Quality::major())
    }
}

impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.quality.key == other.quality.key
    }
}

impl Eq for Chord {}

impl Hash for Chord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
        self.quality.key.hash(state);
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Add<i8> for Chord {
    type Output = Chord;

    fn add(self, semitones: i8) -> Self::Output {
        self.transpose(semitones as i32)
    }
}

impl Sub<i8> for Chord {
    type Output = Chord;

    fn sub(self, semitones: i8) -> Self::Output {
        self.transpose(-(semitones as i32))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Chord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Chord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Ok(Chord::decode(&encoded))
    }
}
