//! Harmonic function classification and next-chord rules
//!
//! A chord's function is its scale degree relative to the key plus a coarse
//! quality flag. Each function owns an ordered rule list; the order is the
//! suggestion priority shown to the player.

use crate::types::quality::Quality;
use crate::types::Chord;
use rand::Rng;
use std::fmt;

/// Chromatic scale degree, in semitones above the key root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleDegree {
    I,
    FlatII,
    II,
    FlatIII,
    III,
    IV,
    SharpIV,
    V,
    FlatVI,
    VI,
    FlatVII,
    VII,
}

impl ScaleDegree {
    pub fn semitones(&self) -> u8 {
        match self {
            ScaleDegree::I => 0,
            ScaleDegree::FlatII => 1,
            ScaleDegree::II => 2,
            ScaleDegree::FlatIII => 3,
            ScaleDegree::III => 4,
            ScaleDegree::IV => 5,
            ScaleDegree::SharpIV => 6,
            ScaleDegree::V => 7,
            ScaleDegree::FlatVI => 8,
            ScaleDegree::VI => 9,
            ScaleDegree::FlatVII => 10,
            ScaleDegree::VII => 11,
        }
    }

    /// Absolute root of this degree in a key
    pub fn root_in(&self, key: u8) -> u8 {
        (key % 12 + self.semitones()) % 12
    }
}

/// A chord's role relative to the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarmonicFunction {
    Tonic,
    FlatTwo,
    MinorTwo,
    MajorTwo,
    FlatThree,
    MinorThree,
    MinorFour,
    MajorFour,
    SharpFourDiminished,
    Dominant,
    FlatSix,
    MinorSix,
    MajorSix,
    FlatSeven,
    Any,
}

impl HarmonicFunction {
    /// Classify a chord against a key root (pitch class)
    pub fn classify(chord: &Chord, key: u8) -> Self {
        let degree = (chord.root() + 12 - key % 12) % 12;
        let quality: &Quality = chord.quality();
        let minor = quality.is_minor();
        let dominant = quality.is_dominant();

        match degree {
            0 => HarmonicFunction::Tonic,
            1 if dominant => HarmonicFunction::FlatTwo,
            2 if minor => HarmonicFunction::MinorTwo,
            2 if dominant => HarmonicFunction::MajorTwo,
            3 => HarmonicFunction::FlatThree,
            4 if minor => HarmonicFunction::MinorThree,
            5 if minor => HarmonicFunction::MinorFour,
            5 => HarmonicFunction::MajorFour,
            6 if quality.is_diminished() => HarmonicFunction::SharpFourDiminished,
            7 => HarmonicFunction::Dominant,
            8 => HarmonicFunction::FlatSix,
            9 if minor => HarmonicFunction::MinorSix,
            9 if dominant => HarmonicFunction::MajorSix,
            10 => HarmonicFunction::FlatSeven,
            _ => HarmonicFunction::Any,
        }
    }

    /// Roman-numeral label, e.g. `ii`, `bVI`, `#iv`
    pub fn label(&self) -> &'static str {
        match self {
            HarmonicFunction::Tonic => "I",
            HarmonicFunction::FlatTwo => "bII",
            HarmonicFunction::MinorTwo => "ii",
            HarmonicFunction::MajorTwo => "II",
            HarmonicFunction::FlatThree => "bIII",
            HarmonicFunction::MinorThree => "iii",
            HarmonicFunction::MinorFour => "iv",
            HarmonicFunction::MajorFour => "IV",
            HarmonicFunction::SharpFourDiminished => "#iv",
            HarmonicFunction::Dominant => "V",
            HarmonicFunction::FlatSix => "bVI",
            HarmonicFunction::MinorSix => "vi",
            HarmonicFunction::MajorSix => "VI",
            HarmonicFunction::FlatSeven => "bVII",
            HarmonicFunction::Any => "any",
        }
    }

    /// Ordered transition rules for this function.
    ///
    /// `II`, `bIII`, `iii`, `#iv` and `VI` have lists of their own written for
    /// this crate (secondary dominant, borrowed and mediant motions) instead
    /// of sharing the tonic list.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            HarmonicFunction::Tonic => TONIC_RULES,
            HarmonicFunction::FlatTwo => FLAT_TWO_RULES,
            HarmonicFunction::MinorTwo => MINOR_TWO_RULES,
            HarmonicFunction::MajorTwo => MAJOR_TWO_RULES,
            HarmonicFunction::FlatThree => FLAT_THREE_RULES,
            HarmonicFunction::MinorThree => MINOR_THREE_RULES,
            HarmonicFunction::MinorFour => MINOR_FOUR_RULES,
            HarmonicFunction::MajorFour => MAJOR_FOUR_RULES,
            HarmonicFunction::SharpFourDiminished => SHARP_FOUR_RULES,
            HarmonicFunction::Dominant => DOMINANT_RULES,
            HarmonicFunction::FlatSix => FLAT_SIX_RULES,
            HarmonicFunction::MinorSix => MINOR_SIX_RULES,
            HarmonicFunction::MajorSix => MAJOR_SIX_RULES,
            HarmonicFunction::FlatSeven => FLAT_SEVEN_RULES,
            HarmonicFunction::Any => ANY_RULES,
        }
    }
}

impl fmt::Display for HarmonicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why a rule suggests its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RuleCategory {
    Diatonic,
    Modal,
    Substitution,
    Resolution,
    Deceptive,
    Plagal,
    Backdoor,
    Turnaround,
    Secondary,
}

impl RuleCategory {
    pub fn name(&self) -> &'static str {
        match self {
            RuleCategory::Diatonic => "diatonic",
            RuleCategory::Modal => "modal",
            RuleCategory::Substitution => "substitution",
            RuleCategory::Resolution => "resolution",
            RuleCategory::Deceptive => "deceptive",
            RuleCategory::Plagal => "plagal",
            RuleCategory::Backdoor => "backdoor",
            RuleCategory::Turnaround => "turnaround",
            RuleCategory::Secondary => "secondary",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One transition: target degree and quality, with a category tag and label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub degree: ScaleDegree,
    pub quality: &'static str,
    pub category: RuleCategory,
    pub label: &'static str,
}

const fn rule(
    degree: ScaleDegree,
    quality: &'static str,
    category: RuleCategory,
    label: &'static str,
) -> Rule {
    Rule {
        degree,
        quality,
        category,
        label,
    }
}

use RuleCategory as R;
use ScaleDegree as D;

static TONIC_RULES: &[Rule] = &[
    rule(D::II, "m7", R::Diatonic, "ii-V setup"),
    rule(D::IV, "maj7", R::Diatonic, "subdominant"),
    rule(D::IV, "m", R::Modal, "iv (minor plagal)"),
    rule(D::V, "7", R::Diatonic, "dominant"),
    rule(D::VI, "m7", R::Diatonic, "relative minor"),
    rule(D::III, "m7", R::Diatonic, "mediant"),
    rule(D::FlatVII, "7", R::Modal, "♭VII (mixolydian)"),
    rule(D::FlatIII, "maj7", R::Modal, "♭III (borrowed)"),
    rule(D::FlatVI, "maj7", R::Modal, "♭VI (borrowed)"),
    rule(D::II, "7", R::Substitution, "II7 (V/V)"),
    rule(D::III, "7", R::Substitution, "III7 (V/vi)"),
    rule(D::VI, "7", R::Substitution, "VI7 (V/ii)"),
    rule(D::FlatVI, "7", R::Substitution, "♭VI7 (Coltrane)"),
    rule(D::SharpIV, "dim7", R::Substitution, "#iv° (to V)"),
];

static MINOR_TWO_RULES: &[Rule] = &[
    rule(D::V, "7", R::Diatonic, "V7 (ii-V)"),
    rule(D::V, "7b9", R::Diatonic, "V7♭9"),
    rule(D::V, "7alt", R::Diatonic, "V7alt"),
    rule(D::FlatII, "7", R::Substitution, "tritone sub of V"),
    rule(D::SharpIV, "dim7", R::Substitution, "dim approach to V"),
];

static MAJOR_TWO_RULES: &[Rule] = &[
    rule(D::V, "7", R::Secondary, "V/V resolves to V"),
    rule(D::II, "m7", R::Diatonic, "II7 → ii7"),
    rule(D::V, "7sus4", R::Secondary, "to V7sus"),
    rule(D::FlatVI, "7", R::Substitution, "tritone sub of V/V"),
];

static FLAT_THREE_RULES: &[Rule] = &[
    rule(D::FlatVI, "maj7", R::Modal, "to ♭VI"),
    rule(D::II, "m7", R::Diatonic, "chromatic descent to ii"),
    rule(D::IV, "maj7", R::Diatonic, "to IV"),
    rule(D::I, "maj7", R::Resolution, "back to I"),
];

static MINOR_THREE_RULES: &[Rule] = &[
    rule(D::VI, "7", R::Secondary, "V/ii (iii-VI-ii-V)"),
    rule(D::VI, "m7", R::Diatonic, "to vi"),
    rule(D::FlatIII, "m7", R::Substitution, "chromatic descent (♭iii7)"),
    rule(D::IV, "maj7", R::Diatonic, "to IV"),
];

static SHARP_FOUR_RULES: &[Rule] = &[
    rule(D::V, "7", R::Resolution, "#iv° → V"),
    rule(D::I, "maj7", R::Resolution, "to I"),
    rule(D::II, "m7", R::Diatonic, "to ii"),
];

static DOMINANT_RULES: &[Rule] = &[
    rule(D::I, "maj7", R::Resolution, "resolve to I"),
    rule(D::I, "", R::Resolution, "resolve to I (triad)"),
    rule(D::VI, "m7", R::Deceptive, "deceptive to vi"),
    rule(D::FlatVI, "maj7", R::Deceptive, "deceptive to ♭VI"),
    rule(D::IV, "maj7", R::Backdoor, "backdoor IV"),
    rule(D::II, "m7", R::Turnaround, "back to ii"),
    rule(D::FlatII, "7", R::Substitution, "tritone sub"),
];

static MAJOR_FOUR_RULES: &[Rule] = &[
    rule(D::IV, "m", R::Modal, "IV → iv"),
    rule(D::V, "7", R::Diatonic, "to dominant"),
    rule(D::I, "maj7", R::Plagal, "plagal to I"),
    rule(D::II, "m7", R::Diatonic, "to ii"),
    rule(D::FlatVII, "7", R::Modal, "backdoor dominant"),
];

static MINOR_FOUR_RULES: &[Rule] = &[
    rule(D::I, "maj7", R::Plagal, "minor plagal to I"),
    rule(D::V, "7", R::Diatonic, "to dominant"),
    rule(D::FlatVII, "7", R::Modal, "backdoor dominant"),
    rule(D::FlatVI, "maj7", R::Modal, "to ♭VI"),
];

static MINOR_SIX_RULES: &[Rule] = &[
    rule(D::II, "m7", R::Diatonic, "to ii"),
    rule(D::IV, "maj7", R::Diatonic, "to IV"),
    rule(D::V, "7", R::Diatonic, "to V"),
    rule(D::III, "7", R::Secondary, "V/vi (secondary dom)"),
];

static MAJOR_SIX_RULES: &[Rule] = &[
    rule(D::II, "m7", R::Secondary, "V/ii → ii"),
    rule(D::II, "7", R::Secondary, "to II7 (dominant chain)"),
    rule(D::FlatIII, "7", R::Substitution, "tritone sub of V/ii"),
];

static FLAT_SEVEN_RULES: &[Rule] = &[
    rule(D::I, "maj7", R::Resolution, "backdoor resolve"),
    rule(D::IV, "maj7", R::Diatonic, "to IV"),
    rule(D::FlatVI, "maj7", R::Modal, "to ♭VI"),
];

static FLAT_SIX_RULES: &[Rule] = &[
    rule(D::FlatVII, "7", R::Modal, "to ♭VII"),
    rule(D::V, "7", R::Diatonic, "to V"),
    rule(D::I, "maj7", R::Resolution, "to I"),
    rule(D::IV, "m7", R::Modal, "to iv"),
];

static FLAT_TWO_RULES: &[Rule] = &[
    rule(D::I, "maj7", R::Resolution, "resolve to I"),
    rule(D::FlatVI, "maj7", R::Deceptive, "deceptive to ♭VI"),
    rule(D::V, "7", R::Substitution, "V7 (original dom)"),
];

static ANY_RULES: &[Rule] = &[
    rule(D::II, "m7", R::Diatonic, "ii (reorient)"),
    rule(D::V, "7", R::Diatonic, "V7 (reorient)"),
    rule(D::I, "maj7", R::Resolution, "I (home)"),
    rule(D::IV, "maj7", R::Diatonic, "IV"),
    rule(D::FlatVII, "7", R::Modal, "♭VII"),
    rule(D::FlatVI, "maj7", R::Modal, "♭VI"),
];

/// A suggested continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NextChord {
    pub chord: Chord,
    pub category: RuleCategory,
    pub label: &'static str,
}

/// Rule-based continuations of `chord` in `key`, in rule order
pub fn next_chords(chord: &Chord, key: u8) -> Vec<NextChord> {
    let function = HarmonicFunction::classify(chord, key);
    function
        .rules()
        .iter()
        .map(|rule| NextChord {
            chord: Chord::new(rule.degree.root_in(key % 12) as i32, rule.quality),
            category: rule.category,
            label: rule.label,
        })
        .collect()
}

/// Starting material offered when nothing has been played yet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommonProgressions {
    pub diatonic: Vec<Chord>,
    pub dominants: Vec<Chord>,
    pub substitutions: Vec<Chord>,
}

impl CommonProgressions {
    /// Groups with their display names, in presentation order
    pub fn groups(&self) -> [(&'static str, &[Chord]); 3] {
        [
            ("diatonic", &self.diatonic),
            ("dominants", &self.dominants),
            ("substitutions", &self.substitutions),
        ]
    }
}

pub fn common_progressions(key: u8) -> CommonProgressions {
    let at = |offset: u8, quality: &str| Chord::new((key % 12 + offset) as i32, quality);
    CommonProgressions {
        diatonic: vec![
            at(0, "maj7"),
            at(2, "m7"),
            at(4, "m7"),
            at(5, "maj7"),
            at(7, "7"),
            at(9, "m7"),
        ],
        dominants: vec![
            at(7, "7"),
            at(7, "9"),
            at(7, "7b9"),
            at(7, "7#9"),
            at(7, "7alt"),
        ],
        substitutions: vec![
            at(1, "7"),
            at(10, "7"),
            at(3, "maj7"),
            at(8, "maj7"),
            at(5, "m7"),
            at(6, "dim7"),
            at(1, "maj7"),
        ],
    }
}

/// Qualities the random generator draws from
pub const RANDOM_QUALITIES: [&str; 9] = ["maj7", "m7", "7", "m7b5", "dim7", "9", "m9", "7b9", "7#9"];

/// `count` chords with uniform roots and qualities from [`RANDOM_QUALITIES`]
pub fn random_chords(count: usize) -> Vec<Chord> {
    random_chords_with(&mut rand::thread_rng(), count)
}

pub fn random_chords_with<G: Rng>(rng: &mut G, count: usize) -> Vec<Chord> {
    (0..count)
        .map(|_| {
            let root = rng.gen_range(0..12);
            let quality = RANDOM_QUALITIES[rng.gen_range(0..RANDOM_QUALITIES.len())];
            Chord::new(root, quality)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn function_of(root: i32, quality: &str, key: u8) -> &'static str {
        HarmonicFunction::classify(&Chord::new(root, quality), key).label()
    }

    #[test]
    fn test_function_labels_in_c() {
        assert_eq!(function_of(0, "maj7", 0), "I");
        assert_eq!(function_of(0, "m7", 0), "I");
        assert_eq!(function_of(1, "7", 0), "bII");
        assert_eq!(function_of(2, "m7", 0), "ii");
        assert_eq!(function_of(2, "7", 0), "II");
        assert_eq!(function_of(3, "maj7", 0), "bIII");
        assert_eq!(function_of(4, "m7", 0), "iii");
        assert_eq!(function_of(5, "m6", 0), "iv");
        assert_eq!(function_of(5, "maj7", 0), "IV");
        assert_eq!(function_of(6, "dim7", 0), "#iv");
        assert_eq!(function_of(7, "13", 0), "V");
        assert_eq!(function_of(8, "maj7", 0), "bVI");
        assert_eq!(function_of(9, "m9", 0), "vi");
        assert_eq!(function_of(9, "7b9", 0), "VI");
        assert_eq!(function_of(10, "7", 0), "bVII");
    }

    #[test]
    fn test_unmatched_combinations_fall_back_to_any() {
        assert_eq!(function_of(1, "maj7", 0), "any");
        assert_eq!(function_of(4, "maj7", 0), "any");
        assert_eq!(function_of(6, "m7b5", 0), "any");
        assert_eq!(function_of(11, "m7b5", 0), "any");
    }

    #[test]
    fn test_maj_qualities_are_not_minor_functions() {
        // ii with a major-seventh quality is neither ii nor II
        assert_eq!(function_of(2, "maj7", 0), "any");
        assert_eq!(function_of(9, "maj9", 0), "any");
    }

    #[test]
    fn test_function_is_relative_to_key() {
        // Bb7 in Eb is the dominant
        assert_eq!(function_of(10, "7", 3), "V");
        // F-7 in Eb is ii
        assert_eq!(function_of(5, "m7", 3), "ii");
    }

    #[test]
    fn test_degree_roots_accept_any_key_byte() {
        assert_eq!(ScaleDegree::V.root_in(0), 7);
        assert_eq!(ScaleDegree::VII.root_in(255), 2);
        assert_eq!(ScaleDegree::II.root_in(250), 0);
    }

    #[test]
    fn test_next_chords_follow_rule_order() {
        let dm7 = Chord::new(2, "m7");
        let next: Vec<String> = next_chords(&dm7, 0)
            .iter()
            .map(|n| n.chord.encode())
            .collect();
        assert_eq!(next, vec!["7:7", "7:7b9", "7:7alt", "1:7", "6:dim7"]);

        let again: Vec<String> = next_chords(&dm7, 0)
            .iter()
            .map(|n| n.chord.encode())
            .collect();
        assert_eq!(next, again);
    }

    #[test]
    fn test_next_chords_transpose_with_key() {
        // G7 in F is II: V/V goes to C7
        let next = next_chords(&Chord::new(7, "7"), 5);
        assert_eq!(next[0].chord, Chord::new(0, "7"));
        assert_eq!(next[0].category, RuleCategory::Secondary);

        let tonic = next_chords(&Chord::new(5, "maj7"), 5);
        assert_eq!(tonic.len(), 14);
        assert_eq!(tonic[0].chord, Chord::new(7, "m7"));
        assert_eq!(tonic[0].label, "ii-V setup");
    }

    #[test]
    fn test_every_function_has_rules() {
        let all = [
            HarmonicFunction::Tonic,
            HarmonicFunction::FlatTwo,
            HarmonicFunction::MinorTwo,
            HarmonicFunction::MajorTwo,
            HarmonicFunction::FlatThree,
            HarmonicFunction::MinorThree,
            HarmonicFunction::MinorFour,
            HarmonicFunction::MajorFour,
            HarmonicFunction::SharpFourDiminished,
            HarmonicFunction::Dominant,
            HarmonicFunction::FlatSix,
            HarmonicFunction::MinorSix,
            HarmonicFunction::MajorSix,
            HarmonicFunction::FlatSeven,
            HarmonicFunction::Any,
        ];
        for function in all {
            assert!(!function.rules().is_empty(), "{} has no rules", function);
            for rule in function.rules() {
                assert!(
                    Quality::lookup(rule.quality).is_some(),
                    "{} rule uses unknown quality {:?}",
                    function,
                    rule.quality
                );
            }
        }
    }

    #[test]
    fn test_common_progressions_in_bb() {
        let common = common_progressions(10);
        assert_eq!(common.diatonic[0], Chord::new(10, "maj7"));
        assert_eq!(common.diatonic[4], Chord::new(5, "7"));
        assert!(common.dominants.iter().all(|c| c.root() == 5));
        assert_eq!(common.substitutions[0], Chord::new(11, "7"));
        assert_eq!(common.substitutions.len(), 7);
        assert_eq!(common.groups()[1].0, "dominants");
    }

    #[test]
    fn test_random_chords_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        let chords = random_chords_with(&mut rng, 25);
        assert_eq!(chords.len(), 25);
        for chord in &chords {
            assert!(chord.root() < 12);
            assert!(RANDOM_QUALITIES.contains(&chord.quality_key()));
        }
        assert!(random_chords(0).is_empty());
        assert_eq!(random_chords(6).len(), 6);
    }
}
