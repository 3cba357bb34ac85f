//! Statistical next-chord prediction with n-gram back-off
//!
//! Windows of recent chords are encoded relative to the first chord of the
//! window (`"0:m7|5:7"`), so one table entry serves every key. Lookup runs
//! from the longest context down to the bigram table until enough
//! continuations have been collected.

use crate::types::{Chord, Quality};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Continuations of one context: `(encoded chord, count)` by descending count
pub type Continuations = Vec<(String, u32)>;

/// Which table a prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NgramOrder {
    #[cfg_attr(feature = "serde", serde(rename = "2-gram"))]
    Bigram,
    #[cfg_attr(feature = "serde", serde(rename = "3-gram"))]
    Trigram,
    #[cfg_attr(feature = "serde", serde(rename = "4-gram"))]
    Fourgram,
    #[cfg_attr(feature = "serde", serde(rename = "5-gram"))]
    Fivegram,
}

impl NgramOrder {
    /// Longest first, the order lookups back off in
    pub const BACK_OFF: [NgramOrder; 4] = [
        NgramOrder::Fivegram,
        NgramOrder::Fourgram,
        NgramOrder::Trigram,
        NgramOrder::Bigram,
    ];

    /// Chords of context the table is keyed on
    pub fn context_len(&self) -> usize {
        match self {
            NgramOrder::Bigram => 1,
            NgramOrder::Trigram => 2,
            NgramOrder::Fourgram => 3,
            NgramOrder::Fivegram => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NgramOrder::Bigram => "2-gram",
            NgramOrder::Trigram => "3-gram",
            NgramOrder::Fourgram => "4-gram",
            NgramOrder::Fivegram => "5-gram",
        }
    }

    fn from_context_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(NgramOrder::Bigram),
            2 => Some(NgramOrder::Trigram),
            3 => Some(NgramOrder::Fourgram),
            4 => Some(NgramOrder::Fivegram),
            _ => None,
        }
    }
}

impl std::fmt::Display for NgramOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Spellings collapsed onto one token for table keys
const CANONICAL: &[(&str, &str)] = &[
    ("", "maj"),
    ("min", "m"),
    ("-", "m"),
    ("-7", "m7"),
    ("M7", "maj7"),
    ("Δ7", "maj7"),
    ("Δ", "maj7"),
    ("M9", "maj9"),
    ("Δ9", "maj9"),
    ("M13", "maj13"),
    ("o7", "dim7"),
    ("°7", "dim7"),
    ("07", "dim7"),
    ("o", "dim"),
    ("°", "dim"),
    ("0", "dim"),
    ("+7", "7#5"),
    ("aug7", "7#5"),
    ("+", "aug"),
    ("ø", "m7b5"),
    ("ø7", "m7b5"),
];

/// Canonical n-gram token for a quality spelling
pub fn canonical_quality(quality: &str) -> String {
    let stripped = match (quality.find('('), quality.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{}", &quality[..open], &quality[close + 1..])
        }
        _ => quality.to_string(),
    };
    CANONICAL
        .iter()
        .find(|(spelling, _)| *spelling == stripped)
        .map(|(_, token)| token.to_string())
        .unwrap_or(stripped)
}

/// Table quality for a canonical token; unknown tokens give the major triad
pub fn decode_quality(token: &str) -> &'static Quality {
    match token {
        "maj" => Quality::major(),
        "aug7" => Quality::resolve("7#5"),
        other => Quality::resolve(other),
    }
}

/// `"<interval>:<token>|..."` for a window of chords against `base`
pub fn window_key(chords: &[Chord], base: u8) -> String {
    chords
        .iter()
        .map(|c| relative_token(c, base))
        .collect::<Vec<_>>()
        .join("|")
}

fn relative_token(chord: &Chord, base: u8) -> String {
    let interval = (chord.root() + 12 - base % 12) % 12;
    format!("{}:{}", interval, canonical_quality(chord.quality_key()))
}

/// Turn a stored continuation back into an absolute chord
fn decode_continuation(encoded: &str, base: u8) -> Option<Chord> {
    let (interval, token) = encoded.split_once(':')?;
    let interval: i32 = interval.trim().parse().ok()?;
    Some(Chord::with_quality(
        base as i32 + interval.rem_euclid(12),
        decode_quality(token),
    ))
}

/// One predicted continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Prediction {
    pub chord: Chord,
    pub count: u32,
    pub source: NgramOrder,
}

/// Observed continuation counts, read-only once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NgramTable {
    #[cfg_attr(feature = "serde", serde(default))]
    pub bigrams: BTreeMap<String, Continuations>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigrams: BTreeMap<String, Continuations>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fourgrams: BTreeMap<String, Continuations>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fivegrams: BTreeMap<String, Continuations>,
}

#[cfg(feature = "serde")]
const BUILTIN_TABLE: &str = include_str!("../../data/ngrams.json");

impl NgramTable {
    pub fn table(&self, order: NgramOrder) -> &BTreeMap<String, Continuations> {
        match order {
            NgramOrder::Bigram => &self.bigrams,
            NgramOrder::Trigram => &self.trigrams,
            NgramOrder::Fourgram => &self.fourgrams,
            NgramOrder::Fivegram => &self.fivegrams,
        }
    }

    fn table_mut(&mut self, order: NgramOrder) -> &mut BTreeMap<String, Continuations> {
        match order {
            NgramOrder::Bigram => &mut self.bigrams,
            NgramOrder::Trigram => &mut self.trigrams,
            NgramOrder::Fourgram => &mut self.fourgrams,
            NgramOrder::Fivegram => &mut self.fivegrams,
        }
    }

    /// Number of contexts across all four tables
    pub fn len(&self) -> usize {
        NgramOrder::BACK_OFF.iter().map(|o| self.table(*o).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The small table of common jazz idioms shipped with the crate
    #[cfg(feature = "serde")]
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_TABLE) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("built-in n-gram table unusable: {:#}", e);
                Self::default()
            }
        }
    }

    #[cfg(not(feature = "serde"))]
    pub fn builtin() -> Self {
        Self::default()
    }

    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        serde_json::from_str(text).context("n-gram table is not a valid JSON document")
    }

    /// Count every 2- to 5-gram in the given chord sequences
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[Chord]>,
    {
        let mut counts: HashMap<(NgramOrder, String), HashMap<String, u32>> = HashMap::new();
        for sequence in sequences {
            let chords = sequence.as_ref();
            for n in 2..=5 {
                for window in chords.windows(n) {
                    let (context, next) = window.split_at(n - 1);
                    let Some(order) = NgramOrder::from_context_len(context.len()) else {
                        continue;
                    };
                    let base = context[0].root();
                    let entry = counts
                        .entry((order, window_key(context, base)))
                        .or_default()
                        .entry(relative_token(&next[0], base))
                        .or_default();
                    *entry += 1;
                }
            }
        }

        let mut table = NgramTable::default();
        for ((order, key), continuations) in counts {
            let mut list: Continuations = continuations.into_iter().collect();
            list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            table.table_mut(order).insert(key, list);
        }
        table
    }

    /// Predict up to `limit` continuations of `history` (oldest first).
    ///
    /// Longer contexts are consulted first. A chord is reported at most once
    /// and never equals the last chord of the history.
    pub fn predict(&self, history: &[Chord], limit: usize) -> Vec<Prediction> {
        let mut results = Vec::new();
        let Some(last) = history.last() else {
            return results;
        };
        let mut seen: HashSet<Chord> = HashSet::from([*last]);

        for order in NgramOrder::BACK_OFF {
            if results.len() >= limit {
                break;
            }
            let n = order.context_len();
            if history.len() < n {
                continue;
            }
            let window = &history[history.len() - n..];
            let base = window[0].root();
            let key = window_key(window, base);
            let Some(continuations) = self.table(order).get(&key) else {
                tracing::debug!(order = order.label(), %key, "no n-gram entry");
                continue;
            };
            tracing::debug!(
                order = order.label(),
                %key,
                candidates = continuations.len(),
                "n-gram hit"
            );

            for (encoded, count) in continuations {
                if results.len() >= limit {
                    break;
                }
                let Some(chord) = decode_continuation(encoded, base) else {
                    tracing::debug!(%encoded, "skipping malformed continuation");
                    continue;
                };
                if seen.insert(chord) {
                    results.push(Prediction {
                        chord,
                        count: *count,
                        source: order,
                    });
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chords(list: &[(i32, &str)]) -> Vec<Chord> {
        list.iter().map(|(r, q)| Chord::new(*r, q)).collect()
    }

    fn two_five_table() -> NgramTable {
        let mut table = NgramTable::default();
        table.bigrams.insert(
            "0:7".to_string(),
            vec![
                ("5:maj7".to_string(), 40),
                ("5:maj".to_string(), 12),
                ("0:7".to_string(), 9),
                ("11:7".to_string(), 3),
            ],
        );
        table.trigrams.insert(
            "0:m7|5:7".to_string(),
            vec![("10:maj7".to_string(), 25), ("10:m7".to_string(), 4)],
        );
        table
    }

    #[test]
    fn test_canonical_vocabulary() {
        assert_eq!(canonical_quality(""), "maj");
        assert_eq!(canonical_quality("M7"), "maj7");
        assert_eq!(canonical_quality("Δ7"), "maj7");
        assert_eq!(canonical_quality("maj7"), "maj7");
        assert_eq!(canonical_quality("o7"), "dim7");
        assert_eq!(canonical_quality("°7"), "dim7");
        assert_eq!(canonical_quality("dim7"), "dim7");
        assert_eq!(canonical_quality("7(b9)"), "7");
        assert_eq!(canonical_quality("13b9"), "13b9");
        // augmented sevenths keep the chart spelling used by stored tables
        assert_eq!(canonical_quality("7#5"), "7#5");
        assert_eq!(canonical_quality("+7"), "7#5");
        assert_eq!(canonical_quality("aug7"), "7#5");
    }

    #[test]
    fn test_decode_tokens() {
        assert_eq!(decode_quality("maj").key, "");
        assert_eq!(decode_quality("aug7").key, "7#5");
        assert_eq!(decode_quality("m7b5").key, "m7b5");
        assert_eq!(decode_quality("weird").key, "");
    }

    #[test]
    fn test_window_key_is_relative_to_first_chord() {
        let window = chords(&[(7, "m7"), (0, "7"), (5, "")]);
        assert_eq!(window_key(&window, 7), "0:m7|5:7|10:maj");
    }

    #[test]
    fn test_bigram_predictions_are_transposed() {
        let table = two_five_table();
        // A7 alone: bigram continuations land on D
        let predictions = table.predict(&chords(&[(9, "7")]), 8);
        let got: Vec<(String, u32, NgramOrder)> = predictions
            .iter()
            .map(|p| (p.chord.encode(), p.count, p.source))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2:maj7".to_string(), 40, NgramOrder::Bigram),
                ("2:".to_string(), 12, NgramOrder::Bigram),
                ("8:7".to_string(), 3, NgramOrder::Bigram),
            ]
        );
    }

    #[test]
    fn test_back_off_prefers_longer_context() {
        let table = two_five_table();
        // Gm7 C7 in F: trigram first, then bigram fills the rest
        let predictions = table.predict(&chords(&[(7, "m7"), (0, "7")]), 3);
        let got: Vec<(String, NgramOrder)> = predictions
            .iter()
            .map(|p| (p.chord.encode(), p.source))
            .collect();
        assert_eq!(
            got,
            vec![
                ("5:maj7".to_string(), NgramOrder::Trigram),
                ("5:m7".to_string(), NgramOrder::Trigram),
                ("5:".to_string(), NgramOrder::Bigram),
            ]
        );
    }

    #[test]
    fn test_predictions_skip_duplicates_and_the_current_chord() {
        let table = two_five_table();
        let predictions = table.predict(&chords(&[(2, "m7"), (7, "7")]), 10);
        let keys: Vec<String> = predictions.iter().map(|p| p.chord.encode()).collect();
        // 0:maj7 is offered by both tables but reported once; G7 itself never
        assert_eq!(keys, vec!["0:maj7", "0:m7", "0:", "6:7"]);
    }

    #[test]
    fn test_out_of_range_intervals_wrap() {
        let mut table = NgramTable::default();
        table.bigrams.insert(
            "0:7".to_string(),
            vec![
                ("2147483647:m7".to_string(), 3),
                ("-7:maj7".to_string(), 2),
                ("99999999999:7".to_string(), 1),
            ],
        );
        let predictions = table.predict(&chords(&[(7, "7")]), 8);
        let keys: Vec<String> = predictions.iter().map(|p| p.chord.encode()).collect();
        // 2^31 - 1 is 7 mod 12; the last entry does not fit an i32 and is skipped
        assert_eq!(keys, vec!["2:m7", "0:maj7"]);
    }

    #[test]
    fn test_augmented_seventh_matches_stored_spelling() {
        let mut table = NgramTable::default();
        table
            .bigrams
            .insert("0:7#5".to_string(), vec![("5:maj7".to_string(), 4)]);
        let predictions = table.predict(&chords(&[(7, "7#5")]), 1);
        assert_eq!(predictions[0].chord, Chord::new(0, "maj7"));
    }

    #[test]
    fn test_back_off_from_five_and_four_gram_contexts() {
        let mut table = two_five_table();
        // iii VI ii V, relative to the iii
        table.fivegrams.insert(
            "0:m7|5:7|10:m7|3:7".to_string(),
            vec![("8:maj7".to_string(), 6)],
        );
        // VI ii V, relative to the VI
        table.fourgrams.insert(
            "0:7|5:m7|10:7".to_string(),
            vec![("3:maj7".to_string(), 5), ("3:6".to_string(), 2)],
        );

        // Em7 A7 Dm7 G7 in C
        let history = chords(&[(4, "m7"), (9, "7"), (2, "m7"), (7, "7")]);
        let predictions = table.predict(&history, 5);
        let got: Vec<(String, NgramOrder)> = predictions
            .iter()
            .map(|p| (p.chord.encode(), p.source))
            .collect();
        assert_eq!(
            got,
            vec![
                ("0:maj7".to_string(), NgramOrder::Fivegram),
                ("0:6".to_string(), NgramOrder::Fourgram),
                ("0:m7".to_string(), NgramOrder::Trigram),
                ("0:".to_string(), NgramOrder::Bigram),
                ("6:7".to_string(), NgramOrder::Bigram),
            ]
        );

        // same progression a tone higher: the window base moves with it
        let up = chords(&[(6, "m7"), (11, "7"), (4, "m7"), (9, "7")]);
        let first = table.predict(&up, 1);
        assert_eq!(first[0].chord, Chord::new(2, "maj7"));
        assert_eq!(first[0].source, NgramOrder::Fivegram);
    }

    #[test]
    fn test_missing_five_gram_falls_to_four_gram() {
        let mut table = NgramTable::default();
        table.fourgrams.insert(
            "0:7|5:m7|10:7".to_string(),
            vec![("3:maj7".to_string(), 5)],
        );
        // the 5-gram context (Bbmaj7 A7 Dm7 G7) has no entry
        let history = chords(&[(10, "maj7"), (9, "7"), (2, "m7"), (7, "7")]);
        let predictions = table.predict(&history, 3);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].chord, Chord::new(0, "maj7"));
        assert_eq!(predictions[0].source, NgramOrder::Fourgram);
    }

    #[test]
    fn test_empty_history_and_zero_limit() {
        let table = two_five_table();
        assert!(table.predict(&[], 8).is_empty());
        assert!(table.predict(&chords(&[(7, "7")]), 0).is_empty());
    }

    #[test]
    fn test_from_sequences_counts_windows() {
        let songs = vec![
            chords(&[(2, "m7"), (7, "7"), (0, "maj7")]),
            chords(&[(9, "m7"), (2, "7"), (7, "maj7")]),
            chords(&[(9, "m7"), (2, "7"), (7, "")]),
        ];
        let table = NgramTable::from_sequences(&songs);
        assert_eq!(
            table.trigrams.get("0:m7|5:7"),
            Some(&vec![("10:maj7".to_string(), 2), ("10:maj".to_string(), 1)])
        );
        assert_eq!(
            table.bigrams.get("0:m7"),
            Some(&vec![("5:7".to_string(), 3)])
        );
        assert!(table.fourgrams.is_empty());

        let long = vec![
            chords(&[(4, "m7"), (9, "7"), (2, "m7"), (7, "7"), (0, "maj7")]),
            chords(&[(6, "m7"), (11, "7"), (4, "m7"), (9, "7"), (2, "")]),
        ];
        let long_table = NgramTable::from_sequences(&long);
        assert_eq!(
            long_table.fivegrams.get("0:m7|5:7|10:m7|3:7"),
            Some(&vec![("8:maj".to_string(), 1), ("8:maj7".to_string(), 1)])
        );
        assert_eq!(
            long_table.fourgrams.get("0:7|5:m7|10:7"),
            Some(&vec![("3:maj".to_string(), 1), ("3:maj7".to_string(), 1)])
        );

        // what was counted can be predicted back
        let predictions = table.predict(&chords(&[(4, "m7"), (9, "7")]), 1);
        assert_eq!(predictions[0].chord, Chord::new(2, "maj7"));
        assert_eq!(predictions[0].source, NgramOrder::Trigram);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_builtin_table_loads() {
        let table = NgramTable::builtin();
        assert!(!table.is_empty());
        assert!(table.bigrams.contains_key("0:m7"));
        let predictions = table.predict(&chords(&[(2, "m7"), (7, "7")]), 4);
        assert!(!predictions.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() {
        let table = NgramTable::from_json(r#"{"bigrams": {"0:m7": [["5:7", 3]]}}"#).unwrap();
        assert_eq!(table.bigrams["0:m7"], vec![("5:7".to_string(), 3)]);
        assert!(table.trigrams.is_empty());
        assert!(NgramTable::from_json("[1, 2]").is_err());
    }
}
