//! Chord-symbol text to [`Chord`]
//!
//! Lead-sheet spellings vary wildly (`C-7`, `Cmin7`, `CΔ`, `Bø`...). Parsing
//! goes through three stages: an alias table, an exact table-key match, and
//! finally an ordered longest-prefix simplification so that `C7b9(#11)/E`
//! still lands on something playable. Anything unrecognised after a valid
//! root is a major triad.

use crate::types::note::{parse_pitch_class, split_note_name};
use crate::types::{Chord, Quality};

/// Alternative spellings mapped onto table keys
const ALIASES: &[(&str, &str)] = &[
    ("0", "dim"),
    ("07", "dim7"),
    ("o", "dim"),
    ("o7", "dim7"),
    ("°", "dim"),
    ("°7", "dim7"),
    ("ø", "m7b5"),
    ("ø7", "m7b5"),
    ("+", "aug"),
    ("+7", "7#5"),
    ("Δ", "maj7"),
    ("Δ7", "maj7"),
    ("Δ9", "maj9"),
    ("-", "m"),
    ("-7", "m7"),
    ("-9", "m9"),
    ("-11", "m11"),
    ("-6", "m6"),
    ("m/maj7", "mMaj7"),
    ("minmaj7", "mMaj7"),
    ("mmaj7", "mMaj7"),
    ("min", "m"),
    ("min7", "m7"),
    ("min9", "m9"),
    ("min11", "m11"),
    ("min6", "m6"),
    ("M7", "maj7"),
    ("M9", "maj9"),
    ("M13", "maj13"),
    ("maj", ""),
    ("dom7", "7"),
    ("dom9", "9"),
    ("dom13", "13"),
];

/// Qualities that only match when the whole suffix is exactly this text
const EXACT: &[(&str, &str)] = &[("m", "m"), ("0", "dim"), ("sus", "sus")];

/// Checked in order; more specific prefixes come first
const PREFIXES: &[(&str, &str)] = &[
    ("maj13", "maj13"),
    ("maj9#11", "maj9#11"),
    ("maj9", "maj9"),
    ("maj7#11", "maj7#11"),
    ("maj7#5", "maj7#5"),
    ("maj7", "maj7"),
    ("m7b5", "m7b5"),
    ("m69", "m69"),
    ("m6", "m6"),
    ("m11", "m11"),
    ("m9", "m9"),
    ("m7", "m7"),
    ("13#11", "13#11"),
    ("13#9", "13#9"),
    ("13b9", "13b9"),
    ("13sus", "13sus"),
    ("13", "13"),
    ("11", "11"),
    ("9#11", "9#11"),
    ("9#5", "9#5"),
    ("9b5", "9b5"),
    ("9sus", "9sus"),
    ("9", "9"),
    ("7b9b13", "7b9b13"),
    ("7b9#11", "7b9#11"),
    ("7b9#5", "7b9#5"),
    ("7b9sus", "7b9sus"),
    ("7b9", "7b9"),
    ("7#9#11", "7#9#11"),
    ("7#9", "7#9"),
    ("7#11", "7#11"),
    ("7b13sus", "7b13sus"),
    ("7b13", "7b13"),
    ("7b5#9", "7b5#9"),
    ("7b5b9", "7b5b9"),
    ("7b5", "7b5"),
    ("7#5#9", "7#5#9"),
    ("7#5", "7#5"),
    ("7alt", "7alt"),
    ("7sus", "7sus"),
    ("7", "7"),
    ("69", "69"),
    ("6", "6"),
    ("07", "dim7"),
    ("aug", "aug"),
    ("add9", "add9"),
    ("sus4", "sus4"),
    ("sus2", "sus2"),
];

fn lookup(table: &[(&str, &'static str)], text: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == text).map(|(_, v)| *v)
}

/// Reduce an arbitrary quality suffix to a table key
pub fn simplify_quality(quality: &str) -> &'static str {
    if let Some(key) = lookup(EXACT, quality) {
        return key;
    }
    PREFIXES
        .iter()
        .find(|(prefix, _)| quality.starts_with(prefix))
        .map(|(_, key)| *key)
        .unwrap_or("")
}

/// Resolve a quality suffix (without root) to a table quality
pub fn parse_quality(suffix: &str) -> &'static Quality {
    let suffix = suffix.trim();
    let key = lookup(ALIASES, suffix).unwrap_or(suffix);
    Quality::lookup(key).unwrap_or_else(|| Quality::resolve(simplify_quality(key)))
}

/// Parse a lead-sheet chord symbol such as `Ebm7`, `G7b9/B` or `(Dm7)`.
///
/// Returns `None` for "no chord" markers and text without a recognisable
/// root; never fails otherwise.
pub fn parse_chord_symbol(symbol: &str) -> Option<Chord> {
    let mut text = symbol.trim();
    if text.is_empty() || text == "NC" || text == "N.C." {
        return None;
    }
    text = text.strip_prefix('(').unwrap_or(text);
    if let Some((head, _)) = text.split_once('(') {
        text = head;
    }

    if !matches!(text.chars().next(), Some('A'..='G')) {
        return None;
    }
    let (root, consumed) = split_note_name(text)?;

    let mut quality = &text[consumed..];
    if let Some((head, _)) = quality.split_once('/') {
        quality = head;
    }

    Some(Chord::with_quality(root as i32, parse_quality(quality)))
}

/// Verbose quality words used by external note-set classifiers
const VERBOSE_QUALITIES: &[(&str, &str)] = &[
    ("major", ""),
    ("minor", "m"),
    ("major-seventh", "maj7"),
    ("minor-seventh", "m7"),
    ("dominant-seventh", "7"),
    ("minor-seventh-flat-five", "m7b5"),
    ("half-diminished-seventh", "m7b5"),
    ("diminished-seventh", "dim7"),
    ("diminished", "dim"),
    ("augmented", "aug"),
    ("major-ninth", "maj9"),
    ("minor-ninth", "m9"),
    ("dominant-ninth", "9"),
    ("major-sixth", "6"),
    ("minor-sixth", "m6"),
    ("suspended-fourth", "sus4"),
    ("suspended-second", "sus2"),
    ("seventh-suspended-fourth", "7sus4"),
    ("dominant-seventh-sharp-nine", "7#9"),
    ("dominant-seventh-flat-nine", "7b9"),
    ("dominant-seventh-sharp-five", "7#5"),
    ("dominant-seventh-flat-five", "7b5"),
    ("major-thirteenth", "maj13"),
    ("dominant-thirteenth", "13"),
    ("minor-eleventh", "m11"),
    ("dominant-eleventh", "11"),
];

/// Parse names of the form `Root-quality-words`, e.g. `F#-minor-seventh`.
/// Unknown quality words give a major triad on the parsed root.
pub fn parse_verbose_chord_name(name: &str) -> Option<Chord> {
    let (root, words) = name.trim().split_once('-')?;
    let root = parse_pitch_class(root)?;
    let key = lookup(VERBOSE_QUALITIES, words).unwrap_or("");
    Some(Chord::new(root as i32, key))
}

fn looks_verbose(name: &str) -> bool {
    name.split_once('-').is_some_and(|(_, words)| {
        !words.is_empty() && words.chars().all(|c| c.is_ascii_lowercase() || c == '-')
    })
}

/// Accept either a verbose name (`C-major-seventh`) or a lead-sheet symbol (`C-7`)
pub fn parse_chord_name(name: &str) -> Option<Chord> {
    let name = name.trim();
    if looks_verbose(name) {
        parse_verbose_chord_name(name)
    } else {
        parse_chord_symbol(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(symbol: &str) -> Option<String> {
        parse_chord_symbol(symbol).map(|c| c.encode())
    }

    #[test]
    fn test_plain_symbols() {
        assert_eq!(parsed("C"), Some("0:".to_string()));
        assert_eq!(parsed("Ebm7"), Some("3:m7".to_string()));
        assert_eq!(parsed("F#7#9"), Some("6:7#9".to_string()));
        assert_eq!(parsed("Bbmaj7"), Some("10:maj7".to_string()));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parsed("D-7"), Some("2:m7".to_string()));
        assert_eq!(parsed("Bø"), Some("11:m7b5".to_string()));
        assert_eq!(parsed("CΔ"), Some("0:maj7".to_string()));
        assert_eq!(parsed("Ao7"), Some("9:dim7".to_string()));
        assert_eq!(parsed("Gmin9"), Some("7:m9".to_string()));
        assert_eq!(parsed("EM7"), Some("4:maj7".to_string()));
    }

    #[test]
    fn test_slashes_and_parentheses_are_dropped() {
        assert_eq!(parsed("G7b9/B"), Some("7:7b9".to_string()));
        assert_eq!(parsed("(Dm7)"), Some("2:m7".to_string()));
        assert_eq!(parsed("C7(#11)"), Some("0:7".to_string()));
    }

    #[test]
    fn test_prefix_simplification() {
        assert_eq!(parsed("Cmaj7sus2"), Some("0:maj7".to_string()));
        assert_eq!(parsed("F13add11"), Some("5:13".to_string()));
        assert_eq!(parsed("Dm7add11"), Some("2:m7".to_string()));
        assert_eq!(parsed("Cfoo"), Some("0:".to_string()));
    }

    #[test]
    fn test_no_chord_markers() {
        assert_eq!(parsed("NC"), None);
        assert_eq!(parsed("N.C."), None);
        assert_eq!(parsed(""), None);
        assert_eq!(parsed("x7"), None);
        assert_eq!(parsed("bb7"), None);
    }

    #[test]
    fn test_verbose_names() {
        assert_eq!(
            parse_verbose_chord_name("F#-minor-seventh"),
            Some(Chord::new(6, "m7"))
        );
        assert_eq!(
            parse_verbose_chord_name("Bb-dominant-seventh-flat-nine"),
            Some(Chord::new(10, "7b9"))
        );
        assert_eq!(parse_verbose_chord_name("D-mystery"), Some(Chord::new(2, "")));
        assert_eq!(parse_verbose_chord_name("Cmaj7"), None);
        assert_eq!(parse_verbose_chord_name("Q-major"), None);
    }

    #[test]
    fn test_name_dispatch() {
        assert_eq!(parse_chord_name("D-7"), Some(Chord::new(2, "m7")));
        assert_eq!(parse_chord_name("D-minor-seventh"), Some(Chord::new(2, "m7")));
        assert_eq!(parse_chord_name("E-"), Some(Chord::new(4, "m")));
        assert_eq!(parse_chord_name("N.C."), None);
    }
}
