//! Chord detection from unordered note sets
//!
//! [`detect`] is the built-in template matcher. It is exposed through the
//! [`ChordClassifier`] trait together with an adapter for external namers,
//! and [`ClassifierChain`] tries them in priority order.

use crate::parser::symbol::parse_chord_name;
use crate::types::note::MidiNote;
use crate::types::{Chord, Quality};
use num_rational::Ratio;
use num_traits::{ToPrimitive, Zero};

/// Best template match for a note set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub chord: Chord,
    /// Shared intervals over the larger of the two interval-set sizes
    pub score: Ratio<u32>,
}

impl Detection {
    pub fn confidence(&self) -> f64 {
        self.score.to_f64().unwrap_or(0.0)
    }
}

fn unique_pitch_classes(notes: &[u8]) -> Vec<u8> {
    let mut set = Vec::with_capacity(notes.len());
    for pc in notes.iter().map(|n| n % 12) {
        if !set.contains(&pc) {
            set.push(pc);
        }
    }
    set
}

fn score_quality(intervals: &[u8], quality: &Quality) -> Ratio<u32> {
    let template: Vec<u8> = quality.reduced_intervals().collect();
    let matches = intervals.iter().filter(|i| template.contains(i)).count();
    let size = intervals.len().max(template.len());
    Ratio::new(matches as u32, size as u32)
}

fn best_quality(intervals: &[u8]) -> (&'static Quality, Ratio<u32>) {
    let mut best: Option<(&'static Quality, Ratio<u32>)> = None;
    for quality in Quality::all() {
        let score = score_quality(intervals, quality);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((quality, score));
        }
    }
    best.unwrap_or((Quality::major(), Ratio::zero()))
}

/// Detect with score. Candidate roots are tried in input order and qualities in
/// table order; only a strictly better score replaces the current best.
pub fn detect_scored(pitch_classes: &[u8]) -> Option<Detection> {
    let set = unique_pitch_classes(pitch_classes);
    let mut best: Option<Detection> = None;

    for &root in &set {
        let mut intervals: Vec<u8> = set.iter().map(|pc| (pc + 12 - root) % 12).collect();
        intervals.sort_unstable();

        let (quality, score) = best_quality(&intervals);
        tracing::trace!(root, quality = quality.key, %score, "detect candidate");
        if best.is_none_or(|b| score > b.score) {
            best = Some(Detection {
                chord: Chord::with_quality(root as i32, quality),
                score,
            });
        }
    }

    best
}

/// Best-fitting chord for a set of pitch classes (or MIDI notes); `None` when empty
pub fn detect(pitch_classes: &[u8]) -> Option<Chord> {
    detect_scored(pitch_classes).map(|d| d.chord)
}

/// Something that can name the chord formed by a set of absolute notes
pub trait ChordClassifier {
    /// Short source label reported alongside results
    fn name(&self) -> &str;

    fn classify(&self, notes: &[MidiNote]) -> Option<Chord>;
}

/// The built-in template matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateClassifier;

impl ChordClassifier for TemplateClassifier {
    fn name(&self) -> &str {
        "template"
    }

    fn classify(&self, notes: &[MidiNote]) -> Option<Chord> {
        detect(notes)
    }
}

/// Adapter for an external namer that returns chord-name text
pub struct SymbolClassifier<F>
where
    F: Fn(&[MidiNote]) -> Option<String>,
{
    name: String,
    namer: F,
}

impl<F> SymbolClassifier<F>
where
    F: Fn(&[MidiNote]) -> Option<String>,
{
    pub fn new(name: impl Into<String>, namer: F) -> Self {
        SymbolClassifier {
            name: name.into(),
            namer,
        }
    }
}

impl<F> ChordClassifier for SymbolClassifier<F>
where
    F: Fn(&[MidiNote]) -> Option<String>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, notes: &[MidiNote]) -> Option<Chord> {
        let label = (self.namer)(notes)?;
        let chord = parse_chord_name(&label);
        if chord.is_none() {
            tracing::debug!(source = %self.name, label = %label, "unusable chord label");
        }
        chord
    }
}

/// A chord together with the classifier that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub chord: Chord,
    pub source: String,
}

/// Classifiers tried in a fixed priority order
pub struct ClassifierChain {
    classifiers: Vec<Box<dyn ChordClassifier>>,
}

impl ClassifierChain {
    /// Chain holding only the built-in template matcher
    pub fn new() -> Self {
        ClassifierChain {
            classifiers: vec![Box::new(TemplateClassifier)],
        }
    }

    /// Put a classifier ahead of everything already in the chain
    pub fn with_primary(mut self, classifier: impl ChordClassifier + 'static) -> Self {
        self.classifiers.insert(0, Box::new(classifier));
        self
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    pub fn classify(&self, notes: &[MidiNote]) -> Option<Classified> {
        if notes.is_empty() {
            return None;
        }
        self.classifiers.iter().find_map(|c| {
            c.classify(notes).map(|chord| Classified {
                chord,
                source: c.name().to_string(),
            })
        })
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_triads() {
        assert_eq!(detect(&[0, 4, 7]), Some(Chord::new(0, "")));
        assert_eq!(detect(&[0, 3, 7]), Some(Chord::new(0, "m")));
        assert_eq!(detect(&[7, 11, 2]), Some(Chord::new(7, "")));
    }

    #[test]
    fn test_detect_empty_is_none() {
        assert_eq!(detect(&[]), None);
    }

    #[test]
    fn test_detect_sevenths_from_midi_notes() {
        // Dm7 voiced D3 F4 A4 C5
        assert_eq!(detect(&[50, 65, 69, 72]), Some(Chord::new(2, "m7")));
        // G7 with a doubled root
        assert_eq!(detect(&[43, 55, 59, 62, 65]), Some(Chord::new(7, "7")));
    }

    #[test]
    fn test_inversions_find_the_root() {
        // E G C -> C major, found from the second candidate root
        assert_eq!(detect(&[4, 7, 0]), Some(Chord::new(0, "")));
    }

    #[test]
    fn test_ties_keep_first_root_and_quality() {
        // C E G# is symmetric: every root scores 1 with "aug", first root wins
        assert_eq!(detect(&[0, 4, 8]), Some(Chord::new(0, "aug")));
        assert_eq!(detect(&[8, 0, 4]), Some(Chord::new(8, "aug")));
        // sus4 and sus share intervals; the earlier table row wins
        assert_eq!(detect(&[0, 5, 7]).map(|c| c.quality_key()), Some("sus4"));
    }

    #[test]
    fn test_weak_matches_still_return_a_chord() {
        let detection = detect_scored(&[0, 1]).unwrap();
        assert!(detection.confidence() < 1.0);
        assert!(detection.confidence() > 0.0);

        let exact = detect_scored(&[0, 4, 7, 11]).unwrap();
        assert_eq!(exact.chord, Chord::new(0, "maj7"));
        assert_eq!(exact.confidence(), 1.0);
    }

    #[test]
    fn test_chain_prefers_primary_classifier() {
        let chain = ClassifierChain::new().with_primary(SymbolClassifier::new("external", |_| {
            Some("A-minor-seventh".to_string())
        }));
        let result = chain.classify(&[60, 64, 67]).unwrap();
        assert_eq!(result.chord, Chord::new(9, "m7"));
        assert_eq!(result.source, "external");
    }

    #[test]
    fn test_chain_falls_back_to_template() {
        let chain = ClassifierChain::new()
            .with_primary(SymbolClassifier::new("silent", |_| None))
            .with_primary(SymbolClassifier::new("garbled", |_| Some("???".to_string())));
        assert_eq!(chain.len(), 3);

        let result = chain.classify(&[62, 65, 69]).unwrap();
        assert_eq!(result.chord, Chord::new(2, "m"));
        assert_eq!(result.source, "template");

        assert_eq!(chain.classify(&[]), None);
    }
}
