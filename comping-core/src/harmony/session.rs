//! One player's harmony state: current chord, held voicing and history
//!
//! Every user action is a method call on [`HarmonySession`]. Sessions share
//! nothing but the read-only n-gram table, so any number can run side by side.

use crate::error::Result;
use crate::harmony::analysis::{analyze, TransitionHint};
use crate::harmony::classify::{ChordClassifier, Classified, ClassifierChain};
use crate::harmony::ngram::{NgramOrder, NgramTable};
use crate::harmony::progression::{common_progressions, next_chords, CommonProgressions, RuleCategory};
use crate::harmony::voice_controller::VoiceController;
use crate::types::note::MidiNote;
use crate::types::{Chord, HistoryDocument, HistoryEntry, SessionConfig, Song, Voicing};
use std::collections::HashSet;
use std::sync::Arc;

/// Bass notes sit in octave 2
const BASS_BASE: u8 = 36;

/// Where a suggested chord came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum SuggestionSource {
    Ngram { order: NgramOrder, count: u32 },
    Rule { category: RuleCategory, label: &'static str },
    Variation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Suggestion {
    pub chord: Chord,
    pub source: SuggestionSource,
    pub hint: Option<TransitionHint>,
}

/// Everything offered after a chord, or the starting groups before any chord
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Suggestions {
    pub predictions: Vec<Suggestion>,
    pub next: Vec<Suggestion>,
    pub common: Option<CommonProgressions>,
}

/// Result of playing a chord
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Played {
    pub chord: Chord,
    pub voicing: Voicing,
    /// How the move from the previous chord reads
    pub hint: Option<TransitionHint>,
    /// False when the chord repeated the last history entry
    pub recorded: bool,
}

pub struct HarmonySession {
    config: SessionConfig,
    controller: VoiceController,
    classifiers: ClassifierChain,
    ngrams: Arc<NgramTable>,
    history: Vec<HistoryEntry>,
    current: Option<Chord>,
}

impl HarmonySession {
    /// New session with the built-in n-gram table
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_ngrams(config, Arc::new(NgramTable::builtin()))
    }

    pub fn with_ngrams(mut config: SessionConfig, ngrams: Arc<NgramTable>) -> Result<Self> {
        config.bounds.validate()?;
        config.key %= 12;
        Ok(HarmonySession {
            controller: VoiceController::new(config.voice_count, config.bounds),
            config,
            classifiers: ClassifierChain::new(),
            ngrams,
            history: Vec::new(),
            current: None,
        })
    }

    /// Consult `classifier` before the built-in detector
    pub fn with_classifier(mut self, classifier: impl ChordClassifier + 'static) -> Self {
        self.prefer_classifier(classifier);
        self
    }

    pub fn prefer_classifier(&mut self, classifier: impl ChordClassifier + 'static) {
        self.classifiers = std::mem::take(&mut self.classifiers).with_primary(classifier);
    }

    pub fn set_ngrams(&mut self, ngrams: Arc<NgramTable>) {
        self.ngrams = ngrams;
    }

    pub fn ngrams(&self) -> &NgramTable {
        &self.ngrams
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn key(&self) -> u8 {
        self.config.key
    }

    pub fn set_key(&mut self, key: u8) {
        self.config.key = key % 12;
    }

    pub fn set_voice_count(&mut self, voice_count: usize) {
        self.config.voice_count = voice_count.max(1);
        self.controller.set_voice_count(self.config.voice_count);
    }

    pub fn bass_enabled(&self) -> bool {
        self.config.bass_enabled
    }

    pub fn set_bass_enabled(&mut self, enabled: bool) {
        self.config.bass_enabled = enabled;
    }

    pub fn current_chord(&self) -> Option<Chord> {
        self.current
    }

    pub fn current_voicing(&self) -> Option<&[MidiNote]> {
        self.controller.current_voicing()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The last few recorded chords, oldest first
    pub fn recent_chords(&self) -> Vec<Chord> {
        let skip = self.history.len().saturating_sub(self.config.visible_history);
        self.history[skip..].iter().map(|e| e.chord).collect()
    }

    /// Name the chord formed by a set of absolute notes
    pub fn classify(&self, notes: &[MidiNote]) -> Option<Classified> {
        self.classifiers.classify(notes)
    }

    /// Voice `chord` from the held voicing, make it current and record it
    pub fn play(&mut self, chord: Chord) -> Result<Played> {
        let hint = self
            .current
            .and_then(|previous| analyze(&previous, &chord, self.config.key));
        let voicing = self.controller.voice(&chord)?;
        self.current = Some(chord);

        let repeated = self
            .history
            .last()
            .is_some_and(|last| last.chord.symbol() == chord.symbol());
        if !repeated {
            let stored = self.with_bass(&chord, &voicing);
            self.history.push(HistoryEntry::new(chord, stored));
        }
        tracing::debug!(chord = %chord, ?voicing, recorded = !repeated, "played");

        Ok(Played {
            chord,
            voicing,
            hint,
            recorded: !repeated,
        })
    }

    /// Predictions and rule-based continuations of the current chord
    pub fn suggest(&self) -> Suggestions {
        let Some(current) = self.current else {
            return Suggestions {
                common: Some(common_progressions(self.config.key)),
                ..Suggestions::default()
            };
        };

        let mut context: Vec<Chord> = self.history.iter().map(|e| e.chord).collect();
        if context.last() != Some(&current) {
            context.push(current);
        }

        let mut seen: HashSet<Chord> = HashSet::from([current]);
        let predictions: Vec<Suggestion> = self
            .ngrams
            .predict(&context, self.config.prediction_limit)
            .into_iter()
            .filter(|p| seen.insert(p.chord))
            .map(|p| Suggestion {
                chord: p.chord,
                source: SuggestionSource::Ngram {
                    order: p.source,
                    count: p.count,
                },
                hint: analyze(&current, &p.chord, self.config.key),
            })
            .collect();

        let next = next_chords(&current, self.config.key)
            .into_iter()
            .filter(|n| seen.insert(n.chord))
            .map(|n| Suggestion {
                chord: n.chord,
                source: SuggestionSource::Rule {
                    category: n.category,
                    label: n.label,
                },
                hint: analyze(&current, &n.chord, self.config.key),
            })
            .collect();

        Suggestions {
            predictions,
            next,
            common: None,
        }
    }

    /// Replacement candidates for the history entry at `index`
    pub fn substitutions(&self, index: usize) -> Vec<Suggestion> {
        let Some(entry) = self.history.get(index) else {
            return Vec::new();
        };
        let chord = entry.chord;
        let key = self.config.key;
        let mut seen: HashSet<Chord> = HashSet::from([chord]);
        let mut out = Vec::new();

        let context: Vec<Chord> = self.history[..=index].iter().map(|e| e.chord).collect();
        for prediction in self.ngrams.predict(&context, self.config.substitution_limit) {
            if seen.insert(prediction.chord) {
                out.push(Suggestion {
                    chord: prediction.chord,
                    source: SuggestionSource::Ngram {
                        order: prediction.source,
                        count: prediction.count,
                    },
                    hint: analyze(&chord, &prediction.chord, key),
                });
            }
        }

        for variation in chord.variations() {
            if seen.insert(variation) {
                out.push(Suggestion {
                    chord: variation,
                    source: SuggestionSource::Variation,
                    hint: analyze(&chord, &variation, key),
                });
            }
        }

        for next in next_chords(&chord, key) {
            if seen.insert(next.chord) {
                out.push(Suggestion {
                    chord: next.chord,
                    source: SuggestionSource::Rule {
                        category: next.category,
                        label: next.label,
                    },
                    hint: analyze(&chord, &next.chord, key),
                });
            }
        }

        out
    }

    /// Replace the entry at `index`, voicing it from the entry before it, and jump there.
    ///
    /// Returns `None` for an index outside the history.
    pub fn substitute(&mut self, index: usize, chord: Chord) -> Result<Option<Voicing>> {
        if index >= self.history.len() {
            return Ok(None);
        }
        let previous = match index.checked_sub(1).map(|i| &self.history[i]) {
            Some(entry) if !entry.voicing.is_empty() => {
                Some(Self::playable(&entry.chord, &entry.voicing))
            }
            _ => None,
        };
        let voicing = match previous {
            Some(previous) => self.controller.voice_from(&previous, &chord)?,
            None => self.controller.voice(&chord)?,
        };
        let stored = self.with_bass(&chord, &voicing);
        self.history[index] = HistoryEntry::new(chord, stored);
        self.jump_to(index)
    }

    /// Make the entry at `index` current, restoring its voicing when it has one
    pub fn jump_to(&mut self, index: usize) -> Result<Option<Voicing>> {
        let Some(entry) = self.history.get(index) else {
            return Ok(None);
        };
        let chord = entry.chord;
        let voicing = if entry.voicing.is_empty() {
            self.controller.voice(&chord)?
        } else {
            let stored = Self::playable(&chord, &entry.voicing);
            self.controller.set_custom_voicing(&stored);
            stored
        };
        self.current = Some(chord);
        Ok(Some(voicing))
    }

    /// Move every voice by an octave; refused if a note would leave the bounds
    pub fn shift_octave(&mut self, direction: i8) -> Option<Voicing> {
        let held = self.controller.current_voicing()?;
        let shift = direction.signum() as i32 * 12;
        let shifted: Vec<i32> = held.iter().map(|&n| n as i32 + shift).collect();
        self.commit_edit(shifted)
    }

    /// Rotate the voicing: the lowest note goes up an octave, or the highest down
    pub fn shift_inversion(&mut self, direction: i8) -> Option<Voicing> {
        let held = self.controller.current_voicing()?;
        if held.len() < 2 || direction == 0 {
            return None;
        }
        let mut sorted: Vec<i32> = held.iter().map(|&n| n as i32).collect();
        sorted.sort_unstable();
        if direction > 0 {
            let lowest = sorted.remove(0);
            sorted.push(lowest + 12);
        } else if let Some(highest) = sorted.pop() {
            sorted.insert(0, highest - 12);
        }
        self.commit_edit(sorted)
    }

    /// Re-spread the current chord from scratch
    pub fn reset_voicing(&mut self) -> Result<Option<Voicing>> {
        let Some(chord) = self.current else {
            return Ok(None);
        };
        self.controller.set_voice_count(self.config.voice_count);
        self.controller.reset();
        let voicing = self.controller.voice(&chord)?;
        self.update_last_voicing(&chord, &voicing);
        Ok(Some(voicing))
    }

    /// Drag one held note to another key and re-detect the chord.
    ///
    /// Refused when `from` is not held, `to` is out of bounds or already held.
    pub fn move_note(&mut self, from: MidiNote, to: MidiNote) -> Option<(Voicing, Option<Classified>)> {
        let held = self.controller.current_voicing()?;
        let idx = held.iter().position(|&n| n == from)?;
        if from == to || !self.config.bounds.contains(to as i32) || held.contains(&to) {
            return None;
        }
        let mut voicing = held.to_vec();
        voicing[idx] = to;
        voicing.sort_unstable();
        self.controller.set_custom_voicing(&voicing);

        let detected = self.classifiers.classify(&voicing);
        if let Some(found) = &detected {
            self.current = Some(found.chord);
        }
        if let Some(current) = self.current {
            let matches_last = self
                .history
                .last()
                .is_some_and(|last| last.chord.symbol() == current.symbol());
            if matches_last {
                self.update_last_voicing(&current, &voicing);
            }
        }
        Some((voicing, detected))
    }

    /// Replace the history with an unvoiced chart and start on its first chord
    pub fn load_song(&mut self, song: &Song) -> Result<usize> {
        self.history = song.chords().map(HistoryEntry::unvoiced).collect();
        self.current = None;
        self.controller.reset();
        if let Some(first) = self.history.first().map(|e| e.chord) {
            self.controller.voice(&first)?;
            self.current = Some(first);
        }
        tracing::debug!(title = %song.title, chords = self.history.len(), "loaded song");
        Ok(self.history.len())
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.current = None;
        self.controller.reset();
    }

    pub fn export_history(&self, timestamp: Option<u64>) -> HistoryDocument {
        HistoryDocument {
            history: self.history.clone(),
            timestamp,
        }
    }

    /// Replace the history; the last imported entry becomes current
    pub fn import_history(&mut self, document: HistoryDocument) -> usize {
        self.history = document.history;
        self.controller.reset();
        self.current = self.history.last().map(|e| e.chord);
        if let Some(last) = self.history.last() {
            if !last.voicing.is_empty() {
                let playable = Self::playable(&last.chord, &last.voicing);
                self.controller.set_custom_voicing(&playable);
            }
        }
        self.history.len()
    }

    fn with_bass(&self, chord: &Chord, voicing: &[MidiNote]) -> Voicing {
        let mut stored = voicing.to_vec();
        if self.config.bass_enabled {
            let bass = BASS_BASE + chord.root();
            if !stored.contains(&bass) {
                stored.insert(0, bass);
            }
        }
        stored
    }

    /// A stored voicing without the extra bass note recorded alongside it.
    ///
    /// The bass is the note `BASS_BASE + root` in front, below every other
    /// note, with the root's pitch class voiced again above it.
    fn playable(chord: &Chord, stored: &[MidiNote]) -> Voicing {
        match stored.split_first() {
            Some((&bass, upper))
                if bass == BASS_BASE + chord.root()
                    && upper.iter().all(|&n| n > bass)
                    && upper.iter().any(|&n| n % 12 == chord.root()) =>
            {
                upper.to_vec()
            }
            _ => stored.to_vec(),
        }
    }

    fn commit_edit(&mut self, notes: Vec<i32>) -> Option<Voicing> {
        if !notes.iter().all(|&n| self.config.bounds.contains(n)) {
            return None;
        }
        let mut voicing: Voicing = notes.into_iter().map(|n| n as MidiNote).collect();
        voicing.sort_unstable();
        self.controller.set_custom_voicing(&voicing);
        if let Some(chord) = self.current {
            self.update_last_voicing(&chord, &voicing);
        }
        Some(voicing)
    }

    fn update_last_voicing(&mut self, chord: &Chord, voicing: &[MidiNote]) {
        let stored = self.with_bass(chord, voicing);
        if let Some(last) = self.history.last_mut() {
            last.voicing = stored;
        }
    }
}

impl Default for HarmonySession {
    fn default() -> Self {
        HarmonySession {
            controller: VoiceController::default(),
            config: SessionConfig::default(),
            classifiers: ClassifierChain::new(),
            ngrams: Arc::new(NgramTable::builtin()),
            history: Vec::new(),
            current: None,
        }
    }
}
