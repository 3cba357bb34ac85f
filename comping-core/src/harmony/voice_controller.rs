//! Holds the sounding voicing and moves it from chord to chord

use crate::error::Result;
use crate::harmony::voice_leading::VoiceLeader;
use crate::types::note::MidiNote;
use crate::types::{Chord, Voicing, VoicingBounds};

/// Lowest voice of a fresh voicing sits in octave 3
const DEFAULT_BASS_BASE: i32 = 48;
/// Upper voices of a fresh voicing start in octave 4
const DEFAULT_UPPER_BASE: i32 = 60;
const DEFAULT_CEILING: i32 = 84;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceController {
    leader: VoiceLeader,
    current: Option<Voicing>,
    voice_count: usize,
}

impl VoiceController {
    pub fn new(voice_count: usize, bounds: VoicingBounds) -> Self {
        VoiceController {
            leader: VoiceLeader::new(bounds),
            current: None,
            voice_count: voice_count.max(1),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    /// Change the number of voices; the next chord starts from a fresh spread
    pub fn set_voice_count(&mut self, voice_count: usize) {
        let voice_count = voice_count.max(1);
        if voice_count != self.voice_count {
            self.voice_count = voice_count;
            self.current = None;
        }
    }

    pub fn current_voicing(&self) -> Option<&[MidiNote]> {
        self.current.as_deref()
    }

    /// Forget the held voicing
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Take over an externally chosen voicing; its size becomes the voice count
    pub fn set_custom_voicing(&mut self, notes: &[MidiNote]) {
        let mut notes = notes.to_vec();
        notes.sort_unstable();
        self.voice_count = notes.len().max(1);
        self.current = if notes.is_empty() { None } else { Some(notes) };
    }

    /// Pitch classes for every voice: the chord's own tones first, then
    /// doublings drawn from the non-root tones
    pub fn target_pitch_classes(&self, chord: &Chord) -> Vec<u8> {
        let pcs = chord.pitch_classes();
        let mut targets: Vec<u8> = pcs.iter().copied().take(self.voice_count).collect();
        while targets.len() < self.voice_count {
            let missing = targets.len() - pcs.len();
            let idx = missing % (pcs.len() - 1) + 1;
            targets.push(pcs[idx]);
        }
        targets
    }

    /// Ascending spread: root near octave 3, the rest stacked from octave 4
    pub fn build_default_voicing(&self, chord: &Chord) -> Voicing {
        let pcs = chord.pitch_classes();
        let mut voicing: Vec<i32> = vec![DEFAULT_BASS_BASE + pcs[0] as i32];

        for i in 1..self.voice_count {
            let pc = if i < pcs.len() {
                pcs[i]
            } else {
                pcs[(i - pcs.len()) % (pcs.len() - 1) + 1]
            };
            let mut note = DEFAULT_UPPER_BASE + pc as i32;
            if voicing.last().is_some_and(|&prev| note <= prev) {
                note += 12;
            }
            if note > DEFAULT_CEILING {
                note -= 12;
            }
            voicing.push(note);
        }

        let mut voicing: Voicing = voicing.into_iter().map(|n| n as MidiNote).collect();
        voicing.sort_unstable();
        voicing
    }

    /// Voice `chord`, leading from the held voicing when there is one, and hold the result
    pub fn voice(&mut self, chord: &Chord) -> Result<Voicing> {
        let next = match &self.current {
            None => self.build_default_voicing(chord),
            Some(previous) => {
                let targets = self.target_pitch_classes(chord);
                self.leader.resolve(previous, &targets)?
            }
        };
        self.current = Some(next.clone());
        Ok(next)
    }

    /// Voice `chord` leading from an explicit voicing instead of the held one
    pub fn voice_from(&mut self, previous: &[MidiNote], chord: &Chord) -> Result<Voicing> {
        if previous.is_empty() {
            self.current = None;
        } else {
            self.set_custom_voicing(previous);
        }
        self.voice(chord)
    }
}

impl Default for VoiceController {
    fn default() -> Self {
        Self::new(5, VoicingBounds::default())
    }
}
