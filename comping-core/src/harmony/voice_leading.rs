//! Greedy nearest-note voice leading
//!
//! Each previous note, in the order given, claims the closest in-bounds
//! instance of a still-unclaimed target pitch class. The result mirrors the
//! input one-to-one and is a local approximation: an early voice is never
//! moved to make room for a later one.

use crate::error::{HarmonyError, Result};
use crate::types::note::MidiNote;
use crate::types::{Voicing, VoicingBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    slot: usize,
    note: i32,
    distance: u32,
}

/// Stateless optimizer over a fixed set of bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceLeader {
    bounds: VoicingBounds,
}

impl VoiceLeader {
    pub fn new(bounds: VoicingBounds) -> Self {
        VoiceLeader { bounds }
    }

    pub fn bounds(&self) -> &VoicingBounds {
        &self.bounds
    }

    /// Move `previous` onto `targets` (pitch classes, duplicates allowed).
    ///
    /// Fails with [`HarmonyError::InvalidInput`] when the lengths differ.
    pub fn resolve(&self, previous: &[MidiNote], targets: &[u8]) -> Result<Voicing> {
        if previous.len() != targets.len() {
            return Err(HarmonyError::InvalidInput {
                voices: previous.len(),
                targets: targets.len(),
            });
        }
        self.bounds.validate()?;

        let mut available: Vec<u8> = targets.iter().map(|pc| pc % 12).collect();
        let mut voicing = Vec::with_capacity(previous.len());

        for (voice, &note) in previous.iter().enumerate() {
            let best = self
                .nearest_in_radius(note, &available)
                .or_else(|| self.nearest_anywhere(voice, note, &available));
            let Some(best) = best else {
                return Err(HarmonyError::UnresolvableVoicing {
                    voice,
                    previous: note,
                });
            };
            available.remove(best.slot);
            voicing.push(best.note as MidiNote);
        }

        Ok(voicing)
    }

    /// Best candidate within the octave radius of `note`; first found wins ties
    fn nearest_in_radius(&self, note: MidiNote, available: &[u8]) -> Option<Candidate> {
        let octave = note as i32 / 12;
        let range = self.bounds.octave_range as i32;
        let mut best: Option<Candidate> = None;

        for (slot, &pc) in available.iter().enumerate() {
            for offset in -range..=range {
                let candidate = pc as i32 + (octave + offset) * 12;
                if !self.bounds.contains(candidate) {
                    continue;
                }
                let distance = candidate.abs_diff(note as i32);
                if best.is_none_or(|b| distance < b.distance) {
                    best = Some(Candidate {
                        slot,
                        note: candidate,
                        distance,
                    });
                }
            }
        }

        best
    }

    /// Fallback when the radius finds nothing: every instance inside the bounds
    fn nearest_anywhere(&self, voice: usize, note: MidiNote, available: &[u8]) -> Option<Candidate> {
        let (min, max) = (self.bounds.min_note as i32, self.bounds.max_note as i32);
        let mut best: Option<Candidate> = None;

        for (slot, &pc) in available.iter().enumerate() {
            let first = min + (pc as i32 - min).rem_euclid(12);
            for candidate in (first..=max).step_by(12) {
                let distance = candidate.abs_diff(note as i32);
                if best.is_none_or(|b| distance < b.distance) {
                    best = Some(Candidate {
                        slot,
                        note: candidate,
                        distance,
                    });
                }
            }
        }

        if let Some(found) = best {
            tracing::debug!(
                voice,
                previous = note,
                chosen = found.note,
                "no candidate within octave radius, widened search"
            );
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leader() -> VoiceLeader {
        VoiceLeader::default()
    }

    #[test]
    fn test_identical_target_does_not_move() {
        assert_eq!(leader().resolve(&[60, 64, 67], &[0, 4, 7]).unwrap(), vec![60, 64, 67]);
    }

    #[test]
    fn test_mismatched_lengths_fail() {
        for (voices, targets) in [(3usize, 4usize), (4, 3), (0, 1), (5, 0)] {
            let previous = vec![60; voices];
            let target = vec![0; targets];
            match leader().resolve(&previous, &target) {
                Err(HarmonyError::InvalidInput { voices: v, targets: t }) => {
                    assert_eq!((v, t), (voices, targets));
                }
                other => panic!("expected InvalidInput, got {:?}", other),
            }
        }
        assert_eq!(leader().resolve(&[], &[]).unwrap(), Vec::<MidiNote>::new());
    }

    #[test]
    fn test_c_to_f_moves_by_step() {
        // C E G -> F A C: C stays as C, E -> F, G -> A
        assert_eq!(leader().resolve(&[60, 64, 67], &[5, 9, 0]).unwrap(), vec![60, 65, 69]);
    }

    #[test]
    fn test_output_mirrors_input_order() {
        // unsorted input stays unsorted
        assert_eq!(leader().resolve(&[67, 60, 64], &[0, 4, 7]).unwrap(), vec![67, 60, 64]);
    }

    #[test]
    fn test_ties_take_first_pitch_class_then_lowest_octave() {
        // D is 2 away from both C and E
        assert_eq!(leader().resolve(&[62], &[0]).unwrap(), vec![60]);
        assert_eq!(leader().resolve(&[62, 62], &[4, 0]).unwrap(), vec![64, 60]);
        // F# is 6 away from C below and C above: the lower octave is tried first
        assert_eq!(leader().resolve(&[66], &[0]).unwrap(), vec![60]);
    }

    #[test]
    fn test_duplicates_are_separate_slots() {
        let voicing = leader().resolve(&[60, 64, 67, 72], &[0, 4, 7, 0]).unwrap();
        assert_eq!(voicing, vec![60, 64, 67, 72]);
    }

    #[test]
    fn test_bounds_are_respected() {
        // the nearest B to C2 would be B1 (35), below the floor
        assert_eq!(leader().resolve(&[36], &[11]).unwrap(), vec![47]);
        assert_eq!(leader().resolve(&[96], &[1]).unwrap(), vec![85]);
    }

    #[test]
    fn test_widened_search_when_radius_is_empty() {
        let bounds = VoicingBounds::new(0, 60, 72).unwrap();
        let narrow = VoiceLeader::new(bounds);
        // note 40 sits in octave 3; with no radius only 36..47 is searched
        assert_eq!(narrow.resolve(&[40], &[7]).unwrap(), vec![67]);
    }

    #[test]
    fn test_unresolvable_when_bounds_hold_no_instance() {
        let bounds = VoicingBounds::new(2, 61, 63).unwrap();
        let tight = VoiceLeader::new(bounds);
        match tight.resolve(&[60, 62], &[2, 7]) {
            Err(HarmonyError::UnresolvableVoicing { voice, previous }) => {
                assert_eq!((voice, previous), (1, 62));
            }
            other => panic!("expected UnresolvableVoicing, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_bounds_are_rejected() {
        assert!(VoicingBounds::new(2, 90, 40).is_err());
    }
}
