//! Concrete voicings and the movement between them

use crate::types::note::{midi_name, MidiNote};
use std::fmt;

/// Absolute notes, one per voice
pub type Voicing = Vec<MidiNote>;

/// Tracks movement of a single voice from one voicing to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoiceMovement {
    pub voice: usize,
    pub from: MidiNote,
    pub to: MidiNote,
    pub semitones: i16,
}

impl VoiceMovement {
    pub fn is_common_tone(&self) -> bool {
        self.semitones == 0
    }

    pub fn is_step(&self) -> bool {
        matches!(self.semitones.abs(), 1 | 2)
    }
}

impl fmt::Display for VoiceMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "voice {}: {} → {} ({:+})",
            self.voice,
            midi_name(self.from),
            midi_name(self.to),
            self.semitones
        )
    }
}

/// Pair voices positionally; extra voices on either side are ignored
pub fn movements(from: &[MidiNote], to: &[MidiNote]) -> Vec<VoiceMovement> {
    from.iter()
        .zip(to)
        .enumerate()
        .map(|(voice, (&from, &to))| VoiceMovement {
            voice,
            from,
            to,
            semitones: to as i16 - from as i16,
        })
        .collect()
}

/// Sum of absolute per-voice distances between two voicings
pub fn total_movement(from: &[MidiNote], to: &[MidiNote]) -> u32 {
    from.iter()
        .zip(to)
        .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
        .sum()
}

/// Space-separated note names, e.g. `C3 E4 B4`
pub fn describe(voicing: &[MidiNote]) -> String {
    voicing
        .iter()
        .map(|&n| midi_name(n))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movements_pair_voices_in_order() {
        let moves = movements(&[48, 64, 67], &[50, 64, 65]);
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0].semitones, 2);
        assert!(moves[1].is_common_tone());
        assert!(moves[2].is_step());
        assert_eq!(moves[2].semitones, -2);
    }

    #[test]
    fn test_total_movement() {
        assert_eq!(total_movement(&[60, 64, 67], &[60, 64, 67]), 0);
        assert_eq!(total_movement(&[60, 64, 67], &[59, 65, 69]), 4);
    }

    #[test]
    fn test_wide_moves_do_not_wrap() {
        // imported voicings are not range-checked, so any u8 pair must pair up
        let moves = movements(&[0, 255], &[255, 0]);
        assert_eq!(moves[0].semitones, 255);
        assert_eq!(moves[1].semitones, -255);
        assert!(!moves[1].is_step());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&[48, 64, 71]), "C3 E4 B4");
        assert_eq!(movements(&[60], &[62])[0].to_string(), "voice 0: C4 → D4 (+2)");
    }
}
