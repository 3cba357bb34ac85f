//! Pitch-class and note-number naming
//!
//! Pitch classes are 0-11 with 0 = C. Absolute notes are MIDI note numbers,
//! with 60 = C4 (middle C).

/// Absolute note number (MIDI)
pub type MidiNote = u8;

/// Display names, flats for the black keys
pub const NOTE_NAMES: [&str; 12] = [
    "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭", "A", "B♭", "B",
];

/// ASCII flat spellings, as synth and notation libraries expect them
pub const ASCII_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reduce any integer (negative included) into 0-11
pub fn pitch_class(value: i32) -> u8 {
    value.rem_euclid(12) as u8
}

/// Display name for a pitch class
pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}

fn natural_pitch_class(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Split a leading note name (letter plus accidentals) off `text`.
///
/// Returns the pitch class and the number of bytes consumed. Any run of
/// `#`, `b`, `♯`, `♭` is accepted, so `Fb` is E and `B#` is C.
pub fn split_note_name(text: &str) -> Option<(u8, usize)> {
    let mut chars = text.char_indices();
    let (_, letter) = chars.next()?;
    let mut value = natural_pitch_class(letter)?;
    let mut consumed = letter.len_utf8();

    for (idx, c) in chars {
        match c {
            '#' | '♯' => value += 1,
            'b' | '♭' => value -= 1,
            _ => break,
        }
        consumed = idx + c.len_utf8();
    }

    Some((pitch_class(value), consumed))
}

/// Parse a bare note name such as `Eb` or `F#`
pub fn parse_pitch_class(text: &str) -> Option<u8> {
    let text = text.trim();
    match split_note_name(text) {
        Some((pc, consumed)) if consumed == text.len() => Some(pc),
        _ => None,
    }
}

/// Scientific name of a MIDI note, e.g. 60 -> "C4"
pub fn midi_name(note: MidiNote) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", ASCII_NAMES[(note % 12) as usize], octave)
}

/// Parse a MIDI note given either as a number (`60`) or a name with octave (`C4`, `Bb-1`)
pub fn parse_midi_note(text: &str) -> Option<MidiNote> {
    let text = text.trim();
    if let Ok(number) = text.parse::<u8>() {
        return (number <= 127).then_some(number);
    }

    let (pc, consumed) = split_note_name(text)?;
    let octave: i32 = text[consumed..].parse().ok()?;
    // Accidentals that cross the octave line (Cb, B#) keep the written octave's letter
    let letter_pc = natural_pitch_class(text.chars().next()?)?;
    let offset = match (letter_pc, pc) {
        (0, 11) => -12,
        (11, 0) => 12,
        _ => 0,
    };
    let note = (octave + 1) * 12 + pc as i32 + offset;
    u8::try_from(note).ok().filter(|n| *n <= 127)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_wraps_negative_values() {
        assert_eq!(pitch_class(-1), 11);
        assert_eq!(pitch_class(-12), 0);
        assert_eq!(pitch_class(26), 2);
    }

    #[test]
    fn test_parse_root_names() {
        assert_eq!(parse_pitch_class("C"), Some(0));
        assert_eq!(parse_pitch_class("Eb"), Some(3));
        assert_eq!(parse_pitch_class("F#"), Some(6));
        assert_eq!(parse_pitch_class("B♭"), Some(10));
        assert_eq!(parse_pitch_class("Fb"), Some(4));
        assert_eq!(parse_pitch_class("Cb"), Some(11));
        assert_eq!(parse_pitch_class("H"), None);
        assert_eq!(parse_pitch_class("Cm7"), None);
    }

    #[test]
    fn test_split_note_name_leaves_suffix() {
        assert_eq!(split_note_name("Bbm7"), Some((10, 2)));
        assert_eq!(split_note_name("D♭Δ7"), Some((1, "D♭".len())));
        assert_eq!(split_note_name("x7"), None);
    }

    #[test]
    fn test_midi_names() {
        assert_eq!(midi_name(60), "C4");
        assert_eq!(midi_name(70), "Bb4");
        assert_eq!(midi_name(36), "C2");
        assert_eq!(parse_midi_note("C4"), Some(60));
        assert_eq!(parse_midi_note("A4"), Some(69));
        assert_eq!(parse_midi_note("64"), Some(64));
        assert_eq!(parse_midi_note("B#3"), Some(60));
        assert_eq!(parse_midi_note("Cb4"), Some(59));
        assert_eq!(parse_midi_note("C"), None);
        assert_eq!(parse_midi_note("200"), None);
    }
}
