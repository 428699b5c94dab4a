//! Note table and computer-keyboard layout.
//!
//! Three octaves, C3..B5, with the tuning table the instrument has always
//! shipped with (equal temperament around A4 = 440 Hz, values kept as the
//! exact literals). Notes are addressed by index into this table so they fit
//! in a `u8` for message passing and recording.
//!
//! The typing layout mirrors a piano: the bottom letter row plays the low
//! octave naturals with the home row above it as the sharps, and the top
//! letter row plays the middle octave with the number row as its sharps. The
//! high octave is reachable from the arrangement editor but has no typed keys,
//! same as the original on-screen-only top octave.

/// Index into the note table.
pub type NoteId = u8;

pub const NOTE_COUNT: usize = 36;

pub const NOTE_NAMES: [&str; NOTE_COUNT] = [
    "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3", "A3", "A#3", "B3", //
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", //
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5",
];

pub const NOTE_FREQS: [f32; NOTE_COUNT] = [
    130.81, 138.59, 146.83, 155.56, 164.81, 174.61, 185.00, 196.00, 207.65, 220.00, 233.08,
    246.94, //
    261.63, 277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.00, 415.30, 440.00, 466.16,
    493.88, //
    523.25, 554.37, 587.33, 622.25, 659.25, 698.46, 739.99, 783.99, 830.61, 880.00, 932.33,
    987.77,
];

pub fn frequency(note: NoteId) -> f32 {
    NOTE_FREQS[note as usize % NOTE_COUNT]
}

pub fn name(note: NoteId) -> &'static str {
    NOTE_NAMES[note as usize % NOTE_COUNT]
}

/// Black-key test, used by the on-screen keyboard layout.
pub fn is_sharp(note: NoteId) -> bool {
    matches!(note % 12, 1 | 3 | 6 | 8 | 10)
}

/// Map a typed character to a note.
pub fn note_for_char(c: char) -> Option<NoteId> {
    let note = match c.to_ascii_lowercase() {
        // Bottom row: low octave naturals
        'z' => 0,  // C3
        'x' => 2,  // D3
        'c' => 4,  // E3
        'v' => 5,  // F3
        'b' => 7,  // G3
        'n' => 9,  // A3
        'm' => 11, // B3

        // Home row: low octave sharps
        's' => 1,  // C#3
        'd' => 3,  // D#3
        'g' => 6,  // F#3
        'h' => 8,  // G#3
        'j' => 10, // A#3

        // Top row: middle octave naturals
        'q' => 12, // C4
        'w' => 14, // D4
        'e' => 16, // E4
        'r' => 17, // F4
        't' => 19, // G4
        'y' => 21, // A4
        'u' => 23, // B4

        // Number row: middle octave sharps
        '2' => 13, // C#4
        '3' => 15, // D#4
        '5' => 18, // F#4
        '6' => 20, // G#4
        '7' => 22, // A#4

        _ => return None,
    };
    Some(note)
}

/// The character that plays a note, if it has one (for key-cap labels).
pub fn char_for_note(note: NoteId) -> Option<char> {
    const LOW: [char; 12] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm'];
    const MID: [char; 12] = ['q', '2', 'w', '3', 'e', 'r', '5', 't', '6', 'y', '7', 'u'];
    match note {
        0..=11 => Some(LOW[note as usize]),
        12..=23 => Some(MID[(note - 12) as usize]),
        _ => None,
    }
}
