use std::fmt;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A MIDI key number, displayed as pitch class plus octave (`60` is `C4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pitch(u8);

impl Pitch {
    pub fn new(key: u8) -> Self {
        Self(key.min(127))
    }

    pub fn key(self) -> u8 {
        self.0
    }

    pub fn pitch_class(self) -> &'static str {
        PITCH_CLASSES[(self.0 % 12) as usize]
    }

    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class(), self.octave())
    }
}

impl From<u8> for Pitch {
    fn from(key: u8) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_scientific_pitch_notation() {
        assert_eq!(Pitch::new(60).name(), "C4");
        assert_eq!(Pitch::new(69).name(), "A4");
        assert_eq!(Pitch::new(61).name(), "C#4");
        assert_eq!(Pitch::new(0).name(), "C-1");
        assert_eq!(Pitch::new(127).name(), "G9");
    }

    #[test]
    fn keys_are_clamped_to_seven_bits() {
        assert_eq!(Pitch::new(200).key(), 127);
    }
}
