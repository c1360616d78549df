//! Replies the Control node sends back. Names match the requests they answer.

/// Result of comparing entries, either the two creation entries with each other or a candidate
/// with the stored password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    /// Decodes the reply byte. Anything other than `0` counts as a mismatch.
    pub fn from_byte(byte: u8) -> Self {
        return match byte {
            0x00 => Self::Match,
            _ => Self::Mismatch,
        };
    }

    pub fn to_byte(self) -> u8 {
        return match self {
            Self::Match => 0x00,
            Self::Mismatch => 0x01,
        };
    }

    pub fn is_match(self) -> bool {
        self == Self::Match
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::Mismatch }
    }
}

/// One presence sample streamed while the door is open. The stream ends with the first
/// unoccupied sample.
pub fn occupancy_byte(occupied: bool) -> u8 {
    occupied as u8
}
