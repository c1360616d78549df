use thiserror::Error;

/// Errors raised by the link, the peripherals, or the password rules.
///
/// Peripheral drivers all bring their own error types; they are collapsed into one variant per
/// collaborator so the state machines stay free of extra type parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The serial peripheral reported a read or write failure.
    #[error("serial link read or write failed")]
    Serial,

    /// A frame filled the receive buffer before its sentinel showed up. The rest of the frame
    /// was drained, so the link is still aligned.
    #[error("frame exceeded {0} bytes without a sentinel")]
    FrameOverflow(usize),

    #[error("password must be {expected} symbols, got {actual}")]
    PasswordLength { expected: usize, actual: usize },

    #[error("byte {0:#04x} is not a password symbol")]
    InvalidSymbol(u8),

    #[error("keypad scan failed")]
    Keypad,

    #[error("display write failed")]
    Display,

    #[error("password storage failed")]
    Storage,

    #[error("motor command failed")]
    Motor,

    #[error("occupancy sensor read failed")]
    Sensor,
}

pub type Result<T> = core::result::Result<T, Error>;
