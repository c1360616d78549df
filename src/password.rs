use core::fmt;

use crate::error::{Error, Result};
use crate::handshake::SENTINEL;

/// Number of symbols in every password.
pub const PASSWORD_LEN: usize = 5;

/// Submits an entry once all symbols are typed.
pub const CONFIRM_KEY: u8 = b'=';
/// Selects "open door" on the home screen.
pub const OPEN_DOOR_KEY: u8 = b'+';
/// Selects "change password" on the home screen.
pub const CHANGE_PASSWORD_KEY: u8 = b'-';

/// Keys that drive the menus and are never part of a password.
pub const RESERVED_KEYS: [u8; 3] = [CONFIRM_KEY, CHANGE_PASSWORD_KEY, OPEN_DOOR_KEY];

/// True if `key` may appear in a password.
///
/// The alphabet is every printable key except the reserved ones and the frame sentinel, which
/// keeps the sentinel and the handshake token out of any password payload.
pub fn is_password_symbol(key: u8) -> bool {
    key.is_ascii_graphic() && key != SENTINEL && !RESERVED_KEYS.contains(&key)
}

/// A password of exactly [`PASSWORD_LEN`] keypad symbols.
///
/// Comparison is plain byte equality. `Debug` masks the symbols.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Password([u8; PASSWORD_LEN]);

impl Password {
    pub fn new(symbols: [u8; PASSWORD_LEN]) -> Result<Self> {
        if let Some(bad) = symbols.iter().find(|s| !is_password_symbol(**s)) {
            return Err(Error::InvalidSymbol(*bad));
        }
        Ok(Self(symbols))
    }

    /// Builds a password from a received frame payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PASSWORD_LEN {
            return Err(Error::PasswordLength {
                expected: PASSWORD_LEN,
                actual: bytes.len(),
            });
        }
        let mut symbols = [0u8; PASSWORD_LEN];
        symbols.copy_from_slice(bytes);
        Self::new(symbols)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}
