use arrayvec::ArrayVec;

use crate::handshake::Unit;
use crate::password::{Password, CHANGE_PASSWORD_KEY, OPEN_DOOR_KEY};

/// What the user asked for on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    OpenDoor,
    ChangePassword,
}

impl Intent {
    /// Maps a home-screen key to its intent. Every other key is a wrong selection.
    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            OPEN_DOOR_KEY => Some(Self::OpenDoor),
            CHANGE_PASSWORD_KEY => Some(Self::ChangePassword),
            _ => None,
        }
    }

    pub fn key(self) -> u8 {
        match self {
            Self::OpenDoor => OPEN_DOOR_KEY,
            Self::ChangePassword => CHANGE_PASSWORD_KEY,
        }
    }
}

/// Requests the HMI node sends to the Control node. Each one travels behind a single rendezvous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Home-screen selection, sent as the raw key byte.
    ///
    /// The selection keys are reserved, so a key report can never be mistaken for the first
    /// symbol of a candidate password.
    Select(Intent),

    /// A new password and its confirmation, stored only if they match.
    Create {
        first: Password,
        confirm: Password,
    },

    /// A candidate checked against the stored password.
    Verify(Password),
}

impl Request {
    /// The units that follow the rendezvous, in wire order.
    pub fn units(&self) -> ArrayVec<[Unit<'_>; 2]> {
        let mut units = ArrayVec::new();
        match self {
            // key | raw byte [1]
            Self::Select(intent) => units.push(Unit::Byte(intent.key())),

            // first   | symbols [5] + '#'
            // confirm | symbols [5] + '#'
            Self::Create { first, confirm } => {
                units.push(Unit::Array(first.as_bytes()));
                units.push(Unit::Array(confirm.as_bytes()));
            },

            // candidate | symbols [5] + '#'
            Self::Verify(candidate) => units.push(Unit::Array(candidate.as_bytes())),
        }
        units
    }
}
