//! **door-locker** is the security protocol of a two-node door lock: an HMI node with a keypad
//! and a character display, and a Control node with the door motor, a presence sensor and the
//! stored password. The nodes talk over one plain UART, through any `embedded-hal` serial pair.
//!
//! The HMI node runs [`Hmi`], which owns the prompts, the retry counter and the lockout. The
//! Control node runs [`SecurityEngine`], which only answers: it stores and checks the password
//! and drives the door through [`DoorSequencer`]. Both sides speak through a [`Link`], where every
//! exchange starts with a token rendezvous so neither side reads bytes the other has not
//! committed to sending.
//!
//! ## Example
//!
//! Offering a candidate password to the Control node:
//! ```
//! # use embedded_hal::serial::{Read, Write};
//! use door_locker::{Link, Password, Unit, HANDSHAKE_TOKEN};
//! # struct TestTx(Vec<u8>);
//! # struct TestRx(usize);
//! #
//! # impl Write<u8> for TestTx {
//! #     type Error = ();
//! #     fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
//! #         self.0.push(word);
//! #         return Ok(());
//! #     }
//! #     fn flush(&mut self) -> nb::Result<(), Self::Error> {
//! #         return Ok(());
//! #     }
//! # }
//! #
//! # const res_data: &[u8] = &[ 0x01 ];
//! #
//! # impl Read<u8> for TestRx {
//! #     type Error = ();
//! #     fn read(&mut self) -> nb::Result<u8, Self::Error> {
//! #         let word = res_data[self.0];
//! #         self.0 += 1;
//! #         return Ok(word);
//! #     }
//! # }
//! # let rx = TestRx(0);
//! # let tx = TestTx(Vec::new());
//!
//! // Obtain tx, rx from some serial port implementation
//! let mut link = Link::new(tx, rx);
//! let candidate = Password::new(*b"12345").unwrap();
//! link.ready_send(Unit::Array(candidate.as_bytes())).unwrap();
//! # let (tx, _) = link.release();
//! # assert_eq!(tx.0, b"\x0112345#");
//! ```
//!
//! For complete nodes on a PC serial port, see the `demos` directory.
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

mod commands;
mod config;
mod engine;
mod error;
mod handshake;
mod hmi;
mod password;
mod peripherals;
mod responses;
mod sequencer;
mod storage;
mod timer;

#[cfg(test)]
mod mock;

pub use crate::commands::{Intent, Request};
pub use crate::config::{Config, Parity, SerialConfig, StopBits, Timing};
pub use crate::engine::{Expecting, SecurityEngine};
pub use crate::error::{Error, Result};
pub use crate::handshake::{Frame, Link, Unit, FRAME_CAPACITY, HANDSHAKE_TOKEN, SENTINEL};
pub use crate::hmi::{Hmi, State};
pub use crate::password::{
    is_password_symbol, Password, CHANGE_PASSWORD_KEY, CONFIRM_KEY, OPEN_DOOR_KEY, PASSWORD_LEN,
    RESERVED_KEYS,
};
pub use crate::peripherals::{CharDisplay, DcMotor, Detached, Keypad, Motor, Rotation};
pub use crate::responses::{occupancy_byte, Verdict};
pub use crate::sequencer::DoorSequencer;
pub use crate::storage::{
    EepromStore, MemoryStore, PasswordStore, EEPROM_DEVICE_ADDRESS, EEPROM_WRITE_CYCLE_MS,
};
pub use crate::timer::{compare_values, CompareDelay, CompareValues, TICK_HZ_8MHZ_DIV1024};
