//! In-memory stand-ins for the peripherals, for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;
use embedded_hal::timer::CountDown;
use embedded_hal::PwmPin;

use crate::error::Result;
use crate::peripherals::{CharDisplay, Keypad, Motor, Rotation};

#[derive(Debug, Default)]
pub struct SerialTx {
    pub written: Vec<u8>,
}

impl serial::Write<u8> for SerialTx {
    type Error = ();

    fn write(&mut self, word: u8) -> nb::Result<(), ()> {
        self.written.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), ()> {
        Ok(())
    }
}

/// Replays a fixed byte script, then fails every read.
#[derive(Debug)]
pub struct SerialRx {
    incoming: VecDeque<u8>,
}

impl SerialRx {
    pub fn new(incoming: &[u8]) -> Self {
        Self { incoming: incoming.iter().copied().collect() }
    }

    pub fn is_drained(&self) -> bool {
        self.incoming.is_empty()
    }
}

impl serial::Read<u8> for SerialRx {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, ()> {
        self.incoming.pop_front().ok_or(nb::Error::Other(()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Rotate(Rotation, u8),
    Delay(u32),
}

/// Shared, ordered record of motor commands and delays.
#[derive(Debug, Default, Clone)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn delay(&self) -> JournalDelay {
        JournalDelay(self.clone())
    }

    fn record(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }
}

#[derive(Debug)]
pub struct JournalDelay(Journal);

impl DelayMs<u32> for JournalDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.record(Event::Delay(ms));
    }
}

#[derive(Debug)]
pub struct RecordingMotor(Journal);

impl RecordingMotor {
    pub fn new(journal: &Journal) -> Self {
        Self(journal.clone())
    }
}

impl Motor for RecordingMotor {
    fn rotate(&mut self, rotation: Rotation, speed: u8) -> Result<()> {
        self.0.record(Event::Rotate(rotation, speed));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: Vec<u32>,
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}

/// Presence sensor replaying samples, failing once they run out.
#[derive(Debug)]
pub struct ScriptedSensor {
    // InputPin reads through &self, but the script has to advance.
    samples: RefCell<VecDeque<bool>>,
}

impl ScriptedSensor {
    pub fn new(samples: &[bool]) -> Self {
        Self { samples: RefCell::new(samples.iter().copied().collect()) }
    }
}

impl InputPin for ScriptedSensor {
    type Error = ();

    fn is_high(&self) -> core::result::Result<bool, ()> {
        self.samples.borrow_mut().pop_front().ok_or(())
    }

    fn is_low(&self) -> core::result::Result<bool, ()> {
        self.is_high().map(|high| !high)
    }
}

#[derive(Debug)]
pub struct ScriptedKeypad {
    keys: VecDeque<u8>,
}

impl ScriptedKeypad {
    pub fn new(keys: &[u8]) -> Self {
        Self { keys: keys.iter().copied().collect() }
    }

    pub fn is_drained(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Keypad for ScriptedKeypad {
    type Error = ();

    fn read_key(&mut self) -> nb::Result<u8, ()> {
        self.keys.pop_front().ok_or(nb::Error::Other(()))
    }
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub writes: Vec<(u8, u8, String)>,
    pub clears: usize,
}

impl CharDisplay for RecordingDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> core::result::Result<(), Infallible> {
        self.clears += 1;
        Ok(())
    }

    fn display(&mut self, row: u8, col: u8, text: &str) -> core::result::Result<(), Infallible> {
        self.writes.push((row, col, text.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Pin {
    pub high: bool,
}

impl OutputPin for Pin {
    type Error = Infallible;

    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

#[derive(Debug)]
pub struct Pwm {
    pub duty: u16,
    pub enabled: bool,
    max: u16,
}

impl Pwm {
    pub fn new(max: u16) -> Self {
        Self { duty: 0, enabled: false, max }
    }
}

impl PwmPin for Pwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        self.max
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
    }
}

/// 32 KiB 24C256 with two-byte addressing.
#[derive(Debug)]
pub struct Eeprom {
    pub memory: Vec<u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl Eeprom {
    pub fn blank() -> Self {
        Self { memory: vec![0xff; 0x8000], writes: Vec::new() }
    }

    fn address(bytes: &[u8]) -> usize {
        (usize::from(bytes[0]) << 8) | usize::from(bytes[1])
    }
}

impl i2c::Write for Eeprom {
    type Error = ();

    fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), ()> {
        self.writes.push((address, bytes.to_vec()));
        let start = Self::address(bytes);
        self.memory[start..start + bytes.len() - 2].copy_from_slice(&bytes[2..]);
        Ok(())
    }
}

impl i2c::WriteRead for Eeprom {
    type Error = ();

    fn write_read(&mut self, _address: u8, bytes: &[u8], buffer: &mut [u8]) -> core::result::Result<(), ()> {
        let start = Self::address(bytes);
        buffer.copy_from_slice(&self.memory[start..start + buffer.len()]);
        Ok(())
    }
}

/// Compare timer that reports each match on the second poll.
#[derive(Debug, Default)]
pub struct CompareTimer {
    pub started: Vec<u16>,
    pub waited: usize,
    armed: bool,
}

impl CountDown for CompareTimer {
    type Time = u16;

    fn start<T>(&mut self, count: T)
    where T: Into<u16>
    {
        self.started.push(count.into());
        self.armed = false;
    }

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        if !self.armed {
            self.armed = true;
            return Err(nb::Error::WouldBlock);
        }
        self.waited += 1;
        Ok(())
    }
}
