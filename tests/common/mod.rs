//! Two nodes joined by an in-memory serial wire, one per thread.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use door_locker::{
    CharDisplay, Config, DoorSequencer, Hmi, Keypad, Link, MemoryStore, Motor, Password,
    PasswordStore, Result, Rotation, SecurityEngine,
};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::serial::{Read, Write};

/// Sending half of one wire direction. Fails once the far end is gone.
#[derive(Debug)]
pub struct WireTx(Sender<u8>);

/// Receiving half of one wire direction. Blocks like a UART with nothing in its data register.
#[derive(Debug)]
pub struct WireRx(Receiver<u8>);

impl Write<u8> for WireTx {
    type Error = ();

    fn write(&mut self, word: u8) -> nb::Result<(), ()> {
        self.0.send(word).map_err(|_| nb::Error::Other(()))
    }

    fn flush(&mut self) -> nb::Result<(), ()> {
        Ok(())
    }
}

impl Read<u8> for WireRx {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, ()> {
        self.0.recv().map_err(|_| nb::Error::Other(()))
    }
}

/// Returns the HMI end and the Control end of a null-modem cable.
pub fn wire() -> (Link<WireTx, WireRx>, Link<WireTx, WireRx>) {
    let (to_control, from_hmi) = channel();
    let (to_hmi, from_control) = channel();
    (
        Link::new(WireTx(to_control), WireRx(from_control)),
        Link::new(WireTx(to_hmi), WireRx(from_hmi)),
    )
}

#[derive(Debug)]
pub struct ScriptedKeypad(VecDeque<u8>);

impl ScriptedKeypad {
    pub fn new(keys: &str) -> Self {
        Self(keys.bytes().collect())
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

impl Keypad for ScriptedKeypad {
    type Error = ();

    fn read_key(&mut self) -> nb::Result<u8, ()> {
        self.0.pop_front().ok_or(nb::Error::Other(()))
    }
}

/// Display that keeps every line written to it.
#[derive(Debug, Default)]
pub struct Lcd {
    pub lines: Vec<String>,
}

impl Lcd {
    pub fn shown(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line == text)
    }
}

impl CharDisplay for Lcd {
    type Error = Infallible;

    fn clear(&mut self) -> std::result::Result<(), Infallible> {
        Ok(())
    }

    fn display(&mut self, _row: u8, _col: u8, text: &str) -> std::result::Result<(), Infallible> {
        self.lines.push(text.to_string());
        Ok(())
    }
}

/// Delay that returns at once and remembers what it was asked for.
#[derive(Debug, Default, Clone)]
pub struct Clock(pub Arc<Mutex<Vec<u32>>>);

impl Clock {
    pub fn calls(&self) -> Vec<u32> {
        self.0.lock().unwrap().clone()
    }
}

impl DelayMs<u32> for Clock {
    fn delay_ms(&mut self, ms: u32) {
        self.0.lock().unwrap().push(ms);
    }
}

#[derive(Debug, Default, Clone)]
pub struct MotorLog(pub Arc<Mutex<Vec<Rotation>>>);

impl MotorLog {
    pub fn rotations(&self) -> Vec<Rotation> {
        self.0.lock().unwrap().clone()
    }
}

impl Motor for MotorLog {
    fn rotate(&mut self, rotation: Rotation, _speed: u8) -> Result<()> {
        self.0.lock().unwrap().push(rotation);
        Ok(())
    }
}

/// Presence sensor replaying samples, then reporting an empty doorway.
#[derive(Debug)]
pub struct Presence(Mutex<VecDeque<bool>>);

impl Presence {
    pub fn new(samples: &[bool]) -> Self {
        Self(Mutex::new(samples.iter().copied().collect()))
    }
}

impl InputPin for Presence {
    type Error = Infallible;

    fn is_high(&self) -> std::result::Result<bool, Infallible> {
        Ok(self.0.lock().unwrap().pop_front().unwrap_or(false))
    }

    fn is_low(&self) -> std::result::Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

pub type ControlEngine = SecurityEngine<WireTx, WireRx, MemoryStore, MotorLog, Presence, Clock>;
pub type TestHmi = Hmi<WireTx, WireRx, ScriptedKeypad, Lcd, Clock>;

/// What the Control node leaves behind once the HMI hangs up.
#[derive(Debug)]
pub struct ControlReport {
    pub engine: ControlEngine,
    pub motor: MotorLog,
    pub clock: Clock,
}

impl ControlReport {
    pub fn stored(&mut self) -> Option<Password> {
        self.engine.store().load().unwrap()
    }
}

/// Starts a Control node serving until its link drops.
pub fn spawn_control(
    link: Link<WireTx, WireRx>,
    store: MemoryStore,
    presence: &[bool],
) -> JoinHandle<ControlReport> {
    let motor = MotorLog::default();
    let clock = Clock::default();
    let mut engine = SecurityEngine::new(
        link,
        store,
        DoorSequencer::new(motor.clone(), &Config::default()),
        Presence::new(presence),
        clock.clone(),
    );
    thread::spawn(move || {
        while engine.serve_once().is_ok() {}
        ControlReport { engine, motor, clock }
    })
}

pub fn hmi(link: Link<WireTx, WireRx>, keys: &str) -> (TestHmi, Clock) {
    let clock = Clock::default();
    let keypad = ScriptedKeypad::new(keys);
    let hmi = Hmi::new(link, keypad, Lcd::default(), clock.clone(), Config::default());
    (hmi, clock)
}

pub fn password(symbols: &[u8; 5]) -> Password {
    Password::new(*symbols).unwrap()
}
