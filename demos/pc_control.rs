//! Control node on a PC: the password lives in a file, the motor is a log line and presence is
//! simulated for a fixed number of seconds after the door opens.
//!
//! Usage: `pc_control [port_name] [password_file] [presence_secs]`.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use door_locker::{
    Config, DoorSequencer, Error, Link, Motor, Password, PasswordStore, Rotation, SecurityEngine,
    SerialConfig,
};
use embedded_hal::digital::v2::InputPin;

mod pc_utils;
use pc_utils::{init_logging, open_port, print_ports, SerialReader, SerialWriter, StdDelay};

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        3 => run_control(args[1].as_str(), args[2].as_str(), 0),
        4 => run_control(args[1].as_str(), args[2].as_str(), args[3].parse::<u64>().unwrap()),
        _ => panic!("Usage: pc_control [port_name] [password_file] [presence_secs]"),
    };
}

fn run_control(port_name: &str, password_file: &str, presence_secs: u64) {
    init_logging();
    let port = open_port(port_name, &SerialConfig::default()).unwrap();
    let port_cell = RefCell::new(port);

    let config = Config::default();
    let link = Link::new(SerialWriter(&port_cell), SerialReader(&port_cell));
    let store = FileStore(PathBuf::from(password_file));
    let presence = SimulatedPresence::new(Duration::from_secs(presence_secs));
    let door = DoorSequencer::new(LoggingMotor, &config);

    let mut engine = SecurityEngine::new(link, store, door, presence, StdDelay);
    match engine.run() {
        Ok(never) => match never {},
        Err(e) => println!("Error: {}", e),
    }
}

/// Keeps the record in a file so it survives restarts, like the EEPROM would.
struct FileStore(PathBuf);

impl PasswordStore for FileStore {
    fn load(&mut self) -> door_locker::Result<Option<Password>> {
        match fs::read(&self.0) {
            Ok(bytes) => Ok(Password::from_slice(&bytes).ok()),
            Err(_) => Ok(None),
        }
    }

    fn store(&mut self, password: &Password) -> door_locker::Result<()> {
        fs::write(&self.0, password.as_bytes()).map_err(|_| Error::Storage)
    }
}

struct LoggingMotor;

impl Motor for LoggingMotor {
    fn rotate(&mut self, rotation: Rotation, speed: u8) -> door_locker::Result<()> {
        println!("motor: {:?} at {}%", rotation, speed);
        Ok(())
    }
}

/// Reports presence for a while after the first sample of each door cycle.
struct SimulatedPresence {
    linger: Duration,
    since: Cell<Option<Instant>>,
}

impl SimulatedPresence {
    fn new(linger: Duration) -> Self {
        Self { linger, since: Cell::new(None) }
    }
}

impl InputPin for SimulatedPresence {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let first = self.since.get().unwrap_or_else(Instant::now);
        let occupied = first.elapsed() < self.linger;
        // The stream ends at the first empty sample, so the next cycle starts a fresh visit.
        self.since.set(if occupied { Some(first) } else { None });
        Ok(occupied)
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}
