#![allow(dead_code)]
// Shared between the PC demos; each one uses a different subset.

use std::cell::RefCell;
use std::io::{self, ErrorKind, Read as IoRead, Write as IoWrite};
use std::thread;
use std::time::Duration;

use door_locker::{Parity, SerialConfig, StopBits};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial::{Read, Write};
use serialport::prelude::*;
use tracing_subscriber::EnvFilter;

// The host OS serial port stands in for the UART, so it gets
// wrapped in the embedded-hal serial traits. A port timeout only
// ends one poll; the link itself never gives up.

pub struct SerialReader<'a>(pub &'a RefCell<Box<dyn SerialPort>>);
pub struct SerialWriter<'a>(pub &'a RefCell<Box<dyn SerialPort>>);

impl Read<u8> for SerialReader<'_> {
    type Error = io::Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0u8];
        match self.0.borrow_mut().read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) if e.kind() == ErrorKind::TimedOut => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }
}

impl Write<u8> for SerialWriter<'_> {
    type Error = io::Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        match self.0.borrow_mut().write(&[word]) {
            Ok(1) => Ok(()),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) if e.kind() == ErrorKind::TimedOut => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.0.borrow_mut().flush().map_err(nb::Error::Other)
    }
}

pub fn open_port(port_name: &str, line: &SerialConfig) -> serialport::Result<Box<dyn SerialPort>> {
    println!("Using port {}", port_name);
    let mut port = serialport::open(port_name)?;
    port.set_baud_rate(line.baud_rate)?;
    port.set_parity(match line.parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    })?;
    port.set_stop_bits(match line.stop_bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    })?;
    port.set_data_bits(match line.data_bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    })?;
    port.set_timeout(Duration::from_millis(100))?;
    Ok(port)
}

pub fn print_ports() {
    match serialport::available_ports() {
        Ok(ports) => {
            for port in ports {
                println!("Available port: {} ({:#?})", port.port_name, port.port_type);
            }
        },
        Err(e) => eprintln!("Error: {}", e),
    }
}

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Wall-clock delay.
pub struct StdDelay;

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

pub fn flush_stdout() {
    io::stdout().flush().ok();
}

pub fn read_stdin_byte() -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    match io::stdin().read(&mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(buf[0])),
    }
}
