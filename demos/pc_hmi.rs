//! HMI node on a PC: keys come from stdin, the display is the terminal.
//!
//! Usage: `pc_hmi [port_name]`. Type keys followed by Enter, for example `12345=`.

use std::cell::RefCell;
use std::convert::Infallible;
use std::env;
use std::io;

use door_locker::{CharDisplay, Config, Hmi, Keypad, Link, SerialConfig};

mod pc_utils;
use pc_utils::{
    flush_stdout, init_logging, open_port, print_ports, read_stdin_byte, SerialReader, SerialWriter,
    StdDelay,
};

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => print_ports(),
        2 => run_hmi(args[1].as_str()),
        _ => panic!("Usage: pc_hmi [port_name]"),
    };
}

fn run_hmi(port_name: &str) {
    init_logging();
    let port = open_port(port_name, &SerialConfig::default()).unwrap();
    let port_cell = RefCell::new(port);

    let link = Link::new(SerialWriter(&port_cell), SerialReader(&port_cell));
    let mut hmi = Hmi::new(link, StdinKeypad, Terminal, StdDelay, Config::default());
    match hmi.run() {
        Ok(never) => match never {},
        Err(e) => println!("Error: {}", e),
    }
}

struct StdinKeypad;

impl Keypad for StdinKeypad {
    type Error = io::Error;

    fn read_key(&mut self) -> nb::Result<u8, io::Error> {
        match read_stdin_byte() {
            Ok(Some(b'\n')) | Ok(Some(b'\r')) => Err(nb::Error::WouldBlock),
            Ok(Some(key)) => Ok(key),
            Ok(None) => Err(nb::Error::Other(io::ErrorKind::UnexpectedEof.into())),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }
}

struct Terminal;

impl CharDisplay for Terminal {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        println!();
        println!("----------------");
        Ok(())
    }

    fn display(&mut self, row: u8, col: u8, text: &str) -> Result<(), Infallible> {
        if text == "*" {
            print!("*");
            flush_stdout();
        } else {
            println!("[{},{}] {}", row, col, text);
        }
        Ok(())
    }
}
