//! The keypad/display node. It starts every exchange on the link; the Control node only answers.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial::{Read, Write};
use nb::block;
use tracing::{debug, info, warn};

use crate::commands::{Intent, Request};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handshake::Link;
use crate::password::{is_password_symbol, Password, CONFIRM_KEY, PASSWORD_LEN};
use crate::peripherals::{CharDisplay, Detached, Keypad};
use crate::responses::Verdict;
use crate::sequencer::DoorSequencer;

const MASK: &str = "*";

/// Where the HMI is in the password lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Boot,
    CreatingPassword,
    Home,
    VerifyingPassword(Intent),
    Actuating,
    RecreatingPassword,
    LockedOut,
}

/// Keypad and display front end driving the password state machine.
#[derive(Debug)]
pub struct Hmi<TX, RX, K, L, D> {
    link: Link<TX, RX>,
    keypad: K,
    lcd: L,
    delay: D,
    door: DoorSequencer<Detached>,
    config: Config,
    state: State,
    attempt: u8,
}

impl<TX, RX, K, L, D> Hmi<TX, RX, K, L, D>
where TX: Write<u8>,
      RX: Read<u8>,
      K: Keypad,
      L: CharDisplay,
      D: DelayMs<u32>
{
    pub fn new(link: Link<TX, RX>, keypad: K, lcd: L, delay: D, config: Config) -> Self {
        Self {
            link,
            keypad,
            lcd,
            delay,
            door: DoorSequencer::new(Detached, &config),
            config,
            state: State::Boot,
            attempt: 1,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Retry counter, 1 for the first attempt of a verification.
    pub fn attempt(&self) -> u8 {
        self.attempt
    }

    pub fn release(self) -> (Link<TX, RX>, K, L, D) {
        (self.link, self.keypad, self.lcd, self.delay)
    }

    /// Runs the state machine forever. Only returns on a peripheral or link failure.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.step()?;
        }
    }

    /// Runs the current state to completion and returns the next one.
    pub fn step(&mut self) -> Result<State> {
        let next = match self.state {
            State::Boot => self.boot()?,
            State::CreatingPassword => {
                self.create_password()?;
                self.show(&[(0, 0, "Password Created"), (1, 2, "Successfully")])?;
                State::Home
            },
            State::Home => self.home()?,
            State::VerifyingPassword(intent) => self.verify(intent)?,
            State::Actuating => self.actuate()?,
            State::RecreatingPassword => {
                self.create_password()?;
                self.show(&[(0, 0, "Password Changed"), (1, 2, "Successfully")])?;
                State::Home
            },
            State::LockedOut => self.lockout()?,
        };
        if next != self.state {
            info!(from = ?self.state, to = ?next, "hmi transition");
        }
        self.state = next;
        Ok(next)
    }

    fn boot(&mut self) -> Result<State> {
        self.show(&[(0, 6, "Hello")])?;
        self.show(&[(0, 1, "Welcome To our"), (1, 5, "System")])?;
        Ok(State::CreatingPassword)
    }

    /// Takes a new password and its confirmation until the Control node accepts the pair.
    ///
    /// A mismatch keeps the state, so the caller's next step asks again.
    fn create_password(&mut self) -> Result<()> {
        loop {
            self.prompt(&[(0, 0, "PLZ Enter Pass:")])?;
            let first = self.read_password(1, 0)?;
            self.prompt(&[(0, 0, "PLZ Re-Enter The"), (1, 0, "Same Pass:")])?;
            let confirm = self.read_password(1, 10)?;

            self.submit(&Request::Create { first, confirm })?;
            if self.receive_verdict()?.is_match() {
                info!("password accepted");
                return Ok(());
            }
            warn!("password entries differ");
            self.show(&[(0, 3, "Try Again.")])?;
        }
    }

    fn home(&mut self) -> Result<State> {
        self.prompt(&[(0, 0, "+ : Open Door"), (1, 0, "- : Change Pass")])?;
        let key = self.read_key()?;
        match Intent::from_key(key) {
            Some(intent) => {
                self.submit(&Request::Select(intent))?;
                Ok(State::VerifyingPassword(intent))
            },
            None => {
                debug!(key, "not a menu key");
                self.show(&[(0, 3, "Try Again.")])?;
                Ok(State::Home)
            },
        }
    }

    /// One verification attempt.
    fn verify(&mut self, intent: Intent) -> Result<State> {
        self.prompt(&[(0, 0, "PLZ Enter Old"), (1, 0, "Pass:")])?;
        let candidate = self.read_password(1, 5)?;
        self.submit(&Request::Verify(candidate))?;

        if self.receive_verdict()?.is_match() {
            self.attempt = 1;
            return Ok(match intent {
                Intent::OpenDoor => State::Actuating,
                Intent::ChangePassword => State::RecreatingPassword,
            });
        }

        warn!(attempt = self.attempt, "wrong password");
        if self.attempt >= self.config.max_attempts() {
            return Ok(State::LockedOut);
        }
        self.attempt += 1;
        self.show(&[(0, 3, "Try Again.")])?;
        Ok(State::VerifyingPassword(intent))
    }

    fn lockout(&mut self) -> Result<State> {
        warn!(secs = self.config.timing.lockout_secs, "system locked");
        self.prompt(&[(0, 2, "System Locked"), (1, 1, "Wait For 1 Min")])?;
        for _ in 0..self.config.timing.lockout_secs {
            self.delay.delay_ms(1000);
        }
        self.attempt = 1;
        Ok(State::Home)
    }

    fn actuate(&mut self) -> Result<State> {
        self.prompt(&[(0, 1, "Door Unlocking"), (1, 4, "PLZ Wait")])?;
        self.door.open_phase(&mut self.delay)?;

        // Presence stream: the first sample behind a rendezvous, the rest raw up to a zero.
        if self.link.ready_receive_byte()? != 0 {
            self.prompt(&[(0, 1, "Wait For People"), (1, 4, "To Enter")])?;
            while self.link.receive_byte()? != 0 {}
        }

        self.prompt(&[(0, 2, "Door Locking")])?;
        self.door.close_phase(&mut self.delay)?;
        Ok(State::Home)
    }

    /// Reads a masked entry, echoing a mask for every accepted symbol from `row`, `col` on.
    ///
    /// Reserved keys and anything outside the password alphabet are skipped. Once all symbols are
    /// in, keys are discarded until the confirm key.
    pub fn read_password(&mut self, row: u8, col: u8) -> Result<Password> {
        let mut symbols = [0u8; PASSWORD_LEN];
        let mut count = 0;
        while count < PASSWORD_LEN {
            let key = self.read_key()?;
            if is_password_symbol(key) {
                symbols[count] = key;
                self.lcd
                    .display(row, col + count as u8, MASK)
                    .map_err(|_| Error::Display)?;
                count += 1;
            }
        }
        while self.read_key()? != CONFIRM_KEY {}
        Password::new(symbols)
    }

    fn read_key(&mut self) -> Result<u8> {
        self.delay.delay_ms(self.config.timing.keypad_debounce_ms);
        block!(self.keypad.read_key()).map_err(|_| Error::Keypad)
    }

    fn submit(&mut self, request: &Request) -> Result<()> {
        self.link.offer()?;
        for unit in request.units() {
            self.link.transfer(unit)?;
        }
        Ok(())
    }

    fn receive_verdict(&mut self) -> Result<Verdict> {
        self.link.ready_receive_byte().map(Verdict::from_byte)
    }

    /// Clears the display and writes `lines`.
    fn prompt(&mut self, lines: &[(u8, u8, &str)]) -> Result<()> {
        self.lcd.clear().map_err(|_| Error::Display)?;
        for (row, col, text) in lines {
            self.lcd.display(*row, *col, text).map_err(|_| Error::Display)?;
        }
        Ok(())
    }

    /// Like [`Hmi::prompt`], then holds the message for the message delay.
    fn show(&mut self, lines: &[(u8, u8, &str)]) -> Result<()> {
        self.prompt(lines)?;
        self.delay.delay_ms(self.config.timing.message_ms);
        Ok(())
    }
}
