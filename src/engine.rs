//! The Control node: keeper of the password and driver of the door.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::serial::{Read, Write};
use tracing::{debug, info, warn};

use crate::commands::Intent;
use crate::error::{Error, Result};
use crate::handshake::{Frame, Link, Unit};
use crate::password::Password;
use crate::peripherals::Motor;
use crate::responses::{occupancy_byte, Verdict};
use crate::sequencer::DoorSequencer;
use crate::storage::PasswordStore;

/// Which unit the grammar expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expecting {
    /// A password and its confirmation, behind one rendezvous.
    Creation,
    /// A key report or a candidate password.
    Request,
}

/// Reactive side of the protocol.
///
/// It never starts an exchange and keeps no attempt count: retries and lockout belong to the HMI.
/// Its only memory is the stored password, the pending intent and where it is in the grammar.
#[derive(Debug)]
pub struct SecurityEngine<TX, RX, S, M, P, D> {
    link: Link<TX, RX>,
    store: S,
    door: DoorSequencer<M>,
    sensor: P,
    delay: D,
    expecting: Expecting,
    intent: Option<Intent>,
}

impl<TX, RX, S, M, P, D> SecurityEngine<TX, RX, S, M, P, D>
where TX: Write<u8>,
      RX: Read<u8>,
      S: PasswordStore,
      M: Motor,
      P: InputPin,
      D: DelayMs<u32>
{
    /// Starts out expecting a password to be created, as the HMI does after boot.
    pub fn new(link: Link<TX, RX>, store: S, door: DoorSequencer<M>, sensor: P, delay: D) -> Self {
        Self {
            link,
            store,
            door,
            sensor,
            delay,
            expecting: Expecting::Creation,
            intent: None,
        }
    }

    pub fn expecting(&self) -> Expecting {
        self.expecting
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn door(&self) -> &DoorSequencer<M> {
        &self.door
    }

    /// Serves exchanges forever. Only returns on a peripheral or link failure.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.serve_once()?;
        }
    }

    /// Blocks for the next exchange from the HMI and handles it completely.
    pub fn serve_once(&mut self) -> Result<()> {
        match self.expecting {
            Expecting::Creation => self.serve_creation(),
            Expecting::Request => self.serve_request(),
        }
    }

    fn serve_creation(&mut self) -> Result<()> {
        self.link.accept()?;
        // Both frames are read before judging either, so a bad first frame cannot desync the
        // second.
        let first = candidate(self.link.receive_frame())?;
        let confirm = candidate(self.link.receive_frame())?;

        let verdict = match (first, confirm) {
            (Some(first), Some(confirm)) if first == confirm => {
                self.store.store(&first)?;
                info!("password stored");
                Verdict::Match
            },
            _ => {
                warn!("creation entries rejected");
                Verdict::Mismatch
            },
        };
        self.reply(verdict)?;
        if verdict.is_match() {
            self.expecting = Expecting::Request;
        }
        Ok(())
    }

    fn serve_request(&mut self) -> Result<()> {
        self.link.accept()?;
        let lead = self.link.receive_byte()?;
        if let Some(intent) = Intent::from_key(lead) {
            debug!(?intent, "key report");
            self.intent = Some(intent);
            return Ok(());
        }

        let verdict = match candidate(self.link.receive_frame_from(lead))? {
            Some(entered) => Verdict::from(self.store.load()? == Some(entered)),
            None => Verdict::Mismatch,
        };
        self.reply(verdict)?;
        if !verdict.is_match() {
            warn!(intent = ?self.intent, "verification failed");
            return Ok(());
        }

        match self.intent.take() {
            Some(Intent::OpenDoor) => self.open_door(),
            Some(Intent::ChangePassword) => {
                self.expecting = Expecting::Creation;
                Ok(())
            },
            None => {
                warn!("verified without a pending intent");
                Ok(())
            },
        }
    }

    fn open_door(&mut self) -> Result<()> {
        let link = &mut self.link;
        let mut announced = false;
        self.door.cycle(&mut self.sensor, &mut self.delay, |occupied| {
            let byte = occupancy_byte(occupied);
            if announced {
                link.send_byte(byte)
            } else {
                announced = true;
                link.ready_send(Unit::Byte(byte))
            }
        })
    }

    fn reply(&mut self, verdict: Verdict) -> Result<()> {
        debug!(?verdict, "replying");
        self.link.ready_send(Unit::Byte(verdict.to_byte()))
    }
}

/// Turns a received frame into a password. Malformed frames become `None` so they can be
/// answered with a mismatch; link failures still propagate.
fn candidate(frame: Result<Frame>) -> Result<Option<Password>> {
    match frame {
        Ok(frame) => match Password::from_slice(&frame) {
            Ok(password) => Ok(Some(password)),
            Err(err) => {
                warn!(%err, "malformed password frame");
                Ok(None)
            },
        },
        Err(err @ Error::FrameOverflow(_)) => {
            warn!(%err, "malformed password frame");
            Ok(None)
        },
        Err(err) => Err(err),
    }
}
