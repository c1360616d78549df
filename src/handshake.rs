use arrayvec::ArrayVec;
use embedded_hal::serial::{Read, Write};
use nb::block;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

/// "I am ready for the next unit." Sent by both sides before any payload moves.
pub const HANDSHAKE_TOKEN: u8 = 0x01;

/// Terminates arrays and strings on the wire.
pub const SENTINEL: u8 = b'#';

/// Largest payload a frame can carry, sentinel excluded.
pub const FRAME_CAPACITY: usize = 16;

/// Payload of a received frame, sentinel stripped.
pub type Frame = ArrayVec<[u8; FRAME_CAPACITY]>;

/// One unit of transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit<'a> {
    /// A single raw byte, no terminator.
    Byte(u8),
    /// A fixed array, followed by the sentinel on the wire.
    Array(&'a [u8]),
    /// A string, followed by the sentinel unless it already ends with one.
    Str(&'a str),
}

/// One end of the serial link between the two nodes.
///
/// There are no packet boundaries, no flow control and no interrupts on the wire, so every
/// exchange starts with a rendezvous: the sender offers [`HANDSHAKE_TOKEN`] and waits for the
/// receiver to answer with the same token before the payload flows. Waits are unbounded; a peer
/// that never answers stalls the caller.
#[derive(Debug)]
pub struct Link<TX, RX> {
    tx: TX,
    rx: RX,
}

impl<TX, RX> Link<TX, RX>
where TX: Write<u8>,
      RX: Read<u8>
{
    pub fn new(tx: TX, rx: RX) -> Self {
        Self { tx, rx }
    }

    /// Gives the serial halves back.
    pub fn release(self) -> (TX, RX) {
        (self.tx, self.rx)
    }

    /// Offers a unit, blocks until the peer is ready for it, then transfers it.
    pub fn ready_send(&mut self, unit: Unit<'_>) -> Result<()> {
        self.offer()?;
        self.transfer(unit)
    }

    /// Signals readiness, then blocks until one byte arrives.
    pub fn ready_receive_byte(&mut self) -> Result<u8> {
        self.accept()?;
        self.receive_byte()
    }

    /// Signals readiness, then blocks until one sentinel-terminated frame arrives.
    pub fn ready_receive_frame(&mut self) -> Result<Frame> {
        self.accept()?;
        self.receive_frame()
    }

    /// Sender half of the rendezvous: announce, then wait for the peer's token.
    pub fn offer(&mut self) -> Result<()> {
        debug!("offering unit");
        self.send_byte(HANDSHAKE_TOKEN)?;
        self.wait_for_token()
    }

    /// Receiver half of the rendezvous: wait for the peer's token, then answer it.
    pub fn accept(&mut self) -> Result<()> {
        self.wait_for_token()?;
        self.send_byte(HANDSHAKE_TOKEN)?;
        debug!("accepted unit");
        Ok(())
    }

    /// Writes a unit without a rendezvous. Only valid while continuing an exchange the peer has
    /// already accepted.
    pub fn transfer(&mut self, unit: Unit<'_>) -> Result<()> {
        match unit {
            Unit::Byte(byte) => self.write_byte(byte)?,
            Unit::Array(bytes) => {
                self.write_bytes(bytes)?;
                self.write_byte(SENTINEL)?;
            },
            Unit::Str(text) => {
                let bytes = text.as_bytes();
                self.write_bytes(bytes)?;
                if bytes.last() != Some(&SENTINEL) {
                    self.write_byte(SENTINEL)?;
                }
            },
        }
        return block!(self.tx.flush()).map_err(|_| Error::Serial);
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.transfer(Unit::Byte(byte))
    }

    /// Blocks until the receiver holds a byte.
    pub fn receive_byte(&mut self) -> Result<u8> {
        block!(self.rx.read()).map_err(|_| Error::Serial)
    }

    /// Reads bytes up to the sentinel.
    pub fn receive_frame(&mut self) -> Result<Frame> {
        let first = self.receive_byte()?;
        self.receive_frame_from(first)
    }

    /// Like [`Link::receive_frame`], for callers that already consumed the first byte to decide
    /// what kind of unit is arriving.
    pub fn receive_frame_from(&mut self, first: u8) -> Result<Frame> {
        let mut frame = Frame::new();
        let mut byte = first;
        let mut overflowed = false;
        while byte != SENTINEL {
            if frame.try_push(byte).is_err() {
                overflowed = true;
            }
            byte = self.receive_byte()?;
        }

        if overflowed {
            warn!(capacity = FRAME_CAPACITY, "frame overflowed, drained to sentinel");
            return Err(Error::FrameOverflow(FRAME_CAPACITY));
        }
        return Ok(frame);
    }

    fn wait_for_token(&mut self) -> Result<()> {
        loop {
            let byte = self.receive_byte()?;
            if byte == HANDSHAKE_TOKEN {
                return Ok(());
            }
            trace!(byte, "discarding stray byte while waiting for token");
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for byte in bytes {
            self.write_byte(*byte)?;
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        block!(self.tx.write(byte)).map_err(|_| Error::Serial)
    }
}
