//! Non-volatile home of the one password record.

use byteorder::{BigEndian, ByteOrder};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use tracing::debug;

use crate::error::{Error, Result};
use crate::password::{Password, PASSWORD_LEN};

/// Holds exactly one password, overwritten in place.
pub trait PasswordStore {
    /// Returns the stored password, or `None` if nothing valid has been written yet.
    fn load(&mut self) -> Result<Option<Password>>;

    fn store(&mut self, password: &Password) -> Result<()>;
}

/// RAM-backed store. Loses the password on reset.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    record: Option<Password>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: Password) -> Self {
        Self { record: Some(password) }
    }
}

impl PasswordStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Password>> {
        Ok(self.record)
    }

    fn store(&mut self, password: &Password) -> Result<()> {
        self.record = Some(*password);
        Ok(())
    }
}

/// Default 7-bit address of a 24Cxx EEPROM with A0..A2 tied low.
pub const EEPROM_DEVICE_ADDRESS: u8 = 0x50;

/// Time the EEPROM needs to commit one byte.
pub const EEPROM_WRITE_CYCLE_MS: u32 = 10;

/// Store on an I2C 24Cxx EEPROM with two-byte memory addresses.
///
/// Bytes are written one at a time, each followed by a full write cycle, so the record may sit
/// anywhere without caring about page boundaries.
#[derive(Debug)]
pub struct EepromStore<I2C, D> {
    i2c: I2C,
    delay: D,
    device: u8,
    base: u16,
}

impl<I2C, D> EepromStore<I2C, D>
where I2C: Write + WriteRead,
      D: DelayMs<u32>
{
    /// `base` is the memory address of the first password symbol.
    pub fn new(i2c: I2C, delay: D, base: u16) -> Self {
        Self {
            i2c,
            delay,
            device: EEPROM_DEVICE_ADDRESS,
            base,
        }
    }

    pub fn with_device_address(mut self, device: u8) -> Self {
        self.device = device;
        self
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> PasswordStore for EepromStore<I2C, D>
where I2C: Write + WriteRead,
      D: DelayMs<u32>
{
    fn load(&mut self) -> Result<Option<Password>> {
        let mut address = [0u8; 2];
        BigEndian::write_u16(&mut address, self.base);
        let mut record = [0u8; PASSWORD_LEN];
        self.i2c
            .write_read(self.device, &address, &mut record)
            .map_err(|_| Error::Storage)?;
        // A blank part reads back 0xFF, which is not a password symbol.
        Ok(Password::new(record).ok())
    }

    fn store(&mut self, password: &Password) -> Result<()> {
        // Required write:
        // addr  | memory address [2], big endian
        // data  | symbol [1]
        for (offset, symbol) in password.as_bytes().iter().enumerate() {
            let mut packet = [0u8; 3];
            BigEndian::write_u16(&mut packet[..2], self.base.wrapping_add(offset as u16));
            packet[2] = *symbol;
            self.i2c.write(self.device, &packet).map_err(|_| Error::Storage)?;
            self.delay.delay_ms(EEPROM_WRITE_CYCLE_MS);
        }
        debug!(base = self.base, "password record written");
        Ok(())
    }
}
