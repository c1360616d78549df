//! Collaborators the state machines drive. Where `embedded-hal` has a trait for the job (serial,
//! pins, PWM, delays, I2C) it is used directly; keypad, display and motor get small traits here.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::error::{Error, Result};

/// A scanned key matrix.
pub trait Keypad {
    type Error;

    /// Returns the pressed key, or `WouldBlock` while no key is down.
    fn read_key(&mut self) -> nb::Result<u8, Self::Error>;
}

/// A line-oriented character display such as a 16x2 LCD.
pub trait CharDisplay {
    type Error;

    fn clear(&mut self) -> core::result::Result<(), Self::Error>;

    /// Writes `text` starting at `row`, `col`.
    fn display(&mut self, row: u8, col: u8, text: &str) -> core::result::Result<(), Self::Error>;
}

/// Direction of the door motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Stop,
    /// Unlocks the door.
    Clockwise,
    /// Locks the door.
    CounterClockwise,
}

pub trait Motor {
    /// Turns the motor at `speed` percent of full power. `speed` is ignored for `Stop`.
    fn rotate(&mut self, rotation: Rotation, speed: u8) -> Result<()>;
}

/// Stand-in motor for a node that mirrors the door timing without driving anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl Motor for Detached {
    fn rotate(&mut self, _rotation: Rotation, _speed: u8) -> Result<()> {
        Ok(())
    }
}

/// DC motor behind an H-bridge: two direction inputs and a PWM enable line.
#[derive(Debug)]
pub struct DcMotor<IN1, IN2, EN> {
    in1: IN1,
    in2: IN2,
    enable: EN,
}

impl<IN1, IN2, EN> DcMotor<IN1, IN2, EN>
where IN1: OutputPin,
      IN2: OutputPin,
      EN: PwmPin<Duty = u16>
{
    /// Takes the pins and leaves the motor stopped.
    pub fn new(in1: IN1, in2: IN2, enable: EN) -> Result<Self> {
        let mut motor = Self { in1, in2, enable };
        motor.enable.enable();
        motor.rotate(Rotation::Stop, 0)?;
        Ok(motor)
    }

    pub fn release(self) -> (IN1, IN2, EN) {
        (self.in1, self.in2, self.enable)
    }

    fn duty_for(&self, speed: u8) -> u16 {
        let max = u32::from(self.enable.get_max_duty());
        (max * u32::from(speed.min(100)) / 100) as u16
    }
}

impl<IN1, IN2, EN> Motor for DcMotor<IN1, IN2, EN>
where IN1: OutputPin,
      IN2: OutputPin,
      EN: PwmPin<Duty = u16>
{
    fn rotate(&mut self, rotation: Rotation, speed: u8) -> Result<()> {
        // Direction pins first, so the bridge never sees duty with a stale direction.
        let (in1, in2, duty) = match rotation {
            Rotation::Stop => (false, false, 0),
            Rotation::Clockwise => (true, false, self.duty_for(speed)),
            Rotation::CounterClockwise => (false, true, self.duty_for(speed)),
        };
        set_pin(&mut self.in1, in1)?;
        set_pin(&mut self.in2, in2)?;
        self.enable.set_duty(duty);
        Ok(())
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| Error::Motor)
}
