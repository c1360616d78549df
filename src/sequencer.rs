use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::peripherals::{Motor, Rotation};

/// Runs the door through unlock, hold and lock.
///
/// Every phase is a blocking delay that always runs to completion. The HMI node runs the same
/// phases with a [`Detached`](crate::peripherals::Detached) motor so both ends of the link move on
/// together.
#[derive(Debug)]
pub struct DoorSequencer<M> {
    motor: M,
    door_ms: u32,
    poll_ms: u32,
    speed: u8,
}

impl<M: Motor> DoorSequencer<M> {
    pub fn new(motor: M, config: &Config) -> Self {
        Self {
            motor,
            door_ms: config.timing.door_ms,
            poll_ms: config.timing.occupancy_poll_ms,
            speed: config.motor_speed,
        }
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn release(self) -> M {
        self.motor
    }

    /// Unlocks: clockwise for the door delay, then stop.
    pub fn open_phase<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<()> {
        debug!("door unlocking");
        self.run(Rotation::Clockwise, delay)
    }

    /// Holds the door open while `sensor` reports presence.
    ///
    /// Each sample goes to `report`. The first sample is always reported, and the last reported
    /// sample is always unoccupied.
    pub fn hold_open<P, D, F>(&mut self, sensor: &mut P, delay: &mut D, mut report: F) -> Result<()>
    where P: InputPin,
          D: DelayMs<u32>,
          F: FnMut(bool) -> Result<()>
    {
        let mut occupied = sensor.is_high().map_err(|_| Error::Sensor)?;
        report(occupied)?;
        while occupied {
            delay.delay_ms(self.poll_ms);
            occupied = sensor.is_high().map_err(|_| Error::Sensor)?;
            report(occupied)?;
        }
        Ok(())
    }

    /// Locks: counter-clockwise for the door delay, then stop.
    pub fn close_phase<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<()> {
        debug!("door locking");
        self.run(Rotation::CounterClockwise, delay)
    }

    /// Open, hold, close, in that order, whatever the sensor says.
    pub fn cycle<P, D, F>(&mut self, sensor: &mut P, delay: &mut D, report: F) -> Result<()>
    where P: InputPin,
          D: DelayMs<u32>,
          F: FnMut(bool) -> Result<()>
    {
        self.open_phase(delay)?;
        self.hold_open(sensor, delay, report)?;
        self.close_phase(delay)?;
        info!("door cycle complete");
        Ok(())
    }

    fn run<D: DelayMs<u32>>(&mut self, rotation: Rotation, delay: &mut D) -> Result<()> {
        self.motor.rotate(rotation, self.speed)?;
        delay.delay_ms(self.door_ms);
        self.motor.rotate(Rotation::Stop, 0)
    }
}
