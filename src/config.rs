//! Timings and policy shared by both nodes.
//!
//! Both nodes must be built with the same door timing, otherwise the HMI announces "Door Locking"
//! while the Control node is still holding the door open.

/// Real-time intervals, all in milliseconds except the lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause before each keypad scan, so one press is not read twice.
    pub keypad_debounce_ms: u32,

    /// How long a transient message stays on the display.
    pub message_ms: u32,

    /// Length of each door phase (unlocking and locking).
    pub door_ms: u32,

    /// Lockout length, counted as this many one-second waits.
    pub lockout_secs: u32,

    /// Interval between presence sensor samples while the door is held open.
    pub occupancy_poll_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            keypad_debounce_ms: 250,
            message_ms: 750,
            door_ms: 15_000,
            // The display promises one minute; the lockout has always been 59 seconds.
            lockout_secs: 59,
            occupancy_poll_ms: 100,
        }
    }
}

/// Node configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub timing: Timing,

    /// Wrong verifications allowed before lockout. Never below 1.
    max_attempts: u8,

    /// Motor speed during the door phases, in percent of full duty.
    pub motor_speed: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            max_attempts: 3,
            motor_speed: 100,
        }
    }
}

impl Config {
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u8) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    pub fn with_motor_speed(mut self, speed: u8) -> Self {
        self.motor_speed = speed.min(100);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Line settings both UARTs must agree on. The link itself does not configure the peripheral;
/// whoever builds the `TX`/`RX` halves applies these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            parity: Parity::Odd,
            stop_bits: StopBits::One,
            data_bits: 8,
        }
    }
}
