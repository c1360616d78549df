use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;
use nb::block;

/// Tick rate of a 16-bit timer clocked from 8 MHz through a /1024 prescaler.
pub const TICK_HZ_8MHZ_DIV1024: u32 = 7812;

/// Blocking delay built from a 16-bit compare-match timer.
///
/// A compare register tops out at 65535 ticks, about 8.4 s at [`TICK_HZ_8MHZ_DIV1024`], so long
/// delays run as a chain of compare cycles: full-range cycles first, then the remainder. Each
/// cycle busy-waits on the timer's match flag.
#[derive(Debug)]
pub struct CompareDelay<T> {
    timer: T,
    tick_hz: u32,
}

impl<T> CompareDelay<T>
where T: CountDown,
      T::Time: From<u16>
{
    pub fn new(timer: T, tick_hz: u32) -> Self {
        Self { timer, tick_hz }
    }

    pub fn release(self) -> T {
        self.timer
    }
}

impl<T> DelayMs<u32> for CompareDelay<T>
where T: CountDown,
      T::Time: From<u16>
{
    fn delay_ms(&mut self, ms: u32) {
        for compare in compare_values(ms, self.tick_hz) {
            self.timer.start(compare);
            // The error type is uninhabited; a compare cycle cannot fail.
            let _ = block!(self.timer.wait());
        }
    }
}

/// Compare values that together count `ms` milliseconds at `tick_hz`.
pub fn compare_values(ms: u32, tick_hz: u32) -> CompareValues {
    CompareValues {
        remaining: u64::from(ms) * u64::from(tick_hz) / 1000,
    }
}

/// Iterator returned by [`compare_values`].
#[derive(Debug, Clone)]
pub struct CompareValues {
    remaining: u64,
}

impl Iterator for CompareValues {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        let cycle = self.remaining.min(u64::from(u16::MAX));
        self.remaining -= cycle;
        Some(cycle as u16)
    }
}
