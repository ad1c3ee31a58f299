//! Hardware Abstraction Layer for the output pin and the alarm timer

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::Duration;

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::Duration;

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Mock duration type, microsecond resolution
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1_000)
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1_000
        }
    }

    impl core::ops::Mul<u32> for Duration {
        type Output = Duration;

        fn mul(self, rhs: u32) -> Duration {
            Duration(self.0 * rhs as u64)
        }
    }
}

use embedded_hal::digital::OutputPin;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Timing operation failed
    TimingError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::TimingError => write!(f, "Timing operation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Trait for the controlled output pin
pub trait OutputLevel {
    type Error: From<HalError>;

    /// Drive the physical level (true = high)
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Last level driven onto the pin
    fn level(&self) -> Result<bool, Self::Error>;

    /// Toggle the output level
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let current = self.level()?;
        self.set_level(!current)
    }
}

/// Trait for a free-running counter with a programmable alarm threshold
pub trait AlarmTimer {
    type Error: From<HalError>;

    /// Current counter value in ticks
    fn counter(&mut self) -> u64;

    /// Program the absolute counter value at which the alarm fires next
    fn set_alarm(&mut self, threshold: u64) -> Result<(), Self::Error>;
}

/// A monitored input with a latched edge interrupt
pub trait EdgeInput {
    /// Start latching edges on this input
    fn listen(&mut self);

    /// An edge is latched and not yet acknowledged
    fn is_pending(&self) -> bool;

    /// Clear the latched edge
    fn acknowledge(&mut self);
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalOutput<P> {
    pin: P,
    inverted: bool,
    level: bool,
}

impl<P> EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    /// Wrap a pin; with `inverted` a logical high drives the pin low
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted, level: false }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputLevel for EmbeddedHalOutput<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        let physical = if self.inverted { !high } else { high };
        if physical {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.level = high;
        Ok(())
    }

    fn level(&self) -> Result<bool, Self::Error> {
        Ok(self.level)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use heapless::Vec;

    #[derive(Default, Debug)]
    pub struct MockOutput {
        level: bool,
        writes: usize,
        fail_next: bool,
    }

    impl MockOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_high(&self) -> bool {
            self.level
        }

        /// Number of successful writes so far
        pub fn writes(&self) -> usize {
            self.writes
        }

        /// Make the next write fail with `HalError::GpioError`
        pub fn fail_next_write(&mut self) {
            self.fail_next = true;
        }
    }

    impl OutputLevel for MockOutput {
        type Error = HalError;

        fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
            if core::mem::take(&mut self.fail_next) {
                return Err(HalError::GpioError);
            }
            self.level = high;
            self.writes += 1;
            Ok(())
        }

        fn level(&self) -> Result<bool, Self::Error> {
            Ok(self.level)
        }
    }

    /// Alarm timer whose counter is set by the test
    #[derive(Default, Debug)]
    pub struct MockAlarmTimer {
        counter: u64,
        programmed: Vec<u64, 64>,
        fail_next: bool,
    }

    impl MockAlarmTimer {
        pub fn new(counter: u64) -> Self {
            Self {
                counter,
                programmed: Vec::new(),
                fail_next: false,
            }
        }

        /// Make the next `set_alarm` fail with `HalError::TimingError`
        pub fn fail_next_alarm(&mut self) {
            self.fail_next = true;
        }

        /// Set the value the next `counter()` read returns
        pub fn set_counter(&mut self, counter: u64) {
            self.counter = counter;
        }

        /// Most recent thresholds programmed, oldest first
        pub fn programmed(&self) -> &[u64] {
            &self.programmed
        }

        pub fn current_alarm(&self) -> Option<u64> {
            self.programmed.last().copied()
        }
    }

    impl AlarmTimer for MockAlarmTimer {
        type Error = HalError;

        fn counter(&mut self) -> u64 {
            self.counter
        }

        fn set_alarm(&mut self, threshold: u64) -> Result<(), Self::Error> {
            if core::mem::take(&mut self.fail_next) {
                return Err(HalError::TimingError);
            }
            if self.programmed.is_full() {
                self.programmed.remove(0);
            }
            self.programmed.push(threshold).map_err(|_| HalError::TimingError)
        }
    }

    /// Input whose edges are raised by the test
    #[derive(Default, Debug)]
    pub struct MockEdgeInput {
        listening: bool,
        pending: bool,
        acknowledged: usize,
    }

    impl MockEdgeInput {
        pub fn new() -> Self {
            Self::default()
        }

        /// Simulate an edge; only latched while listening
        pub fn trigger(&mut self) {
            if self.listening {
                self.pending = true;
            }
        }

        pub fn is_listening(&self) -> bool {
            self.listening
        }

        pub fn acknowledged(&self) -> usize {
            self.acknowledged
        }
    }

    impl EdgeInput for MockEdgeInput {
        fn listen(&mut self) {
            self.listening = true;
        }

        fn is_pending(&self) -> bool {
            self.pending
        }

        fn acknowledge(&mut self) {
            self.pending = false;
            self.acknowledged += 1;
        }
    }
}
