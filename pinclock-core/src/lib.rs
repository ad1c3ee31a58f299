#![cfg_attr(not(feature = "std"), no_std)]

//! # Pinclock Core
//!
//! Interrupt-to-task event pipelines for a small board controller.
//! Push-button edges drive an output pin, and a self-rearming hardware
//! alarm drives a software wall clock. Each pipeline is an interrupt-side
//! producer, a bounded queue, and a consumer task that owns its state.

pub mod types;
pub mod queue;
pub mod gpio;
pub mod alarm;
pub mod clock;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use queue::*;
pub use gpio::*;
pub use alarm::*;
pub use clock::*;
pub use hal::{*, Duration};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference sizing: three buttons, 0.1 s alarm at 1 MHz, ten ticks per second
pub fn default_config() -> ControllerConfig {
    ControllerConfig {
        pins: PinMap::new(5, 6, 7),
        output_pin: 4,
        tick_hz: 1_000_000,
        alarm_period_ticks: 100_000,
        ticks_per_second: 10,
        missed_tick_timeout: Duration::from_millis(100) * 2,
    }
}
