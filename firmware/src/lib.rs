#![no_std]

//! ESP32-C3 bindings for the pinclock pipelines
//!
//! Interrupt handlers live in the binary; this library holds the pieces they
//! and the embassy tasks share.

pub use embassy_executor::Spawner;
pub use static_cell::StaticCell;

pub use pinclock_core::*;

pub use crate::board::*;
pub use crate::tasks::*;

pub mod board;

/// Queue carrying button edges from the GPIO interrupt
pub type GpioQueue = EventQueue<GpioEdgeEvent, QUEUE_CAPACITY>;

/// Queue carrying alarm snapshots from the timer interrupt
pub type TimerQueue = EventQueue<TimerTick, QUEUE_CAPACITY>;

// Embassy tasks module
pub mod tasks {
    use super::*;

    /// Drains the GPIO queue and drives the indicator output
    #[embassy_executor::task]
    pub async fn gpio_dispatch_task(dispatcher: GpioDispatcher<Indicator>, queue: &'static GpioQueue) {
        #[cfg(feature = "defmt")]
        defmt::info!("🔘 GPIO dispatch task started");
        dispatcher.run(QueueSource::blocking(queue)).await;
    }

    /// Accumulates alarm ticks into the wall clock
    #[embassy_executor::task]
    pub async fn clock_task(clock: ClockAccumulator, queue: &'static TimerQueue, timeout: Duration) {
        #[cfg(feature = "defmt")]
        defmt::info!("⏰ Clock task started (timeout {} ms)", timeout.as_millis());
        clock.run(QueueSource::with_timeout(queue, timeout)).await;
    }
}
