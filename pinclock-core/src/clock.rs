//! Software wall clock fed by alarm ticks

use core::fmt;

use crate::queue::EventSource;
use crate::types::TimerTick;

/// Elapsed time since boot, wrapping every 24 hours
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl WatchTime {
    pub const MIDNIGHT: WatchTime = WatchTime { hours: 0, minutes: 0, seconds: 0 };

    /// Build a time of day; out-of-range fields yield `None`
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Option<Self> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            None
        } else {
            Some(Self { hours, minutes, seconds })
        }
    }

    pub const fn hours(&self) -> u8 {
        self.hours
    }

    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Seconds since midnight
    pub const fn total_seconds(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Add one second, carrying into minutes and hours
    pub fn advance_second(&mut self) {
        self.seconds += 1;
        if self.seconds < 60 {
            return;
        }
        self.seconds = 0;
        self.minutes += 1;
        if self.minutes < 60 {
            return;
        }
        self.minutes = 0;
        self.hours += 1;
        if self.hours == 24 {
            self.hours = 0;
        }
    }
}

impl fmt::Display for WatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Result of one accumulator step
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    /// A tick arrived without completing a second
    Tick { fraction: u8 },
    /// A tick completed a second; carries the updated time
    SecondElapsed(WatchTime),
    /// No tick arrived within the timeout window
    MissedTick,
}

/// Turns a fixed number of ticks into one second of [`WatchTime`]
///
/// Sole owner of the clock state. A missed tick leaves it untouched.
#[derive(Clone, Debug)]
pub struct ClockAccumulator {
    ticks_per_second: u8,
    fraction: u8,
    time: WatchTime,
    missed: u32,
}

impl ClockAccumulator {
    /// Accumulator starting at midnight
    ///
    /// A `ticks_per_second` of zero is treated as one.
    pub fn new(ticks_per_second: u8) -> Self {
        Self::starting_at(ticks_per_second, WatchTime::MIDNIGHT)
    }

    pub fn starting_at(ticks_per_second: u8, time: WatchTime) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1),
            fraction: 0,
            time,
            missed: 0,
        }
    }

    pub fn time(&self) -> WatchTime {
        self.time
    }

    /// Ticks received since the last whole second
    pub fn fraction(&self) -> u8 {
        self.fraction
    }

    /// Timeouts observed since boot
    pub fn missed_ticks(&self) -> u32 {
        self.missed
    }

    /// Account for one pop result: `Some` is a tick, `None` a timeout
    pub fn handle(&mut self, tick: Option<TimerTick>) -> ClockEvent {
        if tick.is_none() {
            self.missed = self.missed.saturating_add(1);
            return ClockEvent::MissedTick;
        }

        self.fraction += 1;
        if self.fraction < self.ticks_per_second {
            return ClockEvent::Tick { fraction: self.fraction };
        }

        self.fraction = 0;
        self.time.advance_second();
        ClockEvent::SecondElapsed(self.time)
    }

    /// Wait for one tick (or timeout), account for it and report it
    pub async fn step<S>(&mut self, source: &mut S) -> ClockEvent
    where
        S: EventSource<TimerTick>,
    {
        let event = self.handle(source.next_event().await);

        #[cfg(feature = "defmt")]
        match event {
            ClockEvent::SecondElapsed(time) => defmt::info!("⏰ clock {}", time),
            ClockEvent::MissedTick => defmt::warn!("⚠️ missed timer tick (total {})", self.missed),
            ClockEvent::Tick { .. } => {}
        }

        event
    }

    /// Accumulator loop; never returns
    pub async fn run<S>(mut self, mut source: S) -> !
    where
        S: EventSource<TimerTick>,
    {
        loop {
            self.step(&mut source).await;
        }
    }
}
