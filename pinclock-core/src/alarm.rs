//! Self-rearming periodic alarm producer

use crate::hal::AlarmTimer;
use crate::queue::{EventQueue, PushOutcome};
use crate::types::TimerTick;

/// State transition produced by one alarm firing
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFiring {
    /// Snapshot pushed to the timer queue
    pub tick: TimerTick,
    /// Threshold the alarm must be reprogrammed with
    pub next_threshold: u64,
    /// Outcome of the push; a full queue drops the tick
    pub push: PushOutcome,
}

impl AlarmFiring {
    /// True when the firing made the clock task ready to run
    pub const fn woke_consumer(&self) -> bool {
        self.push.woke_consumer()
    }
}

/// Alarm that reprograms itself on an absolute schedule
///
/// Each threshold is the previous threshold plus the period, never "now plus
/// the period", so handler latency does not shift the next firing.
#[derive(Copy, Clone, Debug)]
pub struct PeriodicAlarm {
    threshold: u64,
    period: u64,
}

impl PeriodicAlarm {
    /// Unarmed alarm with the given period in counter ticks
    pub const fn new(period: u64) -> Self {
        Self { threshold: 0, period }
    }

    /// Alarm whose first firing is at `threshold`
    pub const fn starting_at(threshold: u64, period: u64) -> Self {
        Self { threshold, period }
    }

    /// Threshold currently programmed
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// First threshold one period after the current counter value
    pub fn arm<T: AlarmTimer>(&mut self, timer: &mut T) -> Result<u64, T::Error> {
        self.threshold = timer.counter().wrapping_add(self.period);
        timer.set_alarm(self.threshold)?;

        #[cfg(feature = "defmt")]
        defmt::info!("⏲️ alarm armed at {} (period {})", self.threshold, self.period);

        Ok(self.threshold)
    }

    /// Pure firing transition: push the snapshot and step the threshold
    pub fn fire<const N: usize>(&mut self, counter: u64, queue: &EventQueue<TimerTick, N>) -> AlarmFiring {
        let tick = TimerTick::new(counter);
        let push = queue.push_from_isr(tick);
        self.threshold = self.threshold.wrapping_add(self.period);

        AlarmFiring {
            tick,
            next_threshold: self.threshold,
            push,
        }
    }

    /// Alarm interrupt body: read the counter, fire, reprogram the hardware
    pub fn on_alarm<T, const N: usize>(
        &mut self,
        timer: &mut T,
        queue: &EventQueue<TimerTick, N>,
    ) -> Result<AlarmFiring, T::Error>
    where
        T: AlarmTimer,
    {
        let counter = timer.counter();
        let firing = self.fire(counter, queue);
        timer.set_alarm(firing.next_threshold)?;
        Ok(firing)
    }
}
