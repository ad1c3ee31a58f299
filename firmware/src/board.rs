//! ESP32-C3 implementations of the core HAL traits

use esp_hal::efuse::Efuse;
use esp_hal::gpio::{Event, Input, Output};
use esp_hal::time::{Duration as HwDuration, Instant};
use esp_hal::timer::Timer as HwTimer;

use pinclock_core::hal::{AlarmTimer, EdgeInput, EmbeddedHalOutput, HalError};
use pinclock_core::{ChipInfo, RadioFeatures};

/// Indicator output as seen by the dispatcher
pub type Indicator = EmbeddedHalOutput<Output<'static>>;

/// Identity of the running chip: single RISC-V core, WiFi and BLE radios
pub fn chip_info() -> ChipInfo {
    ChipInfo {
        model: esp_hal::chip!(),
        cores: 1,
        features: RadioFeatures {
            wifi: true,
            ble: true,
            ..RadioFeatures::default()
        },
        revision_major: Efuse::major_chip_version(),
        revision_minor: Efuse::minor_chip_version(),
    }
}

/// Push button wired to ground, reported on its falling edge
pub struct Button {
    input: Input<'static>,
}

impl Button {
    pub fn new(input: Input<'static>) -> Self {
        Self { input }
    }
}

impl EdgeInput for Button {
    fn listen(&mut self) {
        self.input.listen(Event::FallingEdge);
    }

    fn is_pending(&self) -> bool {
        self.input.is_interrupt_set()
    }

    fn acknowledge(&mut self) {
        self.input.clear_interrupt();
    }
}

/// Free-running microsecond counter since boot
pub fn board_counter() -> u64 {
    Instant::now().duration_since_epoch().as_micros()
}

/// Alarm backed by a one-shot hardware timer
///
/// Absolute thresholds on the board counter are turned into a countdown
/// from now. A threshold already in the past fires after one tick.
pub struct HardwareAlarm<'a, T> {
    timer: &'a mut T,
}

impl<'a, T> HardwareAlarm<'a, T>
where
    T: HwTimer,
{
    pub fn new(timer: &'a mut T) -> Self {
        Self { timer }
    }

    /// One-shot mode with the interrupt enabled; the handler is installed by the caller
    pub fn enable(&mut self) {
        self.timer.enable_auto_reload(false);
        self.timer.enable_interrupt(true);
    }

    /// Acknowledge a firing so the next one can be raised
    pub fn acknowledge(&mut self) {
        self.timer.clear_interrupt();
    }
}

impl<T> AlarmTimer for HardwareAlarm<'_, T>
where
    T: HwTimer,
{
    type Error = HalError;

    fn counter(&mut self) -> u64 {
        board_counter()
    }

    fn set_alarm(&mut self, threshold: u64) -> Result<(), Self::Error> {
        let delay = threshold.saturating_sub(board_counter()).max(1);

        self.timer.stop();
        self.timer
            .load_value(HwDuration::from_micros(delay))
            .map_err(|_| HalError::TimingError)?;
        self.timer.start();
        Ok(())
    }
}
