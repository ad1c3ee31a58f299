//! Core data types for the controller pipelines

use crate::hal::Duration;

/// Reference queue depth for both pipelines
pub const QUEUE_CAPACITY: usize = 10;

/// One detected edge on one monitored input pin
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioEdgeEvent {
    /// GPIO number that triggered the interrupt
    pub pin: u8,
}

impl GpioEdgeEvent {
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }
}

/// One hardware alarm firing
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerTick {
    /// Counter value read when the alarm fired
    pub counter: u64,
}

impl TimerTick {
    pub const fn new(counter: u64) -> Self {
        Self { counter }
    }
}

/// Output decision bound to a monitored pin
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinAction {
    /// Drive the output high
    On,
    /// Drive the output low
    Off,
    /// Drive the output to the complement of its current level
    Toggle,
}

/// The three monitored pins and the action each one triggers
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    pub on: u8,
    pub off: u8,
    pub toggle: u8,
}

impl PinMap {
    pub const fn new(on: u8, off: u8, toggle: u8) -> Self {
        Self { on, off, toggle }
    }

    /// Look up the action for a pin; pins outside the map have none
    pub const fn action(&self, pin: u8) -> Option<PinAction> {
        if pin == self.on {
            Some(PinAction::On)
        } else if pin == self.off {
            Some(PinAction::Off)
        } else if pin == self.toggle {
            Some(PinAction::Toggle)
        } else {
            None
        }
    }

    /// All monitored pins, in `on`, `off`, `toggle` order
    pub const fn pins(&self) -> [u8; 3] {
        [self.on, self.off, self.toggle]
    }

    const fn is_distinct(&self) -> bool {
        self.on != self.off && self.on != self.toggle && self.off != self.toggle
    }

    const fn contains(&self, pin: u8) -> bool {
        self.action(pin).is_some()
    }
}

/// Logical level of the controlled output pin
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputState {
    level: bool,
}

impl OutputState {
    pub const OFF: OutputState = OutputState { level: false };
    pub const ON: OutputState = OutputState { level: true };

    pub const fn from_level(level: bool) -> Self {
        Self { level }
    }

    pub const fn level(&self) -> bool {
        self.level
    }

    /// Integer mirror of the level (1 = on, 0 = off)
    pub const fn as_int(&self) -> u8 {
        self.level as u8
    }

    /// State that results from applying `action` to this state
    pub const fn apply(self, action: PinAction) -> OutputState {
        match action {
            PinAction::On => OutputState::ON,
            PinAction::Off => OutputState::OFF,
            PinAction::Toggle => OutputState::from_level(!self.level),
        }
    }
}

/// Radio blocks present on the chip
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioFeatures {
    pub wifi: bool,
    pub bt: bool,
    pub ble: bool,
    pub ieee802154: bool,
}

impl core::fmt::Display for RadioFeatures {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.wifi {
            f.write_str("WiFi/")?;
        }
        if self.bt {
            f.write_str("BT")?;
        }
        if self.ble {
            f.write_str("BLE")?;
        }
        if self.ieee802154 {
            f.write_str(", 802.15.4 (Zigbee/Thread)")?;
        }
        Ok(())
    }
}

/// Chip identity reported in the startup banner
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub model: &'static str,
    pub cores: u8,
    pub features: RadioFeatures,
    pub revision_major: u8,
    pub revision_minor: u8,
}

impl core::fmt::Display for ChipInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} chip with {} CPU core(s), {}, silicon revision v{}.{}",
            self.model, self.cores, self.features, self.revision_major, self.revision_minor
        )
    }
}

/// Identifies one of the two event pipelines
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pipeline {
    /// Button edges to output pin
    Gpio,
    /// Alarm ticks to software clock
    Timer,
}

impl Pipeline {
    pub const fn name(&self) -> &'static str {
        match self {
            Pipeline::Gpio => "gpio",
            Pipeline::Timer => "timer",
        }
    }
}

/// Configuration validation failures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Two monitored inputs share a GPIO number
    DuplicateInputPin,
    /// The output pin is also a monitored input
    OutputPinIsInput,
    /// Counter resolution is zero
    ZeroTickRate,
    /// Alarm period is zero
    ZeroAlarmPeriod,
    /// Ticks per second is zero
    ZeroTicksPerSecond,
    /// Timeout does not span at least one full alarm period
    TimeoutTooShort,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::DuplicateInputPin => write!(f, "monitored input pins must be distinct"),
            ConfigError::OutputPinIsInput => write!(f, "output pin must not be a monitored input"),
            ConfigError::ZeroTickRate => write!(f, "tick rate must be non-zero"),
            ConfigError::ZeroAlarmPeriod => write!(f, "alarm period must be non-zero"),
            ConfigError::ZeroTicksPerSecond => write!(f, "ticks per second must be non-zero"),
            ConfigError::TimeoutTooShort => write!(f, "missed tick timeout must exceed one alarm period"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Controller configuration parameters
#[derive(Copy, Clone, Debug)]
pub struct ControllerConfig {
    /// Monitored inputs and their actions
    pub pins: PinMap,
    /// GPIO number of the controlled output
    pub output_pin: u8,
    /// Hardware counter resolution in ticks per second
    pub tick_hz: u32,
    /// Counter ticks between alarm firings
    pub alarm_period_ticks: u64,
    /// Alarm firings that make up one second of clock time
    pub ticks_per_second: u8,
    /// How long the clock task waits for a tick before reporting a miss
    pub missed_tick_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        crate::default_config()
    }
}

impl ControllerConfig {
    /// Create a new configuration with validation
    pub fn new(
        pins: PinMap,
        output_pin: u8,
        tick_hz: u32,
        alarm_period_ticks: u64,
        ticks_per_second: u8,
        missed_tick_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if !pins.is_distinct() {
            return Err(ConfigError::DuplicateInputPin);
        }
        if pins.contains(output_pin) {
            return Err(ConfigError::OutputPinIsInput);
        }
        if tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if alarm_period_ticks == 0 {
            return Err(ConfigError::ZeroAlarmPeriod);
        }
        if ticks_per_second == 0 {
            return Err(ConfigError::ZeroTicksPerSecond);
        }

        let config = Self {
            pins,
            output_pin,
            tick_hz,
            alarm_period_ticks,
            ticks_per_second,
            missed_tick_timeout,
        };
        if missed_tick_timeout.as_micros() <= config.alarm_period_micros() {
            return Err(ConfigError::TimeoutTooShort);
        }
        Ok(config)
    }

    /// Alarm period converted to microseconds
    pub fn alarm_period_micros(&self) -> u64 {
        self.alarm_period_ticks.saturating_mul(1_000_000) / self.tick_hz as u64
    }
}
