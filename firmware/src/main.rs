#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use embassy_time::Timer;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Io, Level, Output, OutputConfig, Pull};
use esp_hal::handler;
use esp_hal::timer::systimer::SystemTimer;
use esp_hal::timer::timg::{Timer as TimgTimer, TimerGroup};
use esp_hal::timer::Timer as _;
use {esp_backtrace as _, esp_println as _};

use pinclock_firmware::*;

esp_bootloader_esp_idf::esp_app_desc!();

// Static resources
static GPIO_QUEUE: StaticCell<GpioQueue> = StaticCell::new();
static TIMER_QUEUE: StaticCell<TimerQueue> = StaticCell::new();

/// Monitored buttons and the producer their edges go to
type ButtonBank = EdgeInputs<'static, Button, QUEUE_CAPACITY>;

struct AlarmState {
    alarm: PeriodicAlarm,
    queue: &'static TimerQueue,
}

static BUTTONS: Mutex<RefCell<Option<ButtonBank>>> = Mutex::new(RefCell::new(None));
static ALARM_TIMER: Mutex<RefCell<Option<TimgTimer>>> = Mutex::new(RefCell::new(None));
static ALARM_STATE: Mutex<RefCell<Option<AlarmState>>> = Mutex::new(RefCell::new(None));
// Set by the alarm interrupt when reprogramming fails; reported by the heartbeat
static ALARM_FAULT: Mutex<Cell<Option<HalError>>> = Mutex::new(Cell::new(None));

// Edge interrupt: forward every pending pin, nothing else
#[handler]
fn gpio_interrupt() {
    critical_section::with(|cs| {
        if let Some(bank) = BUTTONS.borrow_ref_mut(cs).as_mut() {
            bank.service();
        }
    });
}

// Alarm interrupt: snapshot, push, program the next absolute threshold
#[handler]
fn alarm_interrupt() {
    critical_section::with(|cs| {
        let mut timer = ALARM_TIMER.borrow_ref_mut(cs);
        let mut state = ALARM_STATE.borrow_ref_mut(cs);
        let (Some(timer), Some(state)) = (timer.as_mut(), state.as_mut()) else {
            return;
        };

        let mut hw = HardwareAlarm::new(timer);
        hw.acknowledge();
        if let Err(e) = state.alarm.on_alarm(&mut hw, state.queue) {
            ALARM_FAULT.borrow(cs).set(Some(e));
        }
    });
}

/// Main firmware entry point
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    // SYSTIMER drives embassy-time; TIMG0 is left for the periodic alarm
    let systimer = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(systimer.alarm0);

    // Pin numbers below must match the GPIOs taken from `peripherals`
    let config = default_config();

    #[cfg(feature = "defmt")]
    {
        defmt::info!("🔧 pinclock {} starting", VERSION);
        defmt::info!("🔎 This is {}", defmt::Display2Format(&chip_info()));
        defmt::info!(
            "⚙️ inputs on={} off={} toggle={}, output={}",
            config.pins.on,
            config.pins.off,
            config.pins.toggle,
            config.output_pin
        );
        defmt::info!(
            "⚙️ alarm every {} ticks at {} Hz, {} ticks per second",
            config.alarm_period_ticks,
            config.tick_hz,
            config.ticks_per_second
        );
    }

    let input_config = InputConfig::default().with_pull(Pull::Up);
    let buttons = [
        Button::new(Input::new(peripherals.GPIO5, input_config)),
        Button::new(Input::new(peripherals.GPIO6, input_config)),
        Button::new(Input::new(peripherals.GPIO7, input_config)),
    ];
    let indicator = Output::new(peripherals.GPIO4, Level::Low, OutputConfig::default());

    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(gpio_interrupt);

    match create_queue(&GPIO_QUEUE, Pipeline::Gpio) {
        Ok(queue) => {
            // Publish first, then listen, so no edge latches without a handler state
            critical_section::with(|cs| {
                let mut slot = BUTTONS.borrow_ref_mut(cs);
                let bank = slot.insert(EdgeInputs::new(config.pins, buttons, GpioEdgeProducer::new(queue)));
                bank.listen_all();
            });

            let dispatcher = GpioDispatcher::new(config.pins, EmbeddedHalOutput::new(indicator, false));
            spawner.must_spawn(gpio_dispatch_task(dispatcher, queue));
        }
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::error!("❌ GPIO pipeline disabled");
        }
    }

    match create_queue(&TIMER_QUEUE, Pipeline::Timer) {
        Ok(queue) => {
            let timer_group = TimerGroup::new(peripherals.TIMG0);
            let mut timer = timer_group.timer0;
            timer.set_interrupt_handler(alarm_interrupt);

            // Arm and publish together so the first firing finds its state
            let armed = critical_section::with(|cs| {
                let mut alarm = PeriodicAlarm::new(config.alarm_period_ticks);
                let result = {
                    let mut hw = HardwareAlarm::new(&mut timer);
                    hw.enable();
                    alarm.arm(&mut hw)
                };
                ALARM_TIMER.borrow_ref_mut(cs).replace(timer);
                ALARM_STATE.borrow_ref_mut(cs).replace(AlarmState { alarm, queue });
                result
            });

            match armed {
                Ok(_) => {
                    let clock = ClockAccumulator::new(config.ticks_per_second);
                    spawner.must_spawn(clock_task(clock, queue, config.missed_tick_timeout));
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("❌ Alarm could not be armed: {}", _e);
                }
            }
        }
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::error!("❌ Timer pipeline disabled");
        }
    }

    #[cfg(feature = "defmt")]
    defmt::info!("✨ pinclock ready");

    // Main supervision loop
    loop {
        Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("💓 Heartbeat");

        let _fault = critical_section::with(|cs| ALARM_FAULT.borrow(cs).take());
        #[cfg(feature = "defmt")]
        if let Some(e) = _fault {
            defmt::error!("❌ Alarm could not be re-armed: {}; clock stopped", e);
        }
    }
}
