// Host smoke run of both pipelines without an async runtime

use pinclock_core::hal::mock::{MockAlarmTimer, MockOutput};
use pinclock_core::*;
use pinclock_tests::{run_alarm_into_clock, GpioQueue, TimerQueue};

fn main() {
    println!("🧪 pinclock host smoke run ({})", VERSION);

    // Test 1: Configuration validation
    test_configuration();

    // Test 2: GPIO pipeline
    test_gpio_pipeline();

    // Test 3: Timer pipeline
    test_timer_pipeline();

    println!("✅ All smoke checks passed!");
    println!();
    println!("📝 Run the full suite with: cargo test");
}

fn test_configuration() {
    println!("⚙️ Testing configuration...");

    let config = default_config();
    let rebuilt = ControllerConfig::new(
        config.pins,
        config.output_pin,
        config.tick_hz,
        config.alarm_period_ticks,
        config.ticks_per_second,
        config.missed_tick_timeout,
    );
    assert!(rebuilt.is_ok());

    let clash = ControllerConfig::new(
        PinMap::new(5, 5, 7),
        config.output_pin,
        config.tick_hz,
        config.alarm_period_ticks,
        config.ticks_per_second,
        config.missed_tick_timeout,
    );
    assert_eq!(clash.err(), Some(ConfigError::DuplicateInputPin));

    println!("  ✅ Alarm period {} µs, timeout {} ms", config.alarm_period_micros(), config.missed_tick_timeout.as_millis());
}

fn test_gpio_pipeline() {
    println!("🔘 Testing GPIO pipeline...");

    let config = default_config();
    let queue = GpioQueue::new();
    let producer = GpioEdgeProducer::new(&queue);
    let mut dispatcher = GpioDispatcher::new(config.pins, MockOutput::new());

    for pin in [config.pins.toggle, config.pins.toggle, config.pins.on, 3] {
        producer.on_edge(pin);
    }
    while let Some(event) = queue.try_pop() {
        let outcome = dispatcher.dispatch(event).unwrap();
        println!("    {:?}", outcome);
    }

    assert_eq!(dispatcher.state(), OutputState::ON);
    println!("  ✅ Output level {}", dispatcher.state().as_int());
}

fn test_timer_pipeline() {
    println!("⏰ Testing timer pipeline...");

    let config = default_config();
    let queue = TimerQueue::new();
    let mut timer = MockAlarmTimer::new(0);
    let mut alarm = PeriodicAlarm::new(config.alarm_period_ticks);
    let mut clock = ClockAccumulator::starting_at(config.ticks_per_second, WatchTime::new(23, 59, 55).unwrap());
    alarm.arm(&mut timer).unwrap();

    run_alarm_into_clock(&mut alarm, &mut timer, &queue, &mut clock, 100, 17);

    assert_eq!(clock.time(), WatchTime::new(0, 0, 5).unwrap());
    println!("  ✅ Clock at {} after 100 firings", clock.time());
}
