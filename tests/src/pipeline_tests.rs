//! Both pipelines wired end to end over real queues

use pinclock_core::hal::mock::{MockAlarmTimer, MockEdgeInput, MockOutput};
use pinclock_core::*;
use static_cell::StaticCell;

use crate::{GpioQueue, TimerQueue};

#[test]
fn test_queue_cell_can_only_be_claimed_once() {
    static CELL: StaticCell<TimerQueue> = StaticCell::new();

    assert!(create_queue(&CELL, Pipeline::Timer).is_ok());
    assert_eq!(
        create_queue(&CELL, Pipeline::Timer).err(),
        Some(PipelineError::QueueUnavailable(Pipeline::Timer))
    );
}

#[test]
fn test_failed_pipeline_leaves_the_other_running() {
    static GPIO: StaticCell<GpioQueue> = StaticCell::new();
    static TIMER: StaticCell<TimerQueue> = StaticCell::new();

    // Timer storage already taken, as if a previous claim consumed it
    let _ = TIMER.init(EventQueue::new());

    let gpio = create_queue(&GPIO, Pipeline::Gpio).unwrap();
    assert!(create_queue(&TIMER, Pipeline::Timer).is_err());

    let producer = GpioEdgeProducer::new(gpio);
    let mut d = GpioDispatcher::new(default_config().pins, MockOutput::new());
    producer.on_edge(default_config().pins.on);
    d.dispatch(gpio.try_pop().unwrap()).unwrap();
    assert_eq!(d.state(), OutputState::ON);
}

#[tokio::test]
async fn test_edges_flow_from_producer_to_output() {
    println!("🔘 Testing GPIO pipeline end to end...");

    static CELL: StaticCell<GpioQueue> = StaticCell::new();
    let queue = create_queue(&CELL, Pipeline::Gpio).unwrap();
    let pins = default_config().pins;

    let interrupts = tokio::spawn(async move {
        let producer = GpioEdgeProducer::new(queue);
        for pin in [pins.on, pins.toggle, pins.toggle, pins.off, pins.toggle] {
            producer.on_edge(pin);
            tokio::task::yield_now().await;
        }
    });

    let mut dispatcher = GpioDispatcher::new(pins, MockOutput::new());
    let mut source = QueueSource::blocking(queue);
    let mut states = Vec::new();
    for _ in 0..5 {
        if let Some(Ok(DispatchOutcome::Applied { state, .. })) = dispatcher.step(&mut source).await {
            states.push(state.as_int());
        }
    }
    interrupts.await.unwrap();

    assert_eq!(states, vec![1, 0, 1, 0, 1]);
    assert!(dispatcher.output().is_high());

    println!("  ✅ Output followed {} edges", states.len());
}

#[tokio::test]
async fn test_ticks_flow_from_alarm_to_clock() {
    println!("⏰ Testing timer pipeline end to end...");

    static CELL: StaticCell<TimerQueue> = StaticCell::new();
    let queue = create_queue(&CELL, Pipeline::Timer).unwrap();
    let config = default_config();

    let interrupts = tokio::spawn(async move {
        let mut timer = MockAlarmTimer::new(0);
        let mut alarm = PeriodicAlarm::new(config.alarm_period_ticks);
        alarm.arm(&mut timer).unwrap();
        for _ in 0..25 {
            timer.set_counter(alarm.threshold() + 40);
            alarm.on_alarm(&mut timer, queue).unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    });

    let mut clock = ClockAccumulator::new(config.ticks_per_second);
    let mut source = QueueSource::with_timeout(queue, config.missed_tick_timeout);
    for _ in 0..25 {
        assert_ne!(clock.step(&mut source).await, ClockEvent::MissedTick);
    }
    interrupts.await.unwrap();

    assert_eq!(clock.time(), WatchTime::new(0, 0, 2).unwrap());
    assert_eq!(clock.fraction(), 5);

    // Producer gone: the next wait runs into the timeout
    assert_eq!(clock.step(&mut source).await, ClockEvent::MissedTick);
    assert_eq!(clock.missed_ticks(), 1);

    println!("  ✅ Clock at {}", clock.time());
}

#[test]
fn test_button_interrupts_drive_output() {
    println!("🔘 Testing button bank to output...");

    let pins = default_config().pins;
    let queue = GpioQueue::new();
    let mut bank = EdgeInputs::new(
        pins,
        [MockEdgeInput::new(), MockEdgeInput::new(), MockEdgeInput::new()],
        GpioEdgeProducer::new(&queue),
    );
    let mut dispatcher = GpioDispatcher::new(pins, MockOutput::new());

    // No listening yet: a stray interrupt entry finds nothing to do
    assert_eq!(bank.service(), 0);

    bank.listen_all();
    assert_eq!(bank.service(), 0);

    // A press on the toggle input only
    let mut toggle = MockEdgeInput::new();
    toggle.listen();
    toggle.trigger();
    let mut bank = EdgeInputs::new(
        pins,
        [MockEdgeInput::new(), MockEdgeInput::new(), toggle],
        GpioEdgeProducer::new(&queue),
    );
    assert_eq!(bank.service(), 1);
    assert_eq!(bank.service(), 0);

    dispatcher.dispatch(queue.try_pop().unwrap()).unwrap();
    assert_eq!(dispatcher.state(), OutputState::ON);
    assert!(queue.is_empty());

    println!("  ✅ Edge serviced once, output ON");
}
