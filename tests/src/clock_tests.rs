//! Clock accumulation, rollover and timeout handling

use pinclock_core::test_utils::{OutcomeLog, ScriptedSource};
use pinclock_core::*;
use proptest::prelude::*;

const TICKS_PER_SECOND: u8 = 10;

fn tick() -> TimerTick {
    TimerTick::new(0)
}

fn time(h: u8, m: u8, s: u8) -> WatchTime {
    WatchTime::new(h, m, s).unwrap()
}

#[test]
fn test_end_of_day_rollover() {
    println!("⏰ Testing 23:59:59 rollover...");

    let mut clock = ClockAccumulator::starting_at(TICKS_PER_SECOND, time(23, 59, 59));
    for _ in 0..9 {
        assert!(matches!(clock.handle(Some(tick())), ClockEvent::Tick { .. }));
    }
    assert_eq!(clock.handle(Some(tick())), ClockEvent::SecondElapsed(WatchTime::MIDNIGHT));

    println!("  ✅ Rolled over to {}", clock.time());
}

#[test]
fn test_full_day_returns_to_midnight() {
    let mut clock = ClockAccumulator::new(1);
    for _ in 0..86_400 {
        clock.handle(Some(tick()));
    }
    assert_eq!(clock.time(), WatchTime::MIDNIGHT);
}

proptest! {
    #[test]
    fn prop_ticks_match_arithmetic_model(start in 0u32..86_400, ticks in 0u32..5_000) {
        let begin = time((start / 3600) as u8, (start / 60 % 60) as u8, (start % 60) as u8);
        let mut clock = ClockAccumulator::starting_at(TICKS_PER_SECOND, begin);
        for _ in 0..ticks {
            clock.handle(Some(tick()));
        }

        let expected = (start + ticks / TICKS_PER_SECOND as u32) % 86_400;
        prop_assert_eq!(clock.time().total_seconds(), expected);
        prop_assert_eq!(clock.fraction() as u32, ticks % TICKS_PER_SECOND as u32);
    }

    #[test]
    fn prop_timeouts_never_move_the_clock(pattern in proptest::collection::vec(any::<bool>(), 0..300)) {
        let mut clock = ClockAccumulator::new(TICKS_PER_SECOND);
        let delivered = pattern.iter().filter(|&&t| t).count() as u32;
        let missed = pattern.len() as u32 - delivered;

        for is_tick in pattern {
            clock.handle(is_tick.then(tick));
        }

        prop_assert_eq!(clock.time().total_seconds(), delivered / TICKS_PER_SECOND as u32);
        prop_assert_eq!(clock.missed_ticks(), missed);
    }
}

#[tokio::test]
async fn test_single_timeout_warns_once() {
    let mut clock = ClockAccumulator::starting_at(TICKS_PER_SECOND, time(12, 0, 0));
    let mut source = ScriptedSource::new().then_timeout();

    assert_eq!(clock.step(&mut source).await, ClockEvent::MissedTick);
    assert_eq!(clock.time(), time(12, 0, 0));
    assert_eq!(clock.missed_ticks(), 1);
}

#[tokio::test]
async fn test_nine_ticks_timeout_one_tick() {
    println!("⏰ Testing tick gap...");

    let mut clock = ClockAccumulator::new(TICKS_PER_SECOND);
    let mut source = ScriptedSource::new()
        .then_events(tick(), 9)
        .then_timeout()
        .then_event(tick());
    let mut log = OutcomeLog::new();

    while source.remaining() > 0 {
        log.record(clock.step(&mut source).await);
    }

    assert_eq!(log.entries().len(), 11);
    assert_eq!(log.count_where(|e| *e == ClockEvent::MissedTick), 1);
    assert_eq!(log.entries()[9], ClockEvent::MissedTick);
    assert_eq!(log.entries()[10], ClockEvent::SecondElapsed(time(0, 0, 1)));
    assert_eq!(clock.time(), time(0, 0, 1));

    println!("  ✅ One second, one warning");
}

#[tokio::test]
async fn test_real_queue_timeout_counts_missed_tick() {
    let config = default_config();
    let queue: EventQueue<TimerTick, QUEUE_CAPACITY> = EventQueue::new();
    let mut source = QueueSource::with_timeout(&queue, Duration::from_millis(20));
    let mut clock = ClockAccumulator::new(config.ticks_per_second);

    for _ in 0..config.ticks_per_second {
        queue.push(tick());
    }
    for _ in 0..config.ticks_per_second {
        clock.step(&mut source).await;
    }
    assert_eq!(clock.time(), time(0, 0, 1));

    assert_eq!(clock.step(&mut source).await, ClockEvent::MissedTick);
    assert_eq!(clock.time(), time(0, 0, 1));
}
