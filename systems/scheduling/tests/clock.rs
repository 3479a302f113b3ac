use std::time::Duration;

use grid_arcade_core::Scheduler;
use grid_arcade_system_scheduling::VirtualClock;

#[test]
fn repeating_timer_fires_once_per_interval() {
    let mut clock = VirtualClock::new();
    let timer = clock.schedule_every(Duration::from_millis(100));

    clock.advance(Duration::from_millis(350));
    let fired = clock.drain_due();

    assert_eq!(fired, vec![timer, timer, timer]);
    assert_eq!(clock.now(), Duration::from_millis(350));
    assert_eq!(clock.next_due(), Some(Duration::from_millis(400)));
}

#[test]
fn cancellation_is_idempotent() {
    let mut clock = VirtualClock::new();
    let timer = clock.schedule_every(Duration::from_millis(50));

    clock.cancel(timer);
    clock.cancel(timer);
    assert_eq!(clock.pending(), 0);

    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.poll(), None, "cancelled timer must never fire");
}

#[test]
fn timers_scheduled_while_draining_fire_within_the_same_advance() {
    let mut clock = VirtualClock::new();
    let first = clock.schedule_after(Duration::from_millis(100));

    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.poll(), Some(first));
    assert_eq!(clock.now(), Duration::from_millis(100));

    let second = clock.schedule_after(Duration::from_millis(100));
    assert_eq!(clock.poll(), Some(second));
    assert_eq!(clock.now(), Duration::from_millis(200));

    let third = clock.schedule_after(Duration::from_millis(100));
    assert_eq!(clock.poll(), None, "third step falls due past the horizon");
    assert!(clock.is_pending(third));
    assert_eq!(clock.now(), Duration::from_millis(250));
}

#[test]
fn ties_fire_in_request_order() {
    let mut clock = VirtualClock::new();
    let first = clock.schedule_after(Duration::from_millis(10));
    let second = clock.schedule_every(Duration::from_millis(10));

    clock.advance(Duration::from_millis(10));
    assert_eq!(clock.drain_due(), vec![first, second]);
}

#[test]
fn advance_to_next_jumps_to_earliest_due_timer() {
    let mut clock = VirtualClock::new();
    let late = clock.schedule_after(Duration::from_secs(5));
    let early = clock.schedule_after(Duration::from_secs(2));

    assert_eq!(clock.advance_to_next(), Some(Duration::from_secs(2)));
    assert_eq!(clock.drain_due(), vec![early]);
    assert_eq!(clock.advance_to_next(), Some(Duration::from_secs(5)));
    assert_eq!(clock.drain_due(), vec![late]);
    assert_eq!(clock.advance_to_next(), None);
}
