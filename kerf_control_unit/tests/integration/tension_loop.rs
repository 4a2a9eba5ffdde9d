//! Tension-loop scenarios: closed-loop convergence against a simple
//! wire model, actuator arbitration between automatic control and
//! operator commands, and session reset semantics.

use kerf_control_unit::core::ControlCore;

use super::{test_config, RecordingExecutor, SharedFeed};

fn build_core() -> (
    ControlCore<RecordingExecutor, SharedFeed>,
    std::sync::Arc<std::sync::Mutex<Vec<f64>>>,
    std::sync::Arc<std::sync::Mutex<Vec<f64>>>,
) {
    let (sender, sender_log) = SharedFeed::new();
    let (receiver, receiver_log) = SharedFeed::new();
    let core = ControlCore::new(
        &test_config(),
        RecordingExecutor::new(1.0),
        sender,
        receiver,
    )
    .unwrap();
    (core, sender_log, receiver_log)
}

#[test]
fn loop_converges_on_a_proportional_wire_model() {
    let (core, _, receiver_log) = build_core();
    core.set_tension_pid_gains(0.0, 0.05, 0.0).unwrap();
    core.enable_tension().unwrap();
    let handle = core.load_cell_handle();

    // Wire model: measured tension is proportional to the take-up
    // speed. Target 10.0 corresponds to speed 10 / 0.08 = 125.
    // 0.125 s steps are exactly representable, so no batch throttles.
    let mut tension = 0.0;
    let mut now = 0.0;
    for _ in 0..400 {
        handle.on_batch(&[tension], now);
        let speed = receiver_log.lock().unwrap().last().copied().unwrap_or(0.0);
        tension = speed * 0.08;
        now += 0.125;
    }

    let final_speed = *receiver_log.lock().unwrap().last().unwrap();
    let final_tension = final_speed * 0.08;
    assert!(
        (final_tension - 10.0).abs() < 0.5,
        "tension settled at {final_tension}"
    );
}

#[test]
fn batches_only_drive_the_non_primary_actuator() {
    let (core, sender_log, receiver_log) = build_core();
    core.enable_tension().unwrap();
    let handle = core.load_cell_handle();

    let mut now = 0.0;
    for _ in 0..5 {
        handle.on_batch(&[0.0, 2.0, 5.0], now);
        now += 0.125;
    }

    assert!(sender_log.lock().unwrap().is_empty());
    assert_eq!(receiver_log.lock().unwrap().len(), 5);
}

#[test]
fn operator_feed_command_reaches_only_the_primary_while_the_loop_runs() {
    let (core, sender_log, receiver_log) = build_core();
    core.enable_tension().unwrap();

    core.set_wire_feed_speed(180.0).unwrap();
    assert_eq!(*sender_log.lock().unwrap(), vec![180.0]);
    assert!(receiver_log.lock().unwrap().is_empty());
}

#[test]
fn disabling_the_loop_hands_both_actuators_back_to_the_operator() {
    let (core, sender_log, receiver_log) = build_core();
    core.enable_tension().unwrap();
    core.disable_tension().unwrap();

    core.set_wire_feed_speed(40.0).unwrap();
    assert_eq!(*sender_log.lock().unwrap(), vec![40.0]);
    assert_eq!(*receiver_log.lock().unwrap(), vec![40.0]);
}

#[test]
fn reenable_discards_accumulated_integral() {
    let (core, _, receiver_log) = build_core();
    core.set_tension_pid_gains(0.0, 1.0, 0.0).unwrap();
    core.enable_tension().unwrap();
    let handle = core.load_cell_handle();

    // Saturate the integral with a large persistent error.
    let mut now = 0.0;
    for _ in 0..50 {
        handle.on_batch(&[0.0], now);
        now += 0.125;
    }
    assert_eq!(*receiver_log.lock().unwrap().last().unwrap(), 255.0);

    core.disable_tension().unwrap();
    core.enable_tension().unwrap();

    // Zero error after a clean reset must not inherit the old windup.
    handle.on_batch(&[10.0], now + 10.0);
    assert_eq!(*receiver_log.lock().unwrap().last().unwrap(), 0.0);
}

#[test]
fn disabled_loop_ignores_batches_entirely() {
    let (core, sender_log, receiver_log) = build_core();
    let handle = core.load_cell_handle();

    handle.on_batch(&[0.0], 0.0);
    handle.on_batch(&[100.0], 0.2);

    assert!(sender_log.lock().unwrap().is_empty());
    assert!(receiver_log.lock().unwrap().is_empty());
}
