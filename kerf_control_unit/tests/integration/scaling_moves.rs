//! Segmented-move scenarios: pass-through, equal segmentation, and
//! mid-move feedrate retargeting from duty-cycle samples delivered
//! while the coordinator is suspended between sub-moves.

use std::sync::{Arc, Mutex};

use kerf_control_unit::core::ControlCore;

use super::{test_config, RecordingExecutor, SharedFeed};

fn build_core(
    executor: RecordingExecutor,
) -> (
    ControlCore<RecordingExecutor, SharedFeed>,
    Arc<Mutex<Vec<super::RecordedMove>>>,
) {
    let moves = Arc::clone(&executor.moves);
    let (sender, _) = SharedFeed::new();
    let (receiver, _) = SharedFeed::new();
    let core = ControlCore::new(&test_config(), executor, sender, receiver).unwrap();
    (core, moves)
}

#[test]
fn disabled_scaling_forwards_a_single_unmodified_call() {
    let (core, moves) = build_core(RecordingExecutor::new(1.0));

    core.move_to([10.0, 0.0, 0.0, 0.0], 50.0).unwrap();

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].end, [10.0, 0.0, 0.0, 0.0]);
    assert_eq!(moves[0].speed, 50.0);
    assert_eq!(moves[0].accel, None);
}

#[test]
fn enabled_scaling_submits_five_equal_segments_over_ten_mm() {
    let (core, moves) = build_core(RecordingExecutor::new(1.0));
    core.enable_scaling().unwrap();

    core.move_to([10.0, 0.0, 0.0, 0.0], 50.0).unwrap();

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 5);
    for (i, m) in moves.iter().enumerate() {
        let expected_x = 2.0 * (i + 1) as f64;
        assert_eq!(m.end, [expected_x, 0.0, 0.0, 0.0]);
        assert!(m.accel.is_some());
    }
    assert_eq!(moves[4].end, [10.0, 0.0, 0.0, 0.0]);
}

#[test]
fn duty_sample_during_pause_retargets_remaining_segments() {
    let executor = RecordingExecutor::new(1.0);
    let on_pause = Arc::clone(&executor.on_pause);
    let (core, moves) = build_core(executor);
    core.enable_scaling().unwrap();

    // Scheduler stand-in: after the second pause a duty-cycle sample of
    // 0.0 arrives (error = 0.75, kp = 1.0 → output 0.75), lifting the
    // feedrate of the remaining segments.
    let duty_handle = core.duty_cycle_handle();
    let pauses = Arc::new(Mutex::new(0u32));
    let pause_count = Arc::clone(&pauses);
    *on_pause.lock().unwrap() = Some(Box::new(move |wake_time| {
        let mut count = pause_count.lock().unwrap();
        *count += 1;
        if *count == 2 {
            duty_handle.on_sample(0.0, wake_time);
        }
    }));

    core.move_to([10.0, 0.0, 0.0, 0.0], 50.0).unwrap();

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 5);
    // Before the sample: output 0.0 → band floor 6 mm/min = 0.1 mm/s.
    assert!((moves[0].speed - 0.1).abs() < 1e-9);
    assert!((moves[1].speed - 0.1).abs() < 1e-9);
    // After: output 0.75 → 6 + 0.75 × 114 = 91.5 mm/min = 1.525 mm/s.
    for m in &moves[2..] {
        assert!((m.speed - 1.525).abs() < 1e-9, "speed {}", m.speed);
    }
}

#[test]
fn feed_range_change_applies_to_the_next_move() {
    let (core, moves) = build_core(RecordingExecutor::new(1.0));
    core.enable_scaling().unwrap();

    core.move_to([2.0, 0.0, 0.0, 0.0], 50.0).unwrap();
    core.set_feed_range(30.0, 30.0).unwrap();
    core.move_to([4.0, 0.0, 0.0, 0.0], 50.0).unwrap();

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 2);
    assert!((moves[0].speed - 6.0 / 60.0).abs() < 1e-9);
    assert!((moves[1].speed - 30.0 / 60.0).abs() < 1e-9);
}

#[test]
fn disabling_scaling_mid_session_restores_passthrough() {
    let (core, moves) = build_core(RecordingExecutor::new(1.0));
    core.enable_scaling().unwrap();
    core.move_to([4.0, 0.0, 0.0, 0.0], 50.0).unwrap();
    core.disable_scaling().unwrap();
    core.move_to([8.0, 0.0, 0.0, 0.0], 50.0).unwrap();

    let moves = moves.lock().unwrap();
    // 2 segments for the scaled move, then a single pass-through.
    assert_eq!(moves.len(), 3);
    assert_eq!(moves[2].speed, 50.0);
    assert_eq!(moves[2].accel, None);
}
