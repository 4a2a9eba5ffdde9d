mod config_file;
mod scaling_moves;
mod tension_loop;

use std::sync::{Arc, Mutex};

use kerf_common::config::KerfConfig;
use kerf_control_unit::actuator::WireFeed;
use kerf_control_unit::motion::coordinator::{ExecutorError, MotionExecutor};
use kerf_control_unit::motion::segment::{self, Position};

/// Baseline configuration shared by the integration scenarios.
pub fn test_config() -> KerfConfig {
    KerfConfig::from_toml(
        r#"
[feed]
segment_length = 2.0
sample_interval = 0.1

[feed.pid]
kp = 1.0

[tension]
target = 10.0
update_interval = 0.1

[tension.pid]
kp = 0.1

[tension.sender]
pin = "PA7"

[tension.receiver]
pin = "PA8"
"#,
    )
    .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedMove {
    pub end: Position,
    pub speed: f64,
    pub accel: Option<f64>,
}

/// Executor that records every submission and can run a caller-supplied
/// hook during `pause_until`, standing in for the host scheduler
/// delivering sensor callbacks while the coordinator is suspended.
pub struct RecordingExecutor {
    pub moves: Arc<Mutex<Vec<RecordedMove>>>,
    pub on_pause: Arc<Mutex<Option<Box<dyn FnMut(f64) + Send>>>>,
    position: Position,
    clock: f64,
    move_duration: f64,
    pending: Option<Box<dyn FnOnce(f64) + Send>>,
}

impl RecordingExecutor {
    pub fn new(move_duration: f64) -> Self {
        Self {
            moves: Arc::new(Mutex::new(Vec::new())),
            on_pause: Arc::new(Mutex::new(None)),
            position: [0.0; 4],
            clock: 0.0,
            move_duration,
            pending: None,
        }
    }
}

impl MotionExecutor for RecordingExecutor {
    fn submit_move(
        &mut self,
        end: Position,
        speed: f64,
        accel: Option<f64>,
    ) -> Result<(), ExecutorError> {
        self.moves
            .lock()
            .unwrap()
            .push(RecordedMove { end, speed, accel });
        self.clock += if self.move_duration > 0.0 {
            self.move_duration
        } else {
            segment::distance(self.position, end) / speed
        };
        self.position = end;
        Ok(())
    }

    fn register_lookahead_callback(&mut self, callback: Box<dyn FnOnce(f64) + Send>) {
        self.pending = Some(callback);
    }

    fn flush_lookahead(&mut self) {
        if let Some(callback) = self.pending.take() {
            callback(self.clock);
        }
    }

    fn pause_until(&mut self, wake_time: f64) {
        if let Some(hook) = self.on_pause.lock().unwrap().as_mut() {
            hook(wake_time);
        }
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Wire feed whose commanded speeds stay visible to the test through a
/// shared vector.
pub struct SharedFeed(pub Arc<Mutex<Vec<f64>>>);

impl SharedFeed {
    pub fn new() -> (Self, Arc<Mutex<Vec<f64>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Self(Arc::clone(&log)), log)
    }
}

impl WireFeed for SharedFeed {
    fn set_speed(&mut self, speed: f64) {
        self.0.lock().unwrap().push(speed);
    }
}
