//! The shipped sample configuration must load and validate through the
//! same file path production startup uses.

use kerf_common::config::{KerfConfig, WireActuator};

#[test]
fn shipped_sample_config_loads_from_a_file() {
    let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/kerf.toml");
    let contents = std::fs::read_to_string(sample).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kerf.toml");
    std::fs::write(&path, contents).unwrap();

    let config = KerfConfig::load(&path).unwrap();
    assert_eq!(config.feed.target_duty_cycle, 0.75);
    assert_eq!(config.feed.segment_length, 0.1);
    assert_eq!(config.tension.primary, WireActuator::Sender);
    assert_eq!(config.tension.sender.pin, "PA7");
    assert_eq!(config.tension.receiver.pin, "PA8");
}
