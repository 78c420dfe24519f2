//! Integration test: config file + JSON-lines replay driven through the loop.

use std::fs;
use std::io::BufReader;

use adas_common::drive::state::Mode;
use adas_control_unit::config::load_config;
use adas_control_unit::cycle::ControlLoop;
use adas_control_unit::replay::{ReplayError, ReplayReader};
use adas_control_unit::telemetry::RecordingSink;
use tempfile::TempDir;

const CONFIG: &str = r#"
tick_seconds = 0.1

[shared]
service_name = "adas-replay"
log_level = "debug"

[control.emergency]
cooldown_seconds = 0.5

[control.cruise]
max_target_speed = 90.0
"#;

const DRIVE: &str = r#"
# Engage cruise, raise target, meet an obstacle, recover.
{"snapshot":{"ego":{"speed_kmh":40.0}},"intent":"ToggleMode"}
{"snapshot":{"ego":{"speed_kmh":40.0}},"intent":{"AdjustTargetSpeed":80.0}}
{"snapshot":{"ego":{"speed_kmh":41.0}}}
{"snapshot":{"ego":{"speed_kmh":41.0},"obstacle_distance_m":2.0}}
{"snapshot":{"ego":{"speed_kmh":35.0}}}
{"snapshot":{"ego":{"speed_kmh":30.0}}}
{"snapshot":{"ego":{"speed_kmh":30.0}}}
{"snapshot":{"ego":{"speed_kmh":30.0}}}
{"snapshot":{"ego":{"speed_kmh":30.0}}}
{"snapshot":{"ego":{"speed_kmh":30.0}},"remote":{"CruiseControl":false}}
"#;

#[test]
fn replay_drive_with_file_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("adas.toml");
    let drive_path = dir.path().join("drive.jsonl");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&drive_path, DRIVE).unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.tick_seconds, 0.1);
    assert_eq!(config.control.cruise.max_target_speed, 90.0);

    let mut l = ControlLoop::with_sink(&config, RecordingSink::default());
    let reader = ReplayReader::new(BufReader::new(fs::File::open(&drive_path).unwrap()));

    let mut brakes = Vec::new();
    for input in reader {
        let cmd = l.tick(&input.unwrap());
        brakes.push(cmd.brake());
    }

    assert_eq!(brakes.len(), 10);
    assert_eq!(l.tick_count(), 10);
    // Target raised 40 + 80 and clamped to the configured ceiling.
    assert!(l.sink().iter().any(|e| matches!(
        e,
        adas_common::drive::telemetry::TelemetryEvent::TargetSpeedChanged { target_kmh }
            if *target_kmh == 90.0
    )));

    // Emergency at index 3, held for 5 ticks (0.5 s / 0.1 s), released at 8.
    assert!(brakes[3] >= 0.6);
    for b in &brakes[4..8] {
        assert_eq!(*b, brakes[3]);
    }
    assert!(brakes[8] < brakes[3]);
    assert_eq!(l.stats().emergency_ticks, 5);

    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.vehicle_parameters().timestamp_ms, 1000);
}

#[test]
fn replay_stops_on_bad_line() {
    let data = "{\"snapshot\":{}}\n{\"intent\":\"Fly\"}\n";
    let results: Vec<_> = ReplayReader::new(data.as_bytes()).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ReplayError::Parse { line: 2, .. })));
}
