use marker_pose_viewer::config::{BrokerConfig, DEFAULT_MQTT_PORT, RenderConfig, ViewerConfig};
use marker_pose_viewer::error::Error;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = ViewerConfig::default();
    assert_eq!(config.broker.host, "localhost");
    assert_eq!(config.broker.topic, "aruco");
    assert_eq!(config.broker.port, DEFAULT_MQTT_PORT);
    assert_eq!(config.broker.keepalive(), Duration::from_secs(60));
    assert_eq!(config.render.markers_field, "markers");
    assert!((config.render.axis_length - 0.04).abs() < 1e-7);
    assert!((config.render.bound - 0.15).abs() < 1e-7);
    assert_eq!(config.render.frame_pause(), Duration::from_millis(10));
}

#[test]
fn test_write_then_read_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("viewer.json");
    let path = path.to_str().unwrap();

    let config = ViewerConfig {
        broker: BrokerConfig {
            host: "10.0.0.2".to_string(),
            topic: "vision/markers".to_string(),
            ..Default::default()
        },
        render: RenderConfig {
            bound: 0.5,
            ..Default::default()
        },
    };
    config.to_file(path).unwrap();
    assert_eq!(ViewerConfig::from_file(path).unwrap(), config);
}

#[test]
fn test_partial_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.json");
    std::fs::write(&path, r#"{"broker": {"topic": "tags"}, "render": {"axis_length": 0.1}}"#)
        .unwrap();

    let config = ViewerConfig::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.broker.topic, "tags");
    assert_eq!(config.broker.host, "localhost");
    assert_eq!(config.broker.port, 1883);
    assert!((config.render.axis_length - 0.1).abs() < 1e-7);
    assert!((config.render.bound - 0.15).abs() < 1e-7);
}

#[test]
fn test_missing_and_invalid_config() {
    let result = ViewerConfig::from_file("non_existent_path/viewer.json");
    assert!(matches!(result, Err(Error::Config { .. })));

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let result = ViewerConfig::from_file(path.to_str().unwrap());
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_written_config_leaves_client_id_to_each_run() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("viewer.json");
    let path = path.to_str().unwrap();

    ViewerConfig::default().to_file(path).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["broker"]["client_id"], "");

    let config = ViewerConfig::from_file(path).unwrap();
    assert_eq!(config.broker.client_id(), format!("mpview-{}", std::process::id()));

    let named = BrokerConfig {
        client_id: "lab-viewer".to_string(),
        ..Default::default()
    };
    assert_eq!(named.client_id(), "lab-viewer");
}
