//! Tests for well-known paths

use localpilot_config::{config_path, data_dir};

#[test]
fn test_data_dir_is_dot_localpilot() {
    assert!(data_dir().ends_with(".localpilot"));
}

#[test]
fn test_data_dir_under_home() {
    if let Some(home) = dirs::home_dir() {
        assert_eq!(data_dir(), home.join(".localpilot"));
    }
}

#[test]
fn test_config_path_inside_data_dir() {
    let path = config_path();
    assert_eq!(path.parent(), Some(data_dir().as_path()));
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.json"));
}
