use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, Error};
use crate::io;

pub const DEFAULT_MQTT_PORT: u16 = 1883;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub broker: BrokerConfig,
    pub render: RenderConfig,
}

impl ViewerConfig {
    pub fn from_file(path: &str) -> Result<ViewerConfig, Error> {
        io::object_from_json(path).map_err(|source| Error::Config {
            path: path.to_string(),
            source,
        })
    }

    pub fn to_file(&self, path: &str) -> Result<(), Error> {
        io::object_to_json(path, self).map_err(|source: ConfigError| Error::Config {
            path: path.to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub keepalive_secs: u64,
    /// generated per process when empty
    pub client_id: String,
    /// 0, 1 or 2
    pub qos: u8,
    /// capacity of the request channel between client and event loop
    pub channel_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MQTT_PORT,
            topic: "aruco".to_string(),
            keepalive_secs: 60,
            client_id: String::new(),
            qos: 0,
            channel_capacity: 10,
        }
    }
}

impl BrokerConfig {
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    /// The configured client id, or one derived from the process id.
    pub fn client_id(&self) -> String {
        if self.client_id.is_empty() {
            format!("mpview-{}", std::process::id())
        } else {
            self.client_id.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// payload field holding the marker mapping
    pub markers_field: String,
    /// scene units
    pub axis_length: f32,
    /// ui points
    pub line_width: f32,
    /// ui points
    pub glyph_radius: f32,
    /// symmetric bound on all three axes, scene units
    pub bound: f32,
    pub frame_pause_ms: u64,
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markers_field: "markers".to_string(),
            axis_length: 0.04,
            line_width: 1.0,
            glyph_radius: 5.0,
            bound: 0.15,
            frame_pause_ms: 10,
            title: "Real-time MQTT Marker Positions".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn frame_pause(&self) -> Duration {
        Duration::from_millis(self.frame_pause_ms)
    }
}
