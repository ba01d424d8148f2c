use thiserror::Error;

/// An inbound payload that could not be turned into a [`crate::marker::MarkerFrame`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid marker json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload top level is not an object")]
    NotAnObject,
}

/// Failure while building or presenting one frame of the scene.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("failed to log to the recording stream: {0}")]
    Recording(#[from] rerun::RecordingStreamError),

    #[error("scene error: {0}")]
    Scene(String),

    #[error("marker mapping is {0}, expected an object")]
    InvalidMarkers(&'static str),

    #[error("marker '{id}' is malformed: {source}")]
    InvalidMarker {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to reach or stay connected to the broker.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("mqtt client request failed: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("mqtt connection failed: {0}")]
    EventLoop(#[from] rumqttc::ConnectionError),

    #[error("broker rejected the connection: {0}")]
    Rejected(String),

    #[error("invalid qos level {0}, expected 0, 1 or 2")]
    InvalidQos(u8),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("failed to start the delivery runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
