use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::error::{DecodeError, DrawError};

/// Pose of a single marker as published by the vision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// meters, scene frame
    pub position: [f64; 3],
    /// rotation vector (axis * angle), radians
    pub rotation: [f64; 3],
    /// reference marker, drawn with a distinct glyph
    #[serde(default, deserialize_with = "null_as_false")]
    pub origin: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl MarkerRecord {
    pub fn new(position: [f64; 3], rotation: [f64; 3]) -> MarkerRecord {
        MarkerRecord {
            position,
            rotation,
            origin: false,
        }
    }

    pub fn with_origin(mut self, origin: bool) -> MarkerRecord {
        self.origin = origin;
        self
    }
}

/// One snapshot of every marker seen in a single inbound message.
///
/// The marker mapping is kept as received. Its shape is only checked when the
/// frame is drawn, see [`MarkerFrame::records`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    markers: serde_json::Value,
}

impl Default for MarkerFrame {
    fn default() -> Self {
        MarkerFrame {
            markers: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl MarkerFrame {
    pub fn new(markers: HashMap<String, MarkerRecord>) -> MarkerFrame {
        markers.into_iter().collect()
    }

    /// Wraps whatever the payload carried in its marker field.
    pub fn from_raw(markers: serde_json::Value) -> MarkerFrame {
        MarkerFrame { markers }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.markers
    }

    /// Number of marker entries, zero when the mapping is not an object.
    pub fn len(&self) -> usize {
        self.markers.as_object().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed records sorted by marker id.
    pub fn records(&self) -> Result<Vec<(String, MarkerRecord)>, DrawError> {
        let markers = match &self.markers {
            serde_json::Value::Object(m) => m,
            serde_json::Value::Null => return Err(DrawError::InvalidMarkers("null")),
            serde_json::Value::Array(_) => return Err(DrawError::InvalidMarkers("an array")),
            _ => return Err(DrawError::InvalidMarkers("a scalar")),
        };
        let mut records = markers
            .iter()
            .map(|(id, v)| {
                MarkerRecord::deserialize(v)
                    .map(|r| (id.clone(), r))
                    .map_err(|source| DrawError::InvalidMarker {
                        id: id.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }
}

impl FromIterator<(String, MarkerRecord)> for MarkerFrame {
    fn from_iter<I: IntoIterator<Item = (String, MarkerRecord)>>(iter: I) -> Self {
        let markers = iter
            .into_iter()
            .map(|(id, r)| (id, serde_json::json!(r)))
            .collect();
        MarkerFrame {
            markers: serde_json::Value::Object(markers),
        }
    }
}

/// Decodes a raw payload into a frame.
///
/// Only the encoding is checked here: the payload must be a json object. The
/// marker mapping is read from `field` as is; a missing field yields an empty
/// frame.
pub fn decode_payload(payload: &[u8], field: &str) -> Result<MarkerFrame, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    let serde_json::Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject);
    };
    Ok(object
        .remove(field)
        .map(MarkerFrame::from_raw)
        .unwrap_or_default())
}

/// Encodes a frame the way the publisher side sends it.
pub fn encode_payload(frame: &MarkerFrame, field: &str) -> Result<Vec<u8>, serde_json::Error> {
    let mut object = serde_json::Map::new();
    object.insert(field.to_string(), frame.markers.clone());
    serde_json::to_vec(&serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_defaults_to_false() {
        let r: MarkerRecord =
            serde_json::from_str(r#"{"position":[1,2,3],"rotation":[0,0,0]}"#).unwrap();
        assert!(!r.origin);
        assert_eq!(r.position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn null_origin_is_false() {
        let r: MarkerRecord =
            serde_json::from_str(r#"{"position":[1,2,3],"rotation":[0,0,0],"origin":null}"#)
                .unwrap();
        assert!(!r.origin);
    }

    #[test]
    fn short_position_is_rejected() {
        let r = serde_json::from_str::<MarkerRecord>(r#"{"position":[1,2],"rotation":[0,0,0]}"#);
        assert!(r.is_err());
    }
}
