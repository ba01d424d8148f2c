use glam::Vec3;
use nalgebra as na;

use crate::config::RenderConfig;
use crate::error::DrawError;
use crate::marker::MarkerFrame;

/// Rgb colours of the local X, Y and Z axis quivers.
pub const AXIS_COLORS: [(u8, u8, u8); 3] = [(0, 0, 255), (0, 255, 0), (255, 0, 0)];

pub const AXIS_LABELS: [&str; 3] = ["X Axis", "Y Axis", "Z Axis"];

/// Converts a rotation vector (axis * angle) into a rotation matrix.
///
/// The columns are the local X/Y/Z axes expressed in the scene frame.
pub fn rotation_matrix(rvec: &[f64; 3]) -> na::Matrix3<f64> {
    na::Rotation3::from_scaled_axis(na::Vector3::from(*rvec)).into_inner()
}

fn to_vec3(v: &[f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

pub struct Label {
    pub text: String,
    pub position: Vec3,
}

/// Directed segments for one local axis of every marker in a frame.
pub struct AxisQuivers {
    pub axis: usize,
    pub color: (u8, u8, u8),
    pub origins: Vec<Vec3>,
    pub vectors: Vec<Vec3>,
}

impl AxisQuivers {
    fn new(axis: usize, capacity: usize) -> AxisQuivers {
        AxisQuivers {
            axis,
            color: AXIS_COLORS[axis],
            origins: Vec::with_capacity(capacity),
            vectors: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Everything one redraw puts on screen for the markers of a frame.
pub struct FrameGeometry {
    pub origin_glyphs: Vec<Vec3>,
    pub labels: Vec<Label>,
    pub quivers: [AxisQuivers; 3],
}

impl FrameGeometry {
    /// Fails when the frame's marker mapping does not hold well-formed records.
    pub fn build(frame: &MarkerFrame, config: &RenderConfig) -> Result<FrameGeometry, DrawError> {
        // sorted so that consecutive redraws of the same markers are stable
        let markers = frame.records()?;
        let n = markers.len();
        let mut origin_glyphs = Vec::new();
        let mut labels = Vec::with_capacity(n);
        let mut quivers = [
            AxisQuivers::new(0, n),
            AxisQuivers::new(1, n),
            AxisQuivers::new(2, n),
        ];

        for (id, record) in markers {
            let position = to_vec3(&record.position);
            if record.origin {
                origin_glyphs.push(position);
            }
            labels.push(Label { text: id, position });

            let rot = rotation_matrix(&record.rotation);
            for (k, q) in quivers.iter_mut().enumerate() {
                let col = rot.column(k);
                let direction = Vec3::new(col[0] as f32, col[1] as f32, col[2] as f32);
                q.origins.push(position);
                q.vectors.push(direction * config.axis_length);
            }
        }

        Ok(FrameGeometry {
            origin_glyphs,
            labels,
            quivers,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.quivers.iter().map(AxisQuivers::len).sum()
    }
}

/// Positions of the fixed axis labels, at the positive end of each bound.
pub fn axis_label_positions(bound: f32) -> [Vec3; 3] {
    [Vec3::X * bound, Vec3::Y * bound, Vec3::Z * bound]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_about_z() {
        let r = rotation_matrix(&[0.0, 0.0, std::f64::consts::FRAC_PI_2]);
        // local X points along scene Y
        assert!((r[(0, 0)]).abs() < 1e-12);
        assert!((r[(1, 0)] - 1.0).abs() < 1e-12);
        assert!((r[(2, 2)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn axis_labels_sit_on_the_bound() {
        let p = axis_label_positions(0.15);
        assert_eq!(p[0], Vec3::new(0.15, 0.0, 0.0));
        assert_eq!(p[2], Vec3::new(0.0, 0.0, 0.15));
    }
}
