//! The rendering surface the render loop draws into.
//!
//! [`Scene`] is the seam between frame geometry and the viewer; [`RerunScene`]
//! is the implementation backed by a rerun recording stream.

use glam::Vec3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::RecordingStream;
use twox_hash::XxHash64;

use crate::config::RenderConfig;
use crate::error::DrawError;
use crate::geometry::{AXIS_LABELS, AxisQuivers, Label, axis_label_positions};

const APP_ID: &str = "marker_pose_viewer";
const WORLD: &str = "world";
const MARKERS: &str = "world/markers";
const ORIGIN_COLOR: (u8, u8, u8) = (255, 0, 0);
const DECORATION_COLOR: (u8, u8, u8) = (128, 128, 128);

pub trait Scene {
    /// Stamps everything drawn until the next call with `sequence`.
    fn begin_frame(&mut self, sequence: u64) -> Result<(), DrawError>;
    /// Removes everything the previous frame drew.
    fn clear(&mut self) -> Result<(), DrawError>;
    fn draw_origin_glyphs(&mut self, positions: &[Vec3]) -> Result<(), DrawError>;
    fn draw_labels(&mut self, labels: &[Label]) -> Result<(), DrawError>;
    fn draw_quivers(&mut self, quivers: &AxisQuivers) -> Result<(), DrawError>;
    /// Axis labels, title and the fixed scene bound.
    fn draw_frame_decorations(&mut self) -> Result<(), DrawError>;
    /// Hands the frame to the viewer and yields briefly.
    fn present(&mut self) -> Result<(), DrawError>;
}

/// Where the recording is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSink {
    /// spawn a local viewer process
    Spawn,
    /// connect to a running viewer, e.g. `rerun+http://127.0.0.1:9876/proxy`
    Connect(String),
    /// write an `.rrd` file
    Save(String),
}

pub struct RerunScene {
    rec: RecordingStream,
    config: RenderConfig,
}

impl RerunScene {
    pub fn open(sink: &SceneSink, config: &RenderConfig) -> Result<RerunScene, DrawError> {
        let builder = rerun::RecordingStreamBuilder::new(APP_ID);
        let rec = match sink {
            SceneSink::Spawn => builder.spawn()?,
            SceneSink::Connect(url) => {
                builder.connect_grpc_opts(url.as_str(), rerun::default_flush_timeout())?
            }
            SceneSink::Save(path) => builder.save(path)?,
        };
        log::info!("opened scene, sink {:?}", sink);
        Self::from_recording(rec, config)
    }

    pub fn from_recording(
        rec: RecordingStream,
        config: &RenderConfig,
    ) -> Result<RerunScene, DrawError> {
        rec.log_static(WORLD, &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;
        rec.log_static("title", &rerun::TextDocument::new(config.title.clone()))?;
        Ok(RerunScene {
            rec,
            config: config.clone(),
        })
    }
}

impl Drop for RerunScene {
    fn drop(&mut self) {
        log::debug!("flushing scene");
        let _ = self.rec.flush_blocking();
    }
}

impl Scene for RerunScene {
    fn begin_frame(&mut self, sequence: u64) -> Result<(), DrawError> {
        self.rec.set_time_sequence("frame", sequence as i64);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DrawError> {
        self.rec.log(MARKERS, &rerun::Clear::recursive())?;
        Ok(())
    }

    fn draw_origin_glyphs(&mut self, positions: &[Vec3]) -> Result<(), DrawError> {
        if positions.is_empty() {
            return Ok(());
        }
        let (r, g, b) = ORIGIN_COLOR;
        self.rec.log(
            format!("{}/origin", MARKERS),
            &rerun::Points3D::new(positions.iter().map(|p| p.to_array()))
                .with_colors([rerun::Color::from_rgb(r, g, b)])
                .with_radii([rerun::Radius::new_ui_points(self.config.glyph_radius)]),
        )?;
        Ok(())
    }

    fn draw_labels(&mut self, labels: &[Label]) -> Result<(), DrawError> {
        if labels.is_empty() {
            return Ok(());
        }
        let (pts, colors_texts): (Vec<_>, Vec<_>) = labels
            .iter()
            .map(|l| {
                let (r, g, b, a) = id_to_color(&l.text);
                (
                    l.position.to_array(),
                    (rerun::Color::from_unmultiplied_rgba(r, g, b, a), l.text.clone()),
                )
            })
            .unzip();
        let (colors, texts): (Vec<_>, Vec<_>) = colors_texts.into_iter().unzip();
        self.rec.log(
            format!("{}/labels", MARKERS),
            &rerun::Points3D::new(pts)
                .with_colors(colors)
                .with_labels(texts)
                .with_radii([rerun::Radius::new_ui_points(1.0)]),
        )?;
        Ok(())
    }

    fn draw_quivers(&mut self, quivers: &AxisQuivers) -> Result<(), DrawError> {
        if quivers.is_empty() {
            return Ok(());
        }
        let (r, g, b) = quivers.color;
        self.rec.log(
            format!("{}/axis_{}", MARKERS, quivers.axis),
            &rerun::Arrows3D::from_vectors(quivers.vectors.iter().map(|v| v.to_array()))
                .with_origins(quivers.origins.iter().map(|p| p.to_array()))
                .with_colors([rerun::Color::from_rgb(r, g, b)])
                .with_radii([rerun::Radius::new_ui_points(self.config.line_width)]),
        )?;
        Ok(())
    }

    fn draw_frame_decorations(&mut self) -> Result<(), DrawError> {
        let bound = self.config.bound;
        if !(bound.is_finite() && bound > 0.0) {
            return Err(DrawError::Scene(format!("invalid scene bound {}", bound)));
        }
        let (r, g, b) = DECORATION_COLOR;
        self.rec.log(
            format!("{}/bounds", WORLD),
            &rerun::Boxes3D::from_half_sizes([(bound, bound, bound)])
                .with_colors([rerun::Color::from_rgb(r, g, b)]),
        )?;
        self.rec.log(
            format!("{}/axis_labels", WORLD),
            &rerun::Points3D::new(axis_label_positions(bound).map(|p| p.to_array()))
                .with_labels(AXIS_LABELS)
                .with_colors([rerun::Color::from_rgb(r, g, b)])
                .with_radii([rerun::Radius::new_ui_points(1.0)]),
        )?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawError> {
        std::thread::sleep(self.config.frame_pause());
        Ok(())
    }
}

// fixed hash so that a marker keeps its colour across builds
fn color_seed(id: &str) -> u64 {
    XxHash64::oneshot(0, id.as_bytes())
}

/// Stable per-marker colour, derived from the marker id.
pub fn id_to_color(id: &str) -> (u8, u8, u8, u8) {
    let mut rng = ChaCha8Rng::seed_from_u64(color_seed(id));
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::marker::{MarkerFrame, MarkerRecord};
    use crate::render::draw_frame;

    fn memory_scene(config: &RenderConfig) -> RerunScene {
        let (rec, _storage) = rerun::RecordingStreamBuilder::new("marker_pose_viewer_test")
            .memory()
            .unwrap();
        RerunScene::from_recording(rec, config).unwrap()
    }

    #[test]
    fn marker_color_is_stable() {
        assert_eq!(id_to_color("m1"), id_to_color("m1"));
        assert_eq!(id_to_color("m1").3, 255);
    }

    #[test]
    fn color_seed_is_fixed() {
        assert_eq!(color_seed(""), 0xef46db3751d8e999);
        assert_eq!(color_seed("abc"), 0x44bc2cf5ad770999);
        assert_eq!(color_seed("m1"), 0x91ab60ce02b784dc);
    }

    #[test]
    fn draws_into_recording() {
        let config = RenderConfig {
            frame_pause_ms: 0,
            ..Default::default()
        };
        let mut scene = memory_scene(&config);
        let frame: MarkerFrame = [(
            "m1".to_string(),
            MarkerRecord::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]).with_origin(true),
        )]
        .into_iter()
        .collect();
        draw_frame(&mut scene, &frame, &config, 0).unwrap();
        draw_frame(&mut scene, &MarkerFrame::default(), &config, 1).unwrap();
    }

    #[test]
    fn rejects_degenerate_bound() {
        let config = RenderConfig {
            bound: 0.0,
            frame_pause_ms: 0,
            ..Default::default()
        };
        let mut scene = memory_scene(&config);
        assert!(matches!(
            scene.draw_frame_decorations(),
            Err(DrawError::Scene(_))
        ));
    }
}
