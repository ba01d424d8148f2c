use crate::config::RenderConfig;
use crate::error::DrawError;
use crate::frame_queue::FrameConsumer;
use crate::geometry::FrameGeometry;
use crate::marker::MarkerFrame;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub frames_drawn: u64,
    pub markers_drawn: u64,
}

/// Draws every frame popped from `frames` until the queue is interrupted.
///
/// A draw error aborts the loop; the frame is not skipped.
pub fn run<S: Scene>(
    frames: &FrameConsumer,
    scene: &mut S,
    config: &RenderConfig,
) -> Result<RenderSummary, DrawError> {
    let mut summary = RenderSummary::default();
    while let Some(frame) = frames.pop_blocking() {
        let backlog = frames.len();
        if backlog > 0 {
            log::trace!("{} frames waiting", backlog);
        }
        draw_frame(scene, &frame, config, summary.frames_drawn).inspect_err(|e| {
            log::error!("drawing frame {} failed: {}", summary.frames_drawn, e);
        })?;
        summary.frames_drawn += 1;
        summary.markers_drawn += frame.len() as u64;
    }
    log::debug!("render loop interrupted after {} frames", summary.frames_drawn);
    Ok(summary)
}

/// Full redraw of the scene from a single frame.
pub fn draw_frame<S: Scene>(
    scene: &mut S,
    frame: &MarkerFrame,
    config: &RenderConfig,
    sequence: u64,
) -> Result<(), DrawError> {
    scene.begin_frame(sequence)?;
    scene.clear()?;

    let geometry = FrameGeometry::build(frame, config)?;
    scene.draw_origin_glyphs(&geometry.origin_glyphs)?;
    scene.draw_labels(&geometry.labels)?;
    for quivers in &geometry.quivers {
        scene.draw_quivers(quivers)?;
    }

    scene.draw_frame_decorations()?;
    scene.present()
}
