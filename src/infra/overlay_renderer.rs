// ============================================================
// Layer 6 — Vertex Overlay Renderer
// ============================================================
// Projects predicted mesh vertices onto the input image with the
// weak-perspective camera the model predicts:
//
//   [s, tx, ty] = cam
//   u = s * (x + tx)          in normalised [-1, 1] image space
//   v = s * (y + ty)
//   px = (u + 1) * size / 2
//
// Each vertex is drawn as a single pixel. This is a diagnostic
// view, not a shaded mesh render.

use image::{Rgb, RgbImage};

use crate::domain::prediction::PredictionRecord;
use crate::domain::traits::Renderer;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct VertexOverlayRenderer {
    pub color: Rgb<u8>,
}

impl Default for VertexOverlayRenderer {
    fn default() -> Self {
        Self { color: Rgb([255, 64, 64]) }
    }
}

impl VertexOverlayRenderer {
    pub fn new(color: Rgb<u8>) -> Self {
        Self { color }
    }

    /// Pixel position of a vertex, or `None` when it lands off-image
    /// or `cam` holds fewer than three values.
    pub fn project(cam: &[f32], vertex: [f32; 3], width: u32, height: u32) -> Option<(u32, u32)> {
        let &[s, tx, ty, ..] = cam else {
            return None;
        };
        let u = s * (vertex[0] + tx);
        let v = s * (vertex[1] + ty);

        let px = (u + 1.0) * 0.5 * width as f32;
        let py = (v + 1.0) * 0.5 * height as f32;
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }

        let (px, py) = (px as u32, py as u32);
        (px < width && py < height).then_some((px, py))
    }
}

impl Renderer for VertexOverlayRenderer {
    fn render(&self, image: &RgbImage, record: &PredictionRecord) -> Result<RgbImage> {
        if record.cam.len() < 3 {
            return Err(Error::ShapeMismatch {
                field:    "cam",
                expected: 3,
                actual:   record.cam.len(),
            });
        }

        let mut out = image.clone();
        let (w, h)  = out.dimensions();
        for vertex in record.vertices_f32() {
            if let Some((x, y)) = Self::project(&record.cam, vertex, w, h) {
                out.put_pixel(x, y, self.color);
            }
        }
        Ok(out)
    }
}
