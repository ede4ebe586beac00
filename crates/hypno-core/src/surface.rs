use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_skia::{Color, Pixmap};

use crate::color::Rgba;
use crate::resize::Viewport;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} raster surface")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to write frame to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// An RGBA raster surface owned by a scene.
pub struct FrameBuffer {
    pixmap: Pixmap,
}

impl FrameBuffer {
    pub fn new(viewport: Viewport) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(viewport.width, viewport.height).ok_or(SurfaceError::InvalidSize {
            width: viewport.width,
            height: viewport.height,
        })?;
        Ok(Self { pixmap })
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Reallocate for a new viewport. Returns false when the size is unchanged.
    pub fn resize(&mut self, viewport: Viewport) -> Result<bool, SurfaceError> {
        if viewport == self.viewport() {
            return Ok(false);
        }
        *self = Self::new(viewport)?;
        Ok(true)
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixmap.fill(skia_color(color));
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        self.pixmap.save_png(path).map_err(|e| SurfaceError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Convert to a rasterizer color, clamping out-of-range channels.
pub fn skia_color(c: Rgba) -> Color {
    Color::from_rgba(
        c.r.clamp(0.0, 1.0),
        c.g.clamp(0.0, 1.0),
        c.b.clamp(0.0, 1.0),
        c.a.clamp(0.0, 1.0),
    )
    .unwrap_or(Color::TRANSPARENT)
}
