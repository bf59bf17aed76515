//! Viewport Controller
//!
//! Keeps the camera aspect ratio and the renderer viewport in step with the
//! output surface. macroquad has no resize callback, so the application polls
//! the surface once per frame and the controller reacts to size changes.

use macroquad::window::{screen_dpi_scale, screen_height, screen_width};
use crate::camera::SceneCamera;
use crate::render::Renderer;

/// Something with a pixel size the scene is drawn into
pub trait Surface {
    /// Size in physical pixels
    fn size(&self) -> (u32, u32);
}

/// The macroquad window
pub struct MacroquadSurface;

impl Surface for MacroquadSurface {
    fn size(&self) -> (u32, u32) {
        // The window is high_dpi, and the GL viewport is in framebuffer pixels
        physical_size(screen_width(), screen_height(), screen_dpi_scale())
    }
}

/// Logical window size scaled to framebuffer pixels
fn physical_size(width: f32, height: f32, dpi_scale: f32) -> (u32, u32) {
    let scale = |logical: f32| (logical * dpi_scale).round().max(0.0) as u32;
    (scale(width), scale(height))
}

/// What `handle_resize` did with a surface size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Applied,
    /// Zero width or height; renderer and camera untouched
    Skipped,
}

/// Tracks the last surface size seen
#[derive(Debug, Default)]
pub struct ViewportController {
    /// Applied or skipped, so an unchanged size is only handled once
    observed: Option<(u32, u32)>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the surface size to the renderer and camera.
    /// Changes nothing when either dimension is zero.
    pub fn handle_resize<S: Surface, R: Renderer>(
        &mut self,
        surface: &S,
        renderer: &mut R,
        camera: &mut SceneCamera,
    ) -> ResizeOutcome {
        let (width, height) = surface.size();
        self.observed = Some((width, height));
        if width == 0 || height == 0 {
            println!("Skipping viewport update for {}x{} surface", width, height);
            return ResizeOutcome::Skipped;
        }

        renderer.set_viewport(0, 0, width as i32, height as i32);
        camera.set_aspect(width as f32 / height as f32);
        ResizeOutcome::Applied
    }

    /// Handle the surface size only if it differs from the last one seen.
    /// None when nothing changed.
    pub fn poll<S: Surface, R: Renderer>(
        &mut self,
        surface: &S,
        renderer: &mut R,
        camera: &mut SceneCamera,
    ) -> Option<ResizeOutcome> {
        if self.observed == Some(surface.size()) {
            return None;
        }
        Some(self.handle_resize(surface, renderer, camera))
    }
}
