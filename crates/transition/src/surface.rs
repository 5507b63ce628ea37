use crate::UniformStore;

/// Device pixel ratios above this are clamped before sizing the backbuffer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Host viewport in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Minimised windows report zero-sized viewports.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale factor clamped to `(0, cap]`; invalid factors fall back to 1.
    pub fn pixel_ratio(&self, cap: f64) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor.min(cap)
        } else {
            1.0
        }
    }
}

/// Construction parameters for a render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    /// Background is transparent so the page underneath shows through.
    pub alpha: bool,
    /// Smooth the wipe edge with multisampling.
    pub antialias: bool,
    /// Upper bound applied to the device pixel ratio.
    pub pixel_ratio_cap: f64,
    /// Background colour, normalised sRGB.
    pub clear_color: [f32; 3],
    pub clear_alpha: f32,
    /// Colour of the covering overlay, normalised sRGB.
    pub overlay_color: [f32; 3],
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            alpha: true,
            antialias: true,
            pixel_ratio_cap: MAX_PIXEL_RATIO,
            clear_color: [1.0, 1.0, 1.0],
            clear_alpha: 0.0,
            overlay_color: [0.0, 0.0, 0.0],
        }
    }
}

/// Drawing capability the controller renders through.
pub trait RenderSurface {
    /// Updates projection and backbuffer size. Degenerate viewports are
    /// recorded but must not fault.
    fn resize(&mut self, viewport: Viewport);

    /// Draws one frame from the values passed in.
    fn render(&mut self, uniforms: &UniformStore);

    /// Most recent viewport handed to [`RenderSurface::resize`].
    fn viewport(&self) -> Viewport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(800, 600).with_scale_factor(3.0);
        assert_eq!(viewport.pixel_ratio(MAX_PIXEL_RATIO), 2.0);
        let viewport = Viewport::new(800, 600).with_scale_factor(1.5);
        assert_eq!(viewport.pixel_ratio(MAX_PIXEL_RATIO), 1.5);
    }

    #[test]
    fn invalid_scale_factor_falls_back_to_one() {
        let viewport = Viewport::new(800, 600).with_scale_factor(f64::NAN);
        assert_eq!(viewport.pixel_ratio(MAX_PIXEL_RATIO), 1.0);
        let viewport = Viewport::new(800, 600).with_scale_factor(0.0);
        assert_eq!(viewport.pixel_ratio(MAX_PIXEL_RATIO), 1.0);
    }

    #[test]
    fn zero_sized_viewports_are_degenerate() {
        assert!(Viewport::new(0, 0).is_degenerate());
        assert!(Viewport::new(0, 600).is_degenerate());
        assert!(!Viewport::new(1, 1).is_degenerate());
    }
}
