// Surface sizing: container width + image aspect + device pixel ratio
// -> display size, backing pixel size and the responsive brush radius.
// Pure; the controller applies the result.
use crate::config::RevealConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    /// Size the surface is shown at, in layout pixels.
    pub display_width: f32,
    pub display_height: f32,
    /// Backing raster size shared by the visible, mask and overlay surfaces.
    pub pixel_width: usize,
    pub pixel_height: usize,
    /// Device pixel ratio actually used (after sanitising and capping).
    pub device_pixel_ratio: f32,
    pub brush_radius: f32,
}

pub struct SurfaceSizer<'a> {
    config: &'a RevealConfig,
}

impl<'a> SurfaceSizer<'a> {
    pub fn new(config: &'a RevealConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, container_width: f32, aspect: Option<f32>, device_pixel_ratio: f32) -> SurfaceSize {
        let cfg = self.config;

        let container = if container_width.is_finite() { container_width.floor() } else { 0.0 };
        let display_width = container.max(cfg.min_container_width);

        let aspect = match aspect {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => cfg.fallback_aspect,
        };
        let display_height = (display_width / aspect).floor().max(1.0);

        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(cfg.max_device_pixel_ratio)
        } else {
            1.0
        };

        let pixel_width = ((display_width * dpr).floor() as usize).max(1);
        let pixel_height = ((display_height * dpr).floor() as usize).max(1);

        let brush_radius = (pixel_width as f32 * cfg.brush_width_factor)
            .clamp(cfg.brush_min_radius, cfg.brush_max_radius)
            .round();

        SurfaceSize {
            display_width,
            display_height,
            pixel_width,
            pixel_height,
            device_pixel_ratio: dpr,
            brush_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(width: f32, aspect: Option<f32>, dpr: f32) -> SurfaceSize {
        SurfaceSizer::new(&RevealConfig::default()).fit(width, aspect, dpr)
    }

    #[test]
    fn plain_4_by_3_at_dpr_1() {
        let s = fit(400.0, Some(400.0 / 300.0), 1.0);
        assert_eq!((s.pixel_width, s.pixel_height), (400, 300));
        assert_eq!((s.display_width, s.display_height), (400.0, 300.0));
        assert_eq!(s.brush_radius, 24.0);
    }

    #[test]
    fn narrow_container_clamps_to_minimum() {
        let s = fit(120.0, Some(2.0), 1.0);
        assert_eq!(s.display_width, 200.0);
        assert_eq!(s.pixel_height, 100);
    }

    #[test]
    fn missing_aspect_falls_back_to_16_by_9() {
        let s = fit(1600.0, None, 1.0);
        assert_eq!(s.pixel_height, 900);
        let s = fit(1600.0, Some(f32::NAN), 1.0);
        assert_eq!(s.pixel_height, 900);
    }

    #[test]
    fn dpr_is_capped() {
        let s = fit(500.0, Some(1.0), 3.0);
        assert_eq!(s.device_pixel_ratio, 2.0);
        assert_eq!((s.pixel_width, s.pixel_height), (1000, 1000));
        let s = fit(500.0, Some(1.0), 0.0);
        assert_eq!(s.device_pixel_ratio, 1.0);
    }

    #[test]
    fn brush_radius_tracks_pixel_width_within_bounds() {
        assert_eq!(fit(1000.0, Some(1.0), 1.0).brush_radius, 60.0);
        assert_eq!(fit(1000.0, Some(1.0), 1.5).brush_radius, 90.0);
        assert_eq!(fit(3000.0, Some(1.0), 2.0).brush_radius, 220.0);
    }
}
