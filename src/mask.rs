// The persistent reveal mask: how much of the overlay shows at each pixel.
// Alpha only grows through stamping; `clear` is the single way back to 0.

/// Soft round brush: opaque core, then a linear falloff to 0 at the rim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftBrush {
    pub radius: f32,
    /// Fraction of the radius painted at full strength.
    pub core_fraction: f32,
}

impl SoftBrush {
    pub fn new(radius: f32, core_fraction: f32) -> Self {
        Self { radius, core_fraction: core_fraction.clamp(0.0, 1.0) }
    }

    /// Coverage in [0,1] at distance `d` from the brush center.
    #[inline]
    pub fn coverage(&self, d: f32) -> f32 {
        let r = self.radius;
        if r <= 0.0 || d >= r {
            return 0.0;
        }
        let inner = r * self.core_fraction;
        if d <= inner {
            1.0
        } else {
            (r - d) / (r - inner)
        }
    }
}

/// Alpha mask in [0,1] per pixel; 1 = overlay fully revealed, 0 = hidden.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskSurface {
    width: usize,
    height: usize,
    alpha: Vec<f32>, // length = width * height
    painted: bool,   // false until a stamp lands; lets the renderer skip work
}

impl MaskSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0.0; width * height], painted: false }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn alpha(&self) -> &[f32] {
        &self.alpha
    }

    /// Alpha at a pixel; 0 outside the surface.
    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.alpha[y * self.width + x]
    }

    pub fn has_paint(&self) -> bool {
        self.painted
    }

    /// Paint one soft circle centered at (cx, cy), blended source-over so
    /// repeated stamps accumulate toward 1. Parts outside the surface clip.
    pub fn stamp(&mut self, cx: f32, cy: f32, brush: &SoftBrush) {
        if !cx.is_finite() || !cy.is_finite() || brush.radius <= 0.0 {
            return;
        }
        if self.width == 0 || self.height == 0 {
            return;
        }
        let r = brush.radius;

        // Pixel rows/columns whose centers can fall inside the circle.
        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = (cx + r).ceil().min(self.width as f32 - 1.0);
        let y1 = (cy + r).ceil().min(self.height as f32 - 1.0);
        if x1 < 0.0 || y1 < 0.0 {
            return;
        }
        let (x1, y1) = (x1 as usize, y1 as usize);

        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - cy;
            let row = y * self.width;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let s = brush.coverage(dx.hypot(dy));
                if s <= 0.0 {
                    continue;
                }
                let a = &mut self.alpha[row + x];
                *a = (s + *a * (1.0 - s)).min(1.0);
                self.painted = true;
            }
        }
    }

    /// Everything back to fully transparent.
    pub fn clear(&mut self) {
        self.alpha.fill(0.0);
        self.painted = false;
    }

    /// Drop the content and resize to `width` x `height` (all zero).
    pub fn reallocate(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.alpha.clear();
        self.alpha.resize(width * height, 0.0);
        self.painted = false;
    }

    /// Stretch `old` over this surface's current size (bilinear), replacing
    /// the content. Used only while resizing, after `reallocate`.
    pub fn rescale_from(&mut self, old: &MaskSurface) {
        self.alpha.fill(0.0);
        self.painted = false;
        if old.width == 0 || old.height == 0 || !old.painted || self.alpha.is_empty() {
            return;
        }

        let sx_scale = old.width as f32 / self.width as f32;
        let sy_scale = old.height as f32 / self.height as f32;
        let max_x = (old.width - 1) as f32;
        let max_y = (old.height - 1) as f32;

        for y in 0..self.height {
            let sy = ((y as f32 + 0.5) * sy_scale - 0.5).clamp(0.0, max_y);
            let y0 = sy.floor() as usize;
            let y1 = (y0 + 1).min(old.height - 1);
            let fy = sy - y0 as f32;
            for x in 0..self.width {
                let sx = ((x as f32 + 0.5) * sx_scale - 0.5).clamp(0.0, max_x);
                let x0 = sx.floor() as usize;
                let x1 = (x0 + 1).min(old.width - 1);
                let fx = sx - x0 as f32;

                let top = old.alpha[y0 * old.width + x0] * (1.0 - fx) + old.alpha[y0 * old.width + x1] * fx;
                let bottom = old.alpha[y1 * old.width + x0] * (1.0 - fx) + old.alpha[y1 * old.width + x1] * fx;
                let a = (top * (1.0 - fy) + bottom * fy).clamp(0.0, 1.0);
                if a > 0.0 {
                    self.painted = true;
                }
                self.alpha[y * self.width + x] = a;
            }
        }
    }

    /// Convenience: a new surface holding this content stretched to a new size.
    pub fn rescaled(&self, width: usize, height: usize) -> MaskSurface {
        let mut out = MaskSurface::new(width, height);
        out.rescale_from(self);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(r: f32) -> SoftBrush {
        SoftBrush::new(r, 0.15)
    }

    #[test]
    fn coverage_profile() {
        let b = brush(100.0);
        assert_eq!(b.coverage(0.0), 1.0);
        assert_eq!(b.coverage(15.0), 1.0);
        assert!(b.coverage(57.5) > 0.49 && b.coverage(57.5) < 0.51);
        assert_eq!(b.coverage(100.0), 0.0);
        assert_eq!(b.coverage(140.0), 0.0);
    }

    #[test]
    fn stamp_paints_inside_radius_only() {
        let mut m = MaskSurface::new(100, 100);
        m.stamp(50.0, 50.0, &brush(20.0));
        assert_eq!(m.alpha_at(50, 50), 1.0);
        assert!(m.alpha_at(60, 50) > 0.0);
        assert_eq!(m.alpha_at(75, 50), 0.0);
        assert_eq!(m.alpha_at(0, 0), 0.0);
        assert!(m.has_paint());
    }

    #[test]
    fn alpha_never_decreases_across_stamps() {
        let mut m = MaskSurface::new(64, 48);
        let points = [(10.0, 10.0), (30.0, 20.0), (31.0, 21.0), (60.0, 40.0), (-5.0, 50.0), (20.0, 25.0)];
        let mut prev = m.alpha().to_vec();
        for (x, y) in points {
            m.stamp(x, y, &brush(12.0));
            for (before, after) in prev.iter().zip(m.alpha()) {
                assert!(after >= before);
                assert!(*after <= 1.0);
            }
            prev = m.alpha().to_vec();
        }
    }

    #[test]
    fn overlapping_soft_edges_accumulate() {
        let mut m = MaskSurface::new(100, 10);
        m.stamp(40.0, 5.0, &brush(20.0));
        let once = m.alpha_at(55, 5);
        m.stamp(40.0, 5.0, &brush(20.0));
        let twice = m.alpha_at(55, 5);
        assert!(once > 0.0 && once < 1.0);
        assert!(twice > once);
    }

    #[test]
    fn offscreen_stamps_clip_without_panicking() {
        let mut m = MaskSurface::new(20, 20);
        m.stamp(-100.0, -100.0, &brush(10.0));
        m.stamp(500.0, 5.0, &brush(10.0));
        m.stamp(f32::NAN, 5.0, &brush(10.0));
        assert!(!m.has_paint());
        m.stamp(-3.0, -3.0, &brush(10.0));
        assert!(m.alpha_at(0, 0) > 0.0);
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut m = MaskSurface::new(30, 30);
        m.stamp(15.0, 15.0, &brush(10.0));
        m.clear();
        assert!(m.alpha().iter().all(|a| *a == 0.0));
        assert!(!m.has_paint());
    }

    #[test]
    fn rescale_keeps_center_stamp_centered() {
        let mut m = MaskSurface::new(400, 300);
        m.stamp(200.0, 150.0, &brush(40.0));
        let big = m.rescaled(800, 600);
        assert_eq!(big.alpha_at(400, 300), 1.0);
        assert_eq!(big.alpha_at(399, 299), 1.0);
        assert_eq!(big.alpha_at(10, 10), 0.0);
        // Symmetric around the new center.
        assert!((big.alpha_at(400 + 60, 300) - big.alpha_at(399 - 60, 300)).abs() < 1e-4);

        let small = m.rescaled(200, 100);
        assert_eq!(small.alpha_at(100, 50), 1.0);
        assert!(small.has_paint());
    }

    #[test]
    fn rescale_of_blank_mask_stays_blank() {
        let m = MaskSurface::new(10, 10);
        let out = m.rescaled(33, 17);
        assert!(!out.has_paint());
        assert_eq!(out.alpha().len(), 33 * 17);
    }
}
