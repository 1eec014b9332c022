// Core raster types shared by the mask, the renderer and the host window.

/// ARGB raster the user sees (and the scratch overlay composite).
/// Each pixel is 0xAARRGGBB; minifb ignores the top byte when presenting.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // backing pixel width
    pub height: usize,     // backing pixel height
    pub pixels: Vec<u32>,  // length = width * height
}

impl FrameBuffer {
    /// Fully transparent buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// A position in either viewport (layout) or surface (backing pixel) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Axis-aligned rectangle in viewport coordinates (where the surface is displayed).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}

#[inline]
pub fn unpack_argb(px: u32) -> (u8, u8, u8, u8) {
    (
        ((px >> 24) & 0xFF) as u8,
        ((px >> 16) & 0xFF) as u8,
        ((px >> 8) & 0xFF) as u8,
        (px & 0xFF) as u8,
    )
}

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}
