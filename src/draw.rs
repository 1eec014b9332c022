// Window + software drawing utilities for the desktop host.
// Visual effects provided here:
// 1) A resizable window that shows the reveal surface in its top-left corner.
// 2) Mouse/keyboard polling turned into pointer and key events.
// 3) The demo cursor (a + inside a highlight ring).

use crate::error::Error;
use crate::input::{KeyEvent, PointerEvent, PointerPhase, RevealKey};
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

/// minifb only reports one mouse; it gets this pointer id.
pub const MOUSE_POINTER_ID: u64 = 1;

pub struct Drawer {
    window: Window,    // the on-screen window you see
    mouse_down: bool,  // left button state from the previous poll
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, scale_mode: ScaleMode::UpperLeft, ..WindowOptions::default() };
        let mut window =
            Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, mouse_down: false })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Current inner size of the window; this is the widget's container.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    pub fn quit_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Q, KeyRepeat::No)
    }

    pub fn reset_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }

    /// Space/Escape presses this frame, without auto-repeat.
    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(|k| match k {
                Key::Space => Some(RevealKey::Toggle),
                Key::Escape => Some(RevealKey::Cancel),
                _ => None,
            })
            .map(|key| KeyEvent { key, repeat: false })
            .collect()
    }

    /// Turn this frame's mouse state into pointer events. Positions are not
    /// clamped, so a drag that leaves the window keeps its stroke.
    pub fn pointer_events(&mut self) -> Vec<PointerEvent> {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Pass) else {
            // Lost the cursor entirely: treat as a cancelled press.
            let was_down = std::mem::replace(&mut self.mouse_down, false);
            return if was_down {
                vec![PointerEvent::new(MOUSE_POINTER_ID, PointerPhase::Cancel, 0.0, 0.0)]
            } else {
                Vec::new()
            };
        };

        let phase = match (self.mouse_down, down) {
            (false, true) => PointerPhase::Down,
            (true, false) => PointerPhase::Up,
            _ => PointerPhase::Move,
        };
        self.mouse_down = down;
        vec![PointerEvent::new(MOUSE_POINTER_ID, phase, x, y)]
    }
}

/* ---------- Host coordinates, blit, demo cursor ---------- */

/// Window pixels -> layout coordinates. minifb reports the mouse in window
/// pixels, while the controller expects layout units (pixels / dpr).
pub fn to_layout(event: PointerEvent, device_pixel_ratio: f32) -> PointerEvent {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
    PointerEvent { position: Point::new(event.position.x / dpr, event.position.y / dpr), ..event }
}

/// Copy `src` into the top-left of `dst`; the rest of `dst` gets `background`.
/// Visual: the reveal surface sits in the corner of a larger window.
pub fn blit_top_left(dst: &mut FrameBuffer, src: &FrameBuffer, background: u32) {
    dst.pixels.fill(background);
    let w = src.width.min(dst.width);
    let h = src.height.min(dst.height);
    for y in 0..h {
        let from = y * src.width;
        let to = y * dst.width;
        dst.pixels[to..to + w].copy_from_slice(&src.pixels[from..from + w]);
    }
}

/// The pixel at (x,y), or None off the framebuffer.
#[inline]
fn slot(fb: &mut FrameBuffer, x: i32, y: i32) -> Option<&mut u32> {
    let x = usize::try_from(x).ok().filter(|x| *x < fb.width)?;
    let y = usize::try_from(y).ok().filter(|y| *y < fb.height)?;
    fb.pixels.get_mut(y * fb.width + x)
}

/// Demo cursor: a highlight ring (midpoint circle) around a + whose arms
/// leave a 1-pixel gap next to the center dot. Clips at the edges.
pub fn draw_demo_cursor(fb: &mut FrameBuffer, cx: i32, cy: i32, style: &CursorStyle) {
    let (mut x, mut y) = (style.ring_radius, 0);
    let mut err = 1 - style.ring_radius;
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            if let Some(p) = slot(fb, cx + px, cy + py) {
                *p = style.ring_color;
            }
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    for d in (-style.arm..=style.arm).filter(|d| *d == 0 || d.abs() >= 2) {
        for (px, py) in [(cx + d, cy), (cx, cy + d)] {
            if let Some(p) = slot(fb, px, py) {
                *p = style.cursor_color;
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CursorStyle {
    pub arm: i32,
    pub ring_radius: i32,
    pub cursor_color: u32,
    pub ring_color: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SurfaceGeometry;
    use crate::types::Rect;

    const STYLE: CursorStyle = CursorStyle { arm: 20, ring_radius: 4, cursor_color: 5, ring_color: 6 };

    #[test]
    fn blit_copies_into_corner_and_fills_rest() {
        let mut src = FrameBuffer::new(2, 2);
        src.pixels.fill(7);
        let mut dst = FrameBuffer::new(3, 3);
        blit_top_left(&mut dst, &src, 1);
        assert_eq!(dst.pixels, vec![7, 7, 1, 7, 7, 1, 1, 1, 1]);
    }

    #[test]
    fn cursor_clips_at_edges() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_demo_cursor(&mut fb, 0, 0, &STYLE);
        assert_eq!(fb.pixel(0, 0), 5);
        assert_eq!(fb.pixel(9, 0), 5);
        assert_eq!(fb.pixel(0, 9), 5);
        assert_eq!(fb.pixel(1, 0), 0); // gap
        assert_eq!(fb.pixel(4, 0), 5); // arm drawn over the ring
        assert_eq!(fb.pixel(3, 2), 6);
        assert_eq!(fb.pixel(2, 3), 6);
    }

    #[test]
    fn window_pixels_land_on_the_same_surface_pixel() {
        // dpr 2: a 600x400 window shows a 300x200 layout surface backed by 600x400 pixels.
        let geometry = SurfaceGeometry {
            display: Rect::new(0.0, 0.0, 300.0, 200.0),
            pixel_width: 600,
            pixel_height: 400,
        };
        let event = PointerEvent::new(1, PointerPhase::Move, 450.0, 120.0);
        let layout = to_layout(event, 2.0);
        assert_eq!(layout.position, Point::new(225.0, 60.0));
        assert_eq!(layout.pointer_id, 1);
        assert_eq!(geometry.to_surface(layout.position), Point::new(450.0, 120.0));
        assert_eq!(to_layout(event, 0.0).position, event.position);
    }
}
