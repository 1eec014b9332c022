// Compositing: base photo, then (overlay masked by the reveal mask) on top.
// Visual: with the widget inactive you only ever see the base image; once
// active, the overlay shows through wherever the mask has been painted.
use crate::image_ready::RasterImage;
use crate::mask::MaskSurface;
use crate::types::{pack_argb, unpack_argb, FrameBuffer};
use image::imageops::{self, FilterType};
use std::rc::Rc;

/// Stretch a decoded image to exactly `width` x `height` and pack it as ARGB.
pub fn stretch_to_frame(image: &RasterImage, width: usize, height: usize) -> FrameBuffer {
    let src = image.rgba();
    let scaled;
    let rgba = if src.width() as usize == width && src.height() as usize == height {
        src
    } else {
        scaled = imageops::resize(src, width as u32, height as u32, FilterType::Triangle);
        &scaled
    };

    let pixels = rgba.pixels().map(|p| pack_argb(p[3], p[0], p[1], p[2])).collect();
    FrameBuffer { width, height, pixels }
}

/// Non-premultiplied source-over of one ARGB pixel onto another.
#[inline]
fn source_over(src: u32, dst: u32) -> u32 {
    let (sa, sr, sg, sb) = unpack_argb(src);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let (da, dr, dg, db) = unpack_argb(dst);

    let sa_f = sa as f32 / 255.0;
    let da_f = da as f32 / 255.0;
    let out_a = sa_f + da_f * (1.0 - sa_f);
    let mix = |s: u8, d: u8| -> u8 {
        let c = (s as f32 * sa_f + d as f32 * da_f * (1.0 - sa_f)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    pack_argb((out_a * 255.0).round() as u8, mix(sr, dr), mix(sg, dg), mix(sb, db))
}

/// Owns the visible surface, the scratch overlay composite and the
/// surface-sized copies of both images.
pub struct CompositeRenderer {
    base_image: Rc<RasterImage>,
    overlay_image: Rc<RasterImage>,
    base: FrameBuffer,     // base image stretched to the surface
    overlay: FrameBuffer,  // overlay image stretched to the surface
    scratch: FrameBuffer,  // overlay after destination-in with the mask
    visible: FrameBuffer,  // what gets presented
    renders: u64,
}

impl CompositeRenderer {
    pub fn new(base_image: Rc<RasterImage>, overlay_image: Rc<RasterImage>, width: usize, height: usize) -> Self {
        let base = stretch_to_frame(&base_image, width, height);
        let overlay = stretch_to_frame(&overlay_image, width, height);
        Self {
            base_image,
            overlay_image,
            base,
            overlay,
            scratch: FrameBuffer::new(width, height),
            visible: FrameBuffer::new(width, height),
            renders: 0,
        }
    }

    /// Reallocate every surface at the new pixel size.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.visible.width == width && self.visible.height == height {
            return;
        }
        self.base = stretch_to_frame(&self.base_image, width, height);
        self.overlay = stretch_to_frame(&self.overlay_image, width, height);
        self.scratch = FrameBuffer::new(width, height);
        self.visible = FrameBuffer::new(width, height);
    }

    /// Redraw the visible surface from the images and the mask. Touches
    /// nothing but `visible` and `scratch`, so repeated calls agree.
    pub fn render(&mut self, active: bool, mask: &MaskSurface) {
        self.renders += 1;

        // 1) Base image stretched over the whole surface.
        self.visible.pixels.copy_from_slice(&self.base.pixels);
        if !active {
            return;
        }

        // 2) Scratch = overlay, kept only where the mask has alpha.
        if !mask.has_paint() || mask.alpha().len() != self.scratch.pixels.len() {
            if mask.alpha().len() != self.scratch.pixels.len() {
                tracing::warn!(
                    mask = mask.alpha().len(),
                    surface = self.scratch.pixels.len(),
                    "mask and surface sizes differ; overlay skipped"
                );
            }
            self.scratch.pixels.fill(0);
            return;
        }
        for ((dst, src), a) in self.scratch.pixels.iter_mut().zip(&self.overlay.pixels).zip(mask.alpha()) {
            let src_a = (src >> 24) as f32;
            let keep = (src_a * a).round() as u32;
            *dst = (keep << 24) | (src & 0x00FF_FFFF);
        }

        // 3) Masked overlay over the base.
        for (out, src) in self.visible.pixels.iter_mut().zip(&self.scratch.pixels) {
            *out = source_over(*src, *out);
        }
    }

    pub fn visible(&self) -> &FrameBuffer {
        &self.visible
    }

    pub fn overlay_composite(&self) -> &FrameBuffer {
        &self.scratch
    }

    /// How many times `render` actually ran.
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

/// Coalesces redraw requests: any number of `request` calls between two
/// refresh ticks yield a single pending render.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
}

impl FrameScheduler {
    /// Mark a render as pending. Returns true only for the first request of
    /// the interval, i.e. when the caller must ask the host for a tick.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called from the refresh tick; returns whether a render is due and
    /// resets the flag.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
