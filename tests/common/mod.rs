#![allow(dead_code)]

use brush_reveal::config::RevealConfig;
use brush_reveal::image_ready::RasterImage;
use brush_reveal::types::Point;
use brush_reveal::{RevealController, SurfaceHost};
use std::cell::Cell;
use std::rc::Rc;

pub const BASE_RGBA: [u8; 4] = [0, 0, 255, 255];
pub const OVERLAY_RGBA: [u8; 4] = [255, 0, 0, 255];
pub const BASE_ARGB: u32 = 0xFF_00_00_FF;
pub const OVERLAY_ARGB: u32 = 0xFF_FF_00_00;

/// Container the tests can resize from the outside.
#[derive(Default)]
pub struct Container {
    pub width: Cell<f32>,
    pub dpr: Cell<f32>,
    pub origin: Cell<(f32, f32)>,
    pub frames: Cell<u32>,
}

pub struct TestHost(pub Rc<Container>);

impl SurfaceHost for TestHost {
    fn container_width(&self) -> f32 {
        self.0.width.get()
    }
    fn device_pixel_ratio(&self) -> f32 {
        self.0.dpr.get()
    }
    fn surface_origin(&self) -> Point {
        let (x, y) = self.0.origin.get();
        Point::new(x, y)
    }
    fn request_frame(&mut self) {
        self.0.frames.set(self.0.frames.get() + 1);
    }
}

pub fn controller(width: f32, dpr: f32, image_w: u32, image_h: u32) -> (RevealController, Rc<Container>) {
    let container = Rc::new(Container::default());
    container.width.set(width);
    container.dpr.set(dpr);
    let c = RevealController::with_images(
        RevealConfig::default(),
        Box::new(TestHost(container.clone())),
        Rc::new(RasterImage::solid(image_w, image_h, BASE_RGBA)),
        Rc::new(RasterImage::solid(image_w, image_h, OVERLAY_RGBA)),
    );
    (c, container)
}
