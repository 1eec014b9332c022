//! The reveal widget's state machine.
//!
//! `RevealController` owns the mask, the renderer and the stroke router and is
//! the only thing that mutates them. The host (window, page, test harness)
//! is injected as a [`SurfaceHost`] and the two images as [`ImageResource`]s;
//! nothing is sized or drawn until both images are ready.

use crate::composite::{CompositeRenderer, FrameScheduler};
use crate::config::RevealConfig;
use crate::error::Error;
use crate::image_ready::{ImageReadyWaiter, ImageResource, RasterImage};
use crate::input::{KeyCommand, KeyEvent, PointerEvent, PointerInputRouter, StrokeSpacing, SurfaceGeometry};
use crate::mask::{MaskSurface, SoftBrush};
use crate::sizer::{SurfaceSize, SurfaceSizer};
use crate::types::{FrameBuffer, Point, Rect};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Everything the controller needs from its environment.
pub trait SurfaceHost {
    /// Current layout width of the container, in layout pixels.
    fn container_width(&self) -> f32;

    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Top-left of the displayed surface in viewport coordinates.
    fn surface_origin(&self) -> Point {
        Point::default()
    }

    /// Ask for one `on_frame` call on the next display refresh.
    fn request_frame(&mut self);

    fn focus(&mut self) {}

    fn capture_pointer(&mut self, _pointer_id: u64) {}

    fn release_pointer(&mut self, _pointer_id: u64) {}

    /// New display/backing size after a fit or resize.
    fn apply_display_size(&mut self, _size: &SurfaceSize) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    /// Waiting for the base and overlay images.
    Loading,
    Inactive,
    Active,
    /// An image failed to load; the widget stays inert.
    Failed,
}

struct Surfaces {
    aspect: Option<f32>,
    size: SurfaceSize,
    mask: MaskSurface,
    renderer: CompositeRenderer,
}

enum Phase {
    Loading,
    Ready(Surfaces),
    Failed(String),
}

/// Collapses bursts of resize notifications into one resize after a quiet period.
#[derive(Debug)]
struct ResizeDebounce {
    quiet: Duration,
    last_notice: Option<Instant>,
}

impl ResizeDebounce {
    fn note(&mut self, now: Instant) {
        self.last_notice = Some(now);
    }

    fn is_pending(&self) -> bool {
        self.last_notice.is_some()
    }

    fn due(&mut self, now: Instant) -> bool {
        match self.last_notice {
            Some(t) if now.saturating_duration_since(t) >= self.quiet => {
                self.last_notice = None;
                true
            }
            _ => false,
        }
    }
}

pub struct RevealController {
    config: RevealConfig,
    host: Box<dyn SurfaceHost>,
    phase: Phase,
    active: bool,
    brush_radius: f32,
    router: PointerInputRouter,
    scheduler: FrameScheduler,
    pending_resize: ResizeDebounce,
}

impl RevealController {
    /// Build a controller and start waiting for both images. If they are
    /// already decoded, the controller is sized and rendered before this returns.
    pub fn create(
        config: RevealConfig,
        host: Box<dyn SurfaceHost>,
        base: &ImageResource,
        overlay: &ImageResource,
    ) -> Rc<RefCell<RevealController>> {
        let controller = Rc::new(RefCell::new(Self::new(config, host)));
        let weak = Rc::downgrade(&controller);

        ImageReadyWaiter::wait_all(&[base.clone(), overlay.clone()], move |result| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            let mut controller = controller.borrow_mut();
            match result.map(<[Rc<RasterImage>; 2]>::try_from) {
                Ok(Ok([base, overlay])) => controller.initialize(base, overlay),
                Ok(Err(images)) => controller.fail(Error::resource_load(
                    "images",
                    format!("expected 2 images, got {}", images.len()),
                )),
                Err(e) => controller.fail(e),
            }
        });

        controller
    }

    /// Controller over images that are already decoded.
    pub fn with_images(
        config: RevealConfig,
        host: Box<dyn SurfaceHost>,
        base: Rc<RasterImage>,
        overlay: Rc<RasterImage>,
    ) -> Self {
        let mut controller = Self::new(config, host);
        controller.initialize(base, overlay);
        controller
    }

    fn new(config: RevealConfig, host: Box<dyn SurfaceHost>) -> Self {
        let spacing = StrokeSpacing { step_factor: config.stroke_step_factor, min_step: config.stroke_min_step };
        let quiet = Duration::from_millis(config.resize_debounce_ms);
        Self {
            brush_radius: config.brush_min_radius,
            config,
            host,
            phase: Phase::Loading,
            active: false,
            router: PointerInputRouter::new(spacing),
            scheduler: FrameScheduler::default(),
            pending_resize: ResizeDebounce { quiet, last_notice: None },
        }
    }

    fn initialize(&mut self, base: Rc<RasterImage>, overlay: Rc<RasterImage>) {
        let aspect = base.aspect();
        let size = self.compute_size(aspect);
        self.brush_radius = size.brush_radius;
        tracing::info!(
            base_w = base.natural_width(),
            base_h = base.natural_height(),
            px_w = size.pixel_width,
            px_h = size.pixel_height,
            brush = size.brush_radius,
            "reveal surfaces ready"
        );

        let renderer = CompositeRenderer::new(base, overlay, size.pixel_width, size.pixel_height);
        let mask = MaskSurface::new(size.pixel_width, size.pixel_height);
        self.host.apply_display_size(&size);
        self.phase = Phase::Ready(Surfaces { aspect, size, mask, renderer });
        self.render_now();
    }

    fn fail(&mut self, err: Error) {
        tracing::error!(error = %err, "image load failed; reveal widget stays inactive");
        self.phase = Phase::Failed(err.to_string());
    }

    fn compute_size(&self, aspect: Option<f32>) -> SurfaceSize {
        SurfaceSizer::new(&self.config).fit(self.host.container_width(), aspect, self.host.device_pixel_ratio())
    }

    /* ------------------------------ control surface ------------------------------ */

    pub fn enable(&mut self) {
        if !self.active {
            tracing::info!("reveal enabled");
        }
        self.active = true;
        // Before the images arrive only the flag is recorded; `initialize`
        // renders with it.
        if matches!(self.phase, Phase::Ready(_)) {
            self.host.focus();
            self.schedule_render();
        }
    }

    /// Hide the overlay. The mask is kept; only `reset` clears it.
    pub fn disable(&mut self) {
        if self.active {
            tracing::info!("reveal disabled");
        }
        self.active = false;
        if let Some(pointer_id) = self.router.cancel() {
            self.host.release_pointer(pointer_id);
        }
        self.render_now();
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Clear all paint. Active/inactive is unchanged.
    pub fn reset(&mut self) {
        if let Phase::Ready(s) = &mut self.phase {
            s.mask.clear();
            tracing::debug!("mask cleared");
        }
        self.render_now();
    }

    /// Re-fit every surface to the container, carrying the mask over.
    pub fn resize(&mut self) {
        let Phase::Ready(s) = &self.phase else {
            return;
        };
        let size = self.compute_size(s.aspect);
        if let Phase::Ready(s) = &mut self.phase {
            if size != s.size {
                let same_pixels = size.pixel_width == s.size.pixel_width && size.pixel_height == s.size.pixel_height;
                if !same_pixels {
                    // Snapshot, reallocate, stretch the snapshot back in.
                    let snapshot = s.mask.clone();
                    s.mask.reallocate(size.pixel_width, size.pixel_height);
                    s.mask.rescale_from(&snapshot);
                    s.renderer.resize(size.pixel_width, size.pixel_height);
                }
                tracing::debug!(
                    from_w = s.size.pixel_width,
                    from_h = s.size.pixel_height,
                    to_w = size.pixel_width,
                    to_h = size.pixel_height,
                    brush = size.brush_radius,
                    "surfaces resized"
                );
                s.size = size;
                self.brush_radius = size.brush_radius;
                self.host.apply_display_size(&size);
            }
        }
        self.render_now();
    }

    /// Fit to the current container and draw right away.
    pub fn fit_and_render(&mut self) {
        self.resize();
    }

    /// Container size changed. Applied from `on_frame` once notifications
    /// have been quiet for the configured debounce period.
    pub fn notify_resize(&mut self, now: Instant) {
        self.pending_resize.note(now);
        self.host.request_frame();
    }

    /// Display refresh tick.
    pub fn on_frame(&mut self, now: Instant) {
        if self.pending_resize.due(now) {
            self.scheduler.take();
            self.resize();
            return;
        }
        if self.pending_resize.is_pending() {
            self.host.request_frame();
        }
        if self.scheduler.take() {
            self.render_now();
        }
    }

    /// Coalesced render on the next refresh tick.
    pub fn schedule_render(&mut self) {
        if self.scheduler.request() {
            self.host.request_frame();
        }
    }

    pub fn render_now(&mut self) {
        if let Phase::Ready(s) = &mut self.phase {
            s.renderer.render(self.active, &s.mask);
        }
    }

    /* ------------------------------ input ------------------------------ */

    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        let Phase::Ready(s) = &mut self.phase else {
            return;
        };
        let origin = self.host.surface_origin();
        let geometry = SurfaceGeometry {
            display: Rect::new(origin.x, origin.y, s.size.display_width, s.size.display_height),
            pixel_width: s.size.pixel_width,
            pixel_height: s.size.pixel_height,
        };

        let outcome = self.router.handle(event, self.active, &geometry, self.brush_radius);
        if let Some(pointer_id) = outcome.capture {
            self.host.capture_pointer(pointer_id);
        }
        let brush = SoftBrush::new(self.brush_radius, self.config.brush_core_fraction);
        for p in &outcome.stamps {
            s.mask.stamp(p.x, p.y, &brush);
        }
        if let Some(pointer_id) = outcome.release {
            self.host.release_pointer(pointer_id);
        }
        if !outcome.stamps.is_empty() {
            self.schedule_render();
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        match self.router.key_command(event) {
            Some(KeyCommand::Toggle) => self.toggle(),
            Some(KeyCommand::Disable) if self.active => self.disable(),
            _ => {}
        }
    }

    /// Paint one dab at mask-pixel coordinates with the current brush.
    pub fn stamp(&mut self, x: f32, y: f32) {
        let brush = SoftBrush::new(self.brush_radius, self.config.brush_core_fraction);
        if let Phase::Ready(s) = &mut self.phase {
            s.mask.stamp(x, y, &brush);
            self.schedule_render();
        }
    }

    /// Override the responsive radius until the next resize recomputes it.
    pub fn set_brush_radius(&mut self, radius: f32) {
        self.brush_radius = radius;
    }

    /* ------------------------------ read access ------------------------------ */

    pub fn state(&self) -> RevealState {
        match (&self.phase, self.active) {
            (Phase::Loading, _) => RevealState::Loading,
            (Phase::Failed(_), _) => RevealState::Failed,
            (Phase::Ready(_), true) => RevealState::Active,
            (Phase::Ready(_), false) => RevealState::Inactive,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_drawing(&self) -> bool {
        self.router.is_drawing()
    }

    pub fn last_pointer_position(&self) -> Option<Point> {
        self.router.last_position()
    }

    pub fn brush_radius(&self) -> f32 {
        self.brush_radius
    }

    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        match &self.phase {
            Phase::Ready(s) => Some(s.size),
            _ => None,
        }
    }

    pub fn mask(&self) -> Option<&MaskSurface> {
        match &self.phase {
            Phase::Ready(s) => Some(&s.mask),
            _ => None,
        }
    }

    pub fn visible_surface(&self) -> Option<&FrameBuffer> {
        match &self.phase {
            Phase::Ready(s) => Some(s.renderer.visible()),
            _ => None,
        }
    }

    pub fn overlay_composite(&self) -> Option<&FrameBuffer> {
        match &self.phase {
            Phase::Ready(s) => Some(s.renderer.overlay_composite()),
            _ => None,
        }
    }

    pub fn render_count(&self) -> u64 {
        match &self.phase {
            Phase::Ready(s) => s.renderer.render_count(),
            _ => 0,
        }
    }
}
