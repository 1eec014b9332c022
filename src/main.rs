// What you SEE:
// • The base photo fills the top-left of the window, sized to the window width.
// • On start a demo cursor sweeps left/right for a few seconds; painting is on.
// • Hold Left Mouse: paint the mask away and the overlay photo shows through.
// • Space toggles the overlay, Escape hides it, R clears the paint, Q quits.
// • Resize the window: the surface refits and your paint is stretched along.

use brush_reveal::config::RevealConfig;
use brush_reveal::demo::{DemoAnimation, DemoFrame};
use brush_reveal::draw::{blit_top_left, draw_demo_cursor, to_layout, CursorStyle, Drawer};
use brush_reveal::error::Error;
use brush_reveal::image_ready::ImageResource;
use brush_reveal::logging;
use brush_reveal::sizer::SurfaceSize;
use brush_reveal::types::{FrameBuffer, Rect};
use brush_reveal::{RevealController, SurfaceHost};
use clap::Parser;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "brush-reveal", about = "Paint to reveal an overlay photo over a base photo")]
struct Args {
    /// Base photo (always visible)
    #[arg(long)]
    base: PathBuf,
    /// Overlay photo (revealed where you paint)
    #[arg(long)]
    overlay: PathBuf,
    /// Initial window width, in window pixels
    #[arg(long, default_value_t = 960)]
    width: usize,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Device pixel ratio: window pixels per layout unit
    #[arg(long, default_value_t = 1.0)]
    dpr: f32,
    /// Skip the intro cursor animation
    #[arg(long)]
    no_demo: bool,
    /// Debug logging (RUST_LOG is honored)
    #[arg(long)]
    debug: bool,
}

/// Window state the controller reads and writes through `SurfaceHost`.
#[derive(Default)]
struct HostState {
    container_width: Cell<f32>,
    dpr: Cell<f32>,
    frame_requested: Cell<bool>,
    display: Cell<Option<(f32, f32)>>,
}

struct WindowHost(Rc<HostState>);

impl SurfaceHost for WindowHost {
    fn container_width(&self) -> f32 {
        self.0.container_width.get()
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.0.dpr.get()
    }

    fn request_frame(&mut self) {
        self.0.frame_requested.set(true);
    }

    fn apply_display_size(&mut self, size: &SurfaceSize) {
        self.0.display.set(Some((size.display_width, size.display_height)));
    }
}

const BACKGROUND: u32 = 0x00_20_20_20;
const DEMO_CURSOR: CursorStyle =
    CursorStyle { arm: 12, ring_radius: 28, cursor_color: 0x00_FF_FF_FF, ring_color: 0x00_FF_CC_33 };

fn main() -> Result<(), Error> {
    let args = Args::parse();
    logging::init(args.debug);

    let config = match &args.config {
        Some(path) => RevealConfig::load(path)?,
        None => RevealConfig::default(),
    };

    // Window pixels are backing pixels; layout units are window pixels / dpr.
    let dpr = if args.dpr.is_finite() && args.dpr > 0.0 { args.dpr.min(config.max_device_pixel_ratio) } else { 1.0 };
    if dpr != args.dpr {
        tracing::warn!(requested = args.dpr, used = dpr, "device pixel ratio adjusted");
    }

    /* --- Images ---
       Decoding happens up front; a bad file becomes a failed resource. */
    let base = ImageResource::open("base", &args.base);
    let overlay = ImageResource::open("overlay", &args.overlay);

    /* --- Window ---
       Height follows the base photo's aspect so the surface fits at start. */
    let height = match base.natural_size() {
        Some((w, h)) if w > 0 => args.width * h as usize / w as usize,
        _ => args.width * 9 / 16,
    };
    let mut drawer = Drawer::new("Brush Reveal", args.width, height.max(1))?;

    let host = Rc::new(HostState::default());
    host.dpr.set(dpr);
    host.container_width.set(args.width as f32 / dpr);

    let controller = RevealController::create(config.clone(), Box::new(WindowHost(host.clone())), &base, &overlay);
    if let Some(reason) = controller.borrow().failure() {
        return Err(Error::resource_load("reveal", reason));
    }

    /* --- Start flow ---
       Fit, enable painting, and kick off the intro sweep. */
    let mut demo = {
        let mut c = controller.borrow_mut();
        c.fit_and_render();
        c.enable();
        let surface = host.display.get().map(|(w, h)| Rect::new(0.0, 0.0, w, h));
        match surface {
            Some(rect) if config.demo.enabled && !args.no_demo => {
                Some(DemoAnimation::from_config(&config.demo, rect, Instant::now()))
            }
            _ => None,
        }
    };

    let (mut win_w, mut win_h) = drawer.size();
    let mut screen = FrameBuffer::new(win_w, win_h);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.quit_pressed() {
        let now = Instant::now();
        let mut c = controller.borrow_mut();

        // 1) Container resize -> debounced refit (paint survives).
        let (w, h) = drawer.size();
        if (w, h) != (win_w, win_h) {
            (win_w, win_h) = (w, h);
            screen = FrameBuffer::new(w, h);
            host.container_width.set(w as f32 / dpr);
            c.notify_resize(now);
        }

        // 2) Input: keys first, then the mouse stroke.
        for key in drawer.key_events() {
            c.handle_key(&key);
        }
        if drawer.reset_pressed() {
            c.reset();
        }
        for event in drawer.pointer_events() {
            c.handle_pointer(&to_layout(event, dpr));
        }

        // 3) Refresh tick, only when something asked for one.
        if host.frame_requested.replace(false) {
            c.on_frame(now);
        }

        // 4) Compose the window: surface (already at backing size), then demo cursor on top.
        match c.visible_surface() {
            Some(visible) => blit_top_left(&mut screen, visible, BACKGROUND),
            None => screen.pixels.fill(BACKGROUND),
        }
        drop(c);

        if let Some(anim) = demo.as_mut() {
            match anim.tick(now) {
                DemoFrame::Running(p) => {
                    draw_demo_cursor(&mut screen, (p.x * dpr) as i32, (p.y * dpr) as i32, &DEMO_CURSOR)
                }
                DemoFrame::Finished | DemoFrame::Hidden => demo = None,
            }
        }

        // 5) Present.
        drawer.present(&screen)?;
    }

    Ok(())
}
