//! Image resources and the one-shot "decoded and sized" wait.
//!
//! A resource is handed out by the host before it has finished decoding. Anyone
//! interested registers a callback; it runs exactly once, either right away
//! (already settled) or when the host settles the resource.

use crate::error::{Error, Result};
use image::{DynamicImage, RgbaImage};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Decoded RGBA raster with its natural size. Never mutated after decode.
#[derive(Debug, Clone)]
pub struct RasterImage {
    rgba: RgbaImage,
}

impl RasterImage {
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self { rgba }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { rgba: image.into_rgba8() }
    }

    /// Single-colour image, handy for hosts that need a placeholder.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self { rgba: RgbaImage::from_pixel(width, height, image::Rgba(rgba)) }
    }

    pub fn natural_width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.rgba.height()
    }

    /// `natural_width / natural_height`, or `None` when either side is zero.
    pub fn aspect(&self) -> Option<f32> {
        if self.rgba.width() == 0 || self.rgba.height() == 0 {
            return None;
        }
        Some(self.rgba.width() as f32 / self.rgba.height() as f32)
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }
}

type ReadyCallback = Box<dyn FnOnce(Result<Rc<RasterImage>>)>;

enum LoadState {
    Pending(Vec<ReadyCallback>),
    Decoded(Rc<RasterImage>),
    Failed(String),
}

/// Shared handle to an image the host is (or was) decoding.
#[derive(Clone)]
pub struct ImageResource {
    label: Rc<str>,
    state: Rc<RefCell<LoadState>>,
}

impl ImageResource {
    pub fn pending(label: &str) -> Self {
        Self { label: label.into(), state: Rc::new(RefCell::new(LoadState::Pending(Vec::new()))) }
    }

    pub fn decoded(label: &str, image: RasterImage) -> Self {
        Self {
            label: label.into(),
            state: Rc::new(RefCell::new(LoadState::Decoded(Rc::new(image)))),
        }
    }

    pub fn failed(label: &str, reason: impl Into<String>) -> Self {
        Self { label: label.into(), state: Rc::new(RefCell::new(LoadState::Failed(reason.into()))) }
    }

    /// Decode a file from disk. A decode failure becomes a failed resource,
    /// so it reaches waiters the same way an asynchronous failure would.
    pub fn open(label: &str, path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                tracing::debug!(label, path = %path.display(), w = img.width(), h = img.height(), "image decoded");
                Self::decoded(label, RasterImage::from_dynamic(img))
            }
            Err(e) => Self::failed(label, format!("{}: {e}", path.display())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_settled(&self) -> bool {
        !matches!(*self.state.borrow(), LoadState::Pending(_))
    }

    /// Natural size once decoded.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        match &*self.state.borrow() {
            LoadState::Decoded(img) => Some((img.natural_width(), img.natural_height())),
            _ => None,
        }
    }

    /// Host signal: decode finished.
    pub fn complete(&self, image: RasterImage) {
        self.settle(LoadState::Decoded(Rc::new(image)));
    }

    /// Host signal: decode failed.
    pub fn fail(&self, reason: impl Into<String>) {
        self.settle(LoadState::Failed(reason.into()));
    }

    fn settle(&self, next: LoadState) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                LoadState::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = next;
                    waiters
                }
                _ => {
                    tracing::warn!(label = %self.label, "image resource settled twice; ignoring");
                    return;
                }
            }
        };
        for waiter in waiters {
            waiter(self.outcome());
        }
    }

    fn outcome(&self) -> Result<Rc<RasterImage>> {
        match &*self.state.borrow() {
            LoadState::Decoded(img) if img.aspect().is_some() => Ok(img.clone()),
            LoadState::Decoded(_) => Err(Error::resource_load(&*self.label, "decoded with zero size")),
            LoadState::Failed(reason) => Err(Error::resource_load(&*self.label, reason.clone())),
            LoadState::Pending(_) => Err(Error::resource_load(&*self.label, "still pending")),
        }
    }

    /// Run `on_ready` once the resource is decoded with a nonzero size, or
    /// with `ResourceLoad` if it failed. Already-settled resources resolve
    /// synchronously, before this returns.
    pub fn when_ready(&self, on_ready: impl FnOnce(Result<Rc<RasterImage>>) + 'static) {
        {
            let mut state = self.state.borrow_mut();
            if let LoadState::Pending(waiters) = &mut *state {
                waiters.push(Box::new(on_ready));
                return;
            }
        }
        on_ready(self.outcome());
    }
}

type AllReadyCallback = Box<dyn FnOnce(Result<Vec<Rc<RasterImage>>>)>;

/// Joins several resources into one resolution: every image in order, or
/// the first failure. Resolves exactly once.
pub struct ImageReadyWaiter {
    slots: Vec<Option<Rc<RasterImage>>>,
    remaining: usize,
    on_done: Option<AllReadyCallback>,
}

impl ImageReadyWaiter {
    pub fn wait_all(
        resources: &[ImageResource],
        on_done: impl FnOnce(Result<Vec<Rc<RasterImage>>>) + 'static,
    ) {
        if resources.is_empty() {
            on_done(Ok(Vec::new()));
            return;
        }

        let join = Rc::new(RefCell::new(ImageReadyWaiter {
            slots: vec![None; resources.len()],
            remaining: resources.len(),
            on_done: Some(Box::new(on_done)),
        }));

        for (i, resource) in resources.iter().enumerate() {
            let join = join.clone();
            resource.when_ready(move |res| {
                let fire = {
                    let mut j = join.borrow_mut();
                    match res {
                        Ok(img) => {
                            j.slots[i] = Some(img);
                            j.remaining -= 1;
                            if j.remaining == 0 {
                                let images = j.slots.iter_mut().filter_map(Option::take).collect();
                                j.on_done.take().map(|f| (f, Ok(images)))
                            } else {
                                None
                            }
                        }
                        Err(e) => j.on_done.take().map(|f| (f, Err(e))),
                    }
                };
                if let Some((done, result)) = fire {
                    done(result);
                }
            });
        }
    }
}
