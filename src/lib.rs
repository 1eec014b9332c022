//! Brush reveal: paint away a mask to reveal an overlay photo on top of a base
//! photo, composited in software.

pub mod composite;
pub mod config;
pub mod controller;
pub mod demo;
pub mod draw;
pub mod error;
pub mod image_ready;
pub mod input;
pub mod logging;
pub mod mask;
pub mod sizer;
pub mod types;

pub use controller::{RevealController, RevealState, SurfaceHost};
pub use error::{Error, Result};
