// Error type for the reveal widget and its host window.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An image (base or overlay) failed to decode or has no usable size.
    /// Fatal for that widget instance: it never becomes interactive.
    #[error("Resource load error ({label}): {reason}")]
    ResourceLoad { label: String, reason: String },

    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Pushing the visible surface to the window failed

    #[error("Config error: {0}")]
    Config(String), // Reading/parsing the JSON config failed
}

impl Error {
    pub fn resource_load(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ResourceLoad { label: label.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
