//! Error type shared by the inspection core.
//!
//! Every variant is recoverable: the GUI reports it in the status line and
//! the headless runner prints it, and the session stays usable afterwards.

use std::path::PathBuf;

use thiserror::Error;

/// PixelProbe error type
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be read or decoded into an RGBA raster
    #[error("failed to load image {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Pixel address outside the active image
    #[error("pixel ({x}, {y}) is outside the image bounds ({width}x{height})")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A deliberate pixel or export action was requested before any image loaded
    #[error("no image loaded")]
    NoImageLoaded,

    /// Export requested with zero recorded pixels
    #[error("there are no pixels to export")]
    EmptySelection,

    /// The export destination could not be written
    #[error("failed to export to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid headless-mode argument
    #[error("{0}")]
    Cli(String),
}

/// Result type alias using PixelProbe's error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the warning-class outcomes (nothing broke, the request was
    /// simply not applicable).
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Error::OutOfBounds { .. } | Error::NoImageLoaded | Error::EmptySelection
        )
    }
}
