//! PixelProbe: load a raster image, inspect exact RGBA values under the
//! pointer, collect picked pixels, filter them by channel value and export
//! them as CSV.
//!
//! This library holds everything that does not depend on a window; the
//! `PixelProbe` binary wraps it in an egui shell and a headless CLI.

pub mod logger;

pub mod cli;
pub mod error;
pub mod export;
pub mod filter;
pub mod io;
pub mod pixels;
pub mod selection;
pub mod session;
pub mod settings;
pub mod view;

pub use error::{Error, Result};
pub use filter::{Channel, FilterOutcome, FilterSpec};
pub use pixels::{PixelCoord, PixelSample, SourceImage};
pub use selection::{PixelRecord, SelectionStore};
pub use session::Inspector;
pub use view::{ViewState, ViewTransform};
