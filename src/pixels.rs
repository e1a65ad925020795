use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Integer pixel address inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A looked-up pixel: where it is and what it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSample {
    pub coord: PixelCoord,
    pub color: Rgba<u8>,
}

impl PixelSample {
    /// `#RRGGBB`, alpha not encoded.
    pub fn hex(&self) -> String {
        hex_rgb(self.color)
    }
}

/// Uppercase `#RRGGBB` from the RGB channels of a colour.
pub fn hex_rgb(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// A decoded raster, read-only after construction.
///
/// Always at least 1×1; every lookup is strictly bounds-checked.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: RgbaImage,
    path: Option<PathBuf>,
}

impl SourceImage {
    /// Decode any raster the `image` crate understands into RGBA8.
    ///
    /// Missing files, unsupported formats and corrupt data all come back as
    /// [`Error::Decode`].
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let pixels = decoded.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::Decode {
                path: path.to_path_buf(),
                reason: "image has no pixels".to_string(),
            });
        }
        Ok(Self {
            pixels,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-decoded buffer. Returns `None` for an empty buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Option<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return None;
        }
        Some(Self { pixels, path: None })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    /// File the image was decoded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Exact-integer lookup. Coordinates are rejected, never clamped.
    pub fn pixel_at(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        if !self.contains(x, y) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(*self.pixels.get_pixel(x, y))
    }

    pub fn sample(&self, coord: PixelCoord) -> Result<PixelSample> {
        let color = self.pixel_at(coord.x, coord.y)?;
        Ok(PixelSample { coord, color })
    }

    /// Raw RGBA bytes, row-major (for texture upload).
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x + y) as u8, 255])
        });
        SourceImage::from_rgba(img).unwrap()
    }

    #[test]
    fn test_pixel_at_reads_exact_pixel() {
        let img = gradient(100, 50);
        assert_eq!(img.pixel_at(0, 0).unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(img.pixel_at(99, 49).unwrap(), Rgba([99, 49, 148, 255]));
    }

    #[test]
    fn test_pixel_at_rejects_edges_instead_of_clamping() {
        let img = gradient(100, 50);
        for (x, y) in [(100, 0), (0, 50), (100, 50), (u32::MAX, 0)] {
            match img.pixel_at(x, y) {
                Err(Error::OutOfBounds { width, height, .. }) => {
                    assert_eq!((width, height), (100, 50));
                }
                other => panic!("expected OutOfBounds for ({x}, {y}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_rgba_rejects_empty_buffer() {
        assert!(SourceImage::from_rgba(RgbaImage::new(0, 10)).is_none());
    }

    #[test]
    fn test_load_png_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        img.save(&path).unwrap();

        let loaded = SourceImage::load(&path).unwrap();
        assert_eq!(loaded.size(), [3, 2]);
        assert_eq!(loaded.pixel_at(2, 1).unwrap(), Rgba([10, 20, 30, 40]));
        assert_eq!(loaded.path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let err = SourceImage::load(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_load_corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = SourceImage::load(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_hex_is_uppercase_rgb_only() {
        assert_eq!(hex_rgb(Rgba([255, 0, 171, 3])), "#FF00AB");
        let sample = PixelSample {
            coord: PixelCoord::new(1, 2),
            color: Rgba([0, 255, 0, 128]),
        };
        assert_eq!(sample.hex(), "#00FF00");
    }
}
