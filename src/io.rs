// ============================================================================
// FILE I/O: native dialogs and background image decoding
// ============================================================================

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rfd::FileDialog;

use crate::error::Error;
use crate::pixels::SourceImage;
use crate::{log_info, log_warn};

/// Extensions offered by the open dialog and accepted by glob expansion.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// Extensions the `image` crate can decode beyond the common set; still
/// loadable when picked through "All Files".
pub const EXTRA_EXTENSIONS: &[&str] = &["webp", "tga", "gif", "ico"];

pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()) || EXTRA_EXTENSIONS.contains(&ext.as_str())
}

/// Show the native open dialog.
pub fn pick_image_path(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Open Image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All Files", &["*"]);
    if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

/// Show the native save dialog for a CSV export.
pub fn pick_export_path(start_dir: Option<&Path>, suggested_name: &str) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Export Selected Pixels")
        .add_filter("CSV", &["csv"])
        .set_file_name(suggested_name);
    if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    let path = dialog.save_file()?;
    // Some platforms hand back the bare name without the filter's extension.
    if path.extension().is_none() {
        return Some(path.with_extension("csv"));
    }
    Some(path)
}

/// `<stem>_pixels.csv` for the image currently open.
pub fn suggested_export_name(image_path: Option<&Path>) -> String {
    image_path
        .and_then(|p| p.file_stem())
        .map(|s| format!("{}_pixels.csv", s.to_string_lossy()))
        .unwrap_or_else(|| "pixels.csv".to_string())
}

// ============================================================================
// BACKGROUND LOADER
// ============================================================================

/// Result delivered from a background decode.
pub enum LoadResult {
    Loaded { ticket: u64, image: SourceImage },
    Failed { ticket: u64, path: PathBuf, error: Error },
}

impl LoadResult {
    fn ticket(&self) -> u64 {
        match self {
            LoadResult::Loaded { ticket, .. } | LoadResult::Failed { ticket, .. } => *ticket,
        }
    }
}

/// Decodes images on the rayon pool and hands them back through a channel.
///
/// Every request gets a ticket. Only the result for the newest ticket is
/// surfaced by [`poll`](ImageLoader::poll); anything older was superseded
/// by a later Open and is dropped on arrival.
pub struct ImageLoader {
    sender: mpsc::Sender<LoadResult>,
    receiver: mpsc::Receiver<LoadResult>,
    next_ticket: u64,
    pending: Option<(u64, PathBuf)>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            next_ticket: 0,
            pending: None,
        }
    }

    /// Start decoding `path` in the background. Supersedes any earlier request.
    pub fn request(&mut self, path: PathBuf) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some((ticket, path.clone()));
        log_info!("Decoding {} (request {})", path.display(), ticket);

        let sender = self.sender.clone();
        rayon::spawn(move || {
            let result = match SourceImage::load(&path) {
                Ok(image) => LoadResult::Loaded { ticket, image },
                Err(error) => LoadResult::Failed {
                    ticket,
                    path,
                    error,
                },
            };
            let _ = sender.send(result);
        });
        ticket
    }

    /// File currently being decoded, if any.
    pub fn pending_path(&self) -> Option<&Path> {
        self.pending.as_ref().map(|(_, p)| p.as_path())
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking: the result of the newest request once it has arrived.
    pub fn poll(&mut self) -> Option<LoadResult> {
        while let Ok(result) = self.receiver.try_recv() {
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    /// Blocking variant of [`poll`](Self::poll) for headless callers and tests.
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<LoadResult> {
        let deadline = std::time::Instant::now() + timeout;
        while self.pending.is_some() {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            let result = self.receiver.recv_timeout(left).ok()?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    fn accept(&mut self, result: LoadResult) -> Option<LoadResult> {
        let current = self.pending.as_ref().map(|(t, _)| *t);
        if current != Some(result.ticket()) {
            log_warn!("Dropping stale decode result (request {})", result.ticket());
            return None;
        }
        self.pending = None;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_background_decode_delivers_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 4])).save(&path).unwrap();

        let mut loader = ImageLoader::new();
        let ticket = loader.request(path.clone());
        assert!(loader.is_busy());
        assert_eq!(loader.pending_path(), Some(path.as_path()));

        match loader.wait(TIMEOUT) {
            Some(LoadResult::Loaded { ticket: t, image }) => {
                assert_eq!(t, ticket);
                assert_eq!(image.size(), [4, 3]);
            }
            _ => panic!("expected a decoded image"),
        }
        assert!(!loader.is_busy());
    }

    #[test]
    fn test_background_decode_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let mut loader = ImageLoader::new();
        loader.request(path.clone());
        match loader.wait(TIMEOUT) {
            Some(LoadResult::Failed { path: p, error, .. }) => {
                assert_eq!(p, path);
                assert!(matches!(error, Error::Decode { .. }));
            }
            _ => panic!("expected a decode failure"),
        }
    }

    #[test]
    fn test_superseded_request_is_dropped() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        RgbaImage::new(8, 8).save(&first).unwrap();
        RgbaImage::new(2, 5).save(&second).unwrap();

        let mut loader = ImageLoader::new();
        loader.request(first);
        let newest = loader.request(second);

        match loader.wait(TIMEOUT) {
            Some(LoadResult::Loaded { ticket, image }) => {
                assert_eq!(ticket, newest);
                assert_eq!(image.size(), [2, 5]);
            }
            _ => panic!("expected the newest image"),
        }
        // Whatever else arrives later is stale.
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_extension_check() {
        assert!(is_image_extension("PNG"));
        assert!(is_image_extension("tif"));
        assert!(is_image_extension("webp"));
        assert!(!is_image_extension("csv"));
    }

    #[test]
    fn test_suggested_export_name() {
        assert_eq!(
            suggested_export_name(Some(Path::new("/tmp/photo.jpeg"))),
            "photo_pixels.csv"
        );
        assert_eq!(suggested_export_name(None), "pixels.csv");
    }
}
