// ============================================================================
// APP SETTINGS (persistent preferences)
// ============================================================================

use std::path::PathBuf;

use crate::log_warn;

const SETTINGS_FILE: &str = "pixelprobe_settings.cfg";

/// User preferences persisted between sessions as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Live pixel readout while the pointer moves over the image.
    pub hover_tracking: bool,
    /// Draw pixel boundaries when zoomed in far enough.
    pub show_pixel_grid: bool,
    /// Directory of the last opened image (start dir for the open dialog).
    pub last_open_dir: Option<PathBuf>,
    /// Directory of the last CSV export.
    pub last_export_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hover_tracking: true,
            show_pixel_grid: true,
            last_open_dir: None,
            last_export_dir: None,
        }
    }
}

impl AppSettings {
    /// Config directory per platform, created on demand.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?
                .join("pixelprobe");
            let _ = std::fs::create_dir_all(&config_dir);
            Some(config_dir.join(SETTINGS_FILE))
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            let config_dir = PathBuf::from(appdata).join("PixelProbe");
            let _ = std::fs::create_dir_all(&config_dir);
            Some(config_dir.join(SETTINGS_FILE))
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("PixelProbe");
            let _ = std::fs::create_dir_all(&config_dir);
            Some(config_dir.join(SETTINGS_FILE))
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(SETTINGS_FILE)))
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "hover_tracking={}\n\
             show_pixel_grid={}\n\
             last_open_dir={}\n\
             last_export_dir={}\n",
            self.hover_tracking,
            self.show_pixel_grid,
            path_to_str(&self.last_open_dir),
            path_to_str(&self.last_export_dir),
        )
    }

    /// Parse settings text. Unknown keys are ignored, bad values keep the default.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "hover_tracking" => {
                    if let Ok(v) = val.parse() {
                        s.hover_tracking = v;
                    }
                }
                "show_pixel_grid" => {
                    if let Ok(v) = val.parse() {
                        s.show_pixel_grid = v;
                    }
                }
                "last_open_dir" => s.last_open_dir = str_to_path(val),
                "last_export_dir" => s.last_export_dir = str_to_path(val),
                _ => {}
            }
        }
        s
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_config_str(&content),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log_warn!("Could not read settings from {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }
}

fn path_to_str(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn str_to_path(val: &str) -> Option<PathBuf> {
    if val.is_empty() {
        None
    } else {
        Some(PathBuf::from(val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let s = AppSettings::default();
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn test_values_survive_round_trip() {
        let s = AppSettings {
            hover_tracking: false,
            show_pixel_grid: false,
            last_open_dir: Some(PathBuf::from("/home/me/pictures")),
            last_export_dir: Some(PathBuf::from("/tmp/out dir")),
        };
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let text = "hover_tracking=maybe\n\
                    no equals sign here\n\
                    unknown_key=42\n\
                    show_pixel_grid = false \n";
        let s = AppSettings::from_config_str(text);
        assert!(s.hover_tracking);
        assert!(!s.show_pixel_grid);
        assert_eq!(s.last_open_dir, None);
    }

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(AppSettings::from_config_str(""), AppSettings::default());
    }
}
