use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::key_display::KeyDisplayTimings;

/// Persisted overlay configuration. Every field carries a serde default so a
/// settings file from an older build, or a hand-edited partial one, still
/// loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Font size of the elapsed-time readout.
    #[serde(default = "default_timer_font_size")]
    pub timer_font_size: f32,
    #[serde(default = "default_foreground")]
    pub timer_foreground: String,
    #[serde(default = "default_background")]
    pub timer_background: String,
    /// Opacity of the overlay background panel, 0 is fully transparent.
    #[serde(default = "default_background_opacity")]
    pub timer_background_opacity: f32,
    /// Font size of the chord label.
    #[serde(default = "default_key_font_size")]
    pub key_font_size: f32,
    #[serde(default = "default_foreground")]
    pub key_foreground: String,
    /// Seconds the chord label stays after the last key release.
    #[serde(default = "default_key_show_seconds")]
    pub key_show_seconds: f32,
    /// Seconds the fade-out takes once the show window elapses.
    #[serde(default = "default_key_fade_seconds")]
    pub key_fade_seconds: f32,
    /// Seconds a partially released chord stays frozen on screen.
    #[serde(default = "default_key_chord_hold_seconds")]
    pub key_chord_hold_seconds: f32,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_timer_font_size() -> f32 {
    48.0
}

fn default_key_font_size() -> f32 {
    28.0
}

fn default_foreground() -> String {
    "#00FF00".to_string()
}

fn default_background() -> String {
    "#000000".to_string()
}

fn default_background_opacity() -> f32 {
    0.1
}

fn default_key_show_seconds() -> f32 {
    1.2
}

fn default_key_fade_seconds() -> f32 {
    0.6
}

fn default_key_chord_hold_seconds() -> f32 {
    0.3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_font_size: default_timer_font_size(),
            timer_foreground: default_foreground(),
            timer_background: default_background(),
            timer_background_opacity: default_background_opacity(),
            key_font_size: default_key_font_size(),
            key_foreground: default_foreground(),
            key_show_seconds: default_key_show_seconds(),
            key_fade_seconds: default_key_fade_seconds(),
            key_chord_hold_seconds: default_key_chord_hold_seconds(),
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing or empty file yields the defaults; a
    /// malformed one is an error so a typo cannot silently wipe the config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Per-user settings file location, falling back to the temp dir when no
    /// config directory is available.
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("keytimer")
            .join("settings.json")
    }

    /// The three chord-display durations. Negative or non-finite values
    /// clamp to zero rather than erroring.
    pub fn key_display_timings(&self) -> KeyDisplayTimings {
        KeyDisplayTimings {
            show: seconds(self.key_show_seconds),
            fade: seconds(self.key_fade_seconds),
            chord_hold: seconds(self.key_chord_hold_seconds),
        }
    }
}

fn seconds(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f32(value)
    } else {
        Duration::ZERO
    }
}

/// Parse a `#RRGGBB` color, falling back to the given color on anything
/// malformed rather than erroring.
pub fn parse_color(hex: &str, fallback: Color32) -> Color32 {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return fallback;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color32::from_rgb(r, g, b),
        _ => fallback,
    }
}

pub fn color_to_hex(color: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b())
}
