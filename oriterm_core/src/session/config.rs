//! Host-facing configuration snapshot.
//!
//! The engine does no file I/O and no hot-reload watching itself — a
//! companion helper outside this crate parses whatever config file format
//! the host uses and calls [`super::Session::set_config`] with the result.
//! `Session::poll_config` exposes a monotonic generation counter bumped on
//! every `set_config`, so a render loop can cheaply tell whether anything
//! changed since it last looked.

use serde::{Deserialize, Serialize};

/// A small, purpose-built slice of configuration the engine actually
/// consults: font metrics for cell sizing, window geometry, and the
/// default foreground/background theme colors. Keybindings, bell
/// animation, and other purely-presentational settings stay with the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub font_size: f32,
    pub font_family: Option<String>,
    pub window_width: usize,
    pub window_height: usize,
    /// Packed `0x00RRGGBB`.
    pub theme_fg: u32,
    /// Packed `0x00RRGGBB`.
    pub theme_bg: u32,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_family: None,
            window_width: 1024,
            window_height: 768,
            theme_fg: 0x00d3_d7cf,
            theme_bg: 0x0000_0000,
        }
    }
}
