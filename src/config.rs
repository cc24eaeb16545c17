// ABOUTME: Configuration module for the big-deck engine
// ABOUTME: Provides configuration settings and environment variable handling

use crate::render::RenderConfig;
use crate::watch::WatchConfig;
use std::env;
use std::path::PathBuf;

/// Global configuration for the application
pub struct Config {
    pub theme: Option<String>,
    pub width: u32,
    pub height: u32,
    pub image_type: String,
    pub image_basename: String,
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            width: 1280,
            height: 720,
            image_type: "png".to_string(),
            image_basename: "slide_".to_string(),
            debounce_ms: 500,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse_u32 = |key: &str, default: u32| {
            env::var(key)
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            theme: env::var("BIG_DECK_THEME").ok().filter(|s| !s.is_empty()),
            width: parse_u32("BIG_DECK_WIDTH", defaults.width),
            height: parse_u32("BIG_DECK_HEIGHT", defaults.height),
            image_type: env::var("BIG_DECK_IMAGE_TYPE").unwrap_or(defaults.image_type),
            image_basename: env::var("BIG_DECK_IMAGE_BASENAME")
                .unwrap_or(defaults.image_basename),
            debounce_ms: env::var("BIG_DECK_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.debounce_ms),
        }
    }

    /// Get a render configuration with defaults from this config
    pub fn get_render_config(
        &self,
        width: Option<u32>,
        height: Option<u32>,
        format: Option<String>,
        base_name: Option<String>,
    ) -> RenderConfig {
        RenderConfig {
            width: width.unwrap_or(self.width),
            height: height.unwrap_or(self.height),
            format: format.unwrap_or_else(|| self.image_type.clone()),
            base_name: base_name.unwrap_or_else(|| self.image_basename.clone()),
        }
    }

    /// Get a watch configuration with defaults from this config
    pub fn get_watch_config(
        &self,
        markdown_path: PathBuf,
        output_dir: PathBuf,
        theme: Option<String>,
    ) -> WatchConfig {
        WatchConfig {
            markdown_path,
            output_dir,
            theme: theme.or_else(|| self.theme.clone()),
            render: self.get_render_config(None, None, None, None),
            debounce_ms: self.debounce_ms,
        }
    }
}
