// ABOUTME: Watch module for monitoring deck changes and re-exporting slides
// ABOUTME: Provides file watching, reloading and auto-regeneration of page images

use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;

use crate::canvas::Canvas;
use crate::errors::{DeckError, Result};
use crate::export::{self, ExportReport};
use crate::render::{ImageRenderer, RenderConfig};
use crate::source::FileSource;
use crate::theme::{BuiltinThemes, ThemeEngine};

/// Configuration for watch mode
pub struct WatchConfig {
    /// Path to the markdown deck to watch
    pub markdown_path: PathBuf,

    /// Output directory for page images
    pub output_dir: PathBuf,

    /// Theme to apply instead of the deck's own
    pub theme: Option<String>,

    /// Surface size, image type and file base name
    pub render: RenderConfig,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            markdown_path: PathBuf::new(),
            output_dir: PathBuf::new(),
            theme: None,
            render: RenderConfig::default(),
            debounce_ms: 500,
        }
    }
}

/// Build a canvas for a deck file with a raster renderer
pub fn open_deck(
    markdown_path: &Path,
    theme: Option<&str>,
    render: &RenderConfig,
) -> Result<Canvas<ImageRenderer>> {
    let source = FileSource::open(markdown_path)?;

    let mut canvas = Canvas::new(ImageRenderer::from_config(render));
    if let Some(theme) = theme {
        BuiltinThemes.validate(theme)?;
        // Remembered on the empty deck, applied once the deck is parsed
        canvas.reload_theme(Some(theme))?;
    }

    canvas.parse_source(Box::new(source));
    if canvas.deck().is_empty() {
        return Err(DeckError::ValidationError(format!(
            "No pages could be parsed from {:?}",
            markdown_path
        )));
    }
    Ok(canvas)
}

/// Export every page of the deck into the output directory
pub fn regenerate_outputs(
    canvas: &mut Canvas<ImageRenderer>,
    config: &WatchConfig,
) -> Result<ExportReport> {
    info!("Regenerating outputs...");
    let basename = config.output_dir.join(&config.render.base_name);
    let report = canvas.save(&basename.to_string_lossy(), &config.render.format)?;

    info!(
        "Pages regenerated: {} images in {:?}",
        report.files.len(),
        config.output_dir
    );
    Ok(report)
}

/// Starts watching a deck file and re-exports its pages when it changes
pub fn watch_deck(config: WatchConfig) -> Result<()> {
    let mut canvas = open_deck(
        &config.markdown_path,
        config.theme.as_deref(),
        &config.render,
    )?;

    export::prepare_target(&config.output_dir.join(&config.render.base_name))?;

    // Initial generation
    regenerate_outputs(&mut canvas, &config)?;

    // Create a channel to receive file system events
    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)?;

    // Watch the directory: editors that save atomically replace the file
    let watch_path = match config.markdown_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let abs_watch_path = fs::canonicalize(watch_path)?;
    debug!("Watching absolute path: {:?}", abs_watch_path);

    debouncer
        .watcher()
        .watch(&abs_watch_path, RecursiveMode::NonRecursive)?;

    info!("Watching for changes in {:?}", watch_path);
    println!(
        "Watching for changes in {:?} (Press Ctrl+C to stop)",
        watch_path
    );

    let mut last_processed = Instant::now();

    for result in rx {
        match result {
            Ok(events) => {
                let relevant_changes = events.iter().any(|event| {
                    event
                        .paths
                        .iter()
                        .any(|path| is_relevant_path(path, &config.markdown_path))
                });

                let now = Instant::now();
                if relevant_changes
                    && now.duration_since(last_processed)
                        > Duration::from_millis(config.debounce_ms)
                {
                    // The event itself says the file changed; mtimes may be too coarse
                    if !canvas.reload_source(true) {
                        continue;
                    }
                    match regenerate_outputs(&mut canvas, &config) {
                        Ok(_) => {
                            info!("Regenerated outputs successfully");
                            last_processed = now;
                        }
                        Err(e) => error!("Failed to regenerate outputs: {}", e),
                    }
                }
            }
            Err(errors) => {
                for e in errors {
                    error!("Watch error: {:?}", e);
                }
            }
        }
    }

    Ok(())
}

/// Checks if a path refers to the watched deck file
pub fn is_relevant_path(path: &Path, markdown_path: &Path) -> bool {
    if path == markdown_path {
        return true;
    }

    // A deleted file cannot be canonicalized; it is not the deck being saved
    let Ok(path_abs) = fs::canonicalize(path) else {
        return false;
    };
    let md_path_abs =
        fs::canonicalize(markdown_path).unwrap_or_else(|_| markdown_path.to_path_buf());

    path_abs == md_path_abs
}
