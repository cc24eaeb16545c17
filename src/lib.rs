// ABOUTME: Library module for the big-deck engine.
// ABOUTME: Contains the deck state machine, render job protocol and default collaborators.

// Reexport modules
pub mod apply_guard;
pub mod canvas;
pub mod config;
pub mod deck;
pub mod errors;
pub mod export;
pub mod overview;
pub mod page;
pub mod parser;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod renderer;
pub mod source;
pub mod theme;
pub mod watch;

// Reexport common types and functions
pub use apply_guard::{ApplyGuard, ApplyState};
pub use canvas::{Canvas, FALLBACK_TITLE};
pub use config::Config;
pub use deck::{Cursor, Deck, Mode};
pub use errors::{DeckError, Result};
pub use export::{digit_count, normalize_image_type, ExportReport};
pub use overview::build_overview_pages;
pub use page::{Block, Page, PageKind, PageStyle, TitleInfo};
pub use parser::{DeckParser, MarkdownParser};
pub use pipeline::{Checkpoint, Headless, JobKind, JobOutcome, Progress};
pub use render::{ImageRenderer, PrintRenderer, RenderConfig};
pub use renderer::Renderer;
pub use source::{FileSource, MemorySource, SourceDocument};
pub use theme::{ApplyContext, BuiltinThemes, ThemeEngine, DEFAULT_THEME};
pub use watch::{open_deck, watch_deck, WatchConfig};

#[cfg(test)]
mod tests;
