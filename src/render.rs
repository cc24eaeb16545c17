// ABOUTME: Rendering backends for the big-deck engine
// ABOUTME: An in-memory raster display used for export and caching, and a text handout printer

use crate::deck::Deck;
use crate::errors::{DeckError, Result};
use crate::export;
use crate::page::{Block, Page};
use crate::pipeline::{JobKind, Progress};
use crate::raster;
use crate::renderer::Renderer;
use image::RgbaImage;
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for raster rendering
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub base_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            format: "png".to_string(),
            base_name: "slide_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PageKey {
    generation: u64,
    thumbnail: bool,
    index: usize,
}

/// Raster display backend: paints pages into images and keeps them cached
/// until the theme, the deck or the surface size changes
pub struct ImageRenderer {
    width: u32,
    height: u32,
    cache: HashMap<PageKey, RgbaImage>,
    frame: Option<RgbaImage>,
    title: String,
    redraw_requested: bool,
}

impl ImageRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cache: HashMap::new(),
            frame: None,
            title: String::new(),
            redraw_requested: false,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Change the surface size, dropping every cached page
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            info!(
                "Surface resized from {}x{} to {}x{}",
                self.width, self.height, width, height
            );
            self.width = width;
            self.height = height;
            self.cache.clear();
        }
    }

    /// Window title last pushed by the canvas
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The most recently drawn page
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    /// True once after the canvas asked for a redraw
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn paint(&mut self, deck: &Deck, index: usize, page: &Page) -> RgbaImage {
        let key = PageKey {
            generation: deck.generation(),
            thumbnail: page.thumbnail_source().is_some(),
            index,
        };
        let (width, height) = (self.width, self.height);
        self.cache
            .entry(key)
            .or_insert_with(|| raster::paint_page(deck, page, width, height))
            .clone()
    }
}

impl Renderer for ImageRenderer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_page(&mut self, deck: &Deck, index: usize, page: &Page) -> Result<()> {
        self.frame = Some(self.paint(deck, index, page));
        Ok(())
    }

    fn rasterize(&mut self, deck: &Deck, index: usize, page: &Page) -> Result<RgbaImage> {
        Ok(self.paint(deck, index, page))
    }

    fn redraw(&mut self) {
        self.redraw_requested = true;
    }

    fn update_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn post_apply_theme(&mut self) {
        self.cache.clear();
        self.redraw_requested = true;
    }

    fn post_parse(&mut self) {
        self.cache.clear();
        self.redraw_requested = true;
    }

    fn post_toggle_overview_mode(&mut self) {
        self.redraw_requested = true;
    }

    fn report_progress(&mut self, progress: &Progress) {
        debug!(
            "{:?}: {}/{} pages",
            progress.kind(),
            progress.done(),
            progress.total()
        );
    }
}

/// Print backend: collects a text handout of every drawn page and writes it
/// out when the print run finishes
pub struct PrintRenderer {
    output: PathBuf,
    sheets: Vec<String>,
    title: String,
}

/// A4 landscape at 72 dpi
const PAPER_SIZE: (u32, u32) = (842, 595);

impl PrintRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            sheets: Vec::new(),
            title: String::new(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }
}

fn format_sheet(index: usize, page: &Page) -> String {
    let mut sheet = format!("== {}. {} ==\n", index + 1, page.title());
    for block in page.blocks() {
        match block {
            Block::Heading { text, .. } => sheet.push_str(&format!("{}\n", text.to_uppercase())),
            Block::Item(text) => sheet.push_str(&format!("  - {}\n", text)),
            Block::Code { text, .. } => {
                for line in text.lines() {
                    sheet.push_str(&format!("    {}\n", line));
                }
            }
            Block::Image { url, alt } => sheet.push_str(&format!("[image: {} ({})]\n", alt, url)),
            Block::Paragraph(text) | Block::Raw(text) => sheet.push_str(&format!("{}\n", text)),
        }
    }
    sheet
}

impl Renderer for PrintRenderer {
    fn width(&self) -> u32 {
        PAPER_SIZE.0
    }

    fn height(&self) -> u32 {
        PAPER_SIZE.1
    }

    fn draw_page(&mut self, _deck: &Deck, index: usize, page: &Page) -> Result<()> {
        self.sheets.push(format_sheet(index, page));
        Ok(())
    }

    fn update_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn pre_job(&mut self, kind: JobKind, _size: Option<usize>) {
        if kind == JobKind::Print {
            self.sheets.clear();
        }
    }

    fn print(&mut self) -> Result<()> {
        info!("Writing handout to {:?}", self.output);
        export::prepare_target(&self.output)?;

        let mut handout = format!(
            "Printed {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        );
        handout.push_str(&self.sheets.join("\n"));

        fs::write(&self.output, handout).map_err(|e| {
            DeckError::PrintError(format!("Failed to write {:?}: {}", self.output, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_lists_blocks() {
        let page = Page::new(
            "Agenda",
            vec![
                Block::Item("first".to_string()),
                Block::Code {
                    language: "rust".to_string(),
                    text: "fn main() {}".to_string(),
                },
            ],
        );
        assert_eq!(
            format_sheet(1, &page),
            "== 2. Agenda ==\n  - first\n    fn main() {}\n"
        );
    }

    #[test]
    fn resize_drops_cache() {
        let deck = Deck::from_pages(vec![Page::new("One", vec![])]);
        let mut renderer = ImageRenderer::new(64, 48);
        renderer.draw_page(&deck, 0, &deck.pages()[0]).unwrap();
        assert_eq!(renderer.cached_pages(), 1);
        assert_eq!(renderer.frame().unwrap().dimensions(), (64, 48));

        renderer.resize(32, 24);
        assert_eq!(renderer.cached_pages(), 0);
    }
}
