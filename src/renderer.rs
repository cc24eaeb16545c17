// ABOUTME: Renderer interface for the big-deck engine
// ABOUTME: Lifecycle notifications, render job hooks and drawing entry points a backend implements

use crate::deck::Deck;
use crate::errors::Result;
use crate::page::Page;
use crate::pipeline::{JobKind, Progress};
use crate::raster;
use image::RgbaImage;

/// A rendering backend driven by the canvas.
///
/// The canvas only ever calls these methods; backends never mutate canvas
/// state directly. Everything except the size queries and `draw_page` has a
/// no-op default.
pub trait Renderer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Draw one page of the active sequence
    fn draw_page(&mut self, deck: &Deck, index: usize, page: &Page) -> Result<()>;

    /// Produce a still image of a page at the current surface size
    fn rasterize(&mut self, deck: &Deck, _index: usize, page: &Page) -> Result<RgbaImage> {
        Ok(raster::paint_page(deck, page, self.width(), self.height()))
    }

    /// Ask for the surface to be repainted
    fn redraw(&mut self) {}

    /// Finish a print run after every page was drawn
    fn print(&mut self) -> Result<()> {
        Ok(())
    }

    fn update_title(&mut self, _title: &str) {}
    fn post_apply_theme(&mut self) {}
    fn post_parse(&mut self) {}
    fn post_move(&mut self, _index: usize) {}
    fn overview_mode_on(&mut self) {}
    fn overview_mode_off(&mut self) {}
    fn post_toggle_overview_mode(&mut self) {}
    fn post_fullscreen(&mut self) {}
    fn post_unfullscreen(&mut self) {}
    fn post_iconify(&mut self) {}

    /// Called once before the first step of a job
    fn pre_job(&mut self, _kind: JobKind, _size: Option<usize>) {}

    /// The backend's own verdict for step `index`; false cancels the job
    fn job_step(&mut self, _kind: JobKind, _index: usize) -> bool {
        true
    }

    /// Called exactly once when a job ends, cancelled or not
    fn post_job(&mut self, _kind: JobKind, _cancelled: bool) {}

    fn report_progress(&mut self, _progress: &Progress) {}
}
