// ABOUTME: Deck module for the big-deck engine
// ABOUTME: Holds the main and overview page sequences plus the per-mode cursor

use crate::overview;
use crate::page::Page;
use log::debug;

/// Which page sequence is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Overview,
}

/// One cursor per mode; only the one selected by the mode is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub main: usize,
    pub overview: usize,
}

impl Cursor {
    pub fn get(&self, mode: Mode) -> usize {
        match mode {
            Mode::Normal => self.main,
            Mode::Overview => self.overview,
        }
    }

    pub fn set(&mut self, mode: Mode, index: usize) {
        match mode {
            Mode::Normal => self.main = index,
            Mode::Overview => self.overview = index,
        }
    }
}

/// The parsed pages and the overview pages derived from them.
///
/// The overview sequence is either empty or holds exactly one page per main
/// page. Any change to the main sequence drops it and bumps the generation.
#[derive(Debug, Default)]
pub struct Deck {
    pages: Vec<Page>,
    overview: Vec<Page>,
    generation: u64,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            overview: Vec::new(),
            generation: 0,
        }
    }

    pub fn append(&mut self, page: Page) {
        self.pages.push(page);
        self.invalidate();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// The sequence shown in the given mode
    pub fn sequence(&self, mode: Mode) -> &[Page] {
        match mode {
            Mode::Normal => &self.pages,
            Mode::Overview => &self.overview,
        }
    }

    pub fn overview_pages(&self) -> &[Page] {
        &self.overview
    }

    /// First page of the title variant
    pub fn title_page(&self) -> Option<&Page> {
        self.pages.iter().find(|page| page.is_title())
    }

    /// Drop both sequences
    pub fn clear(&mut self) {
        self.pages.clear();
        self.invalidate();
    }

    /// Swap in a freshly parsed main sequence
    pub fn replace_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.invalidate();
    }

    /// Build the overview sequence unless it is already cached.
    /// Returns true when a build happened.
    pub fn ensure_overview(&mut self) -> bool {
        if !self.overview.is_empty() || self.pages.is_empty() {
            return false;
        }
        self.overview = overview::build_overview_pages(&self.pages);
        debug!(
            "Built {} overview pages (generation {})",
            self.overview.len(),
            self.generation
        );
        true
    }

    pub fn clear_overview(&mut self) {
        self.overview.clear();
    }

    /// Marker bumped every time the main sequence changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate(&mut self) {
        self.overview.clear();
        self.generation += 1;
    }
}
