// ABOUTME: Canvas module for the big-deck engine
// ABOUTME: The state machine tying deck, source, theme engine and renderer together

use crate::apply_guard::{ApplyGuard, ApplyState};
use crate::deck::{Cursor, Deck, Mode};
use crate::errors::Result;
use crate::export::{self, ExportReport};
use crate::page::{Page, PageStyle};
use crate::parser::{DeckParser, MarkdownParser};
use crate::pipeline::{Checkpoint, Headless, JobKind, JobOutcome, JobState, Snapshot};
use crate::renderer::Renderer;
use crate::source::SourceDocument;
use crate::theme::{ApplyContext, BuiltinThemes, ThemeEngine, DEFAULT_THEME};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Title used when the deck has no title page
pub const FALLBACK_TITLE: &str = "Presentation";

/// Owns the deck and its cursor, and drives the renderer.
///
/// Every mutation goes through the methods here; the renderer only gets
/// notifications and read-only access to the deck.
pub struct Canvas<R: Renderer> {
    deck: Deck,
    cursor: Cursor,
    mode: Mode,
    guard: ApplyGuard,
    theme_name: Option<String>,
    theme_epoch: u64,
    source: Option<Box<dyn SourceDocument>>,
    parser: Box<dyn DeckParser>,
    theme_engine: Box<dyn ThemeEngine>,
    renderer: R,
    saved_image_basename: Option<String>,
    quit: bool,
    fullscreen: bool,
    caching: bool,
}

impl<R: Renderer> Canvas<R> {
    /// Create an empty canvas with the Markdown parser and built-in themes
    pub fn new(renderer: R) -> Self {
        Self {
            deck: Deck::new(),
            cursor: Cursor::default(),
            mode: Mode::Normal,
            guard: ApplyGuard::new(),
            theme_name: None,
            theme_epoch: 0,
            source: None,
            parser: Box::new(MarkdownParser),
            theme_engine: Box::new(BuiltinThemes),
            renderer,
            saved_image_basename: None,
            quit: false,
            fullscreen: false,
            caching: false,
        }
    }

    pub fn with_parser(mut self, parser: impl DeckParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_theme_engine(mut self, engine: impl ThemeEngine + 'static) -> Self {
        self.theme_engine = Box::new(engine);
        self
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_overview_mode(&self) -> bool {
        self.mode == Mode::Overview
    }

    /// The active page sequence
    pub fn pages(&self) -> &[Page] {
        self.deck.sequence(self.mode)
    }

    /// Number of pages in the active sequence
    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.get(self.mode)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn next_page(&self) -> Option<&Page> {
        self.pages().get(self.current_index() + 1)
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme_name.as_deref()
    }

    /// Number of theme applications completed so far
    pub fn theme_epoch(&self) -> u64 {
        self.theme_epoch
    }

    pub fn is_applying(&self) -> bool {
        self.guard.is_applying()
    }

    pub fn apply_state(&self) -> ApplyState {
        self.guard.state()
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    pub fn source(&self) -> Option<&dyn SourceDocument> {
        self.source.as_deref()
    }

    pub fn full_path(&self, relative: &str) -> Option<PathBuf> {
        self.source.as_ref().and_then(|s| s.full_path(relative))
    }

    pub fn tmp_dir(&self) -> Option<PathBuf> {
        self.source.as_ref().and_then(|s| s.tmp_dir())
    }

    /// Title of the title page, or the fallback title
    pub fn title(&self) -> String {
        self.deck
            .title_page()
            .map(|page| page.title().to_string())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string())
    }

    /// Title of the current page, prefixed with the deck title unless the
    /// current page is the title page itself
    pub fn page_title(&mut self) -> String {
        if self.page_count() == 0 {
            return String::new();
        }
        let title = self.title();
        match self.current_page() {
            Some(page) if page.is_title() => page.title().to_string(),
            Some(page) => format!("{}: {}", title, page.title()),
            None => String::new(),
        }
    }

    /// Page under the active cursor. A cursor left past the end (after the
    /// deck shrank) is moved back to the first page.
    pub fn current_page(&mut self) -> Option<&Page> {
        let count = self.page_count();
        if count == 0 {
            return None;
        }
        if self.current_index() >= count {
            debug!(
                "Cursor {} out of range for {} pages, resetting",
                self.current_index(),
                count
            );
            self.move_to_first();
        }
        self.deck.sequence(self.mode).get(self.current_index())
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Move the active cursor without bounds checking. An index past the end
    /// of a non-empty sequence lands on the first page.
    pub fn move_to(&mut self, index: usize) {
        let count = self.page_count();
        let index = if count > 0 && index >= count {
            debug!("Page {} out of range for {} pages, moving to 0", index, count);
            0
        } else {
            index
        };
        self.cursor.set(self.mode, index);
        let title = self.page_title();
        self.renderer.update_title(&title);
        let current = self.current_index();
        debug!("Moved to page {} ({:?} mode)", current, self.mode);
        self.renderer.post_move(current);
    }

    /// Move only when `index` is inside the active sequence
    pub fn move_to_if_valid(&mut self, index: usize) -> bool {
        if index < self.page_count() {
            self.move_to(index);
            true
        } else {
            false
        }
    }

    pub fn move_to_next_if_valid(&mut self) -> bool {
        match self.current_index().checked_add(1) {
            Some(index) => self.move_to_if_valid(index),
            None => false,
        }
    }

    pub fn move_to_previous_if_valid(&mut self) -> bool {
        match self.current_index().checked_sub(1) {
            Some(index) => self.move_to_if_valid(index),
            None => false,
        }
    }

    pub fn move_to_first(&mut self) -> bool {
        self.move_to_if_valid(0)
    }

    /// Move to the last page without checking; on an empty sequence the
    /// cursor lands on 0
    pub fn move_to_last(&mut self) {
        self.move_to(self.page_count().saturating_sub(1));
    }

    pub fn toggle_overview_mode(&mut self) {
        match self.mode {
            Mode::Overview => {
                self.mode = Mode::Normal;
                self.renderer.overview_mode_off();
            }
            Mode::Normal => {
                self.mode = Mode::Overview;
                self.deck.ensure_overview();
                self.renderer.overview_mode_on();
                self.move_to(0);
            }
        }
        info!("Overview mode {}", if self.is_overview_mode() { "on" } else { "off" });
        self.renderer.post_toggle_overview_mode();
    }

    // ---------------------------------------------------------------------
    // Theme
    // ---------------------------------------------------------------------

    /// Apply `name`, or the last applied theme, or the deck's own theme, or
    /// the default theme.
    ///
    /// A reload requested while a theme is being applied is deferred and run
    /// once after the current one finishes; any number of such requests
    /// collapse into one. On failure the pages keep their previous styles.
    pub fn reload_theme(&mut self, name: Option<&str>) -> Result<()> {
        if !self.guard.request() {
            return Ok(());
        }

        let mut name = name.map(str::to_string);
        loop {
            if let Err(e) = self.apply_theme(name.take()) {
                if self.guard.reset() {
                    warn!("Dropping deferred theme reload after failure");
                }
                return Err(e);
            }
            if !self.guard.finish() {
                return Ok(());
            }
            info!("Running deferred theme reload");
        }
    }

    fn apply_theme(&mut self, name: Option<String>) -> Result<()> {
        let resolved = name
            .or_else(|| self.theme_name.clone())
            .or_else(|| self.default_theme())
            .unwrap_or_else(|| DEFAULT_THEME.to_string());

        if self.deck.is_empty() {
            debug!("Deck is empty, remembering theme {} for later", resolved);
            self.theme_name = Some(resolved);
            return Ok(());
        }

        self.theme_engine.validate(&resolved)?;
        info!("Applying theme: {}", resolved);

        let previous: Vec<Option<PageStyle>> =
            self.deck.pages().iter().map(|p| p.style().cloned()).collect();
        for page in self.deck.pages_mut() {
            page.clear_theme();
        }

        let surface = (self.renderer.width(), self.renderer.height());
        let mut ctx = ApplyContext::new(&mut self.deck, &mut self.guard, surface);
        if let Err(e) = self.theme_engine.apply(&mut ctx, &resolved) {
            warn!("Theme {} failed, restoring previous styles: {}", resolved, e);
            for (page, style) in self.deck.pages_mut().iter_mut().zip(previous) {
                page.replace_style(style);
            }
            return Err(e);
        }

        self.clear_overview();
        self.theme_name = Some(resolved);
        self.theme_epoch += 1;
        self.renderer.post_apply_theme();
        Ok(())
    }

    fn default_theme(&self) -> Option<String> {
        self.deck
            .title_page()
            .and_then(|page| page.theme())
            .map(str::to_string)
    }

    fn clear_overview(&mut self) {
        self.deck.clear_overview();
        self.cursor.overview = 0;
        if self.mode == Mode::Overview {
            self.mode = Mode::Normal;
            self.renderer.overview_mode_off();
        }
    }

    // ---------------------------------------------------------------------
    // Source
    // ---------------------------------------------------------------------

    /// Attach a source and parse it if it has anything new
    pub fn parse_source(&mut self, source: Box<dyn SourceDocument>) -> bool {
        self.source = Some(source);
        self.reload_source(false)
    }

    pub fn needs_reload(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_modified())
    }

    /// Re-parse when forced or when the source changed. Returns true when a
    /// new deck was installed.
    pub fn reload_source(&mut self, force: bool) -> bool {
        self.reload_source_with(force, &mut Headless)
    }

    /// Like `reload_source`, yielding to `checkpoint` between phases
    pub fn reload_source_with<C: Checkpoint<R>>(&mut self, force: bool, checkpoint: &mut C) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if !force && !source.is_modified() {
            return false;
        }

        let text = match source.read() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read {}: {}", source.name(), e);
                return false;
            }
        };
        checkpoint.yield_now(self);

        let pages = match self.parser.parse(&text) {
            Ok(pages) => pages,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        let kept = self.cursor;
        info!("Reloaded deck: {} pages", pages.len());
        self.deck.replace_pages(pages);
        self.clear_overview();
        checkpoint.yield_now(self);

        if let Err(e) = self.reload_theme(None) {
            warn!("Failed to apply theme after reload: {}", e);
        }
        let title = self.title();
        self.renderer.update_title(&title);
        self.renderer.post_parse();
        self.cursor = kept;
        true
    }

    // ---------------------------------------------------------------------
    // Window notifications
    // ---------------------------------------------------------------------

    pub fn fullscreened(&mut self) {
        self.fullscreen = true;
        self.renderer.post_fullscreen();
    }

    pub fn unfullscreened(&mut self) {
        self.fullscreen = false;
        self.renderer.post_unfullscreen();
    }

    pub fn iconified(&mut self) {
        self.renderer.post_iconify();
    }

    pub fn toggle_fullscreen(&mut self) {
        if self.fullscreen {
            self.unfullscreened();
        } else {
            self.fullscreened();
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Ask every running job to stop at its next step
    pub fn quit(&mut self) {
        info!("Quit requested");
        self.quit = true;
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    // ---------------------------------------------------------------------
    // Jobs
    // ---------------------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            surface: (self.renderer.width(), self.renderer.height()),
            mode: self.mode,
            generation: self.deck.generation(),
            theme_epoch: self.theme_epoch,
            quit: self.quit,
            applying: self.guard.is_applying(),
        }
    }

    fn start_job(&mut self, kind: JobKind, size: Option<usize>) -> JobState {
        let job = JobState::start(kind, size, self.snapshot());
        self.renderer.pre_job(kind, size);
        job
    }

    /// One step boundary: report progress, let pending work run, then poll
    fn job_step<C: Checkpoint<R>>(&mut self, job: &mut JobState, index: usize, checkpoint: &mut C) -> bool {
        job.update_progress(index);
        if let Some(progress) = job.progress() {
            self.renderer.report_progress(progress);
        }
        checkpoint.yield_now(self);
        let backend = self.renderer.job_step(job.kind(), index);
        let shared = job.should_continue(&self.snapshot());
        backend && shared
    }

    fn finish_job(&mut self, mut job: JobState, cancelled: bool) {
        self.renderer.post_job(job.kind(), cancelled);
        job.end_progress(cancelled);
    }

    /// Put the cursor of a job's sequence back where the job found it. If the
    /// mode changed meanwhile, that cursor is not shown and is set quietly.
    fn restore_cursor(&mut self, mode: Mode, index: usize) {
        if self.mode != mode {
            self.cursor.set(mode, index);
        } else if !self.move_to_if_valid(index) {
            self.move_to_first();
        }
    }

    fn draw_current(&mut self) -> Result<()> {
        let index = self.current_index();
        match self.deck.sequence(self.mode).get(index) {
            Some(page) => self.renderer.draw_page(&self.deck, index, page),
            None => Ok(()),
        }
    }

    /// Redraw after an expose: pick up source changes first unless every
    /// page is being cached, then draw the current page
    pub fn refresh_display(&mut self) -> Result<()> {
        if !self.caching {
            self.reload_source(false);
        }
        self.current_page();
        let mut job = self.start_job(JobKind::Display, None);
        let result = self.draw_current();
        let index = self.current_index();
        let stopped = !self.job_step(&mut job, index, &mut Headless);
        self.finish_job(job, result.is_err() || stopped);
        result
    }

    /// Draw every main page in order, leaving the cursor on the last one,
    /// then let the renderer finish the print run
    pub fn print_all(&mut self) -> Result<JobOutcome> {
        self.print_all_with(&mut Headless)
    }

    pub fn print_all_with<C: Checkpoint<R>>(&mut self, checkpoint: &mut C) -> Result<JobOutcome> {
        let count = self.deck.len();
        let mut job = self.start_job(JobKind::Print, Some(count));
        let mut cancelled = false;
        let mut failure = None;

        for i in 0..count {
            self.move_to(i);
            let drawn = match self.deck.get(i) {
                Some(page) => self.renderer.draw_page(&self.deck, i, page),
                None => Ok(()),
            };
            if let Err(e) = drawn {
                failure = Some(e);
                cancelled = true;
                break;
            }
            if !self.job_step(&mut job, i, checkpoint) {
                cancelled = true;
                break;
            }
        }

        self.finish_job(job, cancelled);
        if let Some(e) = failure {
            return Err(e);
        }
        if !cancelled {
            self.renderer.print()?;
        }
        Ok(JobOutcome::from_cancelled(cancelled))
    }

    /// Base name for exported images: the configured one or the deck title,
    /// with an `_overview` suffix in overview mode
    pub fn saved_image_basename(&self) -> String {
        let name = self
            .saved_image_basename
            .clone()
            .unwrap_or_else(|| self.title());
        match self.mode {
            Mode::Overview => format!("{}_overview", name),
            Mode::Normal => name,
        }
    }

    pub fn set_saved_image_basename(&mut self, basename: impl Into<String>) {
        self.saved_image_basename = Some(basename.into());
    }

    /// Export every page of the active sequence to
    /// `basename + zero-padded index + "." + type`
    pub fn save(&mut self, basename: &str, image_type: &str) -> Result<ExportReport> {
        self.save_with(basename, image_type, &mut Headless)
    }

    pub fn save_with<C: Checkpoint<R>>(
        &mut self,
        basename: &str,
        image_type: &str,
        checkpoint: &mut C,
    ) -> Result<ExportReport> {
        let normalized = export::normalize_image_type(image_type);
        let format = export::image_format(&normalized)?;
        let count = self.page_count();
        let mut report = ExportReport::default();
        if count == 0 {
            return Ok(report);
        }
        export::prepare_target(Path::new(&export::image_file_name(
            basename,
            0,
            count,
            &normalized,
        )))?;

        let (mode, kept) = (self.mode, self.current_index());
        let mut job = self.start_job(JobKind::ImageExport, Some(count));
        let mut failure = None;

        for i in 0..count {
            self.move_to(i);
            let path = PathBuf::from(export::image_file_name(basename, i, count, &normalized));
            let written = match self.deck.sequence(self.mode).get(i) {
                Some(page) => self
                    .renderer
                    .rasterize(&self.deck, i, page)
                    .and_then(|img| export::write_image(img, &path, format)),
                None => Ok(()),
            };
            match written {
                Ok(()) => report.files.push(path),
                Err(e) => {
                    failure = Some(e);
                    report.cancelled = true;
                    break;
                }
            }
            if !self.job_step(&mut job, i, checkpoint) {
                report.cancelled = true;
                break;
            }
        }

        self.finish_job(job, report.cancelled);
        self.restore_cursor(mode, kept);
        match failure {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Render every page of the active sequence ahead of time. A cancelled
    /// run reloads the theme so the display matches the new state; a
    /// complete run just asks for a redraw.
    pub fn cache_all_pages(&mut self) -> JobOutcome {
        self.cache_all_pages_with(&mut Headless)
    }

    pub fn cache_all_pages_with<C: Checkpoint<R>>(&mut self, checkpoint: &mut C) -> JobOutcome {
        let count = self.page_count();
        let (mode, kept) = (self.mode, self.current_index());
        self.caching = true;
        let mut job = self.start_job(JobKind::CacheAll, Some(count));
        let mut cancelled = false;

        for i in 0..count {
            self.move_to(i);
            if let Err(e) = self.draw_current() {
                warn!("Failed to cache page {}: {}", i, e);
                cancelled = true;
                break;
            }
            if !self.job_step(&mut job, i, checkpoint) {
                cancelled = true;
                break;
            }
        }

        self.finish_job(job, cancelled);
        self.caching = false;
        if self.quit {
            return JobOutcome::from_cancelled(cancelled);
        }
        self.restore_cursor(mode, kept);
        if cancelled {
            if let Err(e) = self.reload_theme(None) {
                warn!("Failed to reload theme after cancelled caching: {}", e);
            }
        } else {
            self.renderer.redraw();
        }
        JobOutcome::from_cancelled(cancelled)
    }
}
