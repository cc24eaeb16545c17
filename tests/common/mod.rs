// ABOUTME: Shared test doubles for the big-deck integration tests
// ABOUTME: A renderer that records every call and a theme engine that counts applications

#![allow(dead_code)]

use big_deck::{
    ApplyContext, Block, Canvas, Deck, DeckError, JobKind, MemorySource, Page, PageStyle,
    Renderer, Result, ThemeEngine, TitleInfo,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Renderer that records the calls the canvas makes
pub struct RecordingRenderer {
    pub width: u32,
    pub height: u32,
    pub events: Vec<String>,
    pub drawn: Vec<usize>,
    pub title: String,
    /// Backend verdict: stop the job at this step
    pub stop_at: Option<usize>,
}

impl RecordingRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            events: Vec::new(),
            drawn: Vec::new(),
            title: String::new(),
            stop_at: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }
}

impl Renderer for RecordingRenderer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_page(&mut self, _deck: &Deck, index: usize, _page: &Page) -> Result<()> {
        self.drawn.push(index);
        Ok(())
    }

    fn redraw(&mut self) {
        self.events.push("redraw".to_string());
    }

    fn print(&mut self) -> Result<()> {
        self.events.push("print".to_string());
        Ok(())
    }

    fn update_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn post_apply_theme(&mut self) {
        self.events.push("post_apply_theme".to_string());
    }

    fn post_parse(&mut self) {
        self.events.push("post_parse".to_string());
    }

    fn post_move(&mut self, index: usize) {
        self.events.push(format!("post_move:{}", index));
    }

    fn overview_mode_on(&mut self) {
        self.events.push("overview_mode_on".to_string());
    }

    fn overview_mode_off(&mut self) {
        self.events.push("overview_mode_off".to_string());
    }

    fn post_toggle_overview_mode(&mut self) {
        self.events.push("post_toggle_overview_mode".to_string());
    }

    fn post_fullscreen(&mut self) {
        self.events.push("post_fullscreen".to_string());
    }

    fn post_unfullscreen(&mut self) {
        self.events.push("post_unfullscreen".to_string());
    }

    fn post_iconify(&mut self) {
        self.events.push("post_iconify".to_string());
    }

    fn pre_job(&mut self, kind: JobKind, size: Option<usize>) {
        self.events.push(format!("pre:{:?}:{:?}", kind, size));
    }

    fn job_step(&mut self, kind: JobKind, index: usize) -> bool {
        self.events.push(format!("step:{:?}:{}", kind, index));
        self.stop_at != Some(index)
    }

    fn post_job(&mut self, kind: JobKind, cancelled: bool) {
        self.events.push(format!("post:{:?}:{}", kind, cancelled));
    }
}

/// Theme engine that logs each application. The first application can
/// request nested reloads; a theme named `broken` fails halfway through.
pub struct CountingThemes {
    pub log: Rc<RefCell<Vec<String>>>,
    pub nested_requests: usize,
}

impl CountingThemes {
    pub fn new(log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            log,
            nested_requests: 0,
        }
    }
}

impl ThemeEngine for CountingThemes {
    fn apply(&mut self, ctx: &mut ApplyContext<'_>, name: &str) -> Result<()> {
        self.log.borrow_mut().push(name.to_string());

        for (i, page) in ctx.pages_mut().iter_mut().enumerate() {
            if name == "broken" && i == 1 {
                return Err(DeckError::ThemeError {
                    message: "broken theme".to_string(),
                    source: None,
                });
            }
            page.set_style(style(name));
        }

        if self.log.borrow().len() == 1 {
            for _ in 0..self.nested_requests {
                ctx.reload_theme();
            }
        }
        Ok(())
    }
}

pub fn style(theme: &str) -> PageStyle {
    PageStyle {
        theme: theme.to_string(),
        background: [255, 255, 255],
        foreground: [0, 0, 0],
        accent: [0, 0, 0],
        font_size: 10,
        margin: 10,
    }
}

/// Markdown for a deck with a title page and `n` regular pages
pub fn markdown_deck(title: &str, n: usize) -> String {
    let mut text = format!("% {}\n% Tester\n\n", title);
    for i in 0..n {
        text.push_str(&format!("# Page {}\n\nBody of page {}.\n\n", i + 1, i + 1));
    }
    text
}

pub fn regular_pages(n: usize) -> Vec<Page> {
    (0..n)
        .map(|i| Page::new(format!("Page {}", i + 1), vec![Block::Paragraph(format!("{}", i))]))
        .collect()
}

pub fn title_page(title: &str) -> Page {
    Page::title_page(title, TitleInfo::default(), vec![])
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Canvas over a Markdown deck with `n` regular pages plus a title page
pub fn canvas_with_pages(n: usize) -> Canvas<RecordingRenderer> {
    init_logging();
    let mut canvas = Canvas::new(RecordingRenderer::new(800, 600));
    canvas.parse_source(Box::new(MemorySource::new(markdown_deck("My Deck", n))));
    canvas
}

/// Source shared between the test and the canvas, so the test can edit it
#[derive(Clone)]
pub struct SharedSource(pub Rc<RefCell<MemorySource>>);

impl SharedSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(MemorySource::new(text))))
    }

    pub fn replace(&self, text: impl Into<String>) {
        self.0.borrow_mut().replace(text);
    }
}

impl big_deck::SourceDocument for SharedSource {
    fn is_modified(&self) -> bool {
        self.0.borrow().is_modified()
    }

    fn read(&mut self) -> Result<String> {
        self.0.borrow_mut().read()
    }

    fn name(&self) -> String {
        "<shared>".to_string()
    }
}
