// ABOUTME: Page module for the big-deck engine
// ABOUTME: Defines the drawable page unit, its content blocks and theme-assigned style

/// A piece of drawable content on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Item(String),
    Code { language: String, text: String },
    Image { url: String, alt: String },
    Raw(String),
}

impl Block {
    /// The plain text of the block, used by text-only backends
    pub fn text(&self) -> &str {
        match self {
            Block::Heading { text, .. } => text,
            Block::Paragraph(text) | Block::Item(text) | Block::Raw(text) => text,
            Block::Code { text, .. } => text,
            Block::Image { alt, .. } => alt,
        }
    }
}

/// Metadata carried by the title page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleInfo {
    pub author: Option<String>,
    pub date: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Regular,
    Title(TitleInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Blocks(Vec<Block>),
    /// Reference to a page of the main sequence, drawn scaled down
    Thumbnail { source: usize },
}

pub type Rgb = [u8; 3];

/// Rendering state a theme assigns to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStyle {
    pub theme: String,
    pub background: Rgb,
    pub foreground: Rgb,
    pub accent: Rgb,
    pub font_size: u32,
    pub margin: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    kind: PageKind,
    content: Content,
    style: Option<PageStyle>,
}

impl Page {
    /// Create a regular page with the given blocks
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            kind: PageKind::Regular,
            content: Content::Blocks(blocks),
            style: None,
        }
    }

    /// Create the distinguished title page
    pub fn title_page(title: impl Into<String>, info: TitleInfo, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            kind: PageKind::Title(info),
            content: Content::Blocks(blocks),
            style: None,
        }
    }

    /// Create an overview page pointing at `source` in the main sequence
    pub fn thumbnail(source: usize, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: PageKind::Regular,
            content: Content::Thumbnail { source },
            style: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &PageKind {
        &self.kind
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind, PageKind::Title(_))
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Blocks of a content page; thumbnails have none of their own
    pub fn blocks(&self) -> &[Block] {
        match &self.content {
            Content::Blocks(blocks) => blocks,
            Content::Thumbnail { .. } => &[],
        }
    }

    pub fn thumbnail_source(&self) -> Option<usize> {
        match self.content {
            Content::Thumbnail { source } => Some(source),
            Content::Blocks(_) => None,
        }
    }

    /// Theme requested by the title page, if any
    pub fn theme(&self) -> Option<&str> {
        match &self.kind {
            PageKind::Title(info) => info.theme.as_deref(),
            PageKind::Regular => None,
        }
    }

    pub fn style(&self) -> Option<&PageStyle> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: PageStyle) {
        self.style = Some(style);
    }

    /// Drop the theme-assigned rendering state
    pub fn clear_theme(&mut self) {
        self.style = None;
    }

    pub(crate) fn replace_style(&mut self, style: Option<PageStyle>) {
        self.style = style;
    }
}
