// ABOUTME: Theme module for the big-deck engine
// ABOUTME: Defines the theme engine interface and the built-in color themes

use crate::apply_guard::ApplyGuard;
use crate::deck::Deck;
use crate::errors::{DeckError, Result};
use crate::page::{Page, PageStyle, Rgb};

/// Default theme name, used when neither the caller nor the deck picks one
pub const DEFAULT_THEME: &str = "default";

/// What a theme engine may touch while applying
pub struct ApplyContext<'a> {
    deck: &'a mut Deck,
    guard: &'a mut ApplyGuard,
    surface: (u32, u32),
}

impl<'a> ApplyContext<'a> {
    pub(crate) fn new(deck: &'a mut Deck, guard: &'a mut ApplyGuard, surface: (u32, u32)) -> Self {
        Self {
            deck,
            guard,
            surface,
        }
    }

    pub fn pages(&self) -> &[Page] {
        self.deck.pages()
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        self.deck.pages_mut()
    }

    pub fn title_page(&self) -> Option<&Page> {
        self.deck.title_page()
    }

    /// Surface size of the renderer the deck is being themed for
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Ask for another theme reload. Always deferred until the current apply
    /// has finished.
    pub fn reload_theme(&mut self) {
        self.guard.request();
    }
}

/// Transforms a deck's pages in place for a named theme
pub trait ThemeEngine {
    /// Check that `name` can be applied, before any page state is touched
    fn validate(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn apply(&mut self, ctx: &mut ApplyContext<'_>, name: &str) -> Result<()>;
}

struct Palette {
    background: Rgb,
    foreground: Rgb,
    accent: Rgb,
    font_size: u32,
    margin: u32,
}

/// Built-in themes
const THEMES: &[(&str, Palette)] = &[
    (
        "default",
        Palette {
            background: [255, 255, 255],
            foreground: [34, 34, 34],
            accent: [0, 102, 204],
            font_size: 32,
            margin: 48,
        },
    ),
    (
        "dark",
        Palette {
            background: [30, 30, 46],
            foreground: [205, 214, 244],
            accent: [137, 180, 250],
            font_size: 32,
            margin: 48,
        },
    ),
    (
        "print",
        Palette {
            background: [255, 255, 255],
            foreground: [0, 0, 0],
            accent: [0, 0, 0],
            font_size: 24,
            margin: 72,
        },
    ),
];

fn palette(name: &str) -> Option<&'static Palette> {
    THEMES.iter().find(|(n, _)| *n == name).map(|(_, p)| p)
}

/// Names of the built-in themes
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|(n, _)| *n)
}

/// Theme engine backed by the built-in palettes
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinThemes;

impl ThemeEngine for BuiltinThemes {
    fn validate(&self, name: &str) -> Result<()> {
        palette(name)
            .map(|_| ())
            .ok_or_else(|| DeckError::UnknownTheme(name.to_string()))
    }

    fn apply(&mut self, ctx: &mut ApplyContext<'_>, name: &str) -> Result<()> {
        let palette = palette(name).ok_or_else(|| DeckError::UnknownTheme(name.to_string()))?;
        // Scale type with the surface height, 720px being the reference
        let (_, height) = ctx.surface_size();
        let scale = |v: u32| ((v * height.max(1) + 719) / 720).max(1);

        for page in ctx.pages_mut() {
            let font_size = if page.is_title() {
                palette.font_size * 3 / 2
            } else {
                palette.font_size
            };
            page.set_style(PageStyle {
                theme: name.to_string(),
                background: palette.background,
                foreground: palette.foreground,
                accent: palette.accent,
                font_size: scale(font_size),
                margin: scale(palette.margin),
            });
        }
        Ok(())
    }
}
