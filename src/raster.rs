// ABOUTME: Raster painting for the big-deck engine
// ABOUTME: Paints a wireframe image of a page from its theme style, used for export and caching

use crate::deck::Deck;
use crate::page::{Block, Page, PageStyle, Rgb};
use image::{imageops, Rgba, RgbaImage};

static FALLBACK_STYLE: PageStyle = PageStyle {
    theme: String::new(),
    background: [255, 255, 255],
    foreground: [0, 0, 0],
    accent: [0, 0, 0],
    font_size: 32,
    margin: 48,
};

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// Paint `page` at `width`×`height`. Text is drawn as bars whose length
/// follows the text length; thumbnails paint their source page scaled down.
pub fn paint_page(deck: &Deck, page: &Page, width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let style = page.style().unwrap_or(&FALLBACK_STYLE);
    let mut img = RgbaImage::from_pixel(width, height, rgba(style.background));

    if let Some(source) = page.thumbnail_source().and_then(|i| deck.get(i)) {
        let full = paint_page(deck, source, width, height);
        let thumb = imageops::thumbnail(&full, (width * 4 / 5).max(1), (height * 4 / 5).max(1));
        let x = (width - thumb.width()) / 2;
        let y = (height - thumb.height()) / 2;
        imageops::overlay(&mut img, &thumb, x as i64, y as i64);
        return img;
    }

    let margin = style.margin.min(width / 4);
    let line = style.font_size.max(1);
    let usable = width.saturating_sub(margin * 2);
    let char_w = (line / 2).max(1);
    let bar = |text: &str| (text.chars().count() as u32 * char_w).min(usable);

    let title_h = if page.is_title() { line * 2 } else { line };
    let mut y = if page.is_title() { height / 3 } else { margin };
    fill_rect(&mut img, margin, y, bar(page.title()), title_h, rgba(style.accent));
    y += title_h + line;

    for block in page.blocks() {
        if y >= height {
            break;
        }
        let (indent, color) = match block {
            Block::Heading { .. } => (0, style.accent),
            Block::Item(_) => (line, style.foreground),
            _ => (0, style.foreground),
        };
        let text = block.text();
        let rows = text.lines().count().max(1) as u32;
        for row in 0..rows {
            let row_text = text.lines().nth(row as usize).unwrap_or(text);
            fill_rect(
                &mut img,
                margin + indent,
                y,
                bar(row_text).saturating_sub(indent),
                line * 2 / 3,
                rgba(color),
            );
            y += line;
        }
        y += line / 2;
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paints_requested_size() {
        let deck = Deck::from_pages(vec![Page::new("One", vec![])]);
        let img = paint_page(&deck, &deck.pages()[0], 320, 240);
        assert_eq!(img.dimensions(), (320, 240));
    }

    #[test]
    fn unstyled_page_has_white_background() {
        let deck = Deck::from_pages(vec![Page::new(
            "One",
            vec![Block::Paragraph("hello".to_string())],
        )]);
        let img = paint_page(&deck, &deck.pages()[0], 200, 200);
        assert_eq!(img.get_pixel(199, 199), &Rgba([255, 255, 255, 255]));
        // Title bar starts at the top-left margin
        assert_eq!(img.get_pixel(48, 48), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn thumbnail_paints_source_page() {
        let deck = Deck::from_pages(vec![Page::new("Source", vec![])]);
        let thumb = Page::thumbnail(0, "Source");
        let img = paint_page(&deck, &thumb, 100, 100);
        assert_eq!(img.dimensions(), (100, 100));
    }
}
