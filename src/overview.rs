// ABOUTME: Overview builder for the big-deck engine
// ABOUTME: Derives one thumbnail page per main page for the overview mode

use crate::page::Page;

/// Build the overview sequence for `pages`, one thumbnail per page in order
pub fn build_overview_pages(pages: &[Page]) -> Vec<Page> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| Page::thumbnail(i, page.title()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Block, TitleInfo};

    #[test]
    fn one_thumbnail_per_page_in_order() {
        let pages = vec![
            Page::title_page("Intro", TitleInfo::default(), vec![]),
            Page::new("Agenda", vec![Block::Item("one".to_string())]),
            Page::new("Outro", vec![]),
        ];

        let overview = build_overview_pages(&pages);

        assert_eq!(overview.len(), 3);
        for (i, page) in overview.iter().enumerate() {
            assert_eq!(page.thumbnail_source(), Some(i));
            assert_eq!(page.title(), pages[i].title());
            assert!(!page.is_title());
        }
    }

    #[test]
    fn empty_deck_has_empty_overview() {
        assert!(build_overview_pages(&[]).is_empty());
    }
}
