// ABOUTME: Markdown parsing module for the big-deck engine
// ABOUTME: Turns deck source text into pages, splitting slides on level-1 headings

use crate::errors::{DeckError, Result};
use crate::page::{Block, Page, TitleInfo};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use log::debug;

/// Builds the main page sequence from document text
pub trait DeckParser {
    fn parse(&self, text: &str) -> Result<Vec<Page>>;
}

/// Parser for Markdown decks.
///
/// Optional front matter in the format `% Title`, `% Author`, `% Date`, plus an
/// optional `% theme: name` line, produces a title page. Every level-1 heading
/// starts a new page.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownParser;

impl DeckParser for MarkdownParser {
    fn parse(&self, text: &str) -> Result<Vec<Page>> {
        let front = parse_frontmatter(text)?;
        let content = normalize_headings(&front.body);

        let arena = Arena::new();
        let options = ComrakOptions::default();
        let root = parse_document(&arena, &content, &options);

        let mut pages = Vec::new();
        let mut current: Option<(String, Vec<Block>)> = None;
        let mut title_blocks = Vec::new();

        for node in root.children() {
            let (value, line) = {
                let data = node.data.borrow();
                (data.value.clone(), data.sourcepos.start.line + front.line_offset)
            };

            if let NodeValue::Heading(heading) = &value {
                if heading.level == 1 {
                    if let Some((title, blocks)) = current.take() {
                        pages.push(Page::new(title, blocks));
                    }
                    current = Some((collect_text(node), Vec::new()));
                    continue;
                }
            }

            let blocks = match (&mut current, front.title.is_some()) {
                (Some((_, blocks)), _) => blocks,
                (None, true) => &mut title_blocks,
                (None, false) => {
                    return Err(DeckError::parse(
                        line,
                        "content before the first slide heading",
                    ));
                }
            };
            push_blocks(node, value, blocks);
        }

        if let Some((title, blocks)) = current.take() {
            pages.push(Page::new(title, blocks));
        }
        if let Some(title) = front.title {
            pages.insert(0, Page::title_page(title, front.info, title_blocks));
        }

        debug!("Parsed {} pages", pages.len());
        Ok(pages)
    }
}

fn push_blocks<'a>(node: &'a AstNode<'a>, value: NodeValue, blocks: &mut Vec<Block>) {
    match value {
        NodeValue::Heading(heading) => blocks.push(Block::Heading {
            level: heading.level,
            text: collect_text(node),
        }),
        NodeValue::Paragraph => {
            if let Some(image) = sole_image(node) {
                blocks.push(image);
            } else {
                blocks.push(Block::Paragraph(collect_text(node)));
            }
        }
        NodeValue::List(_) => {
            for item in node.children() {
                blocks.push(Block::Item(collect_text(item)));
            }
        }
        NodeValue::CodeBlock(code) => blocks.push(Block::Code {
            language: code.info.trim().to_string(),
            text: code.literal,
        }),
        NodeValue::HtmlBlock(html) => blocks.push(Block::Raw(html.literal)),
        NodeValue::ThematicBreak => {}
        _ => {
            let text = collect_text(node);
            if !text.is_empty() {
                blocks.push(Block::Paragraph(text));
            }
        }
    }
}

/// A paragraph made of a single image becomes an image block
fn sole_image<'a>(node: &'a AstNode<'a>) -> Option<Block> {
    let mut children = node.children();
    let child = children.next()?;
    if children.next().is_some() {
        return None;
    }
    let url = match &child.data.borrow().value {
        NodeValue::Image(link) => link.url.clone(),
        _ => return None,
    };
    Some(Block::Image {
        url,
        alt: collect_text(child),
    })
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

struct FrontMatter {
    title: Option<String>,
    info: TitleInfo,
    body: String,
    line_offset: usize,
}

/// Parse front matter in the format: % Title\n% Author\n% Date
fn parse_frontmatter(content: &str) -> Result<FrontMatter> {
    let lines: Vec<&str> = content.lines().collect();
    let header_len = lines.iter().take_while(|l| l.starts_with('%')).count();

    if header_len == 0 {
        return Ok(FrontMatter {
            title: None,
            info: TitleInfo::default(),
            body: content.to_string(),
            line_offset: 0,
        });
    }

    let title = lines[0].trim_start_matches('%').trim().to_string();
    if title.is_empty() {
        return Err(DeckError::parse(1, "empty title in front matter"));
    }

    let mut info = TitleInfo::default();
    for (i, line) in lines.iter().enumerate().take(header_len).skip(1) {
        let value = line.trim_start_matches('%').trim();
        if let Some(theme) = value.strip_prefix("theme:") {
            info.theme = Some(theme.trim().to_string());
        } else if info.author.is_none() {
            info.author = Some(value.to_string());
        } else if info.date.is_none() {
            info.date = Some(value.to_string());
        } else {
            return Err(DeckError::parse(i + 1, "unexpected front matter line"));
        }
    }

    Ok(FrontMatter {
        title: Some(title),
        info,
        body: lines[header_len..].join("\n"),
        line_offset: header_len,
    })
}

/// Accept "#Text" (no space) as a level-1 heading, outside fenced code
fn normalize_headings(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut in_fence = false;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        let bare_heading = !in_fence
            && trimmed.starts_with('#')
            && trimmed[1..]
                .chars()
                .next()
                .is_some_and(|c| c != '#' && !c.is_whitespace());

        if bare_heading {
            result.push_str("# ");
            result.push_str(&trimmed[1..]);
        } else {
            result.push_str(line);
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hash_becomes_heading() {
        let normalized = normalize_headings("#Intro\n```\n#not\n```\n## Sub");
        assert_eq!(normalized, "# Intro\n```\n#not\n```\n## Sub\n");
    }

    #[test]
    fn frontmatter_positional_and_theme() {
        let front = parse_frontmatter("% Deck\n% Ann\n% theme: dark\n% 2024\n# One").unwrap();
        assert_eq!(front.title.as_deref(), Some("Deck"));
        assert_eq!(front.info.author.as_deref(), Some("Ann"));
        assert_eq!(front.info.date.as_deref(), Some("2024"));
        assert_eq!(front.info.theme.as_deref(), Some("dark"));
        assert_eq!(front.line_offset, 4);
    }

    #[test]
    fn frontmatter_with_empty_title_fails() {
        let err = parse_frontmatter("%\n# One").err().unwrap();
        assert!(err.is_parse_error());
    }
}
