//! Artifact rendering: optimized markup in, fixed-layout PDF bytes out.
//!
//! Markup is flattened into a short list of text blocks (headings, paragraphs, list items) and
//! laid out by [`pdf`]. Styling in the markup is ignored.

pub mod pdf;

use scraper::{ElementRef, Html, Node};
use thiserror::Error;

pub use pdf::render_blocks;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markup contains no renderable text")]
    NoContent,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// A unit of laid-out text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Section(String),
    Subsection(String),
    Paragraph(String),
    ListItem(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Title(t)
            | Block::Section(t)
            | Block::Subsection(t)
            | Block::Paragraph(t)
            | Block::ListItem(t) => t,
        }
    }
}

/// Renders a markup document to PDF bytes.
pub fn render_pdf(markup: &str) -> Result<Vec<u8>, RenderError> {
    let blocks = markup_to_blocks(markup);
    if blocks.is_empty() {
        return Err(RenderError::NoContent);
    }
    render_blocks(&blocks)
}

/// Renders plain text as one paragraph per line.
pub fn render_plain_text(text: &str) -> Result<Vec<u8>, RenderError> {
    let blocks: Vec<Block> = text
        .lines()
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .map(Block::Paragraph)
        .collect();
    if blocks.is_empty() {
        return Err(RenderError::NoContent);
    }
    render_blocks(&blocks)
}

/// Flattens markup into text blocks in document order.
pub fn markup_to_blocks(markup: &str) -> Vec<Block> {
    let document = Html::parse_document(&envelope(markup));
    let mut walker = BlockWalker::default();
    walker.walk(document.root_element());
    walker.flush();
    walker.blocks
}

/// Drops any chatter before the document proper, and wraps bare fragments.
fn envelope(markup: &str) -> String {
    let lower = markup.to_ascii_lowercase();
    match lower.find("<html").or_else(|| lower.find("<body")) {
        Some(start) => markup[start..].to_string(),
        None => format!("<html><body>{markup}</body></html>"),
    }
}

#[derive(Default)]
struct BlockWalker {
    blocks: Vec<Block>,
    inline: String,
}

impl BlockWalker {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.inline.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        let make: fn(String) -> Block = match element.value().name() {
            "head" | "style" | "script" | "title" => return,
            "h1" => Block::Title,
            "h2" => Block::Section,
            "h3" | "h4" | "h5" | "h6" => Block::Subsection,
            "p" => Block::Paragraph,
            "li" => Block::ListItem,
            "br" => {
                self.flush();
                return;
            }
            "div" | "section" | "article" | "header" | "footer" | "ul" | "ol" | "table" | "tr"
            | "body" | "html" => {
                self.flush();
                self.walk(element);
                self.flush();
                return;
            }
            _ => {
                self.walk(element);
                return;
            }
        };

        self.flush();
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() {
            self.blocks.push(make(text));
        }
    }

    fn flush(&mut self) {
        let text = collapse_whitespace(&self.inline);
        self.inline.clear();
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph(text));
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
