//! Page layout on US Letter with the standard Helvetica font.
//!
//! Helvetica is one of the PDF base-14 fonts, so nothing is embedded. Glyph widths are
//! approximated with an average advance when wrapping.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::{Block, RenderError};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 54;
const LIST_INDENT: i64 = 14;

/// Average Helvetica advance as a fraction of the font size, in thousandths.
const AVG_ADVANCE_PER_MILLE: i64 = 540;

struct Style {
    size: i64,
    leading: i64,
    space_before: i64,
}

const TITLE: Style = Style { size: 20, leading: 26, space_before: 0 };
const SECTION: Style = Style { size: 14, leading: 20, space_before: 10 };
const SUBSECTION: Style = Style { size: 12, leading: 17, space_before: 6 };
const BODY: Style = Style { size: 11, leading: 15, space_before: 4 };

struct Line {
    text: String,
    size: i64,
    x: i64,
    advance: i64,
}

/// Lays out blocks and serializes the document.
pub fn render_blocks(blocks: &[Block]) -> Result<Vec<u8>, RenderError> {
    let lines = layout(blocks);
    let pages = paginate(&lines);
    write_document(&pages)
}

fn layout(blocks: &[Block]) -> Vec<Line> {
    let mut lines = Vec::new();
    for block in blocks {
        let (style, indent, bullet) = match block {
            Block::Title(_) => (&TITLE, 0, false),
            Block::Section(_) => (&SECTION, 0, false),
            Block::Subsection(_) => (&SUBSECTION, 0, false),
            Block::Paragraph(_) => (&BODY, 0, false),
            Block::ListItem(_) => (&BODY, LIST_INDENT, true),
        };

        let width = PAGE_WIDTH - 2 * MARGIN - indent;
        let max_chars = (width * 1000 / (style.size * AVG_ADVANCE_PER_MILLE)).max(1) as usize;

        for (i, text) in wrap(block.text(), max_chars).into_iter().enumerate() {
            let text = match (bullet, i) {
                (true, 0) => format!("- {text}"),
                (true, _) => format!("  {text}"),
                _ => text,
            };
            lines.push(Line {
                text,
                size: style.size,
                x: MARGIN + indent,
                advance: style.leading + if i == 0 { style.space_before } else { 0 },
            });
        }
    }
    lines
}

/// Splits lines into pages, returning (baseline y, line) per page.
fn paginate(lines: &[Line]) -> Vec<Vec<(i64, &Line)>> {
    let mut pages = vec![Vec::new()];
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        if y - line.advance < MARGIN && !pages.last().map_or(true, Vec::is_empty) {
            pages.push(Vec::new());
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= line.advance;
        if let Some(page) = pages.last_mut() {
            page.push((y, line));
        }
    }
    pages
}

fn write_document(pages: &[Vec<(i64, &Line)>]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut operations = Vec::with_capacity(page.len() * 4);
        for (y, line) in page {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), line.size.into()]));
            operations.push(Operation::new("Td", vec![line.x.into(), (*y).into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

/// Greedy word wrap; words longer than a line are hard-split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                if piece.len() == max_chars {
                    lines.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_len = piece.len();
                }
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Encodes text for the font's `WinAnsiEncoding`. Latin-1 maps to itself, the 0x80-0x9F
/// range carries the usual typographic punctuation, and anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_wrap_hard_splits_long_words() {
        let lines = wrap("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_latin1_and_typographic_punctuation_are_kept() {
        assert_eq!(encode_win_ansi("Zoë – CV"), vec![b'Z', b'o', 0xEB, b' ', 0x96, b' ', b'C', b'V']);
        assert_eq!(encode_win_ansi("“Müller”"), vec![0x93, b'M', 0xFC, b'l', b'l', b'e', b'r', 0x94]);
    }

    #[test]
    fn test_characters_outside_win_ansi_become_question_marks() {
        assert_eq!(encode_win_ansi("李 ok"), b"? ok".to_vec());
    }

    #[test]
    fn test_long_content_spans_pages() {
        let blocks: Vec<Block> = (0..120)
            .map(|i| Block::Paragraph(format!("Paragraph number {i} with some body text")))
            .collect();
        let bytes = render_blocks(&blocks).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }
}
