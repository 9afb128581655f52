//! PDF export of a summary: US Letter pages, one-inch margins, 12pt
//! Times-Roman with 14pt leading.

use super::render_plain_text;
use crate::error::RenderError;
use crate::models::SummaryResult;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 14;
const TEXT_WIDTH: f64 = (PAGE_WIDTH - 2 * MARGIN) as f64;

pub fn render_pdf(result: &SummaryResult) -> Result<Vec<u8>, RenderError> {
    let lines = wrap_text(&render_plain_text(result), TEXT_WIDTH);
    let per_page = ((PAGE_HEIGHT - 2 * MARGIN - FONT_SIZE) / LEADING + 1) as usize;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    let mut pages: Vec<&[String]> = lines.chunks(per_page).collect();
    if pages.is_empty() {
        pages.push(&lines[..]);
    }
    for page_lines in pages {
        let page_id = add_page(&mut doc, pages_id, font_id, page_lines)?;
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Summary"),
        "Producer" => Object::string_literal("summarize"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    lines: &[String],
) -> Result<ObjectId, RenderError> {
    let mut operations = Vec::new();
    let mut baseline = PAGE_HEIGHT - MARGIN - FONT_SIZE;

    // one text object per line so extracted text keeps the line breaks
    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
            operations.push(Operation::new("Td", vec![MARGIN.into(), baseline.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        baseline -= LEADING;
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
        "Contents" => content_id,
    }))
}

/// Greedy word wrap using Times-Roman advance widths. Words wider than a
/// full line are broken between characters.
fn wrap_text(text: &str, max_width: f64) -> Vec<String> {
    let space = text_width(" ");
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = text_width(word);
            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                width = 0.0;
                for ch in word.chars() {
                    let ch_width = glyph_width(ch);
                    if width + ch_width > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        width = 0.0;
                    }
                    current.push(ch);
                    width += ch_width;
                }
                continue;
            }

            let needed = if current.is_empty() { word_width } else { width + space + word_width };
            if needed > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                width = word_width;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                width = needed;
            }
        }

        lines.push(current);
    }

    lines
}

fn text_width(text: &str) -> f64 {
    text.chars().map(glyph_width).sum()
}

/// Advance width in points at the export font size.
fn glyph_width(ch: char) -> f64 {
    let units = match ch {
        ' ' | ',' | '.' => 250,
        '!' | '\'' | '(' | ')' | '-' | ':' | ';' | '[' | ']' | '`' => 333,
        '"' => 408,
        '#' | '$' | '*' | '_' | '0'..='9' => 500,
        '%' => 833,
        '&' => 778,
        '+' | '<' | '=' | '>' => 564,
        '/' | '\\' => 278,
        '?' => 444,
        '@' => 921,
        '^' => 469,
        '{' | '}' => 480,
        '|' => 200,
        '~' => 541,
        'A' | 'D' | 'G' | 'H' | 'K' | 'N' | 'O' | 'Q' | 'U' | 'V' | 'X' | 'Y' => 722,
        'B' | 'C' | 'R' => 667,
        'E' | 'L' | 'T' | 'Z' => 611,
        'F' | 'P' | 'S' => 556,
        'I' | 'f' | 'r' => 333,
        'J' => 389,
        'M' => 889,
        'W' => 944,
        'a' | 'c' | 'e' | 'z' => 444,
        'i' | 'j' | 'l' | 't' => 278,
        'm' => 778,
        's' => 389,
        'w' => 722,
        '\u{2022}' => 350,
        '\u{2014}' => 1000,
        _ => 500,
    };
    f64::from(units) * FONT_SIZE as f64 / 1000.0
}

/// Encodes text for the standard WinAnsi font encoding. Characters outside
/// it become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}
