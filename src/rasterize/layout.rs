//! Block layout for card subtrees
//!
//! A deliberately small layout pass: card-body children stack vertically
//! with fixed gaps, text wraps by character count (full-width glyphs), and
//! the vertical-column container lays its columns right to left. The
//! numbers here drive both rasterization and the height estimates the
//! capture pipeline uses in place of live layout measurements.

use crate::dom::{Document, NodeId};
use crate::style::{parse_color, parse_px, resolve_line_height};

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A positioned run of text lines, top to bottom
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub px: f32,
    pub line_height: f32,
    pub color: [u8; 4],
    pub centered: bool,
}

/// A stroked rectangle (the seal frame)
#[derive(Debug, Clone)]
pub struct Frame {
    pub rect: Rect,
    pub color: [u8; 4],
    pub thickness: f32,
}

#[derive(Debug, Clone, Default)]
pub struct CardLayout {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
    pub frames: Vec<Frame>,
}

const BLOCK_GAP: f32 = 12.0;
const SEAL_SIZE: f32 = 48.0;
const FALLBACK_TEXT: [u8; 4] = [51, 51, 51, 255];

/// Estimated rendered height of a card, the stand-in for `offsetHeight`
pub fn measure_card_height(doc: &Document, card: NodeId) -> f32 {
    layout_card(doc, card, None).height
}

/// Lay out a card subtree at the given width (inline width when forced
/// width is absent, 400px as the last resort).
pub fn layout_card(doc: &Document, card: NodeId, forced_width: Option<f32>) -> CardLayout {
    let card_style = doc.computed_style(card);
    let width = forced_width
        .or_else(|| card_style.get("width").and_then(parse_px))
        .unwrap_or(400.0);
    let (pad_y, pad_x) = parse_padding(card_style.get("padding"));
    let content_width = (width - 2.0 * pad_x).max(10.0);

    let mut layout = CardLayout { width, ..Default::default() };
    let mut y = pad_y;
    let mut deferred_marks: Vec<NodeId> = Vec::new();

    let container = doc.query_selector(card, ".card-body").unwrap_or(card);
    for child in doc.node(container).children.clone() {
        let el = doc.node(child);
        if doc.computed_style(child).get("display") == Some("none") {
            continue;
        }
        if el.has_class("quote-mark") {
            if doc.computed_style(child).get("position") == Some("absolute") {
                deferred_marks.push(child);
            } else {
                y += layout_quote_mark_flow(doc, child, pad_x, y, &mut layout);
            }
        } else if el.has_class("text-content") {
            y += layout_text_content(doc, child, pad_x, content_width, y, &mut layout);
        } else if el.has_class("vertical-columns") {
            y += layout_vertical_columns(doc, child, pad_x, content_width, y, &mut layout);
        } else if el.has_class("book-info") {
            y += layout_book_info(doc, child, pad_x, content_width, y, &mut layout);
        } else if el.has_class("seal-box") {
            y += layout_seal(doc, child, pad_x, content_width, y, &mut layout);
        } else if el.has_class("card-date") {
            y += layout_single_line(doc, child, pad_x, content_width, y, &mut layout, 12.0);
        }
        y += BLOCK_GAP;
    }

    layout.height = (y - BLOCK_GAP + pad_y).max(pad_y * 2.0);

    // absolutely positioned quote marks anchor to the card corners
    for mark in deferred_marks {
        layout_quote_mark_absolute(doc, mark, width, layout.height, &mut layout);
    }
    layout
}

fn parse_padding(value: Option<&str>) -> (f32, f32) {
    let parts: Vec<f32> = value
        .unwrap_or("40px 32px")
        .split_whitespace()
        .filter_map(parse_px)
        .collect();
    match parts.as_slice() {
        [all] => (*all, *all),
        [v, h, ..] => (*v, *h),
        _ => (40.0, 32.0),
    }
}

fn text_color(doc: &Document, node: NodeId) -> [u8; 4] {
    doc.computed_style(node)
        .get("color")
        .and_then(parse_color)
        .unwrap_or(FALLBACK_TEXT)
}

fn font_size(doc: &Document, node: NodeId, fallback: f32) -> f32 {
    doc.computed_style(node)
        .get("font-size")
        .and_then(parse_px)
        .unwrap_or(fallback)
}

fn layout_quote_mark_flow(
    doc: &Document,
    mark: NodeId,
    pad_x: f32,
    y: f32,
    layout: &mut CardLayout,
) -> f32 {
    let px = font_size(doc, mark, 48.0);
    let height = px * 0.8;
    layout.blocks.push(TextBlock {
        rect: Rect { x: pad_x, y, width: px, height },
        lines: vec![doc.node(mark).text.clone()],
        px,
        line_height: height,
        color: text_color(doc, mark),
        centered: false,
    });
    height
}

fn layout_quote_mark_absolute(
    doc: &Document,
    mark: NodeId,
    card_width: f32,
    card_height: f32,
    layout: &mut CardLayout,
) {
    let style = doc.computed_style(mark);
    let px = font_size(doc, mark, 48.0);
    let height = px * 0.8;
    let x = if let Some(right) = style.get("right").and_then(parse_px) {
        card_width - right - px
    } else {
        style.get("left").and_then(parse_px).unwrap_or(0.0)
    };
    let y = if let Some(bottom) = style.get("bottom").and_then(parse_px) {
        card_height - bottom - height
    } else {
        style.get("top").and_then(parse_px).unwrap_or(0.0)
    };
    layout.blocks.push(TextBlock {
        rect: Rect { x, y, width: px, height },
        lines: vec![doc.node(mark).text.clone()],
        px,
        line_height: height,
        color: text_color(doc, mark),
        centered: false,
    });
}

fn layout_text_content(
    doc: &Document,
    text: NodeId,
    pad_x: f32,
    content_width: f32,
    y: f32,
    layout: &mut CardLayout,
) -> f32 {
    let px = font_size(doc, text, 20.0);
    let lh = resolve_line_height(doc.computed_style(text).get("line-height"), px);
    let chars_per_line = ((content_width / px).floor() as usize).max(1);

    let mut lines = Vec::new();
    for segment in doc.text_content(text).split('\n') {
        let chars: Vec<char> = segment.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(chars_per_line) {
            lines.push(chunk.iter().collect());
        }
    }
    let height = lines.len() as f32 * lh;
    layout.blocks.push(TextBlock {
        rect: Rect { x: pad_x, y, width: content_width, height },
        lines,
        px,
        line_height: lh,
        color: text_color(doc, text),
        centered: false,
    });
    height
}

fn layout_vertical_columns(
    doc: &Document,
    container: NodeId,
    pad_x: f32,
    content_width: f32,
    y: f32,
    layout: &mut CardLayout,
) -> f32 {
    let columns = doc.node(container).children.clone();
    if columns.is_empty() {
        return 0.0;
    }
    let first_char = doc.node(columns[0]).children.first().copied();
    let px = first_char.map(|c| font_size(doc, c, 20.0)).unwrap_or(20.0);
    let lh = first_char
        .map(|c| resolve_line_height(doc.computed_style(c).get("line-height"), px))
        .unwrap_or(px * 1.8);
    let advance = px + 8.0; // 4px margin either side

    let total_width = columns.len() as f32 * advance;
    let start_x = pad_x + ((content_width - total_width) / 2.0).max(0.0);
    let mut max_chars = 0usize;

    // row-reverse: the first column sits rightmost
    for (i, &column) in columns.iter().enumerate() {
        let chars: Vec<String> = doc
            .node(column)
            .children
            .iter()
            .map(|&span| doc.node(span).text.clone())
            .collect();
        max_chars = max_chars.max(chars.len());
        let x = start_x + (columns.len() - 1 - i) as f32 * advance;
        let height = chars.len() as f32 * lh;
        layout.blocks.push(TextBlock {
            rect: Rect { x: x + 4.0, y, width: px, height },
            lines: chars,
            px,
            line_height: lh,
            color: first_char.map(|c| text_color(doc, c)).unwrap_or(FALLBACK_TEXT),
            centered: true,
        });
    }
    max_chars as f32 * lh
}

fn layout_book_info(
    doc: &Document,
    info: NodeId,
    pad_x: f32,
    content_width: f32,
    y: f32,
    layout: &mut CardLayout,
) -> f32 {
    let mut parts = Vec::new();
    for &child in &doc.node(info).children {
        if doc.computed_style(child).get("display") == Some("none") {
            continue;
        }
        let text = doc.node(child).text.trim().to_string();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    if parts.is_empty() {
        return 0.0;
    }
    let px = font_size(doc, info, 13.0);
    let lh = px * 1.4;
    layout.blocks.push(TextBlock {
        rect: Rect { x: pad_x, y, width: content_width, height: lh },
        lines: vec![parts.join(" · ")],
        px,
        line_height: lh,
        color: text_color(doc, info),
        centered: true,
    });
    lh
}

fn layout_single_line(
    doc: &Document,
    node: NodeId,
    pad_x: f32,
    content_width: f32,
    y: f32,
    layout: &mut CardLayout,
    fallback_px: f32,
) -> f32 {
    let text = doc.node(node).text.clone();
    if text.trim().is_empty() {
        return 0.0;
    }
    let px = font_size(doc, node, fallback_px);
    let lh = px * 1.4;
    layout.blocks.push(TextBlock {
        rect: Rect { x: pad_x, y, width: content_width, height: lh },
        lines: vec![text],
        px,
        line_height: lh,
        color: text_color(doc, node),
        centered: true,
    });
    lh
}

fn layout_seal(
    doc: &Document,
    seal_box: NodeId,
    pad_x: f32,
    content_width: f32,
    y: f32,
    layout: &mut CardLayout,
) -> f32 {
    let seal = match doc.query_selector(seal_box, ".preview-seal") {
        Some(seal) if doc.computed_style(seal).get("display") != Some("none") => seal,
        _ => return 0.0,
    };
    let frame_color = doc
        .computed_style(seal)
        .get("color")
        .and_then(parse_color)
        .unwrap_or([198, 40, 40, 255]);
    let x = pad_x + content_width - SEAL_SIZE;
    layout.frames.push(Frame {
        rect: Rect { x, y, width: SEAL_SIZE, height: SEAL_SIZE },
        color: frame_color,
        thickness: 2.0,
    });

    let cells = doc.query_selector_all(seal, ".seal-cell");
    let positions = seal_cell_rects(x, y, cells.len());
    for (&cell, rect) in cells.iter().zip(positions) {
        let px = font_size(doc, cell, 16.0);
        let line_height = rect.height;
        layout.blocks.push(TextBlock {
            rect,
            lines: vec![doc.node(cell).text.clone()],
            px,
            line_height,
            color: frame_color,
            centered: true,
        });
    }
    SEAL_SIZE
}

/// Cell rectangles inside the seal frame for 1, 2, 3, or 4 cells.
/// Three cells reproduce the reversed-row arrangement: one full-height
/// cell on the right, the split pair stacked on the left.
fn seal_cell_rects(x: f32, y: f32, count: usize) -> Vec<Rect> {
    let s = SEAL_SIZE;
    let h = s / 2.0;
    match count {
        1 => vec![Rect { x, y, width: s, height: s }],
        2 => vec![
            Rect { x, y, width: s, height: h },
            Rect { x, y: y + h, width: s, height: h },
        ],
        3 => vec![
            Rect { x: x + h, y, width: h, height: s },
            Rect { x, y, width: h, height: h },
            Rect { x, y: y + h, width: h, height: h },
        ],
        _ => vec![
            Rect { x, y, width: h, height: h },
            Rect { x: x + h, y, width: h, height: h },
            Rect { x, y: y + h, width: h, height: h },
            Rect { x: x + h, y: y + h, width: h, height: h },
        ],
    }
}
