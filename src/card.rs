//! Card document construction
//!
//! Builds the preview subtree (quote marks, text content, book info, seal
//! box, date stamp) inside a preview-area/preview-wrapper scaffold, and
//! installs the stylesheet the capture pipeline later has to fight: base
//! rules, per-theme rules generated from the catalog, and the
//! mobile-viewport media rules.

use chrono::{Datelike, Local};
use scraper::Html;

use crate::dom::{media_rule, rule, Document, NodeId};
use crate::platform::MOBILE_BREAKPOINT;
use crate::state::{AppState, CardContent, Layout};
use crate::theme::ConfigSet;

pub const CARD_ID: &str = "card-preview";

/// Build the full preview scaffold and return the card node
pub fn build_card(
    doc: &mut Document,
    content: &CardContent,
    state: &AppState,
    configs: &ConfigSet,
) -> NodeId {
    install_stylesheet(doc, configs);

    let area = doc.create_element("div");
    doc.node_mut(area).classes.push("preview-area".into());
    let body = doc.body();
    doc.append_child(body, area);

    let wrapper = doc.create_element("div");
    doc.node_mut(wrapper).classes.push("preview-wrapper".into());
    doc.append_child(area, wrapper);

    let card = doc.create_element("div");
    {
        let el = doc.node_mut(card);
        el.id = Some(CARD_ID.into());
        el.classes.push("card".into());
        el.classes.push(state.theme.clone());
        if state.layout == Layout::Vertical {
            el.classes.push("vertical-mode".into());
        }
        el.style.set("width", &format!("{}px", state.card_width));
    }
    doc.append_child(wrapper, card);

    let card_body = doc.create_element("div");
    doc.node_mut(card_body).classes.push("card-body".into());
    doc.append_child(card, card_body);

    let start_mark = doc.create_element("span");
    {
        let el = doc.node_mut(start_mark);
        el.classes.push("quote-mark".into());
        el.classes.push("start".into());
        el.text = "\u{201c}".into();
    }
    doc.append_child(card_body, start_mark);

    let text = doc.create_element("div");
    {
        let el = doc.node_mut(text);
        el.classes.push("text-content".into());
        el.text = normalize_quote_markup(&content.quote);
        el.style.set("font-family", &state.font);
        el.style.set("font-size", &format!("{}px", state.font_size));
        el.style.set("color", &state.font_color);
        el.style.set("text-align", state.text_align.as_css());
    }
    doc.append_child(card_body, text);

    let end_mark = doc.create_element("span");
    {
        let el = doc.node_mut(end_mark);
        el.classes.push("quote-mark".into());
        el.classes.push("end".into());
        el.text = "\u{201d}".into();
    }
    doc.append_child(card_body, end_mark);

    let book_info = doc.create_element("div");
    doc.node_mut(book_info).classes.push("book-info".into());
    doc.append_child(card_body, book_info);

    let book = doc.create_element("span");
    {
        let el = doc.node_mut(book);
        el.classes.push("preview-book".into());
        el.text = content.book.clone();
    }
    doc.append_child(book_info, book);

    let author = doc.create_element("span");
    {
        let el = doc.node_mut(author);
        el.classes.push("preview-author".into());
        el.text = content.author.clone();
    }
    doc.append_child(book_info, author);

    if content.book.trim().is_empty() && content.author.trim().is_empty() {
        doc.node_mut(book_info).style.set("display", "none");
    }

    let seal_box = doc.create_element("div");
    doc.node_mut(seal_box).classes.push("seal-box".into());
    doc.append_child(card_body, seal_box);

    let seal = doc.create_element("div");
    doc.node_mut(seal).classes.push("preview-seal".into());
    doc.append_child(seal_box, seal);
    update_seal(doc, seal, &content.seal, &state.seal_font);

    let date = doc.create_element("div");
    {
        let el = doc.node_mut(date);
        el.classes.push("card-date".into());
        el.text = today_stamp();
    }
    doc.append_child(card_body, date);

    card
}

/// Base rules, per-theme rules from the catalog, and the mobile-viewport
/// transforms the clone sanitizer exists to neutralize.
pub fn install_stylesheet(doc: &mut Document, configs: &ConfigSet) {
    doc.add_rule(rule(
        ".preview-area",
        &[
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("padding", "48px"),
        ],
    ));
    doc.add_rule(rule(
        ".card",
        &[
            ("padding", "40px 32px"),
            ("color", "#333333"),
            ("background-color", "#ffffff"),
            ("border-radius", "8px"),
            ("box-shadow", "0 4px 24px rgba(0, 0, 0, 0.1)"),
        ],
    ));
    doc.add_rule(rule(
        ".text-content",
        &[("font-size", "20px"), ("line-height", "1.8")],
    ));
    doc.add_rule(rule(".quote-mark", &[("font-size", "48px"), ("opacity", "0.35")]));
    doc.add_rule(rule(".book-info", &[("font-size", "13px"), ("color", "#666666")]));
    doc.add_rule(rule(".card-date", &[("font-size", "12px"), ("color", "#999999")]));
    doc.add_rule(rule(
        ".preview-seal",
        &[
            ("border", "2px solid #c62828"),
            ("color", "#c62828"),
            ("width", "48px"),
            ("height", "48px"),
            ("line-height", "1"),
        ],
    ));

    for theme in &configs.themes {
        let selector = format!(".{}", theme.id);
        let mut decls: Vec<(&str, String)> = Vec::new();
        if let Some(background) = &theme.background {
            decls.push(("background", background.clone()));
        } else if let Some(color) = &theme.color {
            decls.push(("background-color", color.clone()));
        }
        if let Some(border) = &theme.border {
            decls.push(("border", format!("1px solid {}", border)));
        }
        let pairs: Vec<(&str, &str)> =
            decls.iter().map(|(p, v)| (*p, v.as_str())).collect();
        doc.add_rule(rule(&selector, &pairs));
    }

    // Mobile preview hacks. These scale and pin the live preview; a clone
    // rendered with a narrow viewport picks them up and would corrupt the
    // capture unless sanitized.
    doc.add_rule(media_rule(
        ".preview-area",
        MOBILE_BREAKPOINT,
        &[
            ("transform", "scale(0.4)"),
            ("transform-origin", "top left"),
            ("position", "fixed"),
            ("overflow", "hidden"),
            ("padding", "0"),
        ],
    ));
    doc.add_rule(media_rule(
        "#card-preview",
        MOBILE_BREAKPOINT,
        &[("transform", "scale(0.9)"), ("max-width", "92vw"), ("margin", "0 auto")],
    ));
}

/// Rebuild the seal element for the given text.
///
/// One character renders as a single centered span, two stack in a
/// column, three use a reversed row with one full-height cell and a split
/// two-row cell, and four or more fill a 2x2 grid with the first four
/// characters. An empty seal hides the seal box.
pub fn update_seal(doc: &mut Document, seal: NodeId, text: &str, seal_font: &str) {
    for child in doc.node(seal).children.clone() {
        doc.detach(child);
    }

    let seal_box = doc.node(seal).parent;
    if text.trim().is_empty() {
        doc.node_mut(seal).style.set("display", "none");
        if let Some(seal_box) = seal_box {
            doc.node_mut(seal_box).style.set("display", "none");
        }
        return;
    }
    doc.node_mut(seal).style.set("display", "flex");
    doc.node_mut(seal).style.set("font-family", seal_font);
    if let Some(seal_box) = seal_box {
        doc.node_mut(seal_box).style.set("display", "flex");
    }

    let chars: Vec<char> = text.chars().collect();
    match chars.len() {
        1 => {
            let span = seal_cell(doc, chars[0], 28.0);
            doc.node_mut(span).style.set("display", "block");
            doc.append_child(seal, span);
        }
        2 => {
            let column = doc.create_element("div");
            {
                let el = doc.node_mut(column);
                el.classes.push("seal-column".into());
                el.style.set("display", "flex");
                el.style.set("flex-direction", "column");
                el.style.set("align-items", "center");
            }
            doc.append_child(seal, column);
            for &c in &chars[..2] {
                let span = seal_cell(doc, c, 18.0);
                doc.append_child(column, span);
            }
        }
        3 => {
            let row = doc.create_element("div");
            {
                let el = doc.node_mut(row);
                el.classes.push("seal-row".into());
                el.style.set("display", "flex");
                el.style.set("flex-direction", "row-reverse");
                el.style.set("height", "100%");
                el.style.set("width", "100%");
            }
            doc.append_child(seal, row);

            let full = seal_cell(doc, chars[0], 16.0);
            doc.node_mut(full).style.set("height", "100%");
            doc.append_child(row, full);

            let split = doc.create_element("div");
            {
                let el = doc.node_mut(split);
                el.classes.push("seal-split".into());
                el.style.set("display", "flex");
                el.style.set("flex-direction", "column");
                el.style.set("height", "100%");
            }
            doc.append_child(row, split);
            for &c in &chars[1..3] {
                let cell = seal_cell(doc, c, 16.0);
                doc.append_child(split, cell);
            }
        }
        _ => {
            let grid = doc.create_element("div");
            {
                let el = doc.node_mut(grid);
                el.classes.push("seal-grid".into());
                el.style.set("display", "grid");
                el.style.set("grid-template-columns", "1fr 1fr");
                el.style.set("grid-template-rows", "1fr 1fr");
                el.style.set("width", "100%");
                el.style.set("height", "100%");
            }
            doc.append_child(seal, grid);
            // only the first four characters participate
            for &c in chars.iter().take(4) {
                let cell = seal_cell(doc, c, 16.0);
                doc.append_child(grid, cell);
            }
        }
    }
}

fn seal_cell(doc: &mut Document, c: char, px: f32) -> NodeId {
    let span = doc.create_element("span");
    {
        let el = doc.node_mut(span);
        el.classes.push("seal-cell".into());
        el.text = c.to_string();
        el.style.set("font-size", &format!("{}px", px));
        el.style.set("text-align", "center");
    }
    span
}

/// Normalize user-provided quote markup to plain text.
///
/// `<br>` variants become newlines; any other inline tags are stripped by
/// collecting the fragment's text.
pub fn normalize_quote_markup(raw: &str) -> String {
    let with_breaks = raw
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n");
    if !with_breaks.contains('<') {
        return with_breaks;
    }
    let fragment = Html::parse_fragment(&with_breaks);
    fragment.root_element().text().collect::<String>()
}

/// Today as `YYYY.MM.DD`, the card's date stamp format
pub fn today_stamp() -> String {
    let now = Local::now();
    format!("{:04}.{:02}.{:02}", now.year(), now.month(), now.day())
}
