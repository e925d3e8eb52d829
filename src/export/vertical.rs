//! Vertical (right-to-left column) re-layout of the quote text
//!
//! Re-flows the horizontal text node into top-to-bottom columns ordered
//! right to left, the traditional vertical typesetting order: the first
//! `chars_per_column` characters fill the rightmost column. Operates in
//! place on a cloned card subtree.
//!
//! Not idempotent: a second invocation on the same clone inserts a second
//! column container. Callers run it at most once per cloned document;
//! the orchestrator owns that guarantee for both capture paths.

use crate::dom::{Document, NodeId};
use crate::rasterize::layout::measure_card_height;
use crate::style::{parse_px, resolve_line_height};

/// Vertical space reserved for header/footer chrome (date, book info,
/// seal) that the columns must not overlap.
const CHROME_RESERVE: f32 = 150.0;
const MIN_COLUMN_HEIGHT: f32 = 300.0;
const FALLBACK_CHARS_PER_COLUMN: usize = 10;

/// Re-flow the card's text content into right-to-left columns.
/// A card without a body or text node is left untouched.
pub fn apply_vertical_layout(doc: &mut Document, card: NodeId) {
    let card_body = match doc.query_selector(card, ".card-body") {
        Some(body) => body,
        None => return,
    };
    let text = match doc.query_selector(card, ".text-content") {
        Some(text) => text,
        None => return,
    };

    let computed = doc.computed_style(text);
    let font_size = computed.get("font-size").and_then(parse_px).unwrap_or(20.0);
    let font_family = computed.get("font-family").unwrap_or("inherit").to_string();
    let color = computed.get("color").unwrap_or("#333").to_string();
    let line_height = resolve_line_height(computed.get("line-height"), font_size);

    let raw = doc.text_content(text);
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = normalized.chars().collect();

    let card_height = measure_card_height(doc, card);
    let max_height = (card_height - CHROME_RESERVE).max(MIN_COLUMN_HEIGHT);
    let per_column = if line_height > 0.0 {
        let n = (max_height / line_height).floor() as usize;
        if n == 0 {
            FALLBACK_CHARS_PER_COLUMN
        } else {
            n
        }
    } else {
        FALLBACK_CHARS_PER_COLUMN
    };

    let container = doc.create_element("div");
    {
        let el = doc.node_mut(container);
        el.classes.push("vertical-columns".into());
        el.style.set("display", "flex");
        el.style.set("flex-direction", "row-reverse");
        el.style.set("justify-content", "center");
        el.style.set("align-items", "flex-start");
        el.style.set("width", "100%");
        el.style.set("height", "100%");
        el.style.set("position", "relative");
    }

    for chunk in chars.chunks(per_column) {
        let column = doc.create_element("div");
        {
            let el = doc.node_mut(column);
            el.classes.push("vertical-column".into());
            el.style.set("display", "flex");
            el.style.set("flex-direction", "column");
            el.style.set("align-items", "center");
            el.style.set("margin", "0 4px");
        }
        for &c in chunk {
            let span = doc.create_element("span");
            {
                let el = doc.node_mut(span);
                el.text = c.to_string();
                el.style.set("display", "block");
                el.style.set("font-size", &format!("{}px", font_size));
                el.style.set("font-family", &font_family);
                el.style.set("line-height", &format!("{}px", line_height));
                el.style.set("color", &color);
                el.style.set("text-align", "center");
                el.style.set("min-width", "1em");
            }
            doc.append_child(column, span);
        }
        doc.append_child(container, column);
    }

    // hide the horizontal node but keep it findable for later inspection
    doc.node_mut(text).style.set("display", "none");
    doc.insert_before(card_body, container, text);
    doc.node_mut(card_body).style.set("align-items", "center");

    // quote marks leave the flow once the text is column-broken
    if let Some(start) = doc.query_selector(card, ".quote-mark.start") {
        let style = &mut doc.node_mut(start).style;
        style.set("position", "absolute");
        style.set("top", "10px");
        style.set("right", "20px");
        style.set("align-self", "auto");
        style.set("margin", "0");
    }
    if let Some(end) = doc.query_selector(card, ".quote-mark.end") {
        let style = &mut doc.node_mut(end).style;
        style.set("position", "absolute");
        style.set("bottom", "10px");
        style.set("left", "20px");
        style.set("align-self", "auto");
        style.set("margin", "0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::build_card;
    use crate::state::{AppState, CardContent, Layout};
    use crate::theme::ConfigSet;
    use crate::Viewport;

    fn vertical_card(quote: &str) -> (Document, NodeId) {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let content = CardContent { quote: quote.into(), ..Default::default() };
        let mut state = AppState::default();
        state.layout = Layout::Vertical;
        let card = build_card(&mut doc, &content, &state, &ConfigSet::defaults());
        (doc, card)
    }

    fn column_texts(doc: &Document, card: NodeId) -> Vec<String> {
        let container = doc.query_selector(card, ".vertical-columns").expect("columns");
        doc.node(container)
            .children
            .iter()
            .map(|&col| doc.text_content(col))
            .collect()
    }

    #[test]
    fn distributes_characters_across_columns() {
        // 25 characters at the default metrics: line-height 36px and a
        // 300px budget give 8 chars per column -> ceil(25/8) = 4 columns
        let quote: String = ('a'..='y').collect();
        let (mut doc, card) = vertical_card(&quote);
        apply_vertical_layout(&mut doc, card);

        let columns = column_texts(&doc, card);
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0], "abcdefgh"); // first chunk = rightmost column
        assert_eq!(columns[1], "ijklmnop");
        assert_eq!(columns[3], "y");
        for column in &columns {
            assert!(column.chars().count() <= 8);
        }
    }

    #[test]
    fn whitespace_is_collapsed_before_splitting() {
        let (mut doc, card) = vertical_card("天地\n  玄黄   宇宙");
        apply_vertical_layout(&mut doc, card);
        let joined = column_texts(&doc, card).join("");
        assert_eq!(joined, "天地 玄黄 宇宙");
    }

    #[test]
    fn original_text_node_is_hidden_not_removed() {
        let (mut doc, card) = vertical_card("字字字");
        apply_vertical_layout(&mut doc, card);
        let text = doc.query_selector(card, ".text-content").expect("still present");
        assert_eq!(doc.node(text).style.get("display"), Some("none"));

        // the container sits immediately before the hidden node
        let body = doc.query_selector(card, ".card-body").unwrap();
        let children = &doc.node(body).children;
        let container = doc.query_selector(card, ".vertical-columns").unwrap();
        let container_pos = children.iter().position(|&c| c == container).unwrap();
        let text_pos = children.iter().position(|&c| c == text).unwrap();
        assert_eq!(container_pos + 1, text_pos);
    }

    #[test]
    fn quote_marks_move_to_absolute_corners() {
        let (mut doc, card) = vertical_card("引文");
        apply_vertical_layout(&mut doc, card);
        let start = doc.query_selector(card, ".quote-mark.start").unwrap();
        assert_eq!(doc.node(start).style.get("position"), Some("absolute"));
        assert_eq!(doc.node(start).style.get("right"), Some("20px"));
        let end = doc.query_selector(card, ".quote-mark.end").unwrap();
        assert_eq!(doc.node(end).style.get("bottom"), Some("10px"));
        assert_eq!(doc.node(end).style.get("left"), Some("20px"));
    }

    #[test]
    fn double_invocation_duplicates_columns_by_design() {
        let (mut doc, card) = vertical_card("不变式");
        apply_vertical_layout(&mut doc, card);
        apply_vertical_layout(&mut doc, card);
        let containers = doc.query_selector_all(card, ".vertical-columns");
        assert_eq!(containers.len(), 2);
    }

    #[test]
    fn card_without_text_is_left_untouched() {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let bare = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, bare);
        apply_vertical_layout(&mut doc, bare);
        assert!(doc.query_selector(bare, ".vertical-columns").is_none());
    }
}
