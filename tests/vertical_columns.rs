use bookcard::card::build_card;
use bookcard::dom::{Document, NodeId};
use bookcard::export::vertical::apply_vertical_layout;
use bookcard::{AppState, CardContent, ConfigSet, Layout, Viewport};

/// Build a card whose text metrics pin chars-per-column to exactly 10:
/// line-height 30px against the minimum 300px column budget.
fn card_with_quote(quote: &str) -> (Document, NodeId) {
    let mut doc = Document::new(Viewport { width: 1280, height: 720 });
    let content = CardContent { quote: quote.into(), ..Default::default() };
    let mut state = AppState::default();
    state.layout = Layout::Vertical;
    let card = build_card(&mut doc, &content, &state, &ConfigSet::defaults());
    let text = doc.query_selector(card, ".text-content").unwrap();
    doc.node_mut(text).style.set("line-height", "30px");
    (doc, card)
}

fn column_texts(doc: &Document, card: NodeId) -> Vec<String> {
    let container = doc.query_selector(card, ".vertical-columns").expect("columns");
    doc.node(container)
        .children
        .iter()
        .map(|&column| doc.text_content(column))
        .collect()
}

#[test]
fn twenty_five_chars_at_ten_per_column_gives_three_columns() {
    let quote: String = ('A'..='Y').collect(); // 25 characters
    let (mut doc, card) = card_with_quote(&quote);
    apply_vertical_layout(&mut doc, card);

    let columns = column_texts(&doc, card);
    let counts: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    assert_eq!(counts, vec![10, 10, 5]);
    // the rightmost (first) column holds the first ten characters
    assert_eq!(columns[0], "ABCDEFGHIJ");
    assert_eq!(columns[2], "UVWXY");
}

#[test]
fn column_count_is_ceil_of_length_over_capacity() {
    for len in [1usize, 9, 10, 11, 30, 31] {
        let quote = "字".repeat(len);
        let (mut doc, card) = card_with_quote(&quote);
        apply_vertical_layout(&mut doc, card);
        let columns = column_texts(&doc, card);
        let expected = len.div_ceil(10);
        assert_eq!(columns.len(), expected, "len={}", len);
        for column in &columns {
            assert!(column.chars().count() <= 10);
        }
        // concatenating in document order reproduces the input
        assert_eq!(columns.join(""), quote);
    }
}

#[test]
fn characters_read_top_to_bottom_within_a_column() {
    let (mut doc, card) = card_with_quote("一二三");
    apply_vertical_layout(&mut doc, card);
    let container = doc.query_selector(card, ".vertical-columns").unwrap();
    let column = doc.node(container).children[0];
    let spans: Vec<String> = doc
        .node(column)
        .children
        .iter()
        .map(|&span| doc.node(span).text.clone())
        .collect();
    assert_eq!(spans, vec!["一", "二", "三"]);
}

#[test]
fn degenerate_line_height_falls_back_to_ten_per_column() {
    let (mut doc, card) = card_with_quote(&"字".repeat(12));
    let text = doc.query_selector(card, ".text-content").unwrap();
    doc.node_mut(text).style.set("line-height", "100000px");
    apply_vertical_layout(&mut doc, card);
    // floor(300 / 100000) == 0 -> the minimum of 10 kicks in
    let columns = column_texts(&doc, card);
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].chars().count(), 10);
}
