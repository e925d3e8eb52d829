//! SVG export: DOM serialization inside a `foreignObject`
//!
//! Bypasses rasterization entirely. The card subtree is cloned, sized to
//! the configured width with a proportional height, given the computed
//! padding/background/color/font properties inline, and wrapped in an SVG
//! `foreignObject`.

use crate::dom::{Document, NodeId};
use crate::export::encode::{filename, now_ms, ExportArtifact};
use crate::rasterize::layout::measure_card_height;
use crate::state::{AppState, ExportFormat};
use crate::style::parse_px;

/// Serialize the card as a standalone SVG document
pub fn export_svg(doc: &Document, card: NodeId, state: &AppState) -> String {
    let computed = doc.computed_style(card);
    let current_width = doc
        .node(card)
        .style
        .get("width")
        .and_then(parse_px)
        .unwrap_or(state.card_width as f32);
    let current_height = measure_card_height(doc, card).max(1.0);
    let target_width = state.card_width as f32;
    let target_height = current_height * (target_width / current_width.max(1.0));

    // work on a clone; the live card keeps its styling untouched
    let mut clone = doc.clone_detached(doc.viewport);
    let card = clone
        .get_element_by_id(crate::card::CARD_ID)
        .unwrap_or(card);
    {
        let style = &mut clone.node_mut(card).style;
        style.set("width", &format!("{}px", target_width));
        style.set("height", "auto");
        style.set("margin", "0");
        for property in ["padding", "background-color", "color", "font-family", "font-size"] {
            if let Some(value) = computed.get(property) {
                style.set(property, value);
            }
        }
    }
    clone
        .node_mut(card)
        .attrs
        .push(("xmlns".to_string(), "http://www.w3.org/1999/xhtml".to_string()));

    let markup = clone.serialize(card);
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\">",
            "<foreignObject width=\"100%\" height=\"100%\">{body}</foreignObject>",
            "</svg>"
        ),
        w = target_width,
        h = target_height,
        body = markup,
    )
}

/// The SVG export artifact with the standard filename pattern
pub fn svg_artifact(doc: &Document, card: NodeId, state: &AppState) -> ExportArtifact {
    let svg = export_svg(doc, card, state);
    ExportArtifact {
        filename: filename(ExportFormat::Svg, now_ms()),
        mime: ExportFormat::Svg.mime(),
        bytes: svg.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::build_card;
    use crate::state::CardContent;
    use crate::theme::ConfigSet;
    use crate::Viewport;

    fn card_doc(card_width: u32) -> (Document, NodeId, AppState) {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let content = CardContent {
            quote: "山不在高，有仙则名。".into(),
            book: "陋室铭".into(),
            author: "刘禹锡".into(),
            seal: String::new(),
        };
        let mut state = AppState::default();
        state.card_width = card_width;
        let card = build_card(&mut doc, &content, &state, &ConfigSet::defaults());
        (doc, card, state)
    }

    #[test]
    fn svg_wraps_the_card_in_a_foreign_object() {
        let (doc, card, state) = card_doc(400);
        let svg = export_svg(&doc, card, &state);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("<foreignObject"));
        assert!(svg.contains("card-preview"));
        assert!(svg.contains("山不在高"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn svg_is_sized_to_the_configured_width() {
        let (doc, card, state) = card_doc(480);
        let svg = export_svg(&doc, card, &state);
        assert!(svg.contains("width=\"480\""));
    }

    #[test]
    fn svg_export_leaves_the_live_card_untouched() {
        let (doc, card, state) = card_doc(600);
        let before = doc.node(card).style.to_css();
        let _ = export_svg(&doc, card, &state);
        assert_eq!(doc.node(card).style.to_css(), before);
    }

    #[test]
    fn artifact_has_the_svg_mime_and_extension() {
        let (doc, card, state) = card_doc(400);
        let artifact = svg_artifact(&doc, card, &state);
        assert_eq!(artifact.mime, "image/svg+xml");
        assert!(artifact.filename.ends_with(".svg"));
        assert!(String::from_utf8(artifact.bytes).unwrap().contains("foreignObject"));
    }
}
