//! Clone sanitation for capture
//!
//! The rasterizer's clone evaluates media queries against a viewport, not
//! against the live element's rendered context, so a clone can pick up
//! mobile transform/positioning rules even when the live page is
//! desktop-sized (and vice versa). This pass pins the preview scaffold to
//! capture-safe values with maximum priority, re-applies the resolved
//! background (the library's style cloning can drop computed gradients),
//! and forces visibility so a card mid-transition still rasterizes.
//!
//! Called exactly once per capture, inside the rasterizer's clone hook.

use crate::dom::{Document, NodeId};
use crate::export::background::CardBackgroundInfo;
use crate::style::{is_transparent, StyleMap, StyleRule};
use crate::theme::ThemeDescriptor;

const CAPTURE_SAFE: &[(&str, &str)] = &[
    ("transform", "none"),
    ("transform-origin", "center center"),
    ("position", "relative"),
    ("width", "auto"),
    ("height", "auto"),
    ("min-height", "auto"),
    ("max-height", "none"),
    ("padding", "0"),
    ("margin", "0"),
    ("left", "auto"),
    ("top", "auto"),
    ("right", "auto"),
    ("bottom", "auto"),
    ("z-index", "auto"),
    ("border", "none"),
    ("border-radius", "0"),
    ("box-shadow", "none"),
    ("opacity", "1"),
    ("overflow", "visible"),
];

fn important_rule(selector: &str, decls: &[(&str, &str)]) -> StyleRule {
    let mut map = StyleMap::new();
    for (prop, value) in decls {
        map.set_important(prop, value);
    }
    StyleRule::new(selector, map)
}

/// Neutralize viewport- and animation-dependent styling on a cloned
/// document so rasterization is consistent regardless of the live page's
/// responsive state.
pub fn sanitize_clone(
    doc: &mut Document,
    info: &CardBackgroundInfo,
    theme: Option<&ThemeDescriptor>,
    font_color: Option<&str>,
    card_width: u32,
) {
    // Priority override block: beats base rules, the mobile media-query
    // rules, and any transitional inline styles.
    let mut area_decls: Vec<(&str, &str)> = CAPTURE_SAFE.to_vec();
    area_decls.push(("background", "transparent"));
    area_decls.push(("display", "flex"));
    area_decls.push(("align-items", "flex-start"));
    area_decls.push(("justify-content", "center"));
    doc.add_rule(important_rule(".preview-area", &area_decls));
    doc.add_rule(important_rule(
        ".preview-wrapper",
        &[
            ("transform", "none"),
            ("transform-origin", "center center"),
            ("width", "100%"),
            ("max-width", "none"),
            ("padding", "0"),
            ("margin", "0"),
        ],
    ));
    doc.add_rule(important_rule(
        "#card-preview",
        &[
            ("transform", "none"),
            ("position", "relative"),
            ("margin", "0 auto"),
            ("max-width", "none"),
            ("box-shadow", "none"),
        ],
    ));

    let card = match doc.get_element_by_id(crate::card::CARD_ID) {
        Some(card) => card,
        None => return,
    };

    apply_background(doc, card, info, theme);

    // user-chosen text color lands on the text node; otherwise the
    // resolved computed color is pinned on the card
    if let Some(color) = font_color {
        if let Some(text) = doc.query_selector(card, ".text-content") {
            doc.node_mut(text).style.set("color", color);
        }
    } else if let Some(color) = &info.color {
        doc.node_mut(card).style.set("color", color);
    }

    // visibility forcing for the capture heuristics
    let style = &mut doc.node_mut(card).style;
    style.set_important("display", "block");
    style.set_important("visibility", "visible");
    style.set_important("opacity", "1");
    if style.get("width").is_none() {
        style.set("width", &format!("{}px", card_width));
    }
}

fn apply_background(
    doc: &mut Document,
    card: NodeId,
    info: &CardBackgroundInfo,
    theme: Option<&ThemeDescriptor>,
) {
    if let Some(theme) = theme {
        if let Some(gradient) = &theme.background {
            let style = &mut doc.node_mut(card).style;
            style.set_important("background", gradient);
            style.set_important("background-color", "transparent");
            style.set_important("background-size", "cover");
            style.set_important("background-repeat", "no-repeat");
            style.set_important("background-position", "center");
            return;
        }
        if let Some(color) = &theme.color {
            let style = &mut doc.node_mut(card).style;
            style.set_important("background", color);
            style.set_important("background-color", color);
            return;
        }
    }
    // theme miss: fall back to whatever was resolved from computed style
    if let Some(background) = &info.background {
        if background != "none" && !is_transparent(background) {
            doc.node_mut(card).style.set_important("background", background);
        }
    }
    if let Some(color) = &info.background_color {
        if !is_transparent(color) {
            doc.node_mut(card).style.set_important("background-color", color);
        }
    }
    if let Some(image) = &info.background_image {
        if image != "none" {
            let style = &mut doc.node_mut(card).style;
            style.set_important("background-image", image);
            style.set_important("background-size", "cover");
            style.set_important("background-repeat", "no-repeat");
            style.set_important("background-position", "center");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::build_card;
    use crate::export::background::resolve_card_background;
    use crate::state::{AppState, CardContent};
    use crate::theme::ConfigSet;
    use crate::Viewport;

    fn sanitized_mobile_clone(theme_id: &str) -> (Document, NodeId) {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let mut state = AppState::default();
        state.theme = theme_id.to_string();
        let configs = ConfigSet::defaults();
        let card = build_card(&mut doc, &CardContent::default(), &state, &configs);
        let info = resolve_card_background(&doc, card, theme_id, &configs);

        // a clone carrying a phone viewport picks up the mobile rules
        let mut clone = doc.clone_detached(Viewport { width: 375, height: 667 });
        sanitize_clone(&mut clone, &info, info.theme.as_ref(), None, state.card_width);
        (clone, card)
    }

    #[test]
    fn mobile_media_rules_are_neutralized() {
        let (clone, _card) = sanitized_mobile_clone("theme-clean");
        let root = clone.body();
        let area = clone.query_selector(root, ".preview-area").unwrap();
        let area_style = clone.computed_style(area);
        assert_eq!(area_style.get("transform"), Some("none"));
        assert_eq!(area_style.get("position"), Some("relative"));
        assert_eq!(area_style.get("overflow"), Some("visible"));

        let card = clone.get_element_by_id("card-preview").unwrap();
        assert_eq!(clone.computed_style(card).get("transform"), Some("none"));
    }

    #[test]
    fn gradient_background_is_reapplied_with_priority() {
        let (clone, _) = sanitized_mobile_clone("theme-gradient-blue");
        let card = clone.get_element_by_id("card-preview").unwrap();
        let style = clone.computed_style(card);
        assert_eq!(
            style.get("background"),
            Some("linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)")
        );
        assert_eq!(style.get("background-color"), Some("transparent"));
    }

    #[test]
    fn mid_transition_opacity_is_forced_visible() {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let configs = ConfigSet::defaults();
        let card = build_card(&mut doc, &CardContent::default(), &AppState::default(), &configs);
        // a debounced update left the card half-faded
        doc.node_mut(card).style.set("opacity", "0.5");
        let info = resolve_card_background(&doc, card, "theme-clean", &configs);
        let mut clone = doc.clone_detached(doc.viewport);
        sanitize_clone(&mut clone, &info, info.theme.as_ref(), None, 400);
        let card = clone.get_element_by_id("card-preview").unwrap();
        assert_eq!(clone.computed_style(card).get("opacity"), Some("1"));
        assert_eq!(clone.computed_style(card).get("visibility"), Some("visible"));
    }

    #[test]
    fn user_font_color_lands_on_the_text_node() {
        let mut doc = Document::new(Viewport { width: 1280, height: 720 });
        let configs = ConfigSet::defaults();
        let content = CardContent { quote: "文".into(), ..Default::default() };
        let card = build_card(&mut doc, &content, &AppState::default(), &configs);
        let info = resolve_card_background(&doc, card, "theme-clean", &configs);
        let mut clone = doc.clone_detached(doc.viewport);
        sanitize_clone(&mut clone, &info, info.theme.as_ref(), Some("#c62828"), 400);
        let card = clone.get_element_by_id("card-preview").unwrap();
        let text = clone.query_selector(card, ".text-content").unwrap();
        assert_eq!(clone.node(text).style.get("color"), Some("#c62828"));
    }
}
