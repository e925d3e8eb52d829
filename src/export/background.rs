//! Effective background resolution for a themed card
//!
//! Theme metadata wins over computed style: a gradient `background` takes
//! both the background and background-image slots outright, a solid
//! `color` fills background-color, and only a theme miss falls back to the
//! element's computed style. Text color always comes from computed style.
//! Pure over its inputs; never errors.

use crate::dom::{Document, NodeId};
use crate::style::is_transparent;
use crate::theme::{ConfigSet, ThemeDescriptor};

/// Derived, per-capture background facts. Recomputed on every
/// export/thumbnail cycle and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct CardBackgroundInfo {
    pub background: Option<String>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
    /// Resolved text color (always computed style)
    pub color: Option<String>,
    pub theme: Option<ThemeDescriptor>,
}

/// Resolve the card's effective background against the active theme
pub fn resolve_card_background(
    doc: &Document,
    card: NodeId,
    active_theme_id: &str,
    registry: &ConfigSet,
) -> CardBackgroundInfo {
    let theme = registry.find_theme(active_theme_id).cloned();
    let computed = doc.computed_style(card);

    let (background, background_color, background_image) = match &theme {
        Some(t) if t.background.is_some() => {
            let gradient = t.background.clone();
            (gradient.clone(), None, gradient)
        }
        Some(t) if t.color.is_some() => (
            computed.get("background").map(str::to_string),
            t.color.clone(),
            computed.get("background-image").map(str::to_string),
        ),
        _ => (
            computed.get("background").map(str::to_string),
            computed.get("background-color").map(str::to_string),
            computed.get("background-image").map(str::to_string),
        ),
    };

    CardBackgroundInfo {
        background,
        background_color,
        background_image,
        color: computed.get("color").map(str::to_string),
        theme,
    }
}

/// The canvas background-color option for a capture.
///
/// `None` when the theme carries a gradient (the gradient must render
/// unoccluded) or a background image is present; otherwise the resolved
/// solid color, or `None` when there is none worth filling.
pub fn background_color_for_capture(
    info: &CardBackgroundInfo,
    theme: Option<&ThemeDescriptor>,
) -> Option<String> {
    if theme.map(|t| t.background.is_some()).unwrap_or(false) {
        return None;
    }
    if let Some(image) = &info.background_image {
        if image != "none" && !image.is_empty() {
            return None;
        }
    }
    info.background_color
        .as_ref()
        .filter(|color| !is_transparent(color))
        .cloned()
}
