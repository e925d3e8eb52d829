//! Inline style maps, selectors, and rule matching
//!
//! The card document carries CSS-like styling in a deliberately small form:
//! inline declaration maps (with `!important` flags), flat rules keyed by a
//! simple selector (`#id`, `.class` compounds, or a tag name), and an
//! optional `max-width` media condition evaluated against the owning
//! document's viewport. This is enough to reproduce the cascade the capture
//! pipeline has to fight: base rules, mobile media-query rules, inline
//! styles, and `!important` overrides.

use std::collections::BTreeMap;

/// A single declaration value with its priority flag
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDecl {
    pub value: String,
    pub important: bool,
}

/// An ordered property -> declaration map
///
/// Ordering is stable (BTreeMap) so serialized markup and computed-style
/// dumps are deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    decls: BTreeMap<String, StyleDecl>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property without the important flag
    pub fn set(&mut self, property: &str, value: &str) {
        self.decls.insert(
            property.to_string(),
            StyleDecl { value: value.to_string(), important: false },
        );
    }

    /// Set a property with the important flag (the `!important` analog)
    pub fn set_important(&mut self, property: &str, value: &str) {
        self.decls.insert(
            property.to_string(),
            StyleDecl { value: value.to_string(), important: true },
        );
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls.get(property).map(|d| d.value.as_str())
    }

    pub fn decl(&self, property: &str) -> Option<&StyleDecl> {
        self.decls.get(property)
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.decls.remove(property).map(|d| d.value)
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleDecl)> {
        self.decls.iter()
    }

    /// Apply `other` over `self`, honoring important flags: an important
    /// declaration is only replaced by another important one.
    pub fn apply(&mut self, other: &StyleMap) {
        for (prop, decl) in other.iter() {
            let keep = self
                .decls
                .get(prop)
                .map(|cur| cur.important && !decl.important)
                .unwrap_or(false);
            if !keep {
                self.decls.insert(prop.clone(), decl.clone());
            }
        }
    }

    /// Render as an inline `style` attribute value
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (prop, decl) in self.decls.iter() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(prop);
            out.push_str(": ");
            out.push_str(&decl.value);
            if decl.important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }
}

/// A minimal selector: `#id`, a `.class` compound, or a bare tag name
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Id(String),
    Classes(Vec<String>),
    Tag(String),
}

impl Selector {
    /// Parse a selector string. Compound class selectors such as
    /// `.quote-mark.start` are supported; combinators are not.
    pub fn parse(input: &str) -> Selector {
        let input = input.trim();
        if let Some(id) = input.strip_prefix('#') {
            Selector::Id(id.to_string())
        } else if input.starts_with('.') {
            let classes = input
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
            Selector::Classes(classes)
        } else {
            Selector::Tag(input.to_string())
        }
    }

    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        match self {
            Selector::Id(want) => id == Some(want.as_str()),
            Selector::Classes(want) => want.iter().all(|c| classes.iter().any(|have| have == c)),
            Selector::Tag(want) => tag == want,
        }
    }
}

/// Media condition attached to a rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaQuery {
    /// Applies when the viewport width is at most this many pixels
    MaxWidth(u32),
}

impl MediaQuery {
    pub fn applies(&self, viewport_width: u32) -> bool {
        match self {
            MediaQuery::MaxWidth(max) => viewport_width <= *max,
        }
    }
}

/// A flat style rule: selector, declarations, optional media condition
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector: Selector,
    pub decls: StyleMap,
    pub media: Option<MediaQuery>,
}

impl StyleRule {
    pub fn new(selector: &str, decls: StyleMap) -> Self {
        StyleRule { selector: Selector::parse(selector), decls, media: None }
    }

    pub fn with_media(selector: &str, decls: StyleMap, media: MediaQuery) -> Self {
        StyleRule { selector: Selector::parse(selector), decls, media: Some(media) }
    }
}

/// Parse a CSS color into RGBA bytes.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()` and the
/// keywords `transparent`, `white`, and `black`. Anything else yields
/// `None` and callers fall back to their own defaults.
pub fn parse_color(input: &str) -> Option<[u8; 4]> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let mut out = [0u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 16 + v;
                }
                out[3] = 255;
                Some(out)
            }
            6 | 8 => {
                let mut out = [0u8, 0, 0, 255];
                for i in 0..hex.len() / 2 {
                    out[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
                }
                Some(out)
            }
            _ => None,
        };
    }
    if let Some(body) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|b| b.strip_suffix(')'))
    {
        let parts: Vec<&str> = body.split(',').map(|p| p.trim()).collect();
        if parts.len() < 3 {
            return None;
        }
        let r = parts[0].parse::<f32>().ok()?;
        let g = parts[1].parse::<f32>().ok()?;
        let b = parts[2].parse::<f32>().ok()?;
        let a = if parts.len() > 3 { parts[3].parse::<f32>().ok()? } else { 1.0 };
        return Some([r as u8, g as u8, b as u8, (a * 255.0).round() as u8]);
    }
    match s {
        "transparent" => Some([0, 0, 0, 0]),
        "white" => Some([255, 255, 255, 255]),
        "black" => Some([0, 0, 0, 255]),
        _ => None,
    }
}

/// A parsed `linear-gradient(..)` expression
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// CSS gradient angle in degrees (0 = bottom-to-top)
    pub angle_deg: f32,
    /// Color stops with positions in 0..=1
    pub stops: Vec<([u8; 4], f32)>,
}

/// Parse a `linear-gradient(<angle>deg, <color> <pos>%, ...)` expression.
///
/// Returns `None` for anything that is not a linear gradient or has fewer
/// than two parsable stops.
pub fn parse_linear_gradient(input: &str) -> Option<Gradient> {
    let s = input.trim();
    let body = s.strip_prefix("linear-gradient(")?.strip_suffix(')')?;
    let mut parts = body.split(',').map(|p| p.trim());

    let first = parts.next()?;
    let (angle_deg, first_stop) = match first.strip_suffix("deg") {
        Some(angle) => (angle.trim().parse::<f32>().ok()?, None),
        None => (180.0, Some(first)),
    };

    let mut stops = Vec::new();
    for part in first_stop.into_iter().chain(parts) {
        let mut tokens = part.split_whitespace();
        let color = parse_color(tokens.next()?)?;
        let pos = tokens
            .next()
            .and_then(|p| p.strip_suffix('%'))
            .and_then(|p| p.parse::<f32>().ok())
            .map(|p| p / 100.0);
        stops.push((color, pos));
    }
    if stops.len() < 2 {
        return None;
    }

    // distribute unpositioned stops evenly
    let last = stops.len() - 1;
    let resolved = stops
        .iter()
        .enumerate()
        .map(|(i, &(color, pos))| {
            let p = pos.unwrap_or(i as f32 / last as f32);
            (color, p.clamp(0.0, 1.0))
        })
        .collect();
    Some(Gradient { angle_deg, stops: resolved })
}

/// True when the value denotes a fully transparent background
pub fn is_transparent(value: &str) -> bool {
    matches!(parse_color(value), Some([_, _, _, 0])) || value.trim() == "none"
}

/// Parse a pixel length such as `20px` or a bare number
pub fn parse_px(value: &str) -> Option<f32> {
    let v = value.trim().trim_end_matches("px").trim();
    v.parse::<f32>().ok()
}

/// Resolve a line-height value against a font size.
///
/// Pixel values pass through; unitless multipliers scale the font size;
/// anything unparsable falls back to 1.8em (the card's base leading).
pub fn resolve_line_height(value: Option<&str>, font_size: f32) -> f32 {
    match value {
        Some(v) if v.trim().ends_with("px") => {
            parse_px(v).unwrap_or(font_size * 1.8)
        }
        Some(v) => match v.trim().parse::<f32>() {
            Ok(mult) => font_size * mult,
            Err(_) => font_size * 1.8,
        },
        None => font_size * 1.8,
    }
}
