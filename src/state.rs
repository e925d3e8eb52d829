//! Application state and its shallow-merge update type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Font size slider bounds (px)
pub const FONT_SIZE_MIN: u32 = 14;
pub const FONT_SIZE_MAX: u32 = 32;
pub const FONT_SIZE_STEP: u32 = 2;

/// Card width slider bounds (px)
pub const CARD_WIDTH_MIN: u32 = 300;
pub const CARD_WIDTH_MAX: u32 = 600;
pub const CARD_WIDTH_STEP: u32 = 30;

/// Text flow of the card body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Horizontal,
    Vertical,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Horizontal
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "horizontal" => Ok(Layout::Horizontal),
            "vertical" => Ok(Layout::Vertical),
            other => Err(Error::ConfigError(format!("unknown layout: {}", other))),
        }
    }
}

/// Alignment of the quote text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::Justify
    }
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

impl FromStr for TextAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(TextAlign::Left),
            "center" => Ok(TextAlign::Center),
            "right" => Ok(TextAlign::Right),
            "justify" => Ok(TextAlign::Justify),
            other => Err(Error::ConfigError(format!("unknown text-align: {}", other))),
        }
    }
}

/// An output image format. `Jpg` is an accepted alias of `Jpeg`; both
/// normalize to the `jpg` file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Jpg,
    Svg,
    Webp,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg | ExportFormat::Jpg => "jpg",
            ExportFormat::Svg => "svg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg | ExportFormat::Jpg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Svg => "svg",
            ExportFormat::Webp => "webp",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" => Ok(ExportFormat::Jpeg),
            "jpg" => Ok(ExportFormat::Jpg),
            "svg" => Ok(ExportFormat::Svg),
            "webp" => Ok(ExportFormat::Webp),
            other => Err(Error::ConfigError(format!("unknown export format: {}", other))),
        }
    }
}

/// The four text fields that make up the card content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    pub quote: String,
    pub book: String,
    pub author: String,
    pub seal: String,
}

/// In-memory application state, one instance per session.
///
/// Mutated exclusively through [`AppState::update`] shallow merges so the
/// preview controller can diff against prior values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Active theme id
    pub theme: String,
    pub layout: Layout,
    /// CSS font-family value of the quote text
    pub font: String,
    /// Quote font size in px
    pub font_size: u32,
    /// Quote text color (hex)
    pub font_color: String,
    /// Card width in px
    pub card_width: u32,
    /// Preview zoom factor
    pub zoom: f32,
    /// Formats produced by an export unless overridden per call
    pub export_formats: Vec<ExportFormat>,
    /// CSS font-family value of the seal text
    pub seal_font: String,
    pub text_align: TextAlign,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            theme: "theme-clean".to_string(),
            layout: Layout::Horizontal,
            font: "'Noto Serif SC', serif".to_string(),
            font_size: 20,
            font_color: "#1a1a1a".to_string(),
            card_width: 400,
            zoom: 1.0,
            export_formats: vec![ExportFormat::Png],
            seal_font: "'Ma Shan Zheng', cursive".to_string(),
            text_align: TextAlign::Justify,
        }
    }
}

/// A partial state: every field optional, applied as a shallow merge
#[derive(Debug, Clone, Default)]
pub struct AppStateUpdate {
    pub theme: Option<String>,
    pub layout: Option<Layout>,
    pub font: Option<String>,
    pub font_size: Option<u32>,
    pub font_color: Option<String>,
    pub card_width: Option<u32>,
    pub zoom: Option<f32>,
    pub export_formats: Option<Vec<ExportFormat>>,
    pub seal_font: Option<String>,
    pub text_align: Option<TextAlign>,
}

impl AppState {
    /// Shallow-merge the provided fields; absent fields keep their value
    pub fn update(&mut self, updates: AppStateUpdate) {
        if let Some(theme) = updates.theme {
            self.theme = theme;
        }
        if let Some(layout) = updates.layout {
            self.layout = layout;
        }
        if let Some(font) = updates.font {
            self.font = font;
        }
        if let Some(font_size) = updates.font_size {
            self.font_size = font_size;
        }
        if let Some(font_color) = updates.font_color {
            self.font_color = font_color;
        }
        if let Some(card_width) = updates.card_width {
            self.card_width = card_width;
        }
        if let Some(zoom) = updates.zoom {
            self.zoom = zoom;
        }
        if let Some(export_formats) = updates.export_formats {
            self.export_formats = export_formats;
        }
        if let Some(seal_font) = updates.seal_font {
            self.seal_font = seal_font;
        }
        if let Some(text_align) = updates.text_align {
            self.text_align = text_align;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_matches_catalog_defaults() {
        let state = AppState::default();
        assert_eq!(state.theme, "theme-clean");
        assert_eq!(state.font_size, 20);
        assert_eq!(state.card_width, 400);
        assert_eq!(state.export_formats, vec![ExportFormat::Png]);
        assert_eq!(state.text_align, TextAlign::Justify);
    }

    #[test]
    fn update_is_a_shallow_merge() {
        let mut state = AppState::default();
        state.update(AppStateUpdate {
            theme: Some("theme-dark".into()),
            font_size: Some(24),
            ..Default::default()
        });
        assert_eq!(state.theme, "theme-dark");
        assert_eq!(state.font_size, 24);
        // untouched fields keep their values
        assert_eq!(state.card_width, 400);
        assert_eq!(state.layout, Layout::Horizontal);
    }

    #[test]
    fn export_format_normalization() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::Jpg.mime(), "image/jpeg");
        assert_eq!("WEBP".parse::<ExportFormat>().unwrap(), ExportFormat::Webp);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn format_serde_round_trip() {
        let formats = vec![ExportFormat::Png, ExportFormat::Svg];
        let json = serde_json::to_string(&formats).unwrap();
        assert_eq!(json, "[\"png\",\"svg\"]");
        let back: Vec<ExportFormat> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, formats);
    }
}
