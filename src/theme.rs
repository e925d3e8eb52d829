//! Theme, font, and font-color descriptors plus the default tables
//!
//! Exactly one of `color` or `background` is meaningful per theme; a
//! `background` (a CSS gradient expression) wins over `color` wherever both
//! are present. The defaults below are the shipped visual catalog; a remote
//! config may replace any category wholesale (see `remote`).

use serde::{Deserialize, Serialize};

/// A named visual background style selectable by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    pub id: String,
    /// Solid background color (solid themes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Border color (solid themes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    /// Background expression, e.g. a linear-gradient (gradient themes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// A selectable font family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamily {
    pub id: String,
    /// CSS font-family value
    pub value: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
}

/// A selectable text color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontColor {
    pub id: String,
    pub value: String,
    pub name: String,
}

/// The resolved configuration catalog handed to the composition root.
///
/// Constructed explicitly at startup (defaults, optionally merged with a
/// remote payload) and passed down; nothing in the crate reads it from a
/// global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSet {
    pub themes: Vec<ThemeDescriptor>,
    pub fonts: Vec<FontFamily>,
    #[serde(rename = "fontColors")]
    pub font_colors: Vec<FontColor>,
}

impl ConfigSet {
    pub fn defaults() -> Self {
        ConfigSet {
            themes: default_themes(),
            fonts: default_fonts(),
            font_colors: default_font_colors(),
        }
    }

    pub fn find_theme(&self, id: &str) -> Option<&ThemeDescriptor> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn find_font(&self, id: &str) -> Option<&FontFamily> {
        self.fonts.iter().find(|f| f.id == id)
    }
}

impl Default for ConfigSet {
    fn default() -> Self {
        Self::defaults()
    }
}

fn solid(id: &str, color: &str, border: &str) -> ThemeDescriptor {
    ThemeDescriptor {
        id: id.to_string(),
        color: Some(color.to_string()),
        border: Some(border.to_string()),
        background: None,
    }
}

fn gradient(id: &str, background: &str) -> ThemeDescriptor {
    ThemeDescriptor {
        id: id.to_string(),
        color: None,
        border: None,
        background: Some(background.to_string()),
    }
}

pub fn default_themes() -> Vec<ThemeDescriptor> {
    vec![
        solid("theme-clean", "#fff", "#ddd"),
        solid("theme-paper", "#fdfbf7", "#f0e6d2"),
        solid("theme-dark", "#1a1a1a", "#333"),
        solid("theme-mist", "#e8ecef", "#d1d9e0"),
        solid("theme-pink", "#fff0f5", "#f8bbd0"),
        solid("theme-green", "#f1f8e9", "#c5e1a5"),
        solid("theme-parchment", "#f4e4bc", "#d4c5a3"),
        gradient("theme-gradient-blue", "linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)"),
        gradient("theme-gradient-sunset", "linear-gradient(120deg, #f6d365 0%, #fda085 100%)"),
        gradient("theme-gradient-mint", "linear-gradient(135deg, #d4fc79 0%, #96e6a1 100%)"),
    ]
}

pub fn default_fonts() -> Vec<FontFamily> {
    let font = |id: &str, value: &str, name: &str, subtitle: &str| FontFamily {
        id: id.to_string(),
        value: value.to_string(),
        name: name.to_string(),
        subtitle: subtitle.to_string(),
    };
    vec![
        font("noto-serif", "'Noto Serif SC', serif", "宋体", "标准"),
        font("ma-shan-zheng", "'Ma Shan Zheng', cursive", "马善政", "毛笔"),
        font("zhi-mang-xing", "'Zhi Mang Xing', cursive", "志莽行书", "行书"),
        font("long-cang", "'Long Cang', cursive", "龙苍行书", "行书"),
    ]
}

pub fn default_font_colors() -> Vec<FontColor> {
    let color = |id: &str, value: &str, name: &str| FontColor {
        id: id.to_string(),
        value: value.to_string(),
        name: name.to_string(),
    };
    vec![
        color("color-black", "#1a1a1a", "黑色"),
        color("color-gray", "#666666", "灰色"),
        color("color-dark-gray", "#333333", "深灰"),
        color("color-brown", "#5d4037", "棕色"),
        color("color-dark-blue", "#1e3a5f", "深蓝"),
        color("color-dark-green", "#2e7d32", "深绿"),
        color("color-red", "#c62828", "红色"),
        color("color-purple", "#6a1b9a", "紫色"),
    ]
}
