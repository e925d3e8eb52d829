//! Config bundle export and import
//!
//! A bundle is `{version, content, style}` JSON. Import validates the
//! shape, soft-checks the major version (a mismatch needs explicit
//! confirmation, not a hard failure), then applies every provided field
//! and leaves omitted fields untouched.

use serde::{Deserialize, Serialize};

use crate::state::{AppState, AppStateUpdate, CardContent, ExportFormat, Layout, TextAlign};
use crate::{Error, Result};

/// Application version embedded in exported bundles
pub const APP_VERSION: &str = "1.0.1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<String>,
    #[serde(default, rename = "sealFont", skip_serializing_if = "Option::is_none")]
    pub seal_font: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, rename = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, rename = "fontColor", skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, rename = "cardWidth", skip_serializing_if = "Option::is_none")]
    pub card_width: Option<u32>,
    #[serde(default, rename = "textAlign", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, rename = "exportFormats", skip_serializing_if = "Option::is_none")]
    pub export_formats: Option<Vec<ExportFormat>>,
}

/// A full exported configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub version: String,
    pub content: ContentSection,
    pub style: StyleSection,
}

/// Parse a bundle; `content` and `style` must both be present
pub fn parse_bundle(json: &str) -> Result<ConfigBundle> {
    serde_json::from_str(json).map_err(|e| Error::ImportError(format!("invalid bundle: {}", e)))
}

/// Soft version check: major versions must match
pub fn version_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().unwrap_or("").to_string();
    !version.is_empty() && major(version) == major(APP_VERSION)
}

/// Import a bundle. On a major-version mismatch the `confirm` callback is
/// asked whether to proceed; declining aborts with `VersionMismatch`.
pub fn import_bundle(
    json: &str,
    state: &mut AppState,
    content: &mut CardContent,
    confirm: impl FnOnce(&str) -> bool,
) -> Result<ConfigBundle> {
    let bundle = parse_bundle(json)?;
    if !version_compatible(&bundle.version) {
        let prompt = format!(
            "config version {} may be incompatible with {}",
            bundle.version, APP_VERSION
        );
        if !confirm(&prompt) {
            return Err(Error::VersionMismatch {
                found: bundle.version.clone(),
                current: APP_VERSION.to_string(),
            });
        }
    }
    apply_bundle(&bundle, state, content);
    log::info!("config imported");
    Ok(bundle)
}

/// Apply every provided field; omitted fields keep their prior values
pub fn apply_bundle(bundle: &ConfigBundle, state: &mut AppState, content: &mut CardContent) {
    if let Some(quote) = &bundle.content.quote {
        content.quote = quote.clone();
    }
    if let Some(book) = &bundle.content.book {
        content.book = book.clone();
    }
    if let Some(author) = &bundle.content.author {
        content.author = author.clone();
    }
    if let Some(seal) = &bundle.content.seal {
        content.seal = seal.clone();
    }
    state.update(AppStateUpdate {
        theme: bundle.style.theme.clone(),
        layout: bundle.style.layout,
        font: bundle.style.font.clone(),
        font_size: bundle.style.font_size,
        font_color: bundle.style.font_color.clone(),
        card_width: bundle.style.card_width,
        text_align: bundle.style.text_align,
        export_formats: bundle.style.export_formats.clone(),
        seal_font: bundle.content.seal_font.clone(),
        zoom: None,
    });
}

/// Export the current state and content as a bundle
pub fn export_bundle(state: &AppState, content: &CardContent) -> ConfigBundle {
    ConfigBundle {
        version: APP_VERSION.to_string(),
        content: ContentSection {
            quote: Some(content.quote.clone()),
            book: Some(content.book.clone()),
            author: Some(content.author.clone()),
            seal: Some(content.seal.clone()),
            seal_font: Some(state.seal_font.clone()),
        },
        style: StyleSection {
            theme: Some(state.theme.clone()),
            layout: Some(state.layout),
            font: Some(state.font.clone()),
            font_size: Some(state.font_size),
            font_color: Some(state.font_color.clone()),
            card_width: Some(state.card_width),
            text_align: Some(state.text_align),
            export_formats: Some(state.export_formats.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import_round_trips_every_field() {
        let mut state = AppState::default();
        state.theme = "theme-parchment".into();
        state.layout = Layout::Vertical;
        state.font_size = 26;
        state.card_width = 540;
        state.export_formats = vec![ExportFormat::Png, ExportFormat::Webp];
        let content = CardContent {
            quote: "引文".into(),
            book: "书".into(),
            author: "某人".into(),
            seal: "印".into(),
        };

        let json = serde_json::to_string(&export_bundle(&state, &content)).unwrap();

        let mut restored_state = AppState::default();
        let mut restored_content = CardContent::default();
        import_bundle(&json, &mut restored_state, &mut restored_content, |_| {
            panic!("same version must not prompt")
        })
        .unwrap();
        assert_eq!(restored_state, state);
        assert_eq!(restored_content, content);
    }

    #[test]
    fn omitted_fields_keep_their_prior_values() {
        let json = r#"{
            "version": "1.0.0",
            "content": { "quote": "only the quote" },
            "style": { "theme": "theme-dark" }
        }"#;
        let mut state = AppState::default();
        state.font_size = 28;
        let mut content = CardContent { book: "keep me".into(), ..Default::default() };

        import_bundle(json, &mut state, &mut content, |_| true).unwrap();
        assert_eq!(state.theme, "theme-dark");
        assert_eq!(content.quote, "only the quote");
        // untouched by the bundle
        assert_eq!(state.font_size, 28);
        assert_eq!(content.book, "keep me");
    }

    #[test]
    fn missing_sections_are_an_import_error() {
        let mut state = AppState::default();
        let mut content = CardContent::default();
        let err = import_bundle(
            r#"{"version": "1.0.0", "content": {}}"#,
            &mut state,
            &mut content,
            |_| true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ImportError(_)));
    }

    #[test]
    fn version_mismatch_is_a_soft_confirmation() {
        let json = r#"{"version": "2.0.0", "content": {}, "style": {"theme": "theme-mist"}}"#;
        let mut state = AppState::default();
        let mut content = CardContent::default();

        // declined: nothing applied
        let err = import_bundle(json, &mut state, &mut content, |_| false).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
        assert_eq!(state.theme, "theme-clean");

        // confirmed: applied
        import_bundle(json, &mut state, &mut content, |_| true).unwrap();
        assert_eq!(state.theme, "theme-mist");
    }

    #[test]
    fn patch_versions_are_compatible() {
        assert!(version_compatible("1.9.9"));
        assert!(!version_compatible("2.0.0"));
        assert!(!version_compatible(""));
    }
}
