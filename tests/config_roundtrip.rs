use std::sync::Arc;

use bookcard::{
    new_rasterizer, AppState, BookExcerptApp, ConfigSet, ContentCache, Error, ExportFormat,
    FixedPlatform, Layout, TextAlign,
};

fn fresh_app() -> BookExcerptApp {
    BookExcerptApp::new(
        ConfigSet::defaults(),
        AppState::default(),
        Arc::new(FixedPlatform::new()),
        new_rasterizer(),
        ContentCache::disabled(),
    )
}

#[test]
fn full_round_trip_restores_state_and_content() {
    let mut source = fresh_app();
    source.set_quote("春眠不觉晓，处处闻啼鸟。");
    source.set_book("春晓");
    source.set_author("孟浩然");
    source.set_seal("春晓");
    source.set_theme("theme-parchment");
    source.set_layout(Layout::Vertical);
    source.set_font_size(24);
    source.set_card_width(570);
    source.set_text_align(TextAlign::Center);
    source.preview.set_export_formats(vec![ExportFormat::Png, ExportFormat::Svg]);

    let bundle = source.export_config().expect("export config");

    let mut target = fresh_app();
    target.import_config(&bundle, |_| panic!("matching versions never prompt")).unwrap();

    let state = target.preview.state();
    assert_eq!(state.theme, "theme-parchment");
    assert_eq!(state.layout, Layout::Vertical);
    assert_eq!(state.font_size, 24);
    assert_eq!(state.card_width, 570);
    assert_eq!(state.text_align, TextAlign::Center);
    assert_eq!(state.export_formats, vec![ExportFormat::Png, ExportFormat::Svg]);
    assert_eq!(target.preview.content().quote, "春眠不觉晓，处处闻啼鸟。");
    assert_eq!(target.preview.content().seal, "春晓");
}

#[test]
fn partial_bundle_leaves_omitted_fields_alone() {
    let mut app = fresh_app();
    app.set_quote("原有引文");
    app.set_font_size(30);

    let json = r##"{
        "version": "1.0.0",
        "content": { "book": "新书名" },
        "style": { "fontColor": "#5d4037" }
    }"##;
    app.import_config(json, |_| true).unwrap();

    assert_eq!(app.preview.content().book, "新书名");
    assert_eq!(app.preview.state().font_color, "#5d4037");
    // untouched by the bundle
    assert_eq!(app.preview.content().quote, "原有引文");
    assert_eq!(app.preview.state().font_size, 30);
}

#[test]
fn major_version_mismatch_requires_confirmation() {
    let json = r#"{"version": "2.3.0", "content": {}, "style": {"theme": "theme-pink"}}"#;

    let mut declined = fresh_app();
    let err = declined.import_config(json, |prompt| {
        assert!(prompt.contains("2.3.0"));
        false
    });
    assert!(matches!(err, Err(Error::VersionMismatch { .. })));
    assert_eq!(declined.preview.state().theme, "theme-clean");

    let mut accepted = fresh_app();
    accepted.import_config(json, |_| true).unwrap();
    assert_eq!(accepted.preview.state().theme, "theme-pink");
}

#[test]
fn malformed_bundles_surface_a_readable_error() {
    let mut app = fresh_app();
    for json in ["not json", "{}", r#"{"version": "1.0.0", "style": {}}"#] {
        let err = app.import_config(json, |_| true).unwrap_err();
        assert!(matches!(err, Error::ImportError(_)), "input: {}", json);
    }
}
