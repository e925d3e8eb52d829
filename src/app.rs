//! Composition root
//!
//! Owns the preview controller, thumbnail manager, exporter, and content
//! cache, wired together from an explicitly constructed [`ConfigSet`];
//! no ambient globals. Content changes follow a fixed ordering: preview
//! refresh, then thumbnail refresh (debounced), then cache save.

use std::sync::Arc;

use crate::cache::ContentCache;
use crate::export::encode::DownloadSink;
use crate::export::Exporter;
use crate::import;
use crate::platform::Platform;
use crate::preview::PreviewController;
use crate::rasterize::Rasterizer;
use crate::state::{AppState, CardContent, ExportFormat, Layout, TextAlign};
use crate::theme::ConfigSet;
use crate::thumbnail::ThumbnailManager;
use crate::{Result, Viewport};

pub struct BookExcerptApp {
    pub preview: PreviewController,
    pub thumbnail: ThumbnailManager,
    pub exporter: Exporter,
    cache: ContentCache,
}

impl BookExcerptApp {
    /// Assemble the app. Cached content, when present, prefills the card
    /// (an empty cached string is still cached content).
    pub fn new(
        configs: ConfigSet,
        state: AppState,
        platform: Arc<dyn Platform>,
        rasterizer: Arc<dyn Rasterizer>,
        cache: ContentCache,
    ) -> Self {
        let content = if cache.has_cached_content() {
            cache.load_content()
        } else {
            CardContent::default()
        };
        let metrics = platform.metrics();
        let viewport = Viewport { width: metrics.width, height: metrics.height };
        let preview = PreviewController::new(viewport, content, state, configs);
        let thumbnail = ThumbnailManager::new(rasterizer.clone());
        let exporter = Exporter::new(platform, rasterizer);
        BookExcerptApp { preview, thumbnail, exporter, cache }
    }

    /// Seed the content fields directly (CLI input overrides the cache)
    pub fn set_content(&mut self, content: CardContent) {
        *self.preview.content_mut() = content;
        self.preview.update_preview();
        self.preview.update_seal();
        self.thumbnail.request_refresh(&self.preview);
        self.cache.save_content(self.preview.content());
    }

    pub fn set_quote(&mut self, quote: &str) {
        self.preview.content_mut().quote = quote.to_string();
        self.content_changed();
    }

    pub fn set_book(&mut self, book: &str) {
        self.preview.content_mut().book = book.to_string();
        self.content_changed();
    }

    pub fn set_author(&mut self, author: &str) {
        self.preview.content_mut().author = author.to_string();
        self.content_changed();
    }

    pub fn set_seal(&mut self, seal: &str) {
        self.preview.content_mut().seal = seal.to_string();
        self.preview.update_seal();
        self.thumbnail.request_refresh(&self.preview);
        self.cache.save_content(self.preview.content());
    }

    // content update ordering: preview refresh, thumbnail refresh
    // (debounced), cache save
    fn content_changed(&mut self) {
        self.preview.update_preview();
        self.thumbnail.request_refresh(&self.preview);
        self.cache.save_content(self.preview.content());
    }

    pub fn set_theme(&mut self, theme_id: &str) {
        self.preview.set_theme(theme_id);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.preview.set_layout(layout);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_font(&mut self, font_value: &str) {
        self.preview.set_font(font_value);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.preview.set_font_size(size);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_font_color(&mut self, color: &str) {
        self.preview.set_font_color(color);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_card_width(&mut self, width: u32) {
        self.preview.set_card_width(width);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.preview.set_text_align(align);
        self.thumbnail.request_refresh(&self.preview);
    }

    pub fn set_seal_font(&mut self, font: &str) {
        self.preview.set_seal_font(font);
        self.thumbnail.request_refresh(&self.preview);
    }

    /// Export the card; an empty format list falls back to state defaults
    pub async fn export(
        &mut self,
        formats: &[ExportFormat],
        sink: &mut dyn DownloadSink,
    ) -> Result<()> {
        self.exporter.export_card(&mut self.preview, formats, sink).await
    }

    /// Import a config bundle and refresh everything it touched
    pub fn import_config(
        &mut self,
        json: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<()> {
        let mut state = self.preview.state().clone();
        let mut content = self.preview.content().clone();
        import::import_bundle(json, &mut state, &mut content, confirm)?;

        *self.preview.content_mut() = content;
        self.preview.set_theme(&state.theme);
        self.preview.set_layout(state.layout);
        self.preview.set_font(&state.font);
        self.preview.set_font_size(state.font_size);
        self.preview.set_font_color(&state.font_color);
        self.preview.set_card_width(state.card_width);
        self.preview.set_text_align(state.text_align);
        self.preview.set_seal_font(&state.seal_font);
        self.preview.set_export_formats(state.export_formats);
        self.preview.update_preview();
        self.preview.update_seal();

        self.thumbnail.request_refresh(&self.preview);
        self.cache.save_content(self.preview.content());
        Ok(())
    }

    /// Serialize the current state and content as a config bundle
    pub fn export_config(&self) -> Result<String> {
        let bundle = import::export_bundle(self.preview.state(), self.preview.content());
        serde_json::to_string_pretty(&bundle)
            .map_err(|e| crate::Error::Other(format!("bundle serialization failed: {}", e)))
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }
}
