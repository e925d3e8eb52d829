//! Preview controller: owns the card document and applies state changes
//!
//! Every setter is a no-op when the value is unchanged, mirrors the state
//! into the document (classes and inline styles), and leaves refresh
//! ordering to the composition root.

use crate::card::{self, CARD_ID};
use crate::dom::{Document, NodeId};
use crate::state::{AppState, AppStateUpdate, CardContent, Layout, TextAlign};
use crate::theme::ConfigSet;
use crate::Viewport;

pub struct PreviewController {
    doc: Document,
    card: NodeId,
    state: AppState,
    content: CardContent,
    configs: ConfigSet,
}

impl PreviewController {
    pub fn new(
        viewport: Viewport,
        content: CardContent,
        state: AppState,
        configs: ConfigSet,
    ) -> Self {
        let mut doc = Document::new(viewport);
        let card = card::build_card(&mut doc, &content, &state, &configs);
        PreviewController { doc, card, state, content, configs }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn card(&self) -> NodeId {
        self.card
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn configs(&self) -> &ConfigSet {
        &self.configs
    }

    pub fn content_mut(&mut self) -> &mut CardContent {
        &mut self.content
    }

    /// Re-render quote, book, and author from the current content
    pub fn update_preview(&mut self) {
        if let Some(text) = self.doc.query_selector(self.card, ".text-content") {
            let el = self.doc.node_mut(text);
            el.text = card::normalize_quote_markup(&self.content.quote);
            el.style.set("font-family", &self.state.font);
            el.style.set("font-size", &format!("{}px", self.state.font_size));
            el.style.set("text-align", self.state.text_align.as_css());
        }

        let book_empty = self.content.book.trim().is_empty();
        let author_empty = self.content.author.trim().is_empty();
        if let Some(info) = self.doc.query_selector(self.card, ".book-info") {
            if book_empty && author_empty {
                self.doc.node_mut(info).style.set("display", "none");
            } else {
                self.doc.node_mut(info).style.set("display", "flex");
            }
        }
        if let Some(book) = self.doc.query_selector(self.card, ".preview-book") {
            let el = self.doc.node_mut(book);
            el.text = self.content.book.clone();
            el.style.set("display", if book_empty { "none" } else { "block" });
        }
        if let Some(author) = self.doc.query_selector(self.card, ".preview-author") {
            let el = self.doc.node_mut(author);
            el.text = self.content.author.clone();
            el.style.set("display", if author_empty { "none" } else { "block" });
        }
    }

    /// Rebuild the seal arrangement from the current seal text
    pub fn update_seal(&mut self) {
        if let Some(seal) = self.doc.query_selector(self.card, ".preview-seal") {
            card::update_seal(&mut self.doc, seal, &self.content.seal.clone(), &self.state.seal_font.clone());
        }
    }

    pub fn set_theme(&mut self, theme_id: &str) {
        if self.state.theme == theme_id {
            return;
        }
        self.state.update(AppStateUpdate { theme: Some(theme_id.to_string()), ..Default::default() });
        self.sync_card_classes();
    }

    pub fn set_layout(&mut self, layout: Layout) {
        if self.state.layout == layout {
            return;
        }
        self.state.update(AppStateUpdate { layout: Some(layout), ..Default::default() });
        self.sync_card_classes();
    }

    pub fn set_font(&mut self, font_value: &str) {
        if self.state.font == font_value {
            return;
        }
        self.state.update(AppStateUpdate { font: Some(font_value.to_string()), ..Default::default() });
        if let Some(text) = self.doc.query_selector(self.card, ".text-content") {
            self.doc.node_mut(text).style.set("font-family", font_value);
        }
    }

    pub fn set_font_size(&mut self, size: u32) {
        if self.state.font_size == size {
            return;
        }
        self.state.update(AppStateUpdate { font_size: Some(size), ..Default::default() });
        if let Some(text) = self.doc.query_selector(self.card, ".text-content") {
            self.doc.node_mut(text).style.set("font-size", &format!("{}px", size));
        }
    }

    pub fn set_font_color(&mut self, color: &str) {
        if self.state.font_color == color {
            return;
        }
        self.state.update(AppStateUpdate { font_color: Some(color.to_string()), ..Default::default() });
        if let Some(text) = self.doc.query_selector(self.card, ".text-content") {
            self.doc.node_mut(text).style.set("color", color);
        }
    }

    pub fn set_card_width(&mut self, width: u32) {
        if self.state.card_width == width {
            return;
        }
        self.state.update(AppStateUpdate { card_width: Some(width), ..Default::default() });
        self.doc.node_mut(self.card).style.set("width", &format!("{}px", width));
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.update(AppStateUpdate { text_align: Some(align), ..Default::default() });
        if let Some(text) = self.doc.query_selector(self.card, ".text-content") {
            self.doc.node_mut(text).style.set("text-align", align.as_css());
        }
    }

    pub fn set_seal_font(&mut self, font: &str) {
        self.state.update(AppStateUpdate { seal_font: Some(font.to_string()), ..Default::default() });
        self.update_seal();
    }

    pub fn set_export_formats(&mut self, formats: Vec<crate::state::ExportFormat>) {
        self.state.update(AppStateUpdate { export_formats: Some(formats), ..Default::default() });
    }

    /// Zoom is an inline transform on the card; the capture pipeline
    /// resets it to 1 and restores it afterwards.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.update(AppStateUpdate { zoom: Some(zoom), ..Default::default() });
        self.doc
            .node_mut(self.card)
            .style
            .set("transform", &format!("scale({})", zoom));
    }

    fn sync_card_classes(&mut self) {
        let mut classes = vec!["card".to_string(), self.state.theme.clone()];
        if self.state.layout == Layout::Vertical {
            classes.push("vertical-mode".to_string());
        }
        self.doc.node_mut(self.card).classes = classes;
    }
}
