//! Debounced thumbnail rendering
//!
//! A small live raster preview of the card, refreshed on a debounce timer
//! and rendered through exactly the same background/sanitize/vertical
//! pipeline as a full export so the thumbnail never drifts from what an
//! export would produce.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::card::CARD_ID;
use crate::dom::Document;
use crate::export::background::{background_color_for_capture, resolve_card_background};
use crate::export::{sanitize, vertical};
use crate::preview::PreviewController;
use crate::rasterize::{CanvasOptions, RasterSurface, Rasterizer};
use crate::state::{AppState, Layout};
use crate::theme::ConfigSet;
use crate::Result;

/// Thumbnail raster scale relative to the card
pub const THUMBNAIL_SCALE_RATIO: f32 = 0.4;
/// Debounce window for thumbnail refreshes
pub const THUMBNAIL_UPDATE_DELAY_MS: u64 = 300;

pub struct ThumbnailManager {
    rasterizer: Arc<dyn Rasterizer>,
    debouncer: crate::schedule::Debouncer,
    latest: Arc<Mutex<Option<RasterSurface>>>,
}

impl ThumbnailManager {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        ThumbnailManager {
            rasterizer,
            debouncer: crate::schedule::Debouncer::new(Duration::from_millis(
                THUMBNAIL_UPDATE_DELAY_MS,
            )),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Render a thumbnail immediately
    pub fn refresh_now(&self, preview: &PreviewController) -> Result<RasterSurface> {
        let surface = render_thumbnail(
            self.rasterizer.as_ref(),
            preview.doc(),
            preview.state(),
            preview.configs(),
        )?;
        *self.latest.lock().unwrap() = Some(surface.clone());
        Ok(surface)
    }

    /// Schedule a debounced refresh. The card document is cloned into the
    /// task so the live preview stays free to mutate. Outside a runtime
    /// the render happens inline instead.
    pub fn request_refresh(&self, preview: &PreviewController) {
        let rasterizer = self.rasterizer.clone();
        let doc = preview.doc().clone();
        let state = preview.state().clone();
        let configs = preview.configs().clone();
        let latest = self.latest.clone();
        let job = move || {
            match render_thumbnail(rasterizer.as_ref(), &doc, &state, &configs) {
                Ok(surface) => *latest.lock().unwrap() = Some(surface),
                Err(err) => log::debug!("thumbnail refresh failed: {}", err),
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(_) => self.debouncer.call(job),
            Err(_) => job(),
        }
    }

    /// The most recent thumbnail, if any refresh has completed
    pub fn latest(&self) -> Option<RasterSurface> {
        self.latest.lock().unwrap().clone()
    }
}

fn render_thumbnail(
    rasterizer: &dyn Rasterizer,
    doc: &Document,
    state: &AppState,
    configs: &ConfigSet,
) -> Result<RasterSurface> {
    let card = doc
        .get_element_by_id(CARD_ID)
        .ok_or_else(|| crate::Error::RenderError("no card in document".into()))?;
    let info = resolve_card_background(doc, card, &state.theme, configs);

    let hook_info = info.clone();
    let hook_theme = info.theme.clone();
    let font_color = Some(state.font_color.clone()).filter(|c| !c.is_empty());
    let vertical_layout = state.layout == Layout::Vertical;
    let card_width = state.card_width;
    let onclone: crate::rasterize::CloneHook = Box::new(move |clone| {
        sanitize::sanitize_clone(
            clone,
            &hook_info,
            hook_theme.as_ref(),
            font_color.as_deref(),
            card_width,
        );
        if vertical_layout {
            if let Some(cloned_card) = clone.get_element_by_id(CARD_ID) {
                vertical::apply_vertical_layout(clone, cloned_card);
            }
        }
    });

    let options = CanvasOptions {
        scale: THUMBNAIL_SCALE_RATIO,
        use_cors: true,
        background_color: background_color_for_capture(&info, info.theme.as_ref()),
        width: state.card_width as f32,
        height: None,
        onclone: Some(onclone),
    };
    rasterizer.rasterize(doc, card, &options)
}
