//! The capture orchestrator: one entry point from "export this card" to
//! delivered files
//!
//! Sequencing is the correctness story here (single-threaded, cooperative):
//! style mutation must be settled before rasterization starts, restoration
//! runs on success and failure alike, and format downloads are
//! intentionally sequential with a delay between them. Overlapping export
//! requests are rejected outright rather than queued.

pub mod background;
pub mod encode;
pub mod sanitize;
pub mod snapshot;
pub mod svg;
pub mod vertical;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::card::CARD_ID;
use crate::dom::NodeId;
use crate::platform::Platform;
use crate::preview::PreviewController;
use crate::rasterize::{layout, CanvasOptions, RasterSurface, Rasterizer};
use crate::state::{ExportFormat, Layout};
use crate::{Error, Result};

use background::{background_color_for_capture, resolve_card_background, CardBackgroundInfo};
use encode::DownloadSink;

/// Delays and polling knobs for the capture pipeline
#[derive(Debug, Clone)]
pub struct ExportTuning {
    /// Wait after the canonical-state mutation before rasterizing
    pub settle_delay: Duration,
    /// Wait between two downloads of the same export
    pub download_delay: Duration,
}

impl Default for ExportTuning {
    fn default() -> Self {
        ExportTuning {
            settle_delay: Duration::from_millis(300),
            download_delay: Duration::from_millis(300),
        }
    }
}

pub struct Exporter {
    platform: Arc<dyn Platform>,
    rasterizer: Arc<dyn Rasterizer>,
    tuning: ExportTuning,
    in_flight: AtomicBool,
}

impl Exporter {
    pub fn new(platform: Arc<dyn Platform>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self::with_tuning(platform, rasterizer, ExportTuning::default())
    }

    pub fn with_tuning(
        platform: Arc<dyn Platform>,
        rasterizer: Arc<dyn Rasterizer>,
        tuning: ExportTuning,
    ) -> Self {
        Exporter { platform, rasterizer, tuning, in_flight: AtomicBool::new(false) }
    }

    /// Export the card in every requested format.
    ///
    /// An empty `requested` list falls back to the state's stored formats;
    /// if that is empty too the call fails with `NoFormatSelected` before
    /// anything is captured. A second call while one is outstanding fails
    /// with `ExportInFlight`.
    pub async fn export_card(
        &self,
        preview: &mut PreviewController,
        requested: &[ExportFormat],
        sink: &mut dyn DownloadSink,
    ) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(Error::ExportInFlight);
        }
        let result = self.run(preview, requested, sink).await;
        self.in_flight.store(false, Ordering::SeqCst);
        if let Err(err) = &result {
            log::error!("export failed: {}", err);
        }
        result
    }

    async fn run(
        &self,
        preview: &mut PreviewController,
        requested: &[ExportFormat],
        sink: &mut dyn DownloadSink,
    ) -> Result<()> {
        // resolve formats up front: a selection failure must not mutate
        // the card at all
        let formats = self.resolve_formats(preview, requested)?;

        let card = preview.card();
        let theme_id = preview.state().theme.clone();
        let info = resolve_card_background(preview.doc(), card, &theme_id, preview.configs());

        let style_snapshot = snapshot::capture(preview.doc(), card);
        let original_zoom = preview.state().zoom;
        snapshot::prepare_for_capture(preview.doc_mut(), card);
        preview.set_zoom(1.0);

        let captured = self.capture(preview, &info).await;

        // restoration runs regardless of the capture outcome
        snapshot::restore(preview.doc_mut(), card, &style_snapshot);
        preview.set_zoom(original_zoom);
        let surface = captured?;

        for (index, format) in formats.iter().enumerate() {
            let artifact = match format {
                // SVG never touches the raster; it serializes the DOM
                ExportFormat::Svg => svg::svg_artifact(preview.doc(), card, preview.state()),
                other => encode::encode_surface(&surface, *other)?,
            };
            sink.deliver(artifact)?;
            if index + 1 < formats.len() {
                // spread downloads out so browser-style multi-download
                // heuristics don't swallow them
                tokio::time::sleep(self.tuning.download_delay).await;
            }
        }
        Ok(())
    }

    fn resolve_formats(
        &self,
        preview: &PreviewController,
        requested: &[ExportFormat],
    ) -> Result<Vec<ExportFormat>> {
        let formats: Vec<ExportFormat> = if requested.is_empty() {
            preview.state().export_formats.clone()
        } else {
            requested.to_vec()
        };
        if formats.is_empty() {
            return Err(Error::NoFormatSelected);
        }
        Ok(formats)
    }

    async fn capture(
        &self,
        preview: &mut PreviewController,
        info: &CardBackgroundInfo,
    ) -> Result<RasterSurface> {
        self.wait_for_fonts().await;
        tokio::time::sleep(self.tuning.settle_delay).await;

        let card = preview.card();
        let state = preview.state().clone();
        let metrics = self.platform.metrics();

        let target_width = state.card_width as f32;
        let current_layout = layout::layout_card(preview.doc(), card, None);
        let aspect = current_layout.height / current_layout.width.max(1.0);
        let target_height = target_width * aspect;
        let scale = metrics.dpr.max(1.0);

        let is_mobile = metrics.is_mobile();
        let vertical = state.layout == Layout::Vertical;

        // the rasterizer's clone hook: sanitize, and re-flow vertically
        // unless the mobile path already transformed its offscreen clone
        let hook_info = info.clone();
        let hook_theme = info.theme.clone();
        let hook_font_color = Some(state.font_color.clone()).filter(|c| !c.is_empty());
        let hook_vertical = vertical && !is_mobile;
        let card_width = state.card_width;
        let onclone: crate::rasterize::CloneHook = Box::new(move |clone| {
            sanitize::sanitize_clone(
                clone,
                &hook_info,
                hook_theme.as_ref(),
                hook_font_color.as_deref(),
                card_width,
            );
            if hook_vertical {
                if let Some(cloned_card) = clone.get_element_by_id(CARD_ID) {
                    vertical::apply_vertical_layout(clone, cloned_card);
                }
            }
        });

        let mut offscreen = None;
        let mut capture_target = card;
        if is_mobile {
            let (container, clone) =
                self.build_offscreen_clone(preview, info, target_width, target_height, vertical);
            offscreen = Some(container);
            capture_target = clone;
        }

        let options = CanvasOptions {
            scale,
            use_cors: true,
            background_color: background_color_for_capture(info, info.theme.as_ref()),
            width: target_width,
            // the offscreen clone auto-sizes; a fixed height would clip
            // or stretch the re-measured content
            height: if is_mobile { None } else { Some(target_height) },
            onclone: Some(onclone),
        };

        let rastered = self.rasterizer.rasterize(preview.doc(), capture_target, &options);

        if let Some(container) = offscreen {
            preview.doc_mut().detach(container);
        }
        rastered.map_err(|e| Error::CaptureError(e.to_string()))
    }

    /// Clone the card into an isolated offscreen container. Mobile
    /// viewports apply transform hacks to the live preview that would
    /// corrupt a direct capture; the clone gets explicit overrides and,
    /// for vertical layout, the column transform applied directly (it is
    /// a sibling tree, not the rasterizer's internal clone).
    fn build_offscreen_clone(
        &self,
        preview: &mut PreviewController,
        info: &CardBackgroundInfo,
        target_width: f32,
        target_height: f32,
        vertical: bool,
    ) -> (NodeId, NodeId) {
        let card = preview.card();
        let doc = preview.doc_mut();

        let container = doc.create_element("div");
        {
            let el = doc.node_mut(container);
            el.classes.push("offscreen-capture".into());
            let style = &mut el.style;
            style.set("position", "absolute");
            style.set("left", "-9999px");
            style.set("top", "0");
            style.set("width", &format!("{}px", target_width));
            style.set("min-height", &format!("{}px", target_height));
            style.set("background", "transparent");
            style.set("padding", "0");
            style.set("margin", "0");
            style.set("border", "none");
            style.set("overflow", "visible");
        }
        let body = doc.body();
        doc.append_child(body, container);

        let clone = doc.clone_subtree(card, container);
        {
            let style = &mut doc.node_mut(clone).style;
            style.set_important("transform", "none");
            style.set_important("position", "relative");
            style.set_important("margin", "0");
            style.set_important("width", &format!("{}px", target_width));
            style.set_important("min-height", "auto");
            style.set_important("height", "auto");
            style.set_important("opacity", "1");
            style.set_important("visibility", "visible");
        }

        // explicit background: the clone must not depend on class rules
        let background = match (&info.theme, info.background_color.as_deref()) {
            (Some(theme), _) if theme.background.is_some() => {
                ("background", theme.background.clone().unwrap_or_default())
            }
            (Some(theme), _) if theme.color.is_some() => {
                ("background-color", theme.color.clone().unwrap_or_default())
            }
            (_, Some(color)) if !crate::style::is_transparent(color) => {
                ("background-color", color.to_string())
            }
            _ => ("background-color", "#fff".to_string()),
        };
        doc.node_mut(clone).style.set_important(background.0, &background.1);

        if vertical {
            vertical::apply_vertical_layout(doc, clone);
        }

        // resize to the actual rendered height to avoid trailing blank
        // space below the content
        let actual_height = layout::measure_card_height(doc, clone);
        if actual_height > 0.0 {
            doc.node_mut(container)
                .style
                .set("height", &format!("{}px", actual_height));
        }

        (container, clone)
    }

    async fn wait_for_fonts(&self) {
        // poll the readiness signal briefly; hosts without one report
        // ready immediately
        for _ in 0..10 {
            if self.platform.fonts_ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        log::debug!("fonts never reported ready; relying on the settle delay");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedPlatform;
    use crate::preview::PreviewController;
    use crate::rasterize::new_rasterizer;
    use crate::state::{AppState, CardContent};
    use crate::theme::ConfigSet;
    use crate::Viewport;
    use encode::MemorySink;

    fn quick_tuning() -> ExportTuning {
        ExportTuning {
            settle_delay: Duration::from_millis(1),
            download_delay: Duration::from_millis(1),
        }
    }

    fn preview_with(state: AppState) -> PreviewController {
        let content = CardContent {
            quote: "海内存知己，天涯若比邻。".into(),
            book: "送杜少府之任蜀州".into(),
            author: "王勃".into(),
            seal: "知己".into(),
        };
        PreviewController::new(
            Viewport { width: 1280, height: 720 },
            content,
            state,
            ConfigSet::defaults(),
        )
    }

    fn exporter(platform: FixedPlatform) -> Exporter {
        Exporter::with_tuning(Arc::new(platform), new_rasterizer(), quick_tuning())
    }

    #[tokio::test]
    async fn export_delivers_every_requested_format() {
        let mut preview = preview_with(AppState::default());
        let exporter = exporter(FixedPlatform::new());
        let mut sink = MemorySink::default();
        exporter
            .export_card(
                &mut preview,
                &[ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Svg],
                &mut sink,
            )
            .await
            .expect("export");
        assert_eq!(sink.artifacts.len(), 3);
        assert!(sink.artifacts[0].filename.ends_with(".png"));
        assert!(sink.artifacts[1].filename.ends_with(".jpg"));
        assert!(sink.artifacts[2].filename.ends_with(".svg"));
    }

    #[tokio::test]
    async fn empty_request_falls_back_to_state_formats() {
        let mut preview = preview_with(AppState::default());
        let exporter = exporter(FixedPlatform::new());
        let mut sink = MemorySink::default();
        exporter.export_card(&mut preview, &[], &mut sink).await.expect("export");
        assert_eq!(sink.artifacts.len(), 1);
        assert_eq!(sink.artifacts[0].mime, "image/png");
    }

    #[tokio::test]
    async fn empty_state_formats_fail_before_any_mutation() {
        let mut state = AppState::default();
        state.export_formats = Vec::new();
        let mut preview = preview_with(state);
        let before = preview.doc().node(preview.card()).style.to_css();
        let exporter = exporter(FixedPlatform::new());
        let mut sink = MemorySink::default();
        let err = exporter.export_card(&mut preview, &[], &mut sink).await.unwrap_err();
        assert!(matches!(err, Error::NoFormatSelected));
        assert!(sink.artifacts.is_empty());
        assert_eq!(preview.doc().node(preview.card()).style.to_css(), before);
    }

    #[tokio::test]
    async fn styles_and_zoom_are_restored_after_export() {
        let mut preview = preview_with(AppState::default());
        preview.set_zoom(0.75);
        let card = preview.card();
        preview.doc_mut().node_mut(card).style.set("box-shadow", "0 0 4px red");
        let exporter = exporter(FixedPlatform::new());
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export");
        let style = &preview.doc().node(preview.card()).style;
        assert_eq!(style.get("transform"), Some("scale(0.75)"));
        assert_eq!(style.get("box-shadow"), Some("0 0 4px red"));
        assert_eq!(preview.state().zoom, 0.75);
    }

    #[tokio::test]
    async fn mobile_export_tears_down_the_offscreen_clone() {
        let mut preview = preview_with(AppState::default());
        let node_count_before = preview.doc().walk(preview.doc().body()).len();
        let exporter = exporter(FixedPlatform::mobile());
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export");
        // the offscreen container is gone from the reachable tree
        let body = preview.doc().body();
        assert!(preview.doc().query_selector(body, ".offscreen-capture").is_none());
        assert_eq!(preview.doc().walk(body).len(), node_count_before);
    }

    #[tokio::test]
    async fn mobile_vertical_export_produces_a_surface() {
        let mut state = AppState::default();
        state.layout = Layout::Vertical;
        let mut preview = preview_with(state);
        let exporter = exporter(FixedPlatform::mobile());
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export");
        assert_eq!(sink.artifacts.len(), 1);
        // the live card still has its horizontal text node visible
        let text = preview
            .doc()
            .query_selector(preview.card(), ".text-content")
            .unwrap();
        assert_ne!(preview.doc().node(text).style.get("display"), Some("none"));
    }

    #[tokio::test]
    async fn gradient_theme_exports_with_unoccluded_background() {
        let mut state = AppState::default();
        state.theme = "theme-gradient-blue".into();
        let mut preview = preview_with(state);
        preview.set_theme("theme-gradient-blue");
        let exporter = exporter(FixedPlatform::new());
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export");
        assert_eq!(sink.artifacts.len(), 1);
    }

    #[tokio::test]
    async fn overlapping_export_is_rejected() {
        let tuning = ExportTuning {
            settle_delay: Duration::from_millis(200),
            download_delay: Duration::from_millis(1),
        };
        let exporter = Arc::new(Exporter::with_tuning(
            Arc::new(FixedPlatform::new()),
            new_rasterizer(),
            tuning,
        ));

        let first = exporter.clone();
        let running = tokio::spawn(async move {
            let mut preview = preview_with(AppState::default());
            let mut sink = MemorySink::default();
            first.export_card(&mut preview, &[ExportFormat::Png], &mut sink).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut preview = preview_with(AppState::default());
        let mut sink = MemorySink::default();
        let err = exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExportInFlight));

        running.await.unwrap().expect("first export still succeeds");
        // the flag clears once the first export finishes
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export after completion");
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _doc: &crate::dom::Document,
            _target: NodeId,
            _options: &CanvasOptions,
        ) -> crate::Result<RasterSurface> {
            Err(Error::RenderError("backend exploded".into()))
        }
    }

    #[tokio::test]
    async fn rasterizer_failure_still_restores_the_card() {
        let mut preview = preview_with(AppState::default());
        preview.set_zoom(0.6);
        let before = preview.doc().node(preview.card()).style.to_css();
        let exporter = Exporter::with_tuning(
            Arc::new(FixedPlatform::new()),
            Arc::new(FailingRasterizer),
            quick_tuning(),
        );
        let mut sink = MemorySink::default();
        let err = exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CaptureError(_)));
        assert!(sink.artifacts.is_empty());
        assert_eq!(preview.doc().node(preview.card()).style.to_css(), before);
        assert_eq!(preview.state().zoom, 0.6);
    }

    #[tokio::test]
    async fn device_scale_multiplies_output_dimensions() {
        let platform = FixedPlatform::with_metrics(crate::platform::DeviceMetrics {
            width: 1920,
            height: 1080,
            dpr: 2.0,
            touch: false,
        });
        let mut preview = preview_with(AppState::default());
        let exporter = exporter(platform);
        let mut sink = MemorySink::default();
        exporter
            .export_card(&mut preview, &[ExportFormat::Png], &mut sink)
            .await
            .expect("export");
        let decoded =
            image::load_from_memory(&sink.artifacts[0].bytes).expect("decode png");
        assert_eq!(decoded.width(), 800); // 400px card at dpr 2
    }
}
