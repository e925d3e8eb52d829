//! Rasterization: the collaborator that turns a card subtree into pixels
//!
//! The pipeline treats the rasterizer as an opaque backend behind the
//! [`Rasterizer`] trait: it receives a document, a target node, and
//! [`CanvasOptions`], clones the document, hands the clone to the
//! `onclone` hook (the sanitizer's and vertical transformer's only entry
//! point), and produces a [`RasterSurface`]. The built-in software backend
//! is split into layout, paint, and raster passes.

pub mod layout;
pub mod paint;
pub mod raster;

use std::sync::Arc;

use image::RgbaImage;

use crate::dom::{Document, NodeId};
use crate::style::{parse_color, parse_linear_gradient};
use crate::{Error, Result};

use paint::BackgroundFill;

/// A rasterized card: RGBA pixels at device resolution
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pub image: RgbaImage,
}

impl RasterSurface {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Content digest used by golden tests
    pub fn digest(&self) -> String {
        raster::digest(&self.image)
    }
}

/// Callback run against the internal document clone before rasterization
pub type CloneHook = Box<dyn Fn(&mut Document) + Send + Sync>;

/// Options for one rasterization call
pub struct CanvasOptions {
    /// Device scale; surface dimensions are multiplied by this
    pub scale: f32,
    /// Kept for backend parity; the software backend loads nothing remote
    pub use_cors: bool,
    /// Canvas background fill. `None` lets a gradient or image background
    /// of the element show through instead of being occluded.
    pub background_color: Option<String>,
    /// Target width in CSS pixels
    pub width: f32,
    /// Target height in CSS pixels; `None` auto-sizes from content
    pub height: Option<f32>,
    pub onclone: Option<CloneHook>,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        CanvasOptions {
            scale: 1.0,
            use_cors: true,
            background_color: None,
            width: 400.0,
            height: None,
            onclone: None,
        }
    }
}

/// Core trait for rasterizer backends
pub trait Rasterizer: Send + Sync {
    /// Rasterize `target` within `doc` using the given options.
    ///
    /// Implementations clone the document, run the `onclone` hook against
    /// the clone, and never mutate the live document.
    fn rasterize(&self, doc: &Document, target: NodeId, options: &CanvasOptions)
        -> Result<RasterSurface>;
}

/// Pure-Rust software backend: layout -> paint -> raster
pub struct SoftwareRasterizer;

impl SoftwareRasterizer {
    pub fn new() -> Self {
        SoftwareRasterizer
    }

    fn resolve_background(doc: &Document, target: NodeId, options: &CanvasOptions) -> BackgroundFill {
        if let Some(color) = &options.background_color {
            return match parse_color(color) {
                Some([_, _, _, 0]) | None => BackgroundFill::None,
                Some(rgba) => BackgroundFill::Solid(rgba),
            };
        }
        // No canvas fill requested: the element's own background renders
        let style = doc.computed_style(target);
        if let Some(background) = style.get("background") {
            if let Some(gradient) = parse_linear_gradient(background) {
                return BackgroundFill::Gradient(gradient);
            }
            if let Some(rgba) = parse_color(background) {
                if rgba[3] > 0 {
                    return BackgroundFill::Solid(rgba);
                }
            }
        }
        match style.get("background-color").and_then(parse_color) {
            Some([_, _, _, 0]) | None => BackgroundFill::None,
            Some(rgba) => BackgroundFill::Solid(rgba),
        }
    }
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(
        &self,
        doc: &Document,
        target: NodeId,
        options: &CanvasOptions,
    ) -> Result<RasterSurface> {
        if options.width <= 0.0 {
            return Err(Error::RenderError("target width must be positive".into()));
        }
        let mut clone = doc.clone_detached(doc.viewport);
        if let Some(hook) = &options.onclone {
            hook(&mut clone);
        }

        let card_layout = layout::layout_card(&clone, target, Some(options.width));
        let height = options.height.unwrap_or(card_layout.height);
        if height <= 0.0 {
            return Err(Error::RenderError("computed surface height is empty".into()));
        }

        let background = Self::resolve_background(&clone, target, options);
        let commands = paint::build_paint_list(&card_layout, height, &background);
        let image = raster::execute(&commands, options.width, height, options.scale);
        Ok(RasterSurface { image })
    }
}

/// Create the default rasterizer backend
pub fn new_rasterizer() -> Arc<dyn Rasterizer> {
    Arc::new(SoftwareRasterizer::new())
}
