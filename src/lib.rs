//! Bookcard Engine
//!
//! A headless book-excerpt card generator: build a styled card document
//! from a quote, book, author, and seal text, preview it, and export it
//! to PNG/JPEG/WebP/SVG through a capture pipeline that snapshots styles,
//! resolves the themed background, sanitizes a document clone, optionally
//! re-flows the text into vertical columns, and fans one raster out to
//! every requested format.
//!
//! # Features
//!
//! - **Software rasterizer** (built in): deterministic layout/paint/raster
//!   backend behind the swappable [`Rasterizer`] trait
//! - **Explicit configuration**: themes, fonts, and colors are passed in
//!   as a [`ConfigSet`], optionally merged from a remote config server
//! - **Safe capture**: style snapshot/restore on every path, overlapping
//!   exports rejected
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookcard::export::encode::FileSink;
//! use bookcard::{
//!     new_rasterizer, AppState, BookExcerptApp, ConfigSet, ContentCache, FixedPlatform,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = BookExcerptApp::new(
//!     ConfigSet::defaults(),
//!     AppState::default(),
//!     Arc::new(FixedPlatform::new()),
//!     new_rasterizer(),
//!     ContentCache::disabled(),
//! );
//! app.set_quote("问渠那得清如许，为有源头活水来。");
//! app.set_theme("theme-paper");
//!
//! let mut sink = FileSink::new("out");
//! let rt = tokio::runtime::Runtime::new()?;
//! rt.block_on(app.export(&[], &mut sink))?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub mod style;

pub mod state;
pub mod theme;

pub mod card;
pub mod platform;
pub mod schedule;

// Rendering backend (layout -> paint -> raster)
pub mod rasterize;

// The capture/export pipeline
pub mod export;

pub mod preview;
pub mod thumbnail;

// Persistence and configuration surfaces
pub mod cache;
pub mod import;
pub mod remote;

pub mod app;

pub use app::BookExcerptApp;
pub use cache::ContentCache;
pub use export::{ExportTuning, Exporter};
pub use platform::{DeviceMetrics, FixedPlatform, Platform};
pub use preview::PreviewController;
pub use rasterize::{new_rasterizer, CanvasOptions, RasterSurface, Rasterizer};
pub use state::{AppState, AppStateUpdate, CardContent, ExportFormat, Layout, TextAlign};
pub use theme::{ConfigSet, FontColor, FontFamily, ThemeDescriptor};
pub use thumbnail::ThumbnailManager;

/// Viewport dimensions a document is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}
