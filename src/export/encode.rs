//! Per-format encoding and download delivery
//!
//! One raster surface fans out to any number of formats: PNG lossless,
//! JPEG at quality 92, WebP via the lossless encoder (the original's 0.9
//! lossy quality knob has no equivalent there). Filenames follow
//! `book-excerpt-<unix-ms>.<ext>` with the jpeg extension normalized to
//! `jpg`. Delivery goes through a [`DownloadSink`], the crate's stand-in
//! for the browser download.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::rasterize::RasterSurface;
use crate::state::ExportFormat;
use crate::{Error, Result};

const JPEG_QUALITY: u8 = 92;

/// One encoded export artifact ready for delivery
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Render as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Receives finished artifacts; one delivery per requested format
pub trait DownloadSink: Send {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<()>;
}

/// Writes artifacts into a directory, creating it on first delivery
pub struct FileSink {
    dir: PathBuf,
    pub delivered: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSink { dir: dir.into(), delivered: Vec::new() }
    }
}

impl DownloadSink for FileSink {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Other(format!("cannot create output dir: {}", e)))?;
        let path = self.dir.join(&artifact.filename);
        fs::write(&path, &artifact.bytes)
            .map_err(|e| Error::Other(format!("cannot write {}: {}", path.display(), e)))?;
        log::info!("saved {}", path.display());
        self.delivered.push(path);
        Ok(())
    }
}

/// Collects artifacts in memory; used by tests
#[derive(Default)]
pub struct MemorySink {
    pub artifacts: Vec<ExportArtifact>,
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<()> {
        self.artifacts.push(artifact);
        Ok(())
    }
}

/// Export filename for a format at the given unix-ms timestamp
pub fn filename(format: ExportFormat, timestamp_ms: u128) -> String {
    format!("book-excerpt-{}.{}", timestamp_ms, format.extension())
}

pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Encode a raster surface into the requested format.
/// The SVG format never reaches this path; it is serialized from the DOM.
pub fn encode_surface(surface: &RasterSurface, format: ExportFormat) -> Result<ExportArtifact> {
    let (width, height) = (surface.width(), surface.height());
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(surface.image.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| Error::EncodeError(format!("png: {}", e)))?;
        }
        ExportFormat::Jpeg | ExportFormat::Jpg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(surface.image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| Error::EncodeError(format!("jpeg: {}", e)))?;
        }
        ExportFormat::Webp => {
            WebPEncoder::new_lossless(&mut bytes)
                .encode(surface.image.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| Error::EncodeError(format!("webp: {}", e)))?;
        }
        ExportFormat::Svg => {
            return Err(Error::EncodeError(
                "svg is serialized from the document, not the raster".into(),
            ));
        }
    }
    Ok(ExportArtifact {
        filename: filename(format, now_ms()),
        mime: format.mime(),
        bytes,
    })
}
