//! Paint command execution into an RGBA surface
//!
//! Text runs are painted as block glyphs: the software backend is a
//! deterministic stand-in for a real type-setting rasterizer, which keeps
//! golden tests content-addressed without shipping font shaping.

use image::RgbaImage;
use sha2::{Digest, Sha256};

use crate::rasterize::layout::Rect;
use crate::rasterize::paint::PaintCommand;
use crate::style::Gradient;

/// Execute a command list into a surface of `width x height` CSS pixels
/// at the given device scale.
pub fn execute(commands: &[PaintCommand], width: f32, height: f32, scale: f32) -> RgbaImage {
    let scale = scale.max(0.1);
    let pw = (width * scale).round().max(1.0) as u32;
    let ph = (height * scale).round().max(1.0) as u32;
    let mut img = RgbaImage::from_pixel(pw, ph, image::Rgba([0, 0, 0, 0]));

    for command in commands {
        match command {
            PaintCommand::SolidRect { rect, rgba } => {
                fill_rect(&mut img, rect, scale, |_, _| *rgba);
            }
            PaintCommand::GradientRect { rect, gradient } => {
                fill_rect(&mut img, rect, scale, |x, y| {
                    gradient_at(gradient, rect, x / scale, y / scale)
                });
            }
            PaintCommand::FrameRect { rect, rgba, thickness } => {
                let t = *thickness;
                let edges = [
                    Rect { x: rect.x, y: rect.y, width: rect.width, height: t },
                    Rect { x: rect.x, y: rect.y + rect.height - t, width: rect.width, height: t },
                    Rect { x: rect.x, y: rect.y, width: t, height: rect.height },
                    Rect { x: rect.x + rect.width - t, y: rect.y, width: t, height: rect.height },
                ];
                for edge in &edges {
                    fill_rect(&mut img, edge, scale, |_, _| *rgba);
                }
            }
            PaintCommand::TextBlock { rect, lines, px, line_height, rgba, centered } => {
                draw_text_block(&mut img, rect, lines, *px, *line_height, *rgba, *centered, scale);
            }
        }
    }
    img
}

fn fill_rect<F>(img: &mut RgbaImage, rect: &Rect, scale: f32, color_at: F)
where
    F: Fn(f32, f32) -> [u8; 4],
{
    let x0 = (rect.x * scale).round().max(0.0) as u32;
    let y0 = (rect.y * scale).round().max(0.0) as u32;
    let x1 = (((rect.x + rect.width) * scale).round() as u32).min(img.width());
    let y1 = (((rect.y + rect.height) * scale).round() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let src = color_at(x as f32, y as f32);
            blend(img, x, y, src);
        }
    }
}

fn blend(img: &mut RgbaImage, x: u32, y: u32, src: [u8; 4]) {
    if src[3] == 0 {
        return;
    }
    let dst = img.get_pixel_mut(x, y);
    if src[3] == 255 {
        *dst = image::Rgba(src);
        return;
    }
    let a = src[3] as f32 / 255.0;
    for i in 0..3 {
        dst.0[i] = (src[i] as f32 * a + dst.0[i] as f32 * (1.0 - a)).round() as u8;
    }
    dst.0[3] = dst.0[3].max(src[3]);
}

/// Sample a CSS linear gradient at a point inside a rect.
/// 0deg points up; the projection runs along the gradient line through
/// the rect center.
fn gradient_at(gradient: &Gradient, rect: &Rect, x: f32, y: f32) -> [u8; 4] {
    let theta = gradient.angle_deg.to_radians();
    let (dx, dy) = (theta.sin(), -theta.cos());
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    let line_len = (rect.width * dx).abs() + (rect.height * dy).abs();
    let t = if line_len <= f32::EPSILON {
        0.5
    } else {
        0.5 + ((x - cx) * dx + (y - cy) * dy) / line_len
    };
    sample_stops(&gradient.stops, t.clamp(0.0, 1.0))
}

fn sample_stops(stops: &[([u8; 4], f32)], t: f32) -> [u8; 4] {
    match stops.first() {
        None => [0, 0, 0, 0],
        Some(first) if t <= first.1 => first.0,
        Some(_) => {
            for window in stops.windows(2) {
                let (ca, pa) = window[0];
                let (cb, pb) = window[1];
                if t <= pb {
                    let span = (pb - pa).max(f32::EPSILON);
                    let k = (t - pa) / span;
                    let mut out = [0u8; 4];
                    for i in 0..4 {
                        out[i] = (ca[i] as f32 * (1.0 - k) + cb[i] as f32 * k).round() as u8;
                    }
                    return out;
                }
            }
            stops[stops.len() - 1].0
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_text_block(
    img: &mut RgbaImage,
    rect: &Rect,
    lines: &[String],
    px: f32,
    line_height: f32,
    rgba: [u8; 4],
    centered: bool,
    scale: f32,
) {
    let glyph = px * 0.72;
    let inset = (px - glyph) / 2.0;
    for (row, line) in lines.iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        let line_width = chars.len() as f32 * px;
        let start_x = if centered {
            rect.x + ((rect.width - line_width) / 2.0).max(0.0)
        } else {
            rect.x
        };
        let baseline_y = rect.y + row as f32 * line_height + (line_height - glyph) / 2.0;
        for (col, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let cell = Rect {
                x: start_x + col as f32 * px + inset,
                y: baseline_y,
                width: glyph,
                height: glyph,
            };
            fill_rect(img, &cell, scale, |_, _| rgba);
        }
    }
}

/// Content digest of a surface, used by the golden tests
pub fn digest(img: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(img.width().to_le_bytes());
    hasher.update(img.height().to_le_bytes());
    hasher.update(img.as_raw());
    hex::encode(hasher.finalize())
}
