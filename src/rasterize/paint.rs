//! Paint command list for the software rasterizer

use crate::rasterize::layout::{CardLayout, Rect};
use crate::style::Gradient;

/// The background fill painted before any content
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundFill {
    /// Nothing painted; pixels stay transparent
    None,
    Solid([u8; 4]),
    Gradient(Gradient),
}

#[derive(Debug, Clone)]
pub enum PaintCommand {
    SolidRect {
        rect: Rect,
        rgba: [u8; 4],
    },
    GradientRect {
        rect: Rect,
        gradient: Gradient,
    },
    /// Stroked rectangle outline
    FrameRect {
        rect: Rect,
        rgba: [u8; 4],
        thickness: f32,
    },
    /// Lines of text drawn as block glyphs
    TextBlock {
        rect: Rect,
        lines: Vec<String>,
        px: f32,
        line_height: f32,
        rgba: [u8; 4],
        centered: bool,
    },
}

/// Flatten a layout plus background into an ordered command list.
/// Background first, frames next, text on top.
pub fn build_paint_list(
    layout: &CardLayout,
    height: f32,
    background: &BackgroundFill,
) -> Vec<PaintCommand> {
    let mut commands = Vec::new();
    let full = Rect { x: 0.0, y: 0.0, width: layout.width, height };
    match background {
        BackgroundFill::None => {}
        BackgroundFill::Solid(rgba) => {
            commands.push(PaintCommand::SolidRect { rect: full, rgba: *rgba })
        }
        BackgroundFill::Gradient(gradient) => commands.push(PaintCommand::GradientRect {
            rect: full,
            gradient: gradient.clone(),
        }),
    }
    for frame in &layout.frames {
        commands.push(PaintCommand::FrameRect {
            rect: frame.rect.clone(),
            rgba: frame.color,
            thickness: frame.thickness,
        });
    }
    for block in &layout.blocks {
        commands.push(PaintCommand::TextBlock {
            rect: block.rect.clone(),
            lines: block.lines.clone(),
            px: block.px,
            line_height: block.line_height,
            rgba: block.color,
            centered: block.centered,
        });
    }
    commands
}
