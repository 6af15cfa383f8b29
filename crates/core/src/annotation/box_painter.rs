use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::color::Bgr;
use crate::shared::frame::Frame;

use super::glyphs::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Label text color (near-white), drawn over a box-colored background.
const LABEL_TEXT_COLOR: Bgr = Bgr([225, 255, 255]);

/// Draws a hollow rectangle around `bbox` and, optionally, a filled label
/// tab above it.
///
/// The stroke is centered on the box edge, so a thickness of 3 covers one
/// pixel outside the box, the edge itself, and one pixel inside. Drawing is
/// clipped to the frame.
pub fn draw_box(
    frame: &mut Frame,
    bbox: &BoundingBox,
    label: Option<&str>,
    color: Bgr,
    thickness: u32,
) {
    let (fw, fh) = (frame.width(), frame.height());
    if frame.is_empty() || bbox.is_degenerate() {
        return;
    }

    {
        let Some(mut canvas) = ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(fw, fh, frame.data_mut())
        else {
            return;
        };
        let thickness = thickness.max(1) as i32;
        let first = -(thickness - 1) / 2;
        for d in first..first + thickness {
            let w = bbox.width() + 2 * d;
            let h = bbox.height() + 2 * d;
            if w <= 0 || h <= 0 {
                continue;
            }
            let rect = Rect::at(bbox.x1 - d, bbox.y1 - d).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut canvas, rect, Rgb(color.0));
        }
    }

    if let Some(text) = label {
        draw_label(frame, bbox, text, color, thickness);
    }
}

/// Text height in pixels for a given stroke thickness.
pub fn label_height(thickness: u32) -> u32 {
    GLYPH_HEIGHT * glyph_scale(thickness) + 2 * label_padding(thickness)
}

fn glyph_scale(thickness: u32) -> u32 {
    thickness.max(1).div_ceil(2)
}

fn label_padding(thickness: u32) -> u32 {
    glyph_scale(thickness)
}

fn draw_label(frame: &mut Frame, bbox: &BoundingBox, text: &str, color: Bgr, thickness: u32) {
    let scale = glyph_scale(thickness) as i32;
    let pad = label_padding(thickness) as i32;
    let advance = (GLYPH_WIDTH as i32 + 1) * scale;
    let tab_w = text.chars().count() as i32 * advance + 2 * pad;
    let tab_h = label_height(thickness) as i32;

    // Sit on top of the box, or just inside it when there is no room above.
    let top = if bbox.y1 - tab_h >= 0 {
        bbox.y1 - tab_h
    } else {
        bbox.y1
    };
    let left = bbox.x1;

    let (fw, fh) = (frame.width(), frame.height());
    if let Some(mut canvas) = ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(fw, fh, frame.data_mut()) {
        if tab_w > 0 {
            let rect = Rect::at(left, top).of_size(tab_w as u32, tab_h as u32);
            draw_filled_rect_mut(&mut canvas, rect, Rgb(color.0));
        }
    }

    let mut cursor_x = left + pad;
    let cursor_y = top + pad;
    for ch in text.chars() {
        draw_glyph(frame, cursor_x, cursor_y, ch, scale);
        cursor_x += advance;
    }
}

fn draw_glyph(frame: &mut Frame, x: i32, y: i32, ch: char, scale: i32) {
    let (fw, fh) = (frame.width() as i32, frame.height() as i32);
    for (row, bits) in glyph(ch).iter().enumerate() {
        for col in 0..GLYPH_WIDTH as i32 {
            if (bits >> (GLYPH_WIDTH as i32 - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as i32 * scale + dy;
                    if px >= 0 && py >= 0 && px < fw && py < fh {
                        frame.set_pixel(px as u32, py as u32, LABEL_TEXT_COLOR.0);
                    }
                }
            }
        }
    }
}
