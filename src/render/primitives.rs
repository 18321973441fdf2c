//! Primitive rasterization for axis lines.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Draw a line using Bresenham's algorithm (non-antialiased).
///
/// Pixels outside the framebuffer are skipped.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    bresenham(x0, y0, x1, y1, |x, y| plot(fb, x, y, color));
}

/// Draw a line `width` pixels thick by stamping a square brush along a
/// Bresenham path.
///
/// The brush is centered on the path; even widths extend one pixel further
/// toward the top-left.
pub fn draw_thick_line(
    fb: &mut Framebuffer,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    width: u32,
    color: Rgba,
) {
    if width <= 1 {
        draw_line(fb, x0, y0, x1, y1, color);
        return;
    }

    let w = width as i32;
    let lead = w / 2;
    bresenham(x0, y0, x1, y1, |x, y| {
        let left = x - lead;
        let top = y - lead;
        // Clip the brush against the origin; fill_rect clamps the far edges.
        let (left, bw) = clip(left, w);
        let (top, bh) = clip(top, w);
        if bw > 0 && bh > 0 {
            fb.fill_rect(left, top, bw, bh, color);
        }
    });
}

fn clip(start: i32, len: i32) -> (u32, u32) {
    if start >= 0 {
        (start as u32, len as u32)
    } else {
        (0, (len + start).max(0) as u32)
    }
}

#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba) {
    if x >= 0 && y >= 0 {
        fb.set_pixel(x as u32, y as u32, color);
    }
}

fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut visit: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        visit(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}
