//! Owned pixel buffers behind canvas widgets.
//!
//! Pixels are ARGB8888, row-major, stride equal to the width, stored
//! little-endian (`B G R A` in memory) so the buffer can be handed to the
//! toolkit as-is. Drawing clips silently: coordinates outside the buffer are
//! clamped or skipped, never an error.

use crate::error::UiError;

/// Width and height used when a canvas does not declare them.
pub const DEFAULT_CANVAS_SIZE: i32 = 200;

/// Bytes per ARGB8888 pixel.
const BYTES_PER_PIXEL: usize = 4;

/// `0xRRGGBB` → opaque `0xAARRGGBB`.
#[inline]
pub fn rgb_to_argb(rgb: u32) -> u32 {
    0xFF00_0000 | (rgb & 0x00FF_FFFF)
}

/// A `width × height` ARGB8888 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct CanvasBuffer {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for CanvasBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl CanvasBuffer {
    /// Allocate a buffer filled with `background` (`0xRRGGBB`).
    ///
    /// Fails when the size is not positive, exceeds `max_bytes`, or the
    /// allocator refuses the reservation.
    pub fn try_new(width: i32, height: i32, background: u32, max_bytes: usize) -> Result<Self, UiError> {
        let requested = (width.max(0) as usize)
            .saturating_mul(height.max(0) as usize)
            .saturating_mul(BYTES_PER_PIXEL);
        if width <= 0 || height <= 0 || requested > max_bytes {
            return Err(UiError::CanvasAllocation { requested });
        }
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(requested)
            .map_err(|_| UiError::CanvasAllocation { requested })?;
        pixels.resize(requested, 0);
        let mut buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.clear(background);
        Ok(buffer)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Raw ARGB8888 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether `(x, y)` lies inside the buffer.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// ARGB value at `(x, y)`, or `None` outside the buffer.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<u32> {
        if !self.contains(x, y) {
            return None;
        }
        let at = self.offset(i64::from(x), i64::from(y));
        let bytes: [u8; 4] = self.pixels[at..at + BYTES_PER_PIXEL].try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Fill the whole buffer.
    pub fn clear(&mut self, rgb: u32) {
        let bytes = rgb_to_argb(rgb).to_le_bytes();
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Fill a rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, rgb: u32) {
        let x1 = i64::from(x).max(0);
        let y1 = i64::from(y).max(0);
        let x2 = (i64::from(x) + i64::from(w)).min(i64::from(self.width)) - 1;
        let y2 = (i64::from(y) + i64::from(h)).min(i64::from(self.height)) - 1;
        if x1 > x2 || y1 > y2 {
            return;
        }
        self.fill_span(x1, y1, x2, y2, rgb_to_argb(rgb));
    }

    /// Set one pixel; out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgb: u32) {
        if self.contains(x, y) {
            self.put(i64::from(x), i64::from(y), rgb_to_argb(rgb));
        }
    }

    /// Filled circle: every pixel with `dx² + dy² ≤ r²`.
    ///
    /// Only the part of the bounding box inside the buffer is visited.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, rgb: u32) {
        if r < 0 {
            return;
        }
        let argb = rgb_to_argb(rgb);
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let rows = (cy - r).max(0)..=(cy + r).min(i64::from(self.height) - 1);
        let cols = (cx - r).max(0)..=(cx + r).min(i64::from(self.width) - 1);
        for row in rows {
            let dy = row - cy;
            for col in cols.clone() {
                let dx = col - cx;
                if dx * dx + dy * dy <= r * r {
                    self.put(col, row, argb);
                }
            }
        }
    }

    /// Bresenham line stamped with a square brush of half-width
    /// `thickness / 2`.
    ///
    /// The segment is first clipped to the buffer grown by the brush, so
    /// endpoints far outside the canvas cost nothing. The brush half-width
    /// is capped at the larger canvas side.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, rgb: u32, thickness: i32) {
        let argb = rgb_to_argb(rgb);
        let radius = i64::from(thickness / 2).min(i64::from(self.width.max(self.height)));
        if radius < 0 {
            return;
        }
        let bounds = (
            -radius,
            -radius,
            i64::from(self.width) - 1 + radius,
            i64::from(self.height) - 1 + radius,
        );
        let from = (i64::from(x1), i64::from(y1));
        let to = (i64::from(x2), i64::from(y2));
        let Some(((mut x, mut y), (x_end, y_end))) = clip_segment(from, to, bounds) else {
            return;
        };

        let dx = (x_end - x).abs();
        let dy = -(y_end - y).abs();
        let sx = if x < x_end { 1 } else { -1 };
        let sy = if y < y_end { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            let bx1 = (x - radius).max(0);
            let by1 = (y - radius).max(0);
            let bx2 = (x + radius).min(i64::from(self.width) - 1);
            let by2 = (y + radius).min(i64::from(self.height) - 1);
            if bx1 <= bx2 && by1 <= by2 {
                self.fill_span(bx1, by1, bx2, by2, argb);
            }
            if x == x_end && y == y_end {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill the inclusive box `(x1, y1)..=(x2, y2)`, already clipped.
    fn fill_span(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, argb: u32) {
        for row in y1..=y2 {
            for col in x1..=x2 {
                self.put(col, row, argb);
            }
        }
    }

    fn put(&mut self, x: i64, y: i64, argb: u32) {
        let at = self.offset(x, y);
        self.pixels[at..at + BYTES_PER_PIXEL].copy_from_slice(&argb.to_le_bytes());
    }

    fn offset(&self, x: i64, y: i64) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

/// Liang-Barsky clip of `from → to` against the inclusive box
/// `(xmin, ymin, xmax, ymax)`. Endpoints already inside are kept exactly.
fn clip_segment(
    from: (i64, i64),
    to: (i64, i64),
    (xmin, ymin, xmax, ymax): (i64, i64, i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let (x1, y1) = (from.0 as f64, from.1 as f64);
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, x1 - xmin as f64),
        (dx, xmax as f64 - x1),
        (-dy, y1 - ymin as f64),
        (dy, ymax as f64 - y1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| {
        (
            ((x1 + t * dx).round() as i64).clamp(xmin, xmax),
            ((y1 + t * dy).round() as i64).clamp(ymin, ymax),
        )
    };
    let start = if t0 > 0.0 { at(t0) } else { from };
    let end = if t1 < 1.0 { at(t1) } else { to };
    Some((start, end))
}
