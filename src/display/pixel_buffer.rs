// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// This is the canvas both effects draw into; the display layer uploads it
/// to a streaming texture each frame.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with the given resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Change dimensions in place. The backing allocation is only replaced
    /// when the dimensions actually change; contents are undefined afterwards
    /// (callers repaint).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width * height * 4) as usize;
        self.pixels.clear();
        self.pixels.resize(len, 0);
    }

    /// Clear to a solid opaque color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel(chunk, r, g, b);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Set a single pixel with custom alpha (for scratch tiles used with
    /// `blit_additive_tiled`)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx] = a;
            self.pixels[idx + 1] = b;
            self.pixels[idx + 2] = g;
            self.pixels[idx + 3] = r;
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Set pixel with alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let alpha = a as u16;
            self.pixels[idx] = 255; // A - always opaque
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
        }
    }

    /// Draw a horizontal line with alpha blending
    pub fn hline_blend(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let alpha = a as u16;
        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
            idx += 4;
        }
    }

    /// Fill a rectangle with alpha blending
    pub fn fill_rect_blend(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8, a: u8) {
        for row in 0..h as i32 {
            self.hline_blend(x, x + w as i32 - 1, y + row, r, g, b, a);
        }
    }

    /// Draw an alpha-blended line using Bresenham's algorithm with
    /// Cohen-Sutherland clipping. Clips to buffer bounds first, then draws
    /// without per-pixel bounds checks.
    pub fn line_blend(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8, a: u8) {
        let (visible, cx0, cy0, cx1, cy1) = self.clip_line(x0, y0, x1, y1);
        if !visible {
            return;
        }

        let alpha = a as u16;
        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);

            if x == cx1 && y == cy1 {
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

    /// Cohen-Sutherland line clipping algorithm
    /// Returns (visible, x0, y0, x1, y1) with clipped coordinates
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> (bool, i32, i32, i32, i32) {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Max iterations guards against degenerate input; the algorithm
        // converges in at most 4 iterations for valid coordinates
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return (true, x0, y0, x1, y1);
            }
            if (code0 & code1) != 0 {
                return (false, 0, 0, 0, 0);
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let (x, y);

            let dy = y1 - y0;
            let dx = x1 - x0;

            if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return (false, 0, 0, 0, 0);
                }
                x = x0 + dx * (h - 1 - y0) / dy;
                y = h - 1;
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return (false, 0, 0, 0, 0);
                }
                x = x0 + dx * (0 - y0) / dy;
                y = 0;
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return (false, 0, 0, 0, 0);
                }
                y = y0 + dy * (w - 1 - x0) / dx;
                x = w - 1;
            } else {
                // LEFT
                if dx == 0 {
                    return (false, 0, 0, 0, 0);
                }
                y = y0 + dy * (0 - x0) / dx;
                x = 0;
            }

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        (false, 0, 0, 0, 0)
    }

    // ========================================================================
    // Buffer Operations
    // ========================================================================

    /// Blit with a uniform alpha applied to the whole source
    pub fn blit_blend(&mut self, src: &PixelBuffer, x: i32, y: i32, alpha: u8) {
        let src_w = src.width as i32;
        let src_h = src.height as i32;

        for sy in 0..src_h {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }

            for sx in 0..src_w {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }

                let si = src.pixel_index(sx as u32, sy as u32);
                let (sr, sg, sb) = (src.pixels[si + 3], src.pixels[si + 2], src.pixels[si + 1]);
                self.blend_pixel(dx, dy, sr, sg, sb, alpha);
            }
        }
    }

    /// Blit using the source's own per-pixel alpha (source-over). Source
    /// pixels with alpha 0 leave the destination untouched.
    pub fn blit_over(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        let src_w = src.width as i32;
        let src_h = src.height as i32;

        for sy in 0..src_h {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }

            for sx in 0..src_w {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }

                let si = src.pixel_index(sx as u32, sy as u32);
                let a = src.pixels[si];
                if a == 0 {
                    continue;
                }
                let (sr, sg, sb) = (src.pixels[si + 3], src.pixels[si + 2], src.pixels[si + 1]);
                self.blend_pixel(dx, dy, sr, sg, sb, a);
            }
        }
    }

    /// Additively blend a smaller tile repeated across the whole buffer,
    /// scaled by the tile's own per-pixel alpha: dst += src * (a / 255),
    /// saturating. Used for noise overlays.
    pub fn blit_additive_tiled(&mut self, tile: &PixelBuffer) {
        if tile.width == 0 || tile.height == 0 {
            return;
        }

        for y in 0..self.height {
            let ty = y % tile.height;
            for x in 0..self.width {
                let tx = x % tile.width;
                let si = tile.pixel_index(tx, ty);
                let a = tile.pixels[si] as u16;
                if a == 0 {
                    continue;
                }

                let add_r = ((tile.pixels[si + 3] as u16 * a + 127) / 255) as u8;
                let add_g = ((tile.pixels[si + 2] as u16 * a + 127) / 255) as u8;
                let add_b = ((tile.pixels[si + 1] as u16 * a + 127) / 255) as u8;

                let di = self.pixel_index(x, y);
                self.pixels[di + 1] = self.pixels[di + 1].saturating_add(add_b);
                self.pixels[di + 2] = self.pixels[di + 2].saturating_add(add_g);
                self.pixels[di + 3] = self.pixels[di + 3].saturating_add(add_r);
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_blend_clips_without_panicking() {
        let mut buf = PixelBuffer::with_size(32, 32);
        buf.clear(0, 0, 0);
        buf.line_blend(-100, -100, 200, 200, 255, 255, 255, 128);
        buf.line_blend(-5, 40, -5, -40, 255, 255, 255, 128); // fully outside
        assert!(buf.get_pixel(0, 0).is_some());
    }

    #[test]
    fn test_blend_accumulates_toward_source() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.clear(0, 0, 0);
        buf.blend_pixel(1, 1, 200, 200, 200, 64);
        let first = buf.get_pixel(1, 1).unwrap().0;
        buf.blend_pixel(1, 1, 200, 200, 200, 64);
        let second = buf.get_pixel(1, 1).unwrap().0;
        assert!(first > 0);
        assert!(second > first);
        assert!(second <= 200);
    }

    #[test]
    fn test_blit_over_offset_clips() {
        let mut dst = PixelBuffer::with_size(8, 8);
        dst.clear(0, 0, 0);
        let mut src = PixelBuffer::with_size(8, 8);
        src.clear(255, 0, 0); // opaque red
        dst.blit_over(&src, 5, 0);
        assert_eq!(dst.get_pixel(4, 0), Some((0, 0, 0)));
        assert_eq!(dst.get_pixel(5, 0), Some((255, 0, 0)));
        assert_eq!(dst.get_pixel(7, 7), Some((255, 0, 0)));
    }

    #[test]
    fn test_blit_over_uses_source_alpha() {
        let mut dst = PixelBuffer::with_size(4, 1);
        dst.clear(0, 0, 0);
        let mut src = PixelBuffer::with_size(4, 1);
        src.set_pixel_rgba(0, 0, 200, 200, 200, 0); // fully transparent
        src.set_pixel_rgba(1, 0, 200, 200, 200, 128);
        src.set_pixel_rgba(2, 0, 200, 200, 200, 255);
        dst.blit_over(&src, 0, 0);
        assert_eq!(dst.get_pixel(0, 0), Some((0, 0, 0)));
        let half = dst.get_pixel(1, 0).unwrap().0;
        assert!(half > 80 && half < 120, "half-alpha blend: {}", half);
        assert_eq!(dst.get_pixel(2, 0), Some((200, 200, 200)));
    }

    #[test]
    fn test_additive_tiled_saturates() {
        let mut dst = PixelBuffer::with_size(4, 4);
        dst.clear(250, 250, 250);
        let mut tile = PixelBuffer::with_size(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                tile.set_pixel_rgba(x, y, 255, 255, 255, 255);
            }
        }
        dst.blit_additive_tiled(&tile);
        assert_eq!(dst.get_pixel(3, 3), Some((255, 255, 255)));
    }

    #[test]
    fn test_resize_only_on_dimension_change() {
        let mut buf = PixelBuffer::with_size(16, 16);
        buf.resize(16, 16);
        assert_eq!((buf.width(), buf.height()), (16, 16));
        buf.resize(32, 8);
        assert_eq!((buf.width(), buf.height()), (32, 8));
        assert_eq!(buf.as_bytes().len(), 32 * 8 * 4);
    }
}
