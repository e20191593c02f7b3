//! Path-based drawing seam for the blueprint painter.
//!
//! The painter never touches pixels directly: it builds [`Path`]s and
//! strokes them through the [`Canvas`] trait. The production implementation
//! is [`RasterCanvas`] over a `PixelBuffer`; tests substitute a recording
//! canvas to observe exactly which draw calls a paint issued.

use crate::display::PixelBuffer;

/// A single path command, in logical (pre-scale) units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Circle { cx: f32, cy: f32, r: f32 },
}

/// An ordered list of path commands
#[derive(Debug, Clone, Default)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.cmds.push(PathCmd::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.cmds.push(PathCmd::LineTo(x, y));
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.cmds.push(PathCmd::Circle { cx, cy, r });
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn cmds(&self) -> &[PathCmd] {
        &self.cmds
    }
}

/// Stroke style: line width, opacity, optional (on, off) dash pattern.
/// All lengths are in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub alpha: f32,
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn new(width: f32, alpha: f32) -> Self {
        Self {
            width,
            alpha,
            dash: None,
        }
    }

    pub fn dashed(mut self, on: f32, off: f32) -> Self {
        self.dash = Some((on, off));
        self
    }
}

/// Drawing surface the painter renders through
pub trait Canvas {
    /// Uniform scale applied to all subsequent coordinates (device pixels
    /// per logical unit). Called once at the start of a paint.
    fn set_scale(&mut self, scale: f32);

    /// Stroke every segment of `path` in one pass
    fn stroke(&mut self, path: &Path, stroke: &Stroke);

    /// Fill an axis-aligned rectangle at the given opacity
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32);
}

// ============================================================================
// RasterCanvas
// ============================================================================

/// Dash pattern walker, in device units. `dist` accumulates along the path
/// so dashes stay continuous across polyline joints.
struct DashPen {
    on: f32,
    off: f32,
    dist: f32,
}

/// Rasterizing canvas: strokes paths onto a `PixelBuffer` with a fixed ink
/// color and alpha blending
pub struct RasterCanvas<'a> {
    buffer: &'a mut PixelBuffer,
    ink: (u8, u8, u8),
    scale: f32,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(buffer: &'a mut PixelBuffer, ink: (u8, u8, u8)) -> Self {
        Self {
            buffer,
            ink,
            scale: 1.0,
        }
    }

    fn alpha_u8(alpha: f32) -> u8 {
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Draw one device-space segment, widening by parallel offsets along the
    /// perpendicular for thickness > 1
    fn draw_segment(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, thickness: i32, a: u8) {
        let (r, g, b) = self.ink;
        if thickness <= 1 {
            self.buffer.line_blend(
                x0.round() as i32,
                y0.round() as i32,
                x1.round() as i32,
                y1.round() as i32,
                r,
                g,
                b,
                a,
            );
            return;
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 0.001 {
            self.buffer.blend_pixel(x0.round() as i32, y0.round() as i32, r, g, b, a);
            return;
        }

        // Perpendicular unit vector
        let px = -dy / len;
        let py = dx / len;

        let half = (thickness - 1) as f32 / 2.0;
        for i in 0..thickness {
            let offset = i as f32 - half;
            let ox = px * offset;
            let oy = py * offset;
            self.buffer.line_blend(
                (x0 + ox).round() as i32,
                (y0 + oy).round() as i32,
                (x1 + ox).round() as i32,
                (y1 + oy).round() as i32,
                r,
                g,
                b,
                a,
            );
        }
    }

    /// Draw a device-space segment through the dash pen, splitting it into
    /// on/off runs by accumulated length
    fn draw_dashed(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        thickness: i32,
        a: u8,
        pen: &mut DashPen,
    ) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return;
        }
        let ux = dx / len;
        let uy = dy / len;
        let period = pen.on + pen.off;

        let mut t = 0.0;
        while t < len {
            let phase = pen.dist % period;
            let (drawing, run) = if phase < pen.on {
                (true, pen.on - phase)
            } else {
                (false, period - phase)
            };
            let step = run.min(len - t);
            if drawing {
                self.draw_segment(
                    x0 + ux * t,
                    y0 + uy * t,
                    x0 + ux * (t + step),
                    y0 + uy * (t + step),
                    thickness,
                    a,
                );
            }
            t += step;
            pen.dist += step;
        }
    }
}

impl Canvas for RasterCanvas<'_> {
    fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(f32::MIN_POSITIVE);
    }

    fn stroke(&mut self, path: &Path, stroke: &Stroke) {
        let a = Self::alpha_u8(stroke.alpha);
        if a == 0 || path.is_empty() {
            return;
        }

        let s = self.scale;
        let thickness = (stroke.width * s).round().max(1.0) as i32;
        let mut pen = stroke.dash.map(|(on, off)| DashPen {
            on: (on * s).max(f32::EPSILON),
            off: off * s,
            dist: 0.0,
        });

        let mut cursor: Option<(f32, f32)> = None;
        for cmd in path.cmds() {
            match *cmd {
                PathCmd::MoveTo(x, y) => {
                    cursor = Some((x * s, y * s));
                    // Dash phase restarts with each subpath
                    if let Some(ref mut p) = pen {
                        p.dist = 0.0;
                    }
                },
                PathCmd::LineTo(x, y) => {
                    let to = (x * s, y * s);
                    if let Some(from) = cursor {
                        match pen {
                            Some(ref mut p) => {
                                self.draw_dashed(from.0, from.1, to.0, to.1, thickness, a, p);
                            },
                            None => self.draw_segment(from.0, from.1, to.0, to.1, thickness, a),
                        }
                    }
                    cursor = Some(to);
                },
                PathCmd::Circle { cx, cy, r } => {
                    // Flatten to chords roughly 3 device pixels long
                    let dcx = cx * s;
                    let dcy = cy * s;
                    let dr = r * s;
                    let steps = ((std::f32::consts::TAU * dr / 3.0) as usize).clamp(24, 256);
                    if let Some(ref mut p) = pen {
                        p.dist = 0.0;
                    }
                    let point = |i: usize| {
                        let angle = std::f32::consts::TAU * i as f32 / steps as f32;
                        (dcx + angle.cos() * dr, dcy + angle.sin() * dr)
                    };
                    let mut prev = point(0);
                    for i in 1..=steps {
                        let next = point(i);
                        match pen {
                            Some(ref mut p) => {
                                self.draw_dashed(prev.0, prev.1, next.0, next.1, thickness, a, p);
                            },
                            None => {
                                self.draw_segment(prev.0, prev.1, next.0, next.1, thickness, a);
                            },
                        }
                        prev = next;
                    }
                    cursor = None;
                },
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        let a = Self::alpha_u8(alpha);
        if a == 0 {
            return;
        }
        let (r, g, b) = self.ink;
        let s = self.scale;
        self.buffer.fill_rect_blend(
            (x * s).round() as i32,
            (y * s).round() as i32,
            ((w * s).round() as u32).max(1),
            ((h * s).round() as u32).max(1),
            r,
            g,
            b,
            a,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_pixels(buf: &PixelBuffer) -> usize {
        let mut count = 0;
        for y in 0..buf.height() as i32 {
            for x in 0..buf.width() as i32 {
                if buf.get_pixel(x, y) != Some((0, 0, 0)) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_zero_alpha_stroke_draws_nothing() {
        let mut buf = PixelBuffer::with_size(32, 32);
        buf.clear(0, 0, 0);
        let mut canvas = RasterCanvas::new(&mut buf, (255, 255, 255));
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(31.0, 31.0);
        canvas.stroke(&path, &Stroke::new(1.0, 0.0));
        assert_eq!(ink_pixels(&buf), 0);
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut buf = PixelBuffer::with_size(64, 8);
        buf.clear(0, 0, 0);
        let mut canvas = RasterCanvas::new(&mut buf, (255, 255, 255));
        let mut path = Path::new();
        path.move_to(0.0, 4.0);
        path.line_to(63.0, 4.0);
        canvas.stroke(&path, &Stroke::new(1.0, 1.0).dashed(6.0, 10.0));
        let drawn = ink_pixels(&buf);
        // 6-on/10-off over 64 units: roughly 3/8 coverage, never solid
        assert!(drawn > 10 && drawn < 40, "drawn = {}", drawn);
    }

    #[test]
    fn test_scale_doubles_extent() {
        let mut buf = PixelBuffer::with_size(64, 64);
        buf.clear(0, 0, 0);
        let mut canvas = RasterCanvas::new(&mut buf, (255, 255, 255));
        canvas.set_scale(2.0);
        let mut path = Path::new();
        path.move_to(0.0, 10.0);
        path.line_to(20.0, 10.0);
        canvas.stroke(&path, &Stroke::new(1.0, 1.0));
        // Logical (20, 10) lands at device (40, 20)
        assert_ne!(buf.get_pixel(40, 20), Some((0, 0, 0)));
        assert_eq!(buf.get_pixel(40, 10), Some((0, 0, 0)));
    }

    #[test]
    fn test_thick_stroke_covers_more_pixels() {
        let mut thin_buf = PixelBuffer::with_size(32, 32);
        thin_buf.clear(0, 0, 0);
        let mut thin = RasterCanvas::new(&mut thin_buf, (255, 255, 255));
        let mut path = Path::new();
        path.move_to(2.0, 16.0);
        path.line_to(30.0, 16.0);
        thin.stroke(&path, &Stroke::new(1.0, 1.0));

        let mut thick_buf = PixelBuffer::with_size(32, 32);
        thick_buf.clear(0, 0, 0);
        let mut thick = RasterCanvas::new(&mut thick_buf, (255, 255, 255));
        thick.stroke(&path, &Stroke::new(3.0, 1.0));

        assert!(ink_pixels(&thick_buf) > 2 * ink_pixels(&thin_buf));
    }

    #[test]
    fn test_circle_is_closed_ring() {
        let mut buf = PixelBuffer::with_size(64, 64);
        buf.clear(0, 0, 0);
        let mut canvas = RasterCanvas::new(&mut buf, (255, 255, 255));
        let mut path = Path::new();
        path.circle(32.0, 32.0, 20.0);
        canvas.stroke(&path, &Stroke::new(1.0, 1.0));

        // Ink lands near each cardinal point (flattening may be off by a
        // pixel), while the center stays empty
        let near = |cx: i32, cy: i32| {
            (-1..=1).any(|dy| {
                (-1..=1).any(|dx| buf.get_pixel(cx + dx, cy + dy) != Some((0, 0, 0)))
            })
        };
        assert!(near(52, 32));
        assert!(near(12, 32));
        assert!(near(32, 52));
        assert!(near(32, 12));
        assert_eq!(buf.get_pixel(32, 32), Some((0, 0, 0)));
    }
}
