use super::Effect;
use crate::canvas::{Canvas, Path, RasterCanvas, Stroke};
use crate::config::{PaintConfig, Resolved};
use crate::display::PixelBuffer;
use crate::noise;
use crate::util::Rng;
use std::f32::consts::TAU;

/// Paper and ink tones for the standalone rendering
const PAPER: (u8, u8, u8) = (236, 238, 242);
const INK: (u8, u8, u8) = (24, 32, 48);

/// Stipple stream is decorrelated from the other layers by this constant
const STIPPLE_SALT: u32 = 0x9E37_79B9;

/// Procedurally generated "engineering blueprint" painter.
///
/// Pure and stateless: paints a layered drawing through the given canvas and
/// returns. Identical (size, config) inputs produce identical draw calls,
/// which is the central guarantee — the image looks hand-drawn but is fully
/// reproducible for a given seed.
///
/// Layers, in order: minor grid, major grid, diagonal hatch, calibration
/// reticle, oscilloscope traces, stipple noise. A layer whose alpha resolves
/// to 0 issues no draw call at all.
pub fn paint(canvas: &mut dyn Canvas, width: f32, height: f32, cfg: &PaintConfig) {
    let p = cfg.resolve();

    // All layer geometry is in logical units; the canvas scales back up
    let w = width.max(1.0) / p.dpr;
    let h = height.max(1.0) / p.dpr;
    canvas.set_scale(p.dpr);

    grid_pass(canvas, w, h, p.grid, p.seed, 3, p.grid_alpha);
    grid_pass(canvas, w, h, p.major, p.seed, 5, p.major_alpha);
    hatch_pass(canvas, w, h, &p);
    reticle_pass(canvas, w, h, &p);
    scope_pass(canvas, w, h, &p);
    stipple_pass(canvas, w, h, &p);
}

/// One stroke pass of grid lines. Verticals start at `seed mod spacing`,
/// horizontals at `seed * y_mul mod spacing`; every line is floored and
/// offset by 0.5 so a 1-unit stroke lands on a single pixel column/row.
fn grid_pass(canvas: &mut dyn Canvas, w: f32, h: f32, spacing: f32, seed: u32, y_mul: u32, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }

    let mut path = Path::new();

    let mut x = (seed as f64 % spacing as f64) as f32;
    while x <= w {
        let xx = x.floor() + 0.5;
        path.move_to(xx, 0.0);
        path.line_to(xx, h);
        x += spacing;
    }

    let mut y = ((seed as f64 * y_mul as f64) % spacing as f64) as f32;
    while y <= h {
        let yy = y.floor() + 0.5;
        path.move_to(0.0, yy);
        path.line_to(w, yy);
        y += spacing;
    }

    canvas.stroke(&path, &Stroke::new(1.0, alpha));
}

/// Parallel diagonal lines spanning the full diagonal extent
fn hatch_pass(canvas: &mut dyn Canvas, w: f32, h: f32, p: &Resolved) {
    if p.hatch_alpha <= 0.0 {
        return;
    }

    let diag = (w * w + h * h).sqrt();
    let mut path = Path::new();

    let mut t = -diag;
    while t < diag * 2.0 {
        path.move_to(t, -20.0);
        path.line_to(t + h + 20.0, h + 20.0);
        t += p.hatch;
    }

    canvas.stroke(&path, &Stroke::new(1.0, p.hatch_alpha));
}

/// Calibration reticle: three dashed concentric circles, a crosshair and
/// four L-shaped corner ticks
fn reticle_pass(canvas: &mut dyn Canvas, w: f32, h: f32, p: &Resolved) {
    if p.reticle_alpha <= 0.0 {
        return;
    }

    let cx = w * 0.5;
    let cy = h * 0.32;
    let base_r = w.min(h) * 0.10;
    let thin = Stroke::new(1.0, p.reticle_alpha);

    let mut rings = Path::new();
    for i in 0..3 {
        rings.circle(cx, cy, base_r * (1.0 + i as f32 * 0.85));
    }
    canvas.stroke(&rings, &thin.dashed(6.0, 10.0));

    let mut cross = Path::new();
    cross.move_to(cx - base_r * 2.1, cy + 0.5);
    cross.line_to(cx + base_r * 2.1, cy + 0.5);
    cross.move_to(cx + 0.5, cy - base_r * 2.1);
    cross.line_to(cx + 0.5, cy + base_r * 2.1);
    canvas.stroke(&cross, &thin);

    let tick = (p.grid * 0.6).max(10.0);
    let inset = (p.grid * 0.7).max(10.0);
    let mut ticks = Path::new();
    // Top-left
    ticks.move_to(inset, inset + 0.5);
    ticks.line_to(inset + tick, inset + 0.5);
    ticks.move_to(inset + 0.5, inset);
    ticks.line_to(inset + 0.5, inset + tick);
    // Top-right
    ticks.move_to(w - inset, inset + 0.5);
    ticks.line_to(w - inset - tick, inset + 0.5);
    ticks.move_to(w - inset + 0.5, inset);
    ticks.line_to(w - inset + 0.5, inset + tick);
    // Bottom-left
    ticks.move_to(inset, h - inset + 0.5);
    ticks.line_to(inset + tick, h - inset + 0.5);
    ticks.move_to(inset + 0.5, h - inset);
    ticks.line_to(inset + 0.5, h - inset - tick);
    // Bottom-right
    ticks.move_to(w - inset, h - inset + 0.5);
    ticks.line_to(w - inset - tick, h - inset + 0.5);
    ticks.move_to(w - inset + 0.5, h - inset);
    ticks.line_to(w - inset + 0.5, h - inset - tick);
    canvas.stroke(&ticks, &thin);
}

/// Three oscilloscope-like traces: sine waves of increasing frequency and
/// amplitude, roughened by hash noise so they read as hand-traced
fn scope_pass(canvas: &mut dyn Canvas, w: f32, h: f32, p: &Resolved) {
    if p.scope_alpha <= 0.0 {
        return;
    }

    let stroke = Stroke::new(p.scope_width, p.scope_alpha);

    for row in 0..3u32 {
        let r = row as f32;
        let y_base = h * (0.54 + r * 0.14);
        let freq = 1.6 + r * 0.35;
        let amp = 3.8 + r * 1.1;

        let mut path = Path::new();
        let mut x = 0.0f32;
        while x <= w {
            let s = ((x / w) * TAU * freq + p.phase * (0.7 + r * 0.2)).sin();
            let n = noise::wobble(x + r * 971.0, p.seed.wrapping_add(row * 1013));
            let y = y_base + s * amp + n * 1.6;
            if x == 0.0 {
                path.move_to(0.0, y);
            } else {
                path.line_to(x, y);
            }
            x += 6.0;
        }
        canvas.stroke(&path, &stroke);
    }
}

/// Sparse noise dots from the seeded random stream; count scales with area
fn stipple_pass(canvas: &mut dyn Canvas, w: f32, h: f32, p: &Resolved) {
    if p.noise_alpha <= 0.0 {
        return;
    }

    let mut rng = Rng::new(p.seed ^ STIPPLE_SALT);
    let count = ((w * h / 7000.0) as i32).clamp(250, 1800);

    for _ in 0..count {
        let x = (rng.next_f32() * w).floor();
        let y = (rng.next_f32() * h).floor();
        let size = if rng.next_f32() < 0.85 { 1.0 } else { 2.0 };
        canvas.fill_rect(x, y, size, size, p.noise_alpha);
    }
}

// ============================================================================
// Effect wrapper
// ============================================================================

/// Blueprint background as a frame-loop effect. The drawing is static: each
/// render repaints the same deterministic image for the current config.
pub struct Blueprint {
    config: PaintConfig,
}

impl Blueprint {
    pub fn new(config: PaintConfig) -> Self {
        Self { config }
    }
}

impl Effect for Blueprint {
    fn update(&mut self, _dt: f32, _width: u32, _height: u32) {
        // Nothing animates; the painter re-runs against the current buffer
        // size in render()
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.clear(PAPER.0, PAPER.1, PAPER.2);
        let (w, h) = (buffer.width() as f32, buffer.height() as f32);
        let mut canvas = RasterCanvas::new(buffer, INK);
        paint(&mut canvas, w, h, &self.config);
    }

    fn name(&self) -> &str {
        "Blueprint"
    }
}
