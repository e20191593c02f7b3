use super::Effect;
use crate::display::PixelBuffer;
use crate::util::Rng;

/// Side of the pregenerated greyscale noise tile
const NOISE_TILE: u32 = 256;
/// Per-pixel alpha of the noise tile (faint film grain, not static)
const NOISE_ALPHA: u8 = 35;
/// Chance per frame of a glitch burst; tuning constant, overridable via
/// [`Datamosh::set_burst_chance`]
pub const BURST_CHANCE: f32 = 0.06;
/// How much a burst pushes the intensity toward 1
const BURST_KICK: f32 = 0.5;
/// Linear burst decay per second
const BURST_DECAY: f32 = 0.6;
/// Horizontal / vertical smear of the jittered redraw, device pixels
const JITTER_X: i32 = 9;
const JITTER_Y: i32 = 4;

/// Background behind the composite
const BG: (u8, u8, u8) = (17, 19, 24);
/// Gradient endpoints of the base image: warm umber fading to white
const GRAD_FROM: (u8, u8, u8, f32) = (111, 76, 30, 0.25);
const GRAD_TO: (u8, u8, u8, f32) = (255, 255, 255, 0.6);

/// Datamosh header effect: a static gradient base image, smeared every frame
/// by an offset redraw of itself plus additive noise, presented at an alpha
/// modulated by a decaying "burst" intensity.
///
/// In reduced-motion mode the effect never animates and renders the static
/// base gradient instead.
pub struct Datamosh {
    /// Static gradient, regenerated on resize
    base: PixelBuffer,
    /// Fixed noise tile, generated once at construction and never touched
    noise: PixelBuffer,
    /// Scratch composite rebuilt every frame
    mosh: PixelBuffer,
    burst: f32,
    burst_chance: f32,
    rng: Rng,
    animate: bool,
}

impl Datamosh {
    /// `animate = false` is the reduced-motion path: the glitch loop never
    /// starts and only the base gradient is ever shown
    pub fn new(animate: bool) -> Self {
        let mut rng = Rng::new(0x4D05_11ED);
        let mut noise = PixelBuffer::with_size(NOISE_TILE, NOISE_TILE);
        for y in 0..NOISE_TILE as i32 {
            for x in 0..NOISE_TILE as i32 {
                let v = (rng.next_f32() * 255.0) as u8;
                noise.set_pixel_rgba(x, y, v, v, v, NOISE_ALPHA);
            }
        }

        Self {
            base: PixelBuffer::with_size(1, 1),
            noise,
            mosh: PixelBuffer::with_size(1, 1),
            burst: 0.0,
            burst_chance: BURST_CHANCE,
            rng,
            animate,
        }
    }

    /// Current burst intensity, always in [0, 1]
    pub fn burst(&self) -> f32 {
        self.burst
    }

    /// Override the per-frame burst trigger probability
    pub fn set_burst_chance(&mut self, chance: f32) {
        self.burst_chance = chance.clamp(0.0, 1.0);
    }

    /// Resize backing buffers and regenerate the base gradient. Buffers are
    /// reused in place; reallocation happens only when dimensions change,
    /// and the noise tile is never regenerated.
    fn resize(&mut self, width: u32, height: u32) {
        if width == self.base.width() && height == self.base.height() {
            return;
        }
        self.base.resize(width, height);
        self.mosh.resize(width, height);
        paint_gradient(&mut self.base);
    }

    /// Rebuild the composite: base, additive noise, then the base again
    /// offset by the given jitter. The base keeps the gradient's per-pixel
    /// alpha (at most 0.6), so the offset redraw smears over the noise
    /// without erasing it.
    fn compose(&mut self, jx: i32, jy: i32) {
        self.mosh.clear(BG.0, BG.1, BG.2);
        self.mosh.blit_over(&self.base, 0, 0);
        self.mosh.blit_additive_tiled(&self.noise);
        self.mosh.blit_over(&self.base, jx, jy);
    }
}

/// Diagonal gradient from the warm umber corner to near-white. Written as a
/// translucent layer; the alpha ramps 0.25 to 0.6 along the diagonal and is
/// applied wherever the base is drawn.
fn paint_gradient(buffer: &mut PixelBuffer) {
    let w = buffer.width();
    let h = buffer.height();
    let span = (w + h).saturating_sub(2).max(1) as f32;

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let t = (x + y) as f32 / span;
            let r = GRAD_FROM.0 as f32 + (GRAD_TO.0 as f32 - GRAD_FROM.0 as f32) * t;
            let g = GRAD_FROM.1 as f32 + (GRAD_TO.1 as f32 - GRAD_FROM.1 as f32) * t;
            let b = GRAD_FROM.2 as f32 + (GRAD_TO.2 as f32 - GRAD_FROM.2 as f32) * t;
            let a = GRAD_FROM.3 + (GRAD_TO.3 - GRAD_FROM.3) * t;

            buffer.set_pixel_rgba(x, y, r as u8, g as u8, b as u8, (a * 255.0) as u8);
        }
    }
}

impl Effect for Datamosh {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        self.resize(width.max(1), height.max(1));

        if !self.animate {
            return;
        }

        // Intermittent spikes with a smooth linear fade
        if self.rng.next_f32() < self.burst_chance {
            self.burst = (self.burst + BURST_KICK).clamp(0.0, 1.0);
        } else {
            self.burst = (self.burst - dt * BURST_DECAY).clamp(0.0, 1.0);
        }

        let jx = self.rng.range_i32(-JITTER_X, JITTER_X);
        let jy = self.rng.range_i32(-JITTER_Y, JITTER_Y);
        self.compose(jx, jy);
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.clear(BG.0, BG.1, BG.2);
        if self.animate {
            let alpha = ((0.5 + self.burst * 0.3) * 255.0) as u8;
            buffer.blit_blend(&self.mosh, 0, 0, alpha);
        } else {
            buffer.blit_over(&self.base, 0, 0);
        }
    }

    fn name(&self) -> &str {
        "Datamosh"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_never_leaves_unit_interval() {
        let mut fx = Datamosh::new(true);
        let mut dts = Rng::new(0xABCD);
        for _ in 0..500 {
            let dt = dts.next_f32() * 0.25;
            fx.update(dt, 320, 180);
            assert!(
                (0.0..=1.0).contains(&fx.burst()),
                "burst escaped: {}",
                fx.burst()
            );
        }
    }

    #[test]
    fn test_burst_saturates_and_decays() {
        let mut fx = Datamosh::new(true);
        fx.set_burst_chance(1.0);
        for _ in 0..4 {
            fx.update(0.016, 320, 180);
        }
        assert_eq!(fx.burst(), 1.0);

        fx.set_burst_chance(0.0);
        for _ in 0..200 {
            fx.update(0.016, 320, 180);
        }
        assert_eq!(fx.burst(), 0.0);
    }

    #[test]
    fn test_resize_regenerates_base_but_not_noise() {
        let mut fx = Datamosh::new(true);
        fx.update(0.016, 320, 200);
        let noise_before = fx.noise.as_bytes().to_vec();
        let base_before = fx.base.as_bytes().to_vec();

        fx.update(0.016, 640, 400);
        assert_eq!((fx.base.width(), fx.base.height()), (640, 400));
        assert_eq!((fx.mosh.width(), fx.mosh.height()), (640, 400));
        assert_eq!(fx.noise.as_bytes(), noise_before.as_slice());
        assert_ne!(fx.base.as_bytes().len(), base_before.len());

        // Same dimensions again: base left untouched
        let base_after = fx.base.as_bytes().to_vec();
        fx.update(0.016, 640, 400);
        assert_eq!(fx.base.as_bytes(), base_after.as_slice());
    }

    #[test]
    fn test_noise_tile_is_deterministic() {
        let a = Datamosh::new(true);
        let b = Datamosh::new(true);
        assert_eq!(a.noise.as_bytes(), b.noise.as_bytes());
        assert_eq!((a.noise.width(), a.noise.height()), (NOISE_TILE, NOISE_TILE));
    }

    #[test]
    fn test_reduced_motion_never_animates() {
        let mut fx = Datamosh::new(false);
        for _ in 0..50 {
            fx.update(0.016, 320, 180);
        }
        assert_eq!(fx.burst(), 0.0);
        // Composite was never built
        assert!(fx.mosh.as_bytes().iter().all(|&b| b == 0));

        // Render falls back to the static gradient over the background,
        // identical frame to frame
        let mut out = PixelBuffer::with_size(320, 180);
        fx.render(&mut out);
        assert_ne!(out.get_pixel(10, 10), Some(BG));
        let mut again = PixelBuffer::with_size(320, 180);
        fx.render(&mut again);
        assert_eq!(out.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_gradient_brightens_toward_far_corner() {
        let mut fx = Datamosh::new(true);
        fx.update(0.016, 320, 180);
        let near = fx.base.get_pixel(0, 0).unwrap();
        let far = fx.base.get_pixel(319, 179).unwrap();
        assert!(far.0 > near.0 && far.1 > near.1 && far.2 > near.2);
    }

    #[test]
    fn test_composite_differs_from_base() {
        let mut fx = Datamosh::new(true);
        fx.update(0.016, 320, 180);
        assert_ne!(fx.mosh.as_bytes(), fx.base.as_bytes());
    }

    #[test]
    fn test_noise_shows_through_offset_redraw() {
        let mut fx = Datamosh::new(true);
        fx.resize(320, 180);
        // Zero jitter is the worst case: the redraw covers every noisy
        // pixel, and only its translucency keeps the grain visible
        fx.compose(0, 0);

        let mut plain = PixelBuffer::with_size(320, 180);
        plain.clear(BG.0, BG.1, BG.2);
        plain.blit_over(&fx.base, 0, 0);
        plain.blit_over(&fx.base, 0, 0);

        let differing = fx
            .mosh
            .as_bytes()
            .iter()
            .zip(plain.as_bytes())
            .filter(|(a, b)| a != b)
            .count();
        assert!(
            differing > 320 * 180,
            "noise altered only {} bytes",
            differing
        );
    }
}
