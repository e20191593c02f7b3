//! Blueprint paint configuration.
//!
//! A property bag of named numeric parameters. Values arrive from a JSON
//! file and/or `--set key=value` overrides; [`PaintConfig::resolve`] clamps
//! every parameter into its documented range before the painter uses it, so
//! malformed input degrades to defaults instead of failing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Clamp with a non-finite guard: NaN/inf fall back to the default instead
/// of poisoning downstream arithmetic (and `f32::clamp` panics on NaN bounds)
fn num(v: f32, fallback: f32, min: f32, max: f32) -> f32 {
    let v = if v.is_finite() { v } else { fallback };
    v.clamp(min, max)
}

/// Raw paint parameters as supplied by the user. `major` is optional: when
/// unset it is derived from the grid spacing at resolve time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Minor grid spacing, logical units
    pub grid: f32,
    /// Major grid spacing; defaults to 4x the minor grid
    pub major: Option<f32>,
    /// Diagonal hatch spacing
    pub hatch: f32,
    /// Seed for every deterministic layer
    pub seed: u32,
    /// Phase offset for the oscilloscope traces
    pub phase: f32,
    /// Device pixel ratio
    pub dpr: f32,
    pub grid_alpha: f32,
    pub major_alpha: f32,
    pub hatch_alpha: f32,
    pub noise_alpha: f32,
    pub scope_alpha: f32,
    /// Oscilloscope trace line width
    pub scope_width: f32,
    pub reticle_alpha: f32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            grid: 28.0,
            major: None,
            hatch: 160.0,
            seed: 1337,
            phase: 0.0,
            dpr: 1.0,
            grid_alpha: 0.055,
            major_alpha: 0.080,
            hatch_alpha: 0.035,
            noise_alpha: 0.028,
            scope_alpha: 0.055,
            scope_width: 1.15,
            reticle_alpha: 0.050,
        }
    }
}

/// Fully clamped parameters, ready for the painter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub grid: f32,
    pub major: f32,
    pub hatch: f32,
    pub seed: u32,
    pub phase: f32,
    pub dpr: f32,
    pub grid_alpha: f32,
    pub major_alpha: f32,
    pub hatch_alpha: f32,
    pub noise_alpha: f32,
    pub scope_alpha: f32,
    pub scope_width: f32,
    pub reticle_alpha: f32,
}

impl PaintConfig {
    /// Clamp every parameter into its valid range. The major spacing derives
    /// from the clamped grid when unset and always lands in [2*grid, 14*grid].
    pub fn resolve(&self) -> Resolved {
        let d = Self::default();
        let grid = num(self.grid, d.grid, 12.0, 84.0);
        let major = num(
            self.major.unwrap_or(f32::NAN),
            grid * 4.0,
            grid * 2.0,
            grid * 14.0,
        );
        Resolved {
            grid,
            major,
            hatch: num(self.hatch, d.hatch, 70.0, 340.0),
            seed: self.seed,
            phase: if self.phase.is_finite() { self.phase } else { 0.0 },
            dpr: num(self.dpr, d.dpr, 1.0, 2.0),
            grid_alpha: num(self.grid_alpha, d.grid_alpha, 0.0, 0.25),
            major_alpha: num(self.major_alpha, d.major_alpha, 0.0, 0.35),
            hatch_alpha: num(self.hatch_alpha, d.hatch_alpha, 0.0, 0.25),
            noise_alpha: num(self.noise_alpha, d.noise_alpha, 0.0, 0.20),
            scope_alpha: num(self.scope_alpha, d.scope_alpha, 0.0, 0.30),
            scope_width: num(self.scope_width, d.scope_width, 0.6, 2.2),
            reticle_alpha: num(self.reticle_alpha, d.reticle_alpha, 0.0, 0.22),
        }
    }

    /// Apply a string override from the CLI. An unknown key is an error; a
    /// value that fails to parse, or parses to a non-finite number, leaves
    /// the field unchanged (fallback to the current/default value, never a
    /// failure).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        // "NaN" and "inf" parse successfully; treat them like any other
        // unusable value and keep the field as it was
        fn num(value: &str, slot: &mut f32) {
            if let Ok(v) = value.parse::<f32>() {
                if v.is_finite() {
                    *slot = v;
                }
            }
        }

        match key {
            "grid" => num(value, &mut self.grid),
            "major" => {
                if let Ok(v) = value.parse::<f32>() {
                    if v.is_finite() {
                        self.major = Some(v);
                    }
                }
            },
            "hatch" => num(value, &mut self.hatch),
            "seed" => {
                if let Ok(v) = value.parse::<u32>() {
                    self.seed = v;
                }
            },
            "phase" => num(value, &mut self.phase),
            "dpr" => num(value, &mut self.dpr),
            "grid_alpha" => num(value, &mut self.grid_alpha),
            "major_alpha" => num(value, &mut self.major_alpha),
            "hatch_alpha" => num(value, &mut self.hatch_alpha),
            "noise_alpha" => num(value, &mut self.noise_alpha),
            "scope_alpha" => num(value, &mut self.scope_alpha),
            "scope_width" => num(value, &mut self.scope_width),
            "reticle_alpha" => num(value, &mut self.reticle_alpha),
            _ => {
                return Err(format!(
                    "unknown parameter '{}' (known: grid, major, hatch, seed, phase, dpr, \
                     grid_alpha, major_alpha, hatch_alpha, noise_alpha, scope_alpha, \
                     scope_width, reticle_alpha)",
                    key
                ))
            },
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}
