use crate::foundation::math::{mix64, unit_f64};

/// Largest `f64` strictly below `1.0`.
const MAX_BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Seeded, continuous 3D noise field with values in `[0, 1)`.
///
/// Each octave is lattice value noise: pseudo-random values at integer lattice points,
/// blended with a quintic fade so the field is smooth between points. Octaves double in
/// frequency and are weighted by `falloff^i`; the sum is normalized by the total weight, which
/// keeps the output inside `[0, 1)`.
///
/// The same seed always produces the same field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoherentNoise {
    seed: u64,
    octaves: u32,
    falloff: f64,
}

impl CoherentNoise {
    pub const DEFAULT_OCTAVES: u32 = 4;
    pub const DEFAULT_FALLOFF: f64 = 0.5;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            octaves: Self::DEFAULT_OCTAVES,
            falloff: Self::DEFAULT_FALLOFF,
        }
    }

    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut weight = 0.0;
        for octave in 0..self.octaves {
            let seed = self.seed.wrapping_add(u64::from(octave).wrapping_mul(1000));
            total += value_noise3(seed, x * frequency, y * frequency, z * frequency) * amplitude;
            weight += amplitude;
            amplitude *= self.falloff;
            frequency *= 2.0;
        }
        if weight <= 0.0 {
            return 0.0;
        }
        (total / weight).max(0.0).min(MAX_BELOW_ONE)
    }
}

impl Default for CoherentNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

fn lattice(seed: u64, x: i64, y: i64, z: i64) -> f64 {
    let h = mix64(seed ^ mix64(x as u64 ^ mix64(y as u64 ^ mix64(z as u64))));
    unit_f64(h)
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Lattice cell and fractional position of `v`. Coordinates past the `i64` range saturate;
/// their fraction is taken as 0.
fn cell(v: f64) -> (i64, f64) {
    let base = v.floor();
    let frac = v - base;
    (base as i64, if frac.is_finite() { frac } else { 0.0 })
}

fn value_noise3(seed: u64, x: f64, y: f64, z: f64) -> f64 {
    let (xi, fx) = cell(x);
    let (yi, fy) = cell(y);
    let (zi, fz) = cell(z);
    let (xj, yj, zj) = (xi.wrapping_add(1), yi.wrapping_add(1), zi.wrapping_add(1));
    let (u, v, w) = (fade(fx), fade(fy), fade(fz));

    let c000 = lattice(seed, xi, yi, zi);
    let c100 = lattice(seed, xj, yi, zi);
    let c010 = lattice(seed, xi, yj, zi);
    let c110 = lattice(seed, xj, yj, zi);
    let c001 = lattice(seed, xi, yi, zj);
    let c101 = lattice(seed, xj, yi, zj);
    let c011 = lattice(seed, xi, yj, zj);
    let c111 = lattice(seed, xj, yj, zj);

    let x00 = lerp(c000, c100, u);
    let x10 = lerp(c010, c110, u);
    let x01 = lerp(c001, c101, u);
    let x11 = lerp(c011, c111, u);
    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);
    lerp(y0, y1, w)
}

#[cfg(test)]
#[path = "../../tests/unit/field/noise.rs"]
mod tests;
