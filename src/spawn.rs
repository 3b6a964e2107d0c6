//! Sampling helpers for layout generation.
//!
//! Every random placement in the card goes through a [`SpawnContext`]: the
//! tree cone, the scatter boxes, the photo spiral and the color coin flip.
//! Seed it with [`SpawnContext::seeded`] to reproduce a layout exactly.

use crate::config::{ScatterVolume, TreeShape};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random source with helpers for the card's placement rules.
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(42);
/// let p = ctx.random_in_cone(&TreeShape::default());
/// ```
#[derive(Debug, Clone)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Reproducible context: the same seed yields the same layouts.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Context seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Use `seed` when given, system entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Weighted coin flip, true with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    // ========== Position helpers ==========

    /// Random point inside the tree cone.
    ///
    /// Height is uniform in `[0, H]`. The radius is `sqrt(u) * R * (1 - y/H)`,
    /// which biases mass toward the trunk while tapering to the apex.
    pub fn random_in_cone(&mut self, shape: &TreeShape) -> Vec3 {
        let y = self.random() * shape.height;
        let r = self.random().sqrt() * shape.radius_at(y);
        let angle = self.random_range(0.0, TAU);
        Vec3::new(r * angle.cos(), y, r * angle.sin())
    }

    /// Random point inside an axis-aligned box, uniform per axis.
    pub fn random_in_box(&mut self, volume: &ScatterVolume) -> Vec3 {
        let (lo, hi) = (volume.min(), volume.max());
        Vec3::new(
            lo.x + self.random() * (hi.x - lo.x),
            lo.y + self.random() * (hi.y - lo.y),
            lo.z + self.random() * (hi.z - lo.z),
        )
    }

    /// Random point on the photo spiral wrapped around the cone.
    pub fn random_on_spiral(&mut self, shape: &TreeShape, turns: f32, offset: f32) -> Vec3 {
        let t = self.random();
        spiral_on_cone(shape, t, turns, offset)
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Point at progress `t` (0 = base, 1 = apex) on a spiral hugging the cone.
///
/// The spiral makes `turns` revolutions and sits `offset` outside the cone
/// surface, so photos hang just clear of the particles.
pub fn spiral_on_cone(shape: &TreeShape, t: f32, turns: f32, offset: f32) -> Vec3 {
    let angle = t * TAU * turns;
    let r = (1.0 - t) * shape.base_radius + offset;
    Vec3::new(r * angle.cos(), t * shape.height, r * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_in_cone_bounds() {
        let shape = TreeShape::default();
        let mut ctx = SpawnContext::seeded(1);
        for _ in 0..1000 {
            let p = ctx.random_in_cone(&shape);
            assert!(p.y >= 0.0 && p.y <= shape.height);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            assert!(radial <= shape.radius_at(p.y) + 1e-3);
        }
    }

    #[test]
    fn test_random_in_box_bounds() {
        let vol = ScatterVolume::default();
        let mut ctx = SpawnContext::seeded(2);
        for _ in 0..1000 {
            assert!(vol.contains(ctx.random_in_box(&vol)));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let shape = TreeShape::default();
        let mut a = SpawnContext::seeded(99);
        let mut b = SpawnContext::seeded(99);
        for _ in 0..10 {
            assert_eq!(a.random_in_cone(&shape), b.random_in_cone(&shape));
        }
    }

    #[test]
    fn test_spiral_endpoints() {
        let shape = TreeShape::default();
        let base = spiral_on_cone(&shape, 0.0, 5.0, 4.5);
        assert!((base - Vec3::new(46.5, 0.0, 0.0)).length() < 1e-4);

        let apex = spiral_on_cone(&shape, 1.0, 5.0, 4.5);
        assert!((apex.y - 110.0).abs() < 1e-4);
        // Five full turns end where they started, at the offset radius.
        assert!((apex.x - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_chance_extremes() {
        let mut ctx = SpawnContext::seeded(3);
        assert!((0..100).all(|_| ctx.chance(1.0)));
        assert!((0..100).all(|_| !ctx.chance(0.0)));
    }

    #[test]
    fn test_empty_range() {
        let mut ctx = SpawnContext::seeded(4);
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
    }
}
