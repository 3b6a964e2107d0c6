//! The particle field: a fixed-size point cloud with two precomputed layouts.
//!
//! Positions are stored as parallel arrays (structure of arrays). `tree` and
//! `scattered` are written once by [`ParticleField::generate`] and never
//! change; `current` is the only array the animation driver touches.

use crate::animation::Layout;
use crate::config::CardConfig;
use crate::spawn::SpawnContext;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One particle as uploaded to the GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Point cloud with a tree layout, a scattered layout and a live position.
#[derive(Debug, Clone)]
pub struct ParticleField {
    current: Vec<Vec3>,
    tree: Vec<Vec3>,
    scattered: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl ParticleField {
    /// Generate `config.particle_count` particles.
    ///
    /// Tree positions fill the configured cone, scattered positions fill the
    /// configured box, and the two are drawn independently: particle `i` in
    /// the tree has no relation to particle `i` in the starfield. Particles
    /// start on the tree.
    pub fn generate(config: &CardConfig, ctx: &mut SpawnContext) -> Self {
        let n = config.particle_count as usize;
        let mut tree = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);

        for _ in 0..n {
            tree.push(ctx.random_in_cone(&config.tree));
            let color = if ctx.chance(config.colors.primary_weight) {
                config.colors.primary
            } else {
                config.colors.accent
            };
            colors.push(color);
        }

        let scattered = (0..n)
            .map(|_| ctx.random_in_box(&config.scatter))
            .collect();

        Self {
            current: tree.clone(),
            tree,
            scattered,
            colors,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Live positions.
    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    pub fn tree(&self) -> &[Vec3] {
        &self.tree
    }

    pub fn scattered(&self) -> &[Vec3] {
        &self.scattered
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Target array for a layout.
    pub fn targets(&self, layout: Layout) -> &[Vec3] {
        match layout {
            Layout::Tree => &self.tree,
            Layout::Scattered => &self.scattered,
        }
    }

    /// Live positions and the targets for `layout`, borrowed together.
    pub(crate) fn current_and_targets(&mut self, layout: Layout) -> (&mut [Vec3], &[Vec3]) {
        let targets = match layout {
            Layout::Tree => &self.tree,
            Layout::Scattered => &self.scattered,
        };
        (&mut self.current, targets)
    }

    /// Interleave live positions with colors for upload.
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        let mut out = Vec::with_capacity(self.len());
        self.write_vertices(&mut out);
        out
    }

    /// Like [`vertices`](Self::vertices), reusing `out`'s allocation.
    pub fn write_vertices(&self, out: &mut Vec<ParticleVertex>) {
        out.clear();
        out.extend(self.current.iter().zip(&self.colors).map(|(p, c)| ParticleVertex {
            position: p.to_array(),
            color: c.to_array(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeShape;

    fn small_config(count: u32) -> CardConfig {
        CardConfig {
            particle_count: count,
            seed: Some(11),
            ..CardConfig::default()
        }
    }

    #[test]
    fn test_generate_parallel_arrays() {
        let config = small_config(500);
        let field = ParticleField::generate(&config, &mut SpawnContext::seeded(11));
        assert_eq!(field.len(), 500);
        assert_eq!(field.tree().len(), 500);
        assert_eq!(field.scattered().len(), 500);
        assert_eq!(field.colors().len(), 500);
        assert_eq!(field.current(), field.tree());
    }

    #[test]
    fn test_layouts_within_bounds() {
        let mut config = small_config(1000);
        config.tree = TreeShape::new(110.0, 42.0).unwrap();
        let field = ParticleField::generate(&config, &mut SpawnContext::seeded(5));

        for p in field.tree() {
            assert!(p.y >= 0.0 && p.y <= 110.0);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            assert!(radial <= 42.0 + 1e-3);
            assert!(radial <= config.tree.radius_at(p.y) + 1e-3);
        }
        for p in field.scattered() {
            assert!(config.scatter.contains(*p));
        }
    }

    #[test]
    fn test_only_palette_colors() {
        let config = small_config(2000);
        let field = ParticleField::generate(&config, &mut SpawnContext::seeded(8));
        let gold = field
            .colors()
            .iter()
            .filter(|c| **c == config.colors.primary)
            .count();
        let red = field
            .colors()
            .iter()
            .filter(|c| **c == config.colors.accent)
            .count();
        assert_eq!(gold + red, 2000);
        // Roughly 80/20; a wide margin keeps this seed-independent.
        assert!(gold > 1400 && gold < 1800, "gold count {gold}");
    }

    #[test]
    fn test_empty_field() {
        let field = ParticleField::generate(&small_config(0), &mut SpawnContext::seeded(0));
        assert!(field.is_empty());
        assert!(field.vertices().is_empty());
    }

    #[test]
    fn test_zero_height_tree_collapses_to_base() {
        let mut config = small_config(50);
        config.tree = TreeShape::new(0.0, 42.0).unwrap();
        let field = ParticleField::generate(&config, &mut SpawnContext::seeded(1));
        assert!(field.tree().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn test_vertices_interleave() {
        let field = ParticleField::generate(&small_config(3), &mut SpawnContext::seeded(2));
        let verts = field.vertices();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1].position, field.current()[1].to_array());
        assert_eq!(verts[1].color, field.colors()[1].to_array());
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 24);
    }
}
