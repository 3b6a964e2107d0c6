//! Configuration types for the stardust card.
//!
//! A [`CardConfig`] describes the particle tree, the scatter volumes, the
//! motion constants and the photo placement rule. It can be built in code or
//! loaded from a JSON file; every field has a default, so a partial file only
//! overrides what it names.

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cone that the tree layout fills.
///
/// The apex sits at `y = height`, the base disk at `y = 0`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TreeShape {
    pub height: f32,
    pub base_radius: f32,
}

impl TreeShape {
    /// Create a tree shape, rejecting negative or non-finite dimensions.
    pub fn new(height: f32, base_radius: f32) -> Result<Self, ConfigError> {
        let shape = Self {
            height,
            base_radius,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Radius of the cone at height `y`. Zero above the apex or for a flat tree.
    pub fn radius_at(&self, y: f32) -> f32 {
        if self.height <= 0.0 {
            return 0.0;
        }
        (1.0 - y / self.height).max(0.0) * self.base_radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("tree.height", self.height)?;
        non_negative("tree.base_radius", self.base_radius)
    }
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 110.0,
            base_radius: 42.0,
        }
    }
}

/// Axis-aligned box used as a scatter target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScatterVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl ScatterVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec3) -> bool {
        let (lo, hi) = (self.min(), self.max());
        p.cmpge(lo).all() && p.cmple(hi).all()
    }

    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        for v in self.half_extents.to_array() {
            non_negative(name, v)?;
        }
        for v in self.center.to_array() {
            if !v.is_finite() {
                return Err(ConfigError::InvalidValue { name, value: v });
            }
        }
        Ok(())
    }
}

impl Default for ScatterVolume {
    /// The particle starfield: 2.8x the scatter range wide, offset upward.
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 30.0, 0.0),
            half_extents: Vec3::new(308.0, 110.0, 308.0),
        }
    }
}

/// Two-color palette for the particles.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Palette {
    /// Dominant color, warm gold.
    pub primary: Vec3,
    /// Accent color, red.
    pub accent: Vec3,
    /// Probability that a particle gets the primary color.
    pub primary_weight: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: hex_rgb(0xFFF180),
            accent: hex_rgb(0xFF4040),
            primary_weight: 0.8,
        }
    }
}

/// How the blend rate relates to frame time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Smoothing {
    /// Apply `blend_rate` once per frame regardless of delta.
    /// Convergence speed follows the display refresh rate.
    PerFrame,
    /// Scale the rate so that one frame at `reference_hz` behaves like `PerFrame`.
    FrameRateIndependent { reference_hz: f32 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::FrameRateIndependent { reference_hz: 60.0 }
    }
}

/// Motion constants for the animation driver.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Fraction of the remaining distance covered per reference frame.
    pub blend_rate: f32,
    pub smoothing: Smoothing,
    /// Tree group rotation in radians per second while gathered.
    pub tree_spin_rate: f32,
    /// Tree group rotation in radians per second while scattered.
    pub scattered_spin_rate: f32,
    /// Per-photo spin in radians per second while scattered.
    pub mount_spin_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            blend_rate: 0.08,
            smoothing: Smoothing::default(),
            tree_spin_rate: 0.15,
            scattered_spin_rate: 0.05,
            mount_spin_rate: 0.3,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_range("motion.blend_rate", self.blend_rate)?;
        if let Smoothing::FrameRateIndependent { reference_hz } = self.smoothing {
            non_negative("motion.smoothing.reference_hz", reference_hz)?;
        }
        for (name, v) in [
            ("motion.tree_spin_rate", self.tree_spin_rate),
            ("motion.scattered_spin_rate", self.scattered_spin_rate),
            ("motion.mount_spin_rate", self.mount_spin_rate),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::InvalidValue { name, value: v });
            }
        }
        Ok(())
    }
}

/// Placement and sizing of photo mounts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhotoConfig {
    /// Uniform scale while hanging on the tree.
    pub tree_scale: f32,
    /// Uniform scale while scattered.
    pub scattered_scale: f32,
    /// Scale a freshly built mount starts from.
    pub spawn_scale: f32,
    /// Turns of the placement spiral from base to apex.
    pub spiral_turns: f32,
    /// Distance photos hang outside the cone surface.
    pub trunk_offset: f32,
    pub scatter: ScatterVolume,
    /// Oldest photos are dropped beyond this count.
    pub max_photos: usize,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            tree_scale: 0.4,
            scattered_scale: 2.5,
            spawn_scale: 1.0,
            spiral_turns: 5.0,
            trunk_offset: 4.5,
            scatter: ScatterVolume::new(Vec3::new(0.0, 40.0, 0.0), Vec3::new(75.0, 50.0, 75.0)),
            max_photos: 15,
        }
    }
}

impl PhotoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("photos.tree_scale", self.tree_scale)?;
        non_negative("photos.scattered_scale", self.scattered_scale)?;
        non_negative("photos.spawn_scale", self.spawn_scale)?;
        non_negative("photos.spiral_turns", self.spiral_turns)?;
        non_negative("photos.trunk_offset", self.trunk_offset)?;
        self.scatter.validate("photos.scatter")
    }
}

/// Complete card configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    pub particle_count: u32,
    pub tree: TreeShape,
    pub scatter: ScatterVolume,
    pub colors: Palette,
    pub motion: MotionConfig,
    pub photos: PhotoConfig,
    /// Fixed seed for reproducible layouts. `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            particle_count: 40_000,
            tree: TreeShape::default(),
            scatter: ScatterVolume::default(),
            colors: Palette::default(),
            motion: MotionConfig::default(),
            photos: PhotoConfig::default(),
            seed: None,
        }
    }
}

impl CardConfig {
    /// Check every numeric parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tree.validate()?;
        self.scatter.validate("scatter")?;
        unit_range("colors.primary_weight", self.colors.primary_weight)?;
        self.motion.validate()?;
        self.photos.validate()
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: CardConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

fn unit_range(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

/// `0xRRGGBB` to linear 0-1 RGB.
pub fn hex_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tree_shape_rejects_negative() {
        assert!(TreeShape::new(-1.0, 42.0).is_err());
        assert!(TreeShape::new(110.0, f32::NAN).is_err());
        assert!(TreeShape::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_radius_tapers_to_apex() {
        let tree = TreeShape::default();
        assert_eq!(tree.radius_at(0.0), 42.0);
        assert!((tree.radius_at(55.0) - 21.0).abs() < 1e-4);
        assert_eq!(tree.radius_at(110.0), 0.0);
        assert_eq!(TreeShape::new(0.0, 5.0).unwrap().radius_at(0.0), 0.0);
    }

    #[test]
    fn test_scatter_volume_contains_faces() {
        let vol = ScatterVolume::new(Vec3::new(0.0, 30.0, 0.0), Vec3::splat(10.0));
        assert!(vol.contains(Vec3::new(10.0, 40.0, -10.0)));
        assert!(!vol.contains(Vec3::new(0.0, 41.0, 0.0)));
    }

    #[test]
    fn test_blend_rate_out_of_range() {
        let mut config = CardConfig::default();
        config.motion.blend_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CardConfig =
            serde_json::from_str(r#"{ "particle_count": 1000, "seed": 7 }"#).unwrap();
        assert_eq!(config.particle_count, 1000);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tree, TreeShape::default());
        assert_eq!(config.motion.smoothing, Smoothing::default());
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");

        let mut config = CardConfig::default();
        config.motion.smoothing = Smoothing::PerFrame;
        config.photos.max_photos = 3;
        config.save(&path).unwrap();

        let loaded = CardConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_hex_rgb() {
        let red = hex_rgb(0xFF4040);
        assert_eq!(red.x, 1.0);
        assert!((red.y - 64.0 / 255.0).abs() < 1e-6);
    }
}
