//! The animation driver.
//!
//! Each frame moves every particle and every photo mount a fixed fraction of
//! the way toward the active layout. Toggling the layout only swaps the
//! target arrays; nothing is snapped, so motion in flight simply bends
//! toward the new goal.

use crate::config::{MotionConfig, PhotoConfig, Smoothing};
use crate::field::ParticleField;
use crate::mount::MountTable;
use glam::Vec3;
use std::f32::consts::TAU;

/// Which precomputed arrangement particles and mounts converge toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Gathered into the cone.
    #[default]
    Tree,
    /// Spread through the starfield.
    Scattered,
}

impl Layout {
    pub fn from_scattered(scattered: bool) -> Self {
        if scattered {
            Layout::Scattered
        } else {
            Layout::Tree
        }
    }

    pub fn is_scattered(self) -> bool {
        self == Layout::Scattered
    }

    pub fn toggled(self) -> Self {
        match self {
            Layout::Tree => Layout::Scattered,
            Layout::Scattered => Layout::Tree,
        }
    }
}

/// Fraction of the remaining distance to cover this frame, in `[0, 1]`.
///
/// With [`Smoothing::PerFrame`] this is `rate` whatever the delta. With
/// [`Smoothing::FrameRateIndependent`] it is `1 - (1 - rate)^(delta * hz)`,
/// so that one frame at `hz` matches the per-frame law and two half-length
/// frames cover the same ground as one full one.
pub fn blend_factor(rate: f32, smoothing: Smoothing, delta: f32) -> f32 {
    let rate = rate.clamp(0.0, 1.0);
    match smoothing {
        Smoothing::PerFrame => rate,
        Smoothing::FrameRateIndependent { reference_hz } => {
            let frames = (delta.max(0.0) * reference_hz).max(0.0);
            (1.0 - (1.0 - rate).powf(frames)).clamp(0.0, 1.0)
        }
    }
}

/// Move `current` toward `target` by `factor`, never past it.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    let next = current + (target - current) * factor;
    if current <= target {
        next.clamp(current, target)
    } else {
        next.clamp(target, current)
    }
}

/// Per-axis [`approach`].
#[inline]
pub fn approach_vec(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    Vec3::new(
        approach(current.x, target.x, factor),
        approach(current.y, target.y, factor),
        approach(current.z, target.z, factor),
    )
}

/// Drives the per-frame motion of the whole scene.
#[derive(Debug, Clone)]
pub struct Animator {
    motion: MotionConfig,
    tree_rotation: f32,
}

impl Animator {
    pub fn new(motion: MotionConfig) -> Self {
        Self {
            motion,
            tree_rotation: 0.0,
        }
    }

    /// Rotation of the tree group about +Y, in radians, kept in `[0, 2π)`.
    pub fn tree_rotation(&self) -> f32 {
        self.tree_rotation
    }

    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    /// Advance one frame.
    ///
    /// The tree group spins at a rate that depends on the layout (plain
    /// integration, no smoothing). Particle positions and mount poses are
    /// blended toward the layout's targets. Mounts also spin about their own
    /// axis while scattered.
    pub fn step(
        &mut self,
        delta: f32,
        layout: Layout,
        field: &mut ParticleField,
        mounts: &mut MountTable,
        photos: &PhotoConfig,
    ) {
        let delta = delta.max(0.0);
        let spin_rate = match layout {
            Layout::Tree => self.motion.tree_spin_rate,
            Layout::Scattered => self.motion.scattered_spin_rate,
        };
        self.tree_rotation = (self.tree_rotation + delta * spin_rate).rem_euclid(TAU);

        let factor = blend_factor(self.motion.blend_rate, self.motion.smoothing, delta);

        let (current, targets) = field.current_and_targets(layout);
        for (p, target) in current.iter_mut().zip(targets) {
            *p = approach_vec(*p, *target, factor);
        }

        for mount in mounts.iter_mut() {
            let target = mount.target(layout, photos);
            mount.current.position = approach_vec(mount.current.position, target.position, factor);
            mount.current.scale = approach(mount.current.scale, target.scale, factor);
            if layout.is_scattered() {
                mount.spin = (mount.spin + delta * self.motion.mount_spin_rate).rem_euclid(TAU);
            }
        }
    }
}
