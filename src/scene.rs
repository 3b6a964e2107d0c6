//! The stardust scene: particles, photo mounts and the scatter flag.
//!
//! [`Scene`] is the one object the front end talks to. It has a single
//! control (scatter on/off), a single query (what photo is under this
//! point), a way to hand it the current photo list, and a per-frame
//! [`step`](Scene::step).

use crate::animation::{Animator, Layout};
use crate::camera::Camera;
use crate::config::CardConfig;
use crate::error::ConfigError;
use crate::field::ParticleField;
use crate::keepsake::UserPhoto;
use crate::loader::ImageLoader;
use crate::mount::{LoadRequest, MountId, MountTable, PhotoMount};
use crate::picking::{hit_test, Hit};
use crate::spawn::SpawnContext;
use glam::Vec2;

/// Everything that moves on screen.
#[derive(Debug)]
pub struct Scene {
    config: CardConfig,
    field: ParticleField,
    mounts: MountTable,
    animator: Animator,
    loader: ImageLoader,
    layout: Layout,
    ctx: SpawnContext,
}

impl Scene {
    /// Validate `config` and generate the particle field.
    pub fn new(config: CardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = SpawnContext::from_seed_option(config.seed);
        let field = ParticleField::generate(&config, &mut ctx);
        log::info!(
            "generated {} particles (tree {}x{})",
            field.len(),
            config.tree.height,
            config.tree.base_radius
        );
        Ok(Self {
            animator: Animator::new(config.motion),
            config,
            field,
            mounts: MountTable::new(),
            loader: ImageLoader::new(),
            layout: Layout::Tree,
            ctx,
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    // ========== Scatter flag ==========

    /// Choose the target layout. Positions are left where they are.
    pub fn set_scattered(&mut self, scattered: bool) {
        self.layout = Layout::from_scattered(scattered);
    }

    /// Flip the scatter flag and return the new value.
    pub fn toggle_scatter(&mut self) -> bool {
        self.layout = self.layout.toggled();
        self.layout.is_scattered()
    }

    pub fn is_scattered(&self) -> bool {
        self.layout.is_scattered()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    // ========== Photos ==========

    /// Rebuild all mounts from `photos` and start loading their images.
    ///
    /// Loads still running for the previous mounts will be discarded.
    pub fn set_photos(&mut self, photos: &[UserPhoto]) {
        let requests = self.mounts.rebuild(photos, &self.config, &mut self.ctx);
        self.start_loads(requests);
    }

    /// Remove every mount.
    pub fn clear_photos(&mut self) {
        self.mounts.clear();
    }

    fn start_loads(&mut self, requests: Vec<LoadRequest>) {
        for request in requests {
            self.loader.request(request);
        }
    }

    /// Apply finished image loads. Returns how many were attached.
    ///
    /// Failed loads leave the mount on its placeholder. Results for mounts
    /// that were rebuilt or removed in the meantime are dropped.
    pub fn apply_loads(&mut self) -> usize {
        let mut attached = 0;
        for outcome in self.loader.poll() {
            match outcome.result {
                Ok(image) => {
                    if self.mounts.attach_image(outcome.ticket, image) {
                        attached += 1;
                    } else {
                        log::debug!(
                            "discarding stale image for mount {} (generation {})",
                            outcome.ticket.mount.raw(),
                            outcome.ticket.generation
                        );
                    }
                }
                Err(e) => {
                    log::warn!("photo failed to load, keeping placeholder: {e}");
                }
            }
        }
        attached
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.in_flight()
    }

    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    pub fn mount(&self, id: MountId) -> Option<&PhotoMount> {
        self.mounts.get(id)
    }

    // ========== Per frame ==========

    /// Advance one frame of `delta` seconds.
    pub fn step(&mut self, delta: f32) {
        self.apply_loads();
        self.animator.step(
            delta,
            self.layout,
            &mut self.field,
            &mut self.mounts,
            &self.config.photos,
        );
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Rotation of the tree group about +Y, in radians.
    pub fn tree_rotation(&self) -> f32 {
        self.animator.tree_rotation()
    }

    // ========== Picking ==========

    /// Photo under a point in normalized device coordinates, nearest first.
    pub fn hit_test(&self, ndc: Vec2, camera: &Camera) -> Option<Hit> {
        let ray = camera.ray_from_ndc(ndc);
        hit_test(&ray, &self.mounts, self.tree_rotation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(CardConfig {
            particle_count: 200,
            seed: Some(21),
            ..CardConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CardConfig::default();
        config.tree.height = -5.0;
        assert!(Scene::new(config).is_err());
    }

    #[test]
    fn test_toggle_keeps_positions() {
        let mut scene = scene();
        scene.step(0.016);
        let before = scene.field().current().to_vec();
        assert!(scene.toggle_scatter());
        assert_eq!(scene.field().current(), &before[..]);
        assert!(!scene.toggle_scatter());
    }

    #[test]
    fn test_tree_spins_slower_when_scattered() {
        let mut gathered = scene();
        gathered.step(1.0);
        let mut scattered = scene();
        scattered.set_scattered(true);
        scattered.step(1.0);
        assert!((gathered.tree_rotation() - 0.15).abs() < 1e-6);
        assert!((scattered.tree_rotation() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_failed_load_keeps_placeholder() {
        let mut scene = scene();
        scene.set_photos(&[UserPhoto::new("gone", "/no/such/file.png")]);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while scene.pending_loads() > 0 && std::time::Instant::now() < deadline {
            scene.step(0.016);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(scene.mounts().len(), 1);
        assert!(!scene.mounts().iter().next().unwrap().is_loaded());
    }
}
