//! Photo mounts: the in-scene representation of user photos.
//!
//! A [`MountTable`] is rebuilt from scratch whenever the photo list changes.
//! Each rebuild bumps the table's generation, and every image load is issued
//! with a [`LoadTicket`] carrying that generation. A load that finishes after
//! its mount was rebuilt away or removed no longer matches and is dropped
//! instead of being attached to the wrong photo.

use crate::animation::Layout;
use crate::config::{CardConfig, PhotoConfig};
use crate::keepsake::UserPhoto;
use crate::picking::{Collider, ColliderSet, MountPart};
use crate::spawn::{spiral_on_cone, SpawnContext};
use crate::textures::PhotoImage;
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

/// Identity of a mount. Never reused within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u64);

impl MountId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Position plus uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountPose {
    pub position: Vec3,
    pub scale: f32,
}

/// Pixel data for a mount's image plane.
#[derive(Debug, Clone, Default)]
pub enum ImageSlot {
    /// Shown until the photo decodes, and forever if it never does.
    #[default]
    Placeholder,
    Loaded(Arc<PhotoImage>),
}

/// Tag attached to an image load so late results can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub mount: MountId,
    pub generation: u64,
}

/// One photo placed in the scene.
#[derive(Debug, Clone)]
pub struct PhotoMount {
    pub id: MountId,
    /// Id of the [`UserPhoto`] this mount shows.
    pub photo_id: String,
    /// Opaque image reference (path or data URL).
    pub reference: String,
    /// Spot on the tree spiral, fixed at creation.
    pub initial: Vec3,
    /// Spot in the scatter box, fixed at creation.
    pub scattered: Vec3,
    /// Live pose, blended every frame.
    pub current: MountPose,
    /// Spin about the mount's own Y axis, radians.
    pub spin: f32,
    pub image: ImageSlot,
}

impl PhotoMount {
    /// Pose this mount converges toward under `layout`.
    pub fn target(&self, layout: Layout, photos: &PhotoConfig) -> MountPose {
        match layout {
            Layout::Tree => MountPose {
                position: self.initial,
                scale: photos.tree_scale,
            },
            Layout::Scattered => MountPose {
                position: self.scattered,
                scale: photos.scattered_scale,
            },
        }
    }

    /// Transform relative to the tree group: translate, spin, scale.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.current.scale),
            Quat::from_rotation_y(self.spin),
            self.current.position,
        )
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.image, ImageSlot::Loaded(_))
    }

    pub fn image(&self) -> Option<&Arc<PhotoImage>> {
        match &self.image {
            ImageSlot::Loaded(img) => Some(img),
            ImageSlot::Placeholder => None,
        }
    }
}

/// A load the caller should start after a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub reference: String,
}

/// All live mounts plus their colliders.
#[derive(Debug, Default)]
pub struct MountTable {
    mounts: Vec<PhotoMount>,
    colliders: ColliderSet,
    generation: u64,
    next_id: u64,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every mount with a fresh one per photo.
    ///
    /// Placement is random each time: a point on the cone spiral for the
    /// tree pose and a point in the photo scatter box. Returns one load
    /// request per new mount.
    pub fn rebuild(
        &mut self,
        photos: &[UserPhoto],
        config: &CardConfig,
        ctx: &mut SpawnContext,
    ) -> Vec<LoadRequest> {
        self.clear();

        let placement = &config.photos;
        let mut requests = Vec::with_capacity(photos.len());
        for photo in photos {
            let id = MountId(self.next_id);
            self.next_id += 1;

            let t = ctx.random();
            let initial = spiral_on_cone(&config.tree, t, placement.spiral_turns, placement.trunk_offset);
            let scattered = ctx.random_in_box(&placement.scatter);

            self.mounts.push(PhotoMount {
                id,
                photo_id: photo.id.clone(),
                reference: photo.url.clone(),
                initial,
                scattered,
                current: MountPose {
                    position: initial,
                    scale: placement.spawn_scale,
                },
                spin: 0.0,
                image: ImageSlot::Placeholder,
            });
            self.colliders.insert(Collider::frame(id));

            requests.push(LoadRequest {
                ticket: LoadTicket {
                    mount: id,
                    generation: self.generation,
                },
                reference: photo.url.clone(),
            });
        }

        log::debug!(
            "rebuilt {} photo mounts (generation {})",
            self.mounts.len(),
            self.generation
        );
        requests
    }

    /// Remove a single mount and its colliders.
    pub fn remove(&mut self, id: MountId) -> Option<PhotoMount> {
        let index = self.mounts.iter().position(|m| m.id == id)?;
        self.colliders.remove_owner(id);
        Some(self.mounts.remove(index))
    }

    /// Drop every mount. Loads issued before this call become stale.
    pub fn clear(&mut self) {
        self.mounts.clear();
        self.colliders.clear();
        self.generation += 1;
    }

    /// Attach decoded pixels to the mount named by `ticket`.
    ///
    /// Returns `false` and drops `image` if the ticket belongs to an earlier
    /// generation or its mount is gone.
    pub fn attach_image(&mut self, ticket: LoadTicket, image: Arc<PhotoImage>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        let Some(mount) = self.mounts.iter_mut().find(|m| m.id == ticket.mount) else {
            return false;
        };
        mount.image = ImageSlot::Loaded(image);
        if !self.colliders.has(ticket.mount, MountPart::Image) {
            self.colliders.insert(Collider::image(ticket.mount));
        }
        true
    }

    /// Whether a load tagged with `ticket` would still be accepted.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation && self.get(ticket.mount).is_some()
    }

    /// Ticket for a live mount.
    pub fn ticket(&self, id: MountId) -> Option<LoadTicket> {
        self.get(id).map(|m| LoadTicket {
            mount: m.id,
            generation: self.generation,
        })
    }

    pub fn get(&self, id: MountId) -> Option<&PhotoMount> {
        self.mounts.iter().find(|m| m.id == id)
    }

    /// Mount showing the photo with `photo_id`.
    pub fn find_photo(&self, photo_id: &str) -> Option<&PhotoMount> {
        self.mounts.iter().find(|m| m.photo_id == photo_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoMount> {
        self.mounts.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PhotoMount> {
        self.mounts.iter_mut()
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}
