//! Ray picking against photo mounts.
//!
//! Every mount registers its collision quads in a [`ColliderSet`] when it is
//! built, each tagged with the owning [`MountId`]. A hit on any quad (the
//! white frame or the photo in front of it) therefore resolves straight to
//! the mount without walking a scene graph.

use crate::mount::{MountId, MountTable};
use glam::{Mat4, Quat, Vec2, Vec3};

/// Half-size of the white backing frame (4.4 x 5.5).
pub const FRAME_HALF_SIZE: Vec2 = Vec2::new(2.2, 2.75);
/// Half-size of the photo plane (4 x 4).
pub const IMAGE_HALF_SIZE: Vec2 = Vec2::new(2.0, 2.0);
/// Photo plane offset: raised toward the top of the frame, just in front of it.
pub const IMAGE_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.02);

/// A half-line in world space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized (zero stays zero).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Which part of a mount a collider stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPart {
    Frame,
    Image,
}

/// An axis-aligned quad in a mount's local XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub owner: MountId,
    pub part: MountPart,
    /// Quad center in mount-local space; the quad faces +Z.
    pub center: Vec3,
    pub half_size: Vec2,
}

impl Collider {
    pub fn frame(owner: MountId) -> Self {
        Self {
            owner,
            part: MountPart::Frame,
            center: Vec3::ZERO,
            half_size: FRAME_HALF_SIZE,
        }
    }

    pub fn image(owner: MountId) -> Self {
        Self {
            owner,
            part: MountPart::Image,
            center: IMAGE_OFFSET,
            half_size: IMAGE_HALF_SIZE,
        }
    }

    /// Maps the unit quad (-1..1 in X and Y, z = 0) onto this collider in
    /// mount-local space. Drawing uses the same quads that picking tests.
    pub fn quad_transform(&self) -> Mat4 {
        Mat4::from_translation(self.center)
            * Mat4::from_scale(Vec3::new(self.half_size.x, self.half_size.y, 1.0))
    }

    /// Distance along `ray` to this quad under the `world` transform.
    ///
    /// The ray is carried into local space with the inverse transform. The
    /// transform is affine, so the local parameter equals the world one.
    pub fn intersect(&self, ray: &Ray, world: &Mat4) -> Option<f32> {
        if world.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inv = world.inverse();
        let origin = inv.transform_point3(ray.origin);
        let direction = inv.transform_vector3(ray.direction);

        if direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = (self.center.z - origin.z) / direction.z;
        if t < 0.0 {
            return None;
        }

        let p = origin + direction * t;
        let inside = (p.x - self.center.x).abs() <= self.half_size.x
            && (p.y - self.center.y).abs() <= self.half_size.y;
        inside.then_some(t)
    }
}

/// Collision quads for all live mounts.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<Collider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    /// Drop every collider owned by `owner`.
    pub fn remove_owner(&mut self, owner: MountId) {
        self.colliders.retain(|c| c.owner != owner);
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn has(&self, owner: MountId, part: MountPart) -> bool {
        self.colliders
            .iter()
            .any(|c| c.owner == owner && c.part == part)
    }
}

/// The nearest mount under a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub mount: MountId,
    pub part: MountPart,
    pub distance: f32,
}

/// Transform of the tree group: a rotation about +Y.
pub fn tree_transform(tree_rotation: f32) -> Mat4 {
    Mat4::from_quat(Quat::from_rotation_y(tree_rotation))
}

/// Cast `ray` against every mount and return the closest hit.
///
/// Returns `None` for an empty table or when the ray passes between photos.
pub fn hit_test(ray: &Ray, mounts: &MountTable, tree_rotation: f32) -> Option<Hit> {
    let group = tree_transform(tree_rotation);

    mounts
        .colliders()
        .iter()
        .filter_map(|collider| {
            let mount = mounts.get(collider.owner)?;
            let world = group * mount.local_transform();
            collider.intersect(ray, &world).map(|distance| Hit {
                mount: collider.owner,
                part: collider.part,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CardConfig;
    use crate::keepsake::UserPhoto;
    use crate::spawn::SpawnContext;
    use crate::textures::PhotoImage;
    use std::sync::Arc;

    fn id(n: u64) -> MountId {
        MountId::from_raw(n)
    }

    /// Mounts for `photo_ids` in that order, each placed at the z given for
    /// it, facing +Z at unit scale.
    fn table_at(photo_ids: &[(&str, f32)]) -> MountTable {
        let photos: Vec<UserPhoto> = photo_ids
            .iter()
            .map(|(photo, _)| UserPhoto::new(*photo, "/missing.png"))
            .collect();
        let mut table = MountTable::new();
        table.rebuild(&photos, &CardConfig::default(), &mut SpawnContext::seeded(1));
        for mount in table.iter_mut() {
            let z = photo_ids
                .iter()
                .find(|(photo, _)| *photo == mount.photo_id)
                .map(|(_, z)| *z)
                .unwrap();
            mount.current.position = Vec3::new(0.0, 0.0, z);
            mount.current.scale = 1.0;
            mount.spin = 0.0;
        }
        table
    }

    fn mount_id(table: &MountTable, photo_id: &str) -> MountId {
        table.find_photo(photo_id).unwrap().id
    }

    #[test]
    fn test_quad_hit_and_miss() {
        let frame = Collider::frame(id(1));
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let t = frame.intersect(&ray, &world).unwrap();
        assert!((t - 10.0).abs() < 1e-4);

        let beside = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(frame.intersect(&beside, &world).is_none());

        let away = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(frame.intersect(&away, &world).is_none());
    }

    #[test]
    fn test_quad_transform_corners() {
        let image = Collider::image(id(3));
        let corner = image.quad_transform().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((corner - Vec3::new(2.0, 2.5, 0.02)).length() < 1e-6);
    }

    #[test]
    fn test_scaled_quad_distance_is_world_distance() {
        let frame = Collider::frame(id(1));
        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.4),
            Quat::IDENTITY,
            Vec3::new(0.0, 0.0, -20.0),
        );
        // 2.2 * 0.4 = 0.88 half-width after scaling.
        let inside = Ray::new(Vec3::new(0.8, 0.0, 0.0), Vec3::NEG_Z);
        let t = frame.intersect(&inside, &world).unwrap();
        assert!((t - 20.0).abs() < 1e-3);

        let outside = Ray::new(Vec3::new(0.95, 0.0, 0.0), Vec3::NEG_Z);
        assert!(frame.intersect(&outside, &world).is_none());
    }

    #[test]
    fn test_edge_on_quad_misses() {
        let frame = Collider::frame(id(1));
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, -5.0),
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::NEG_Z);
        // Looking at the quad edge-on: the ray runs inside the plane.
        assert!(frame.intersect(&ray, &world).is_none());
    }

    #[test]
    fn test_zero_scale_is_not_hit() {
        let frame = Collider::frame(id(1));
        let world = Mat4::from_scale(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(frame.intersect(&ray, &world).is_none());
    }

    #[test]
    fn test_collider_set_remove_owner() {
        let mut set = ColliderSet::new();
        set.insert(Collider::frame(id(1)));
        set.insert(Collider::image(id(1)));
        set.insert(Collider::frame(id(2)));
        assert!(set.has(id(1), MountPart::Image));

        set.remove_owner(id(1));
        assert_eq!(set.len(), 1);
        assert!(!set.has(id(1), MountPart::Frame));
        assert!(set.has(id(2), MountPart::Frame));
    }

    #[test]
    fn test_hit_test_empty_table() {
        let table = MountTable::new();
        let ray = Ray::new(Vec3::new(0.0, 60.0, 170.0), Vec3::NEG_Z);
        assert!(hit_test(&ray, &table, 0.0).is_none());
    }

    #[test]
    fn test_nearest_mount_wins() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z);

        for order in [[("near", -10.0), ("far", -30.0)], [("far", -30.0), ("near", -10.0)]] {
            let table = table_at(&order);
            let hit = hit_test(&ray, &table, 0.0).unwrap();
            assert_eq!(hit.mount, mount_id(&table, "near"));
            assert_eq!(hit.part, MountPart::Frame);
            assert!((hit.distance - 60.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_picture_hit_resolves_to_its_mount() {
        let mut table = table_at(&[("a", -10.0), ("b", -30.0)]);
        let a = mount_id(&table, "a");
        let ticket = table.ticket(a).unwrap();
        assert!(table.attach_image(ticket, Arc::new(PhotoImage::solid(9, 9, 9, 255))));

        // Through the picture: it sits just in front of the frame.
        let through_picture = Ray::new(Vec3::new(0.0, 0.5, 50.0), Vec3::NEG_Z);
        let hit = hit_test(&through_picture, &table, 0.0).unwrap();
        assert_eq!(hit.mount, a);
        assert_eq!(hit.part, MountPart::Image);
        assert!((hit.distance - (60.0 - 0.02)).abs() < 1e-3);

        // Below the picture only the frame is there.
        let through_frame = Ray::new(Vec3::new(0.0, -2.6, 50.0), Vec3::NEG_Z);
        let hit = hit_test(&through_frame, &table, 0.0).unwrap();
        assert_eq!(hit.mount, a);
        assert_eq!(hit.part, MountPart::Frame);
    }
}
