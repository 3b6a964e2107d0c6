//! # Stardust
//!
//! An interactive greeting card: a cone-shaped tree of glowing particles that
//! scatters into a starfield on a click, carrying the user's photos along.
//!
//! The crate splits into a windowless core and a thin viewer:
//!
//! - [`Scene`] owns the particle field, the photo mounts and the scatter
//!   flag. Step it once per frame and it blends every particle and mount
//!   toward the active layout, turns the tree, and attaches photos as they
//!   finish decoding in the background.
//! - [`Card`] opens a winit window, renders the scene with wgpu and maps
//!   clicks, keys and dropped files onto the scene and the saved
//!   [`Keepsake`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use stardust::Card;
//!
//! fn main() -> Result<(), stardust::CardError> {
//!     env_logger::init();
//!     Card::new().with_store_path("stardust.json").run()
//! }
//! ```
//!
//! ## Driving the scene without a window
//!
//! ```ignore
//! use stardust::prelude::*;
//!
//! let mut scene = Scene::new(CardConfig::default())?;
//! scene.set_photos(&[UserPhoto::new("p1", "photos/us.jpg")]);
//! scene.set_scattered(true);
//! for _ in 0..120 {
//!     scene.step(1.0 / 60.0);
//! }
//!
//! let camera = Camera::for_viewport(1280, 720);
//! if let Some(hit) = scene.hit_test(Vec2::ZERO, &camera) {
//!     println!("photo under the crosshair: {:?}", hit.mount);
//! }
//! ```
//!
//! ## Motion
//!
//! Every frame each particle moves a fixed fraction of its remaining
//! distance toward its target ([`MotionConfig::blend_rate`]). By default that
//! fraction is scaled by the frame time so the card converges at the same
//! speed at any frame rate; see [`Smoothing`].

pub mod animation;
pub mod camera;
mod card;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod greeting;
pub mod input;
pub mod keepsake;
pub mod loader;
pub mod mount;
pub mod picking;
pub mod scene;
pub mod spawn;
pub mod textures;
pub mod time;
pub mod toast;
pub mod ui;

pub use animation::{Animator, Layout};
pub use camera::Camera;
pub use card::{Card, CardState};
pub use config::{CardConfig, MotionConfig, Palette, PhotoConfig, ScatterVolume, Smoothing, TreeShape};
pub use error::{CardError, ConfigError, GpuError, GreetingError, StoreError, TextureError};
pub use field::ParticleField;
pub use glam::{Vec2, Vec3};
pub use greeting::{GreetingSource, StaticGreeting, DEFAULT_GREETING};
pub use keepsake::{JsonFileStore, Keepsake, KeyValueStore, MemoryStore, UserPhoto};
pub use mount::{MountId, MountTable, PhotoMount};
pub use picking::{Hit, MountPart, Ray};
pub use scene::Scene;
pub use spawn::SpawnContext;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use stardust::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animation::Layout;
    pub use crate::camera::Camera;
    pub use crate::card::Card;
    pub use crate::config::CardConfig;
    pub use crate::keepsake::UserPhoto;
    pub use crate::picking::Hit;
    pub use crate::scene::Scene;
    pub use crate::{Vec2, Vec3};
    #[cfg(feature = "egui")]
    pub use egui;
}
