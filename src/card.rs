//! The greeting card window.
//!
//! [`Card`] is the builder, in the same shape as any winit app: configure,
//! then [`run`](Card::run) until the window closes. [`CardState`] holds
//! everything that is not a window or a GPU handle, so the card's behavior
//! can be driven from tests without either.
//!
//! ```ignore
//! use stardust::Card;
//!
//! Card::new()
//!     .with_store_path("stardust.json")
//!     .run()?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::config::CardConfig;
use crate::error::{CardError, TextureError};
use crate::gpu::GpuState;
use crate::greeting::{compose_greeting, GreetingSource, StaticGreeting};
use crate::input::Input;
use crate::keepsake::{JsonFileStore, Keepsake, KeyValueStore, MemoryStore, UserPhoto};
use crate::scene::Scene;
use crate::textures::encode_data_url;
use crate::time::FrameClock;
use crate::toast::Toast;
use crate::ui::{keyboard_actions, CardAction, PanelView};

/// Builder for the card window.
pub struct Card {
    config: CardConfig,
    store_path: Option<PathBuf>,
    greeting_source: Box<dyn GreetingSource>,
}

impl Card {
    pub fn new() -> Self {
        Self {
            config: CardConfig::default(),
            store_path: None,
            greeting_source: Box::new(StaticGreeting::default()),
        }
    }

    pub fn with_config(mut self, config: CardConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist photos and greeting in a JSON file. Without one, the card
    /// forgets everything when it closes.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_greeting_source(mut self, source: impl GreetingSource + 'static) -> Self {
        self.greeting_source = Box::new(source);
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), CardError> {
        let store: Box<dyn KeyValueStore> = match &self.store_path {
            Some(path) => {
                log::info!("keepsake file: {}", path.display());
                Box::new(JsonFileStore::open(path)?)
            }
            None => Box::new(MemoryStore::new()),
        };
        let card = CardState::new(self.config, store)?.with_greeting_source(self.greeting_source);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(card);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Card {
    fn default() -> Self {
        Self::new()
    }
}

/// Scene, memory and interaction state of a running card.
pub struct CardState {
    scene: Scene,
    keepsake: Keepsake,
    store: Box<dyn KeyValueStore>,
    greeting_source: Box<dyn GreetingSource>,
    toast: Toast,
    camera: Camera,
    /// Photo id of the selected mount.
    selected: Option<String>,
    intro: bool,
    /// A clear was asked for and awaits confirmation.
    pending_clear: bool,
    photo_counter: u64,
}

impl CardState {
    /// Build the scene and restore photos and greeting from `store`.
    pub fn new(config: CardConfig, store: Box<dyn KeyValueStore>) -> Result<Self, CardError> {
        let max_photos = config.photos.max_photos;
        let mut scene = Scene::new(config)?;
        let keepsake = Keepsake::load(store.as_ref(), max_photos).unwrap_or_else(|e| {
            log::warn!("saved keepsake unreadable, starting empty: {e}");
            Keepsake::new(max_photos)
        });
        scene.set_photos(keepsake.photos());
        log::info!("restored {} photo(s)", keepsake.photos().len());

        Ok(Self {
            scene,
            keepsake,
            store,
            greeting_source: Box::new(StaticGreeting::default()),
            toast: Toast::new(),
            camera: Camera::default(),
            selected: None,
            intro: true,
            pending_clear: false,
            photo_counter: 0,
        })
    }

    pub fn with_greeting_source(mut self, source: Box<dyn GreetingSource>) -> Self {
        self.greeting_source = source;
        self
    }

    // ========== Accessors ==========

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn keepsake(&self) -> &Keepsake {
        &self.keepsake
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.message()
    }

    /// Photo id of the selected photo, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_intro(&self) -> bool {
        self.intro
    }

    /// Whether a clear is waiting for [`CardAction::ConfirmClear`].
    pub fn confirming_clear(&self) -> bool {
        self.pending_clear
    }

    pub fn panel_view(&self) -> PanelView<'_> {
        PanelView {
            intro: self.intro,
            greeting: self.keepsake.greeting(),
            toast: self.toast.message(),
            scattered: self.scene.is_scattered(),
            photo_count: self.keepsake.photos().len(),
            has_selection: self.selected.is_some(),
            confirming_clear: self.pending_clear,
        }
    }

    // ========== Frame ==========

    /// Frame the tree for a new viewport, keeping any orbit the user made.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let framed = Camera::for_viewport(width, height);
        self.camera.target = framed.target;
        self.camera.resize(width, height);
    }

    pub fn step(&mut self, delta: f32) {
        self.scene.step(delta);
        self.toast.tick(delta);
    }

    // ========== Interaction ==========

    /// Apply one request. Anything other than confirming or cancelling
    /// drops a pending clear.
    pub fn apply(&mut self, action: CardAction) {
        if !matches!(action, CardAction::ConfirmClear | CardAction::CancelClear) {
            self.pending_clear = false;
        }
        match action {
            CardAction::Start => self.intro = false,
            CardAction::ToggleScatter => self.toggle_scatter(),
            CardAction::RemoveSelected => self.remove_selected(),
            CardAction::ClearMemory => self.request_clear(),
            CardAction::ConfirmClear => self.confirm_clear(),
            CardAction::CancelClear => self.cancel_clear(),
            CardAction::ComposeGreeting(prompt) => self.compose_greeting(&prompt),
        }
    }

    /// A click at `ndc`: select the photo under it, or toggle scatter when
    /// there is none.
    pub fn click(&mut self, ndc: Vec2) {
        if self.intro {
            self.intro = false;
            return;
        }
        self.pending_clear = false;
        let photo_id = self
            .scene
            .hit_test(ndc, &self.camera)
            .and_then(|hit| self.scene.mount(hit.mount))
            .map(|mount| mount.photo_id.clone());
        match photo_id {
            Some(id) => {
                log::debug!("selected photo {id}");
                self.selected = Some(id);
                self.toast.show("Photo selected - Backspace removes it");
            }
            None => self.toggle_scatter(),
        }
    }

    fn toggle_scatter(&mut self) {
        let scattered = self.scene.toggle_scatter();
        log::debug!("scatter {}", if scattered { "on" } else { "off" });
    }

    /// Add a photo by reference (path or data URL).
    pub fn add_photo(&mut self, url: impl Into<String>) {
        self.photo_counter += 1;
        self.keepsake
            .add_photo(UserPhoto::with_fresh_id(url, self.photo_counter));
        self.photos_changed();
        self.save();
        self.toast.show("Photo added");
    }

    /// Read an image file and add it as a self-contained data URL.
    pub fn add_photo_file(&mut self, path: &Path) -> Result<(), TextureError> {
        let bytes = std::fs::read(path)?;
        image::guess_format(&bytes)?;
        self.add_photo(encode_data_url(&bytes, path));
        Ok(())
    }

    fn remove_selected(&mut self) {
        let Some(id) = self.selected.take() else {
            return;
        };
        if self.keepsake.remove_photo(&id) {
            self.photos_changed();
            self.save();
            self.toast.show("Photo removed");
        }
    }

    fn request_clear(&mut self) {
        self.pending_clear = true;
        self.toast
            .show("Clear all memory? Enter confirms, Escape keeps it");
    }

    fn confirm_clear(&mut self) {
        if std::mem::take(&mut self.pending_clear) {
            self.clear_memory();
        }
    }

    fn cancel_clear(&mut self) {
        if std::mem::take(&mut self.pending_clear) {
            self.toast.show("Memory kept");
        }
    }

    fn clear_memory(&mut self) {
        self.selected = None;
        if let Err(e) = self.keepsake.clear(self.store.as_mut()) {
            log::error!("failed to clear keepsake: {e}");
        }
        self.scene.clear_photos();
        self.toast.show("Memory cleared");
    }

    fn compose_greeting(&mut self, prompt: &str) {
        match compose_greeting(self.greeting_source.as_mut(), prompt) {
            Ok(text) => {
                self.keepsake.set_greeting(text);
                self.save();
                self.toast.show("Greeting updated");
            }
            Err(e) => {
                log::warn!("greeting not updated: {e}");
                self.toast.show(e.to_string());
            }
        }
    }

    fn photos_changed(&mut self) {
        self.scene.set_photos(self.keepsake.photos());
        if let Some(id) = &self.selected {
            if self.scene.mounts().find_photo(id).is_none() {
                self.selected = None;
            }
        }
    }

    fn save(&mut self) {
        if let Err(e) = self.keepsake.save(self.store.as_mut()) {
            log::error!("failed to save keepsake: {e}");
            self.toast.show("Could not save");
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    card: CardState,
    input: Input,
    clock: FrameClock,
    #[cfg(feature = "egui")]
    panel: crate::ui::PanelState,
    #[cfg(not(feature = "egui"))]
    title: String,
    error: Option<CardError>,
}

impl App {
    fn new(card: CardState) -> Self {
        Self {
            window: None,
            gpu_state: None,
            card,
            input: Input::new(),
            clock: FrameClock::new(),
            #[cfg(feature = "egui")]
            panel: crate::ui::PanelState::default(),
            #[cfg(not(feature = "egui"))]
            title: String::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: CardError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();

        for action in keyboard_actions(&self.input, self.card.is_intro()) {
            self.card.apply(action);
        }
        if let Some(ndc) = self.input.click_ndc() {
            self.card.click(ndc);
        }
        if !self.card.is_intro() {
            let camera = self.card.camera_mut();
            if self.input.is_dragging() {
                camera.orbit(self.input.drag_delta());
            }
            camera.zoom(self.input.scroll_delta());
        }
        self.input.end_frame();

        self.card.step(delta);
        self.draw(event_loop);
    }

    #[cfg(feature = "egui")]
    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu_state), Some(window)) = (self.gpu_state.as_mut(), self.window.clone()) else {
            return;
        };
        let view = self.card.panel_view();
        let panel = &mut self.panel;
        let mut actions = Vec::new();
        let result = gpu_state.render_with_ui(
            self.card.scene(),
            self.card.camera(),
            self.clock.elapsed(),
            &window,
            |ctx| actions = crate::ui::draw_panel(ctx, view, panel),
        );
        self.handle_render_result(result, event_loop);
        for action in actions {
            self.card.apply(action);
        }
    }

    #[cfg(not(feature = "egui"))]
    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = self.gpu_state.as_mut() else {
            return;
        };
        let result = gpu_state.render(self.card.scene(), self.card.camera(), self.clock.elapsed());
        self.handle_render_result(result, event_loop);

        // Without the overlay, the title bar carries the greeting and status.
        let greeting = self.card.keepsake().greeting().lines().next().unwrap_or_default();
        let status = if self.card.confirming_clear() {
            Some("Clear all memory? Enter / Escape")
        } else {
            self.card.toast()
        };
        let title = match status {
            Some(message) => format!("Stardust - {greeting} - {message}"),
            None => format!("Stardust - {greeting}"),
        };
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    /// Give egui first look at an event. Frame and lifecycle events always
    /// reach the card too.
    #[cfg(feature = "egui")]
    fn egui_consumes(&mut self, event: &WindowEvent) -> bool {
        let (Some(gpu_state), Some(window)) = (self.gpu_state.as_mut(), self.window.as_ref()) else {
            return false;
        };
        let consumed = gpu_state.egui_event(window, event);
        consumed
            && !matches!(
                event,
                WindowEvent::RedrawRequested | WindowEvent::Resized(_) | WindowEvent::CloseRequested
            )
    }

    #[cfg(not(feature = "egui"))]
    fn egui_consumes(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    fn handle_render_result(
        &mut self,
        result: Result<(), wgpu::SurfaceError>,
        event_loop: &ActiveEventLoop,
    ) {
        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.reconfigure();
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("Stardust")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        *self.card.camera_mut() = Camera::for_viewport(size.width, size.height);

        match pollster::block_on(GpuState::new(window.clone(), self.card.scene())) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.egui_consumes(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                self.card
                    .set_viewport(physical_size.width, physical_size.height);
                self.input.handle_event(&event);
            }
            WindowEvent::DroppedFile(path) => {
                if let Err(e) = self.card.add_photo_file(&path) {
                    log::warn!("could not add {}: {e}", path.display());
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => self.input.handle_event(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greeting::DEFAULT_GREETING;
    use crate::keepsake::{STORAGE_KEY_GREETING, STORAGE_KEY_PHOTOS};

    fn state_with(store: MemoryStore) -> CardState {
        let config = CardConfig {
            particle_count: 100,
            seed: Some(3),
            ..CardConfig::default()
        };
        CardState::new(config, Box::new(store)).unwrap()
    }

    fn png_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_restores_from_store() {
        let mut store = MemoryStore::new();
        let photos = vec![UserPhoto::new("a", "/x.png"), UserPhoto::new("b", "/y.png")];
        store
            .set(STORAGE_KEY_PHOTOS, &serde_json::to_string(&photos).unwrap())
            .unwrap();
        store.set(STORAGE_KEY_GREETING, "hello").unwrap();

        let card = state_with(store);
        assert_eq!(card.keepsake().photos().len(), 2);
        assert_eq!(card.scene().mounts().len(), 2);
        assert_eq!(card.keepsake().greeting(), "hello");
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY_PHOTOS, "{not json").unwrap();
        store.set(STORAGE_KEY_GREETING, "hello").unwrap();

        let card = state_with(store);
        assert!(card.keepsake().photos().is_empty());
        assert!(card.scene().mounts().is_empty());
        assert_eq!(card.keepsake().greeting(), DEFAULT_GREETING);
    }

    #[test]
    fn test_first_click_leaves_intro_only() {
        let mut card = state_with(MemoryStore::new());
        assert!(card.is_intro());
        card.click(Vec2::ZERO);
        assert!(!card.is_intro());
        assert!(!card.scene().is_scattered());
    }

    #[test]
    fn test_click_on_empty_space_toggles() {
        let mut card = state_with(MemoryStore::new());
        card.apply(CardAction::Start);
        card.click(Vec2::new(0.95, 0.95));
        assert!(card.scene().is_scattered());
        card.click(Vec2::new(0.95, 0.95));
        assert!(!card.scene().is_scattered());
    }

    #[test]
    fn test_add_file_then_remove_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_file(dir.path(), "a.png");

        let mut card = state_with(MemoryStore::new());
        card.add_photo_file(&path).unwrap();
        assert_eq!(card.keepsake().photos().len(), 1);
        assert!(card.keepsake().photos()[0].url.starts_with("data:image/png;base64,"));
        assert_eq!(card.toast(), Some("Photo added"));

        card.selected = Some(card.keepsake().photos()[0].id.clone());
        card.apply(CardAction::RemoveSelected);
        assert!(card.keepsake().photos().is_empty());
        assert!(card.scene().mounts().is_empty());
        assert!(card.selected().is_none());
    }

    #[test]
    fn test_non_image_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not a photo").unwrap();

        let mut card = state_with(MemoryStore::new());
        assert!(card.add_photo_file(&path).is_err());
        assert!(card.keepsake().photos().is_empty());
    }

    #[test]
    fn test_clear_memory_waits_for_confirmation() {
        let mut card = state_with(MemoryStore::new());
        card.add_photo("/x.png");
        card.apply(CardAction::ClearMemory);

        assert!(card.confirming_clear());
        assert_eq!(card.keepsake().photos().len(), 1);
        assert_eq!(card.scene().mounts().len(), 1);
        assert!(card.store.get(STORAGE_KEY_PHOTOS).unwrap().is_some());
    }

    #[test]
    fn test_clear_memory_cancelled() {
        let mut card = state_with(MemoryStore::new());
        card.add_photo("/x.png");
        card.apply(CardAction::ClearMemory);
        card.apply(CardAction::CancelClear);
        assert!(!card.confirming_clear());
        assert_eq!(card.toast(), Some("Memory kept"));

        // A stray confirmation later does nothing.
        card.apply(CardAction::ConfirmClear);
        assert_eq!(card.keepsake().photos().len(), 1);
    }

    #[test]
    fn test_other_action_drops_pending_clear() {
        let mut card = state_with(MemoryStore::new());
        card.add_photo("/x.png");
        card.apply(CardAction::ClearMemory);
        card.apply(CardAction::ToggleScatter);
        card.apply(CardAction::ConfirmClear);
        assert_eq!(card.keepsake().photos().len(), 1);
    }

    #[test]
    fn test_clear_memory() {
        let mut card = state_with(MemoryStore::new());
        card.add_photo("/x.png");
        card.apply(CardAction::ComposeGreeting("winter".into()));
        card.apply(CardAction::ClearMemory);
        card.apply(CardAction::ConfirmClear);

        assert!(!card.confirming_clear());
        assert!(card.scene().mounts().is_empty());
        assert!(card.keepsake().photos().is_empty());
        assert_eq!(card.keepsake().greeting(), DEFAULT_GREETING);
        assert!(card.store.get(STORAGE_KEY_PHOTOS).unwrap().is_none());
    }

    #[test]
    fn test_blank_prompt_keeps_greeting() {
        let mut card = state_with(MemoryStore::new());
        card.apply(CardAction::ComposeGreeting("   ".into()));
        assert_eq!(card.keepsake().greeting(), DEFAULT_GREETING);
        assert!(card.toast().is_some());
    }

    #[test]
    fn test_photo_cap_persists() {
        let mut card = state_with(MemoryStore::new());
        for i in 0..20 {
            card.add_photo(format!("/p{i}.png"));
        }
        assert_eq!(card.keepsake().photos().len(), 15);
        assert_eq!(card.scene().mounts().len(), 15);
        let stored = card.store.get(STORAGE_KEY_PHOTOS).unwrap().unwrap();
        let photos: Vec<UserPhoto> = serde_json::from_str(&stored).unwrap();
        assert_eq!(photos.last().unwrap().url, "/p19.png");
    }
}
