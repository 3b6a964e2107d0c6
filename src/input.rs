//! Pointer and keyboard state for the card window.
//!
//! Raw window events are folded into per-frame state: keys pressed this
//! frame, keys held, pointer position in pixels and NDC, drag motion and
//! clicks. A click is a left press and release that stayed within
//! [`CLICK_SLOP`] pixels, so orbiting the camera never toggles the tree.

use crate::camera::pixel_to_ndc;
use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// How far the pointer may move between press and release and still count
/// as a click, in pixels.
pub const CLICK_SLOP: f32 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(btn: WinitMouseButton) -> Option<Self> {
        match btn {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Keys the card reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Enter,
    Escape,
    Backspace,
    Delete,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Enter | WinitKeyCode::NumpadEnter => KeyCode::Enter,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Backspace => KeyCode::Backspace,
            WinitKeyCode::Delete => KeyCode::Delete,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Keyboard and pointer state, reset once per frame.
#[derive(Debug)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    buttons_held: HashSet<MouseButton>,
    press_origin: Option<Vec2>,
    dragged: bool,
    click: Option<Vec2>,

    pointer: Vec2,
    pointer_delta: Vec2,
    scroll_delta: f32,

    window_size: (u32, u32),
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            buttons_held: HashSet::new(),
            press_origin: None,
            dragged: false,
            click: None,
            pointer: Vec2::ZERO,
            pointer_delta: Vec2::ZERO,
            scroll_delta: 0.0,
            window_size: (800, 600),
        }
    }

    // ========== Queries ==========

    /// Key went down this frame. Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    /// Pointer position in window pixels.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Pointer position in normalized device coordinates, +Y up.
    pub fn pointer_ndc(&self) -> Vec2 {
        let (w, h) = self.window_size;
        pixel_to_ndc(self.pointer.x, self.pointer.y, w, h)
    }

    /// Whether the left button is held and the pointer has left the click
    /// slop since it went down.
    pub fn is_dragging(&self) -> bool {
        self.dragged && self.mouse_held(MouseButton::Left)
    }

    /// Pointer motion while the left button is held, this frame.
    pub fn drag_delta(&self) -> Vec2 {
        if self.mouse_held(MouseButton::Left) {
            self.pointer_delta
        } else {
            Vec2::ZERO
        }
    }

    /// Wheel motion this frame. Positive is scrolling up.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Where a click completed this frame, in NDC.
    pub fn click_ndc(&self) -> Option<Vec2> {
        let (w, h) = self.window_size;
        self.click.map(|p| pixel_to_ndc(p.x, p.y, w, h))
    }

    /// Whether any key went down this frame.
    pub fn any_key_pressed(&self) -> bool {
        !self.keys_pressed.is_empty()
    }

    // ========== Frame bookkeeping ==========

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.click = None;
        self.pointer_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Fold a winit window event into the current state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(KeyCode::from(code)),
                        ElementState::Released => self.release_key(KeyCode::from(code)),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = MouseButton::from_winit(*button) {
                    match state {
                        ElementState::Pressed => self.press_button(btn),
                        ElementState::Released => self.release_button(btn),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                });
            }
            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),
            _ => {}
        }
    }

    pub(crate) fn press_key(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub(crate) fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub(crate) fn press_button(&mut self, btn: MouseButton) {
        self.buttons_held.insert(btn);
        if btn == MouseButton::Left {
            self.press_origin = Some(self.pointer);
            self.dragged = false;
        }
    }

    pub(crate) fn release_button(&mut self, btn: MouseButton) {
        self.buttons_held.remove(&btn);
        if btn == MouseButton::Left {
            if self.press_origin.take().is_some() && !self.dragged {
                self.click = Some(self.pointer);
            }
            self.dragged = false;
        }
    }

    pub(crate) fn move_pointer(&mut self, position: Vec2) {
        self.pointer_delta += position - self.pointer;
        self.pointer = position;
        if let Some(origin) = self.press_origin {
            if origin.distance(position) > CLICK_SLOP {
                self.dragged = true;
            }
        }
    }

    pub(crate) fn scroll(&mut self, amount: f32) {
        self.scroll_delta += amount;
    }
}
