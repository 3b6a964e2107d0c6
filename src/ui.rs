//! What the user can ask the card to do, and the optional egui panel that
//! asks for it.
//!
//! Keyboard shortcuts and panel buttons both produce [`CardAction`]s, so the
//! card applies every request through one path.

use crate::input::{Input, KeyCode};

/// A request from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Leave the intro screen.
    Start,
    ToggleScatter,
    /// Remove the selected photo from the card and from memory.
    RemoveSelected,
    /// Ask to forget every photo and the greeting.
    ClearMemory,
    /// Go ahead with a requested clear.
    ConfirmClear,
    /// Keep everything after all.
    CancelClear,
    /// Compose a new greeting from a prompt.
    ComposeGreeting(String),
}

/// Map this frame's key presses to actions.
///
/// Space toggles scatter and Backspace removes the selected photo. Delete
/// asks to clear memory; Enter confirms and Escape cancels. Any key leaves
/// the intro screen. Clicks are handled by the card itself.
pub fn keyboard_actions(input: &Input, intro: bool) -> Vec<CardAction> {
    if intro {
        return if input.any_key_pressed() {
            vec![CardAction::Start]
        } else {
            Vec::new()
        };
    }

    let mut actions = Vec::new();
    if input.key_pressed(KeyCode::Space) {
        actions.push(CardAction::ToggleScatter);
    }
    if input.key_pressed(KeyCode::Backspace) {
        actions.push(CardAction::RemoveSelected);
    }
    if input.key_pressed(KeyCode::Delete) {
        actions.push(CardAction::ClearMemory);
    }
    if input.key_pressed(KeyCode::Enter) {
        actions.push(CardAction::ConfirmClear);
    }
    if input.key_pressed(KeyCode::Escape) {
        actions.push(CardAction::CancelClear);
    }
    actions
}

/// Read-only state the panel displays.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub intro: bool,
    pub greeting: &'a str,
    pub toast: Option<&'a str>,
    pub scattered: bool,
    pub photo_count: usize,
    pub has_selection: bool,
    pub confirming_clear: bool,
}

/// Text the panel keeps between frames.
#[derive(Debug, Default, Clone)]
pub struct PanelState {
    pub prompt: String,
}

/// Draw the overlay and collect the buttons pressed this frame.
#[cfg(feature = "egui")]
pub fn draw_panel(
    ctx: &egui::Context,
    view: PanelView<'_>,
    state: &mut PanelState,
) -> Vec<CardAction> {
    let mut actions = Vec::new();

    // Text overlays never take the pointer, so clicks reach the scene.
    if view.intro {
        egui::Area::new(egui::Id::new("intro"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Stardust");
                    ui.label("Click anywhere to begin");
                });
            });
        return actions;
    }

    egui::Area::new(egui::Id::new("greeting"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                for line in view.greeting.lines() {
                    ui.label(egui::RichText::new(line).size(22.0).color(egui::Color32::GOLD));
                }
            });
        });

    egui::Window::new("Controls")
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            let label = if view.scattered { "Gather" } else { "Scatter" };
            if ui.button(label).clicked() {
                actions.push(CardAction::ToggleScatter);
            }
            ui.label(format!("{} photo(s) - drop image files to add", view.photo_count));
            ui.add_enabled_ui(view.has_selection, |ui| {
                if ui.button("Remove selected").clicked() {
                    actions.push(CardAction::RemoveSelected);
                }
            });
            if view.confirming_clear {
                ui.label("Clear all photos and the greeting?");
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        actions.push(CardAction::ConfirmClear);
                    }
                    if ui.button("Keep").clicked() {
                        actions.push(CardAction::CancelClear);
                    }
                });
            } else if ui.button("Clear memory").clicked() {
                actions.push(CardAction::ClearMemory);
            }

            ui.separator();
            ui.label("Greeting prompt");
            ui.text_edit_singleline(&mut state.prompt);
            if ui.button("Compose").clicked() {
                actions.push(CardAction::ComposeGreeting(state.prompt.clone()));
            }
        });

    if let Some(message) = view.toast {
        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(message);
                });
            });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_no_actions() {
        let input = Input::new();
        assert!(keyboard_actions(&input, false).is_empty());
        assert!(keyboard_actions(&input, true).is_empty());
    }

    #[test]
    fn test_shortcuts() {
        let mut input = Input::new();
        input.press_key(KeyCode::Space);
        input.press_key(KeyCode::Delete);
        assert_eq!(
            keyboard_actions(&input, false),
            vec![CardAction::ToggleScatter, CardAction::ClearMemory]
        );
    }

    #[test]
    fn test_confirm_and_cancel_keys() {
        let mut input = Input::new();
        input.press_key(KeyCode::Enter);
        assert_eq!(keyboard_actions(&input, false), vec![CardAction::ConfirmClear]);

        input.end_frame();
        input.press_key(KeyCode::Escape);
        assert_eq!(keyboard_actions(&input, false), vec![CardAction::CancelClear]);
    }

    #[test]
    fn test_intro_swallows_keys() {
        let mut input = Input::new();
        input.press_key(KeyCode::Space);
        assert_eq!(keyboard_actions(&input, true), vec![CardAction::Start]);
    }
}
