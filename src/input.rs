//! Input mirrors polled by the camera and post-process controllers
//!
//! Keyboard state is pushed in from winit events; slider, toggle and button
//! values are pushed in from the control panel. Consumers only ever read.

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Well-known control identifiers shared by the panel and the consumers.
pub mod controls {
    pub const SHADOWS: &str = "shadows";
    pub const GRAYSCALE: &str = "grayscale";
    pub const PAUSE: &str = "pause";
    pub const EXPOSURE: &str = "exposure";
    pub const VIGNETTE: &str = "vignette";
    pub const COLLISIONS: &str = "collisions";
    pub const VSYNC: &str = "vsync";
}

/// Live key-pressed set plus GUI value mirrors.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    sliders: HashMap<String, f32>,
    toggles: HashMap<String, bool>,
    buttons: HashMap<String, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.set_key(code, event.state == ElementState::Pressed);
        }
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(code);
        } else {
            self.keys.remove(&code);
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    /// Releases every key, used when the window loses focus.
    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }

    pub fn set_slider(&mut self, id: &str, value: f32) {
        self.sliders.insert(id.to_string(), value);
    }

    pub fn slider(&self, id: &str) -> Option<f32> {
        self.sliders.get(id).copied()
    }

    pub fn slider_or(&self, id: &str, default: f32) -> f32 {
        self.slider(id).unwrap_or(default)
    }

    pub fn set_toggle(&mut self, id: &str, value: bool) {
        self.toggles.insert(id.to_string(), value);
    }

    pub fn toggle(&self, id: &str) -> Option<bool> {
        self.toggles.get(id).copied()
    }

    pub fn toggle_or(&self, id: &str, default: bool) -> bool {
        self.toggle(id).unwrap_or(default)
    }

    /// Buttons flip their stored state on every click.
    pub fn click_button(&mut self, id: &str) {
        let state = self.buttons.entry(id.to_string()).or_insert(false);
        *state = !*state;
    }

    pub fn button(&self, id: &str) -> bool {
        self.buttons.get(id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_and_release() {
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, true);
        assert!(input.is_pressed(KeyCode::KeyW));
        input.set_key(KeyCode::KeyW, false);
        assert!(!input.is_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_button_flips_state() {
        let mut input = InputState::new();
        assert!(!input.button(controls::PAUSE));
        input.click_button(controls::PAUSE);
        assert!(input.button(controls::PAUSE));
        input.click_button(controls::PAUSE);
        assert!(!input.button(controls::PAUSE));
    }

    #[test]
    fn test_slider_defaults() {
        let mut input = InputState::new();
        assert_eq!(input.slider_or(controls::EXPOSURE, 1.0), 1.0);
        input.set_slider(controls::EXPOSURE, 2.5);
        assert_eq!(input.slider(controls::EXPOSURE), Some(2.5));
    }
}
