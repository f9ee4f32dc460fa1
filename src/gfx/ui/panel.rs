//! Control panel: shadows, collisions, vsync, post-processing and pause,
//! plus frame counters
//!
//! The panel never talks to the engine directly. It edits the slider, toggle
//! and button mirrors in [`InputState`], which the update step polls.

use imgui::Ui;

use crate::{
    config::{CollisionMode, DemoConfig},
    input::{controls, InputState},
};

/// Read-only numbers shown at the bottom of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelStats {
    pub frame: u64,
    pub nodes: usize,
    pub draws: usize,
    pub shadow_draws: usize,
}

/// Editable values, read from the input mirrors before the widgets run and
/// written back afterwards. Toggles nobody has touched report the
/// configured startup value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelValues {
    pub shadows: bool,
    pub collisions: bool,
    pub vsync: bool,
    pub exposure: f32,
    pub vignette: f32,
    pub grayscale: bool,
}

impl PanelValues {
    pub fn read(input: &InputState, config: &DemoConfig) -> Self {
        Self {
            shadows: input.toggle_or(controls::SHADOWS, config.shadows_enabled),
            collisions: input.toggle_or(
                controls::COLLISIONS,
                config.collision_mode == CollisionMode::Spheres,
            ),
            vsync: input.toggle_or(controls::VSYNC, config.vsync),
            exposure: input.slider_or(controls::EXPOSURE, 1.0),
            vignette: input.slider_or(controls::VIGNETTE, 0.0),
            grayscale: input.toggle_or(controls::GRAYSCALE, false),
        }
    }

    /// Stores every value that differs from what `input` already reports.
    pub fn write(&self, input: &mut InputState, config: &DemoConfig) {
        let current = Self::read(input, config);
        if current.shadows != self.shadows {
            input.set_toggle(controls::SHADOWS, self.shadows);
        }
        if current.collisions != self.collisions {
            input.set_toggle(controls::COLLISIONS, self.collisions);
        }
        if current.vsync != self.vsync {
            input.set_toggle(controls::VSYNC, self.vsync);
        }
        if current.exposure != self.exposure {
            input.set_slider(controls::EXPOSURE, self.exposure);
        }
        if current.vignette != self.vignette {
            input.set_slider(controls::VIGNETTE, self.vignette);
        }
        if current.grayscale != self.grayscale {
            input.set_toggle(controls::GRAYSCALE, self.grayscale);
        }
    }

    pub fn collision_mode(&self) -> CollisionMode {
        if self.collisions {
            CollisionMode::Spheres
        } else {
            CollisionMode::Disabled
        }
    }
}

pub fn control_panel(ui: &Ui, input: &mut InputState, stats: &PanelStats, config: &DemoConfig) {
    let mut values = PanelValues::read(input, config);
    let mut pause_clicked = false;
    let paused = input.button(controls::PAUSE);

    ui.window("Scene")
        .size([300.0, 300.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            ui.checkbox("Shadows", &mut values.shadows);
            ui.checkbox("Sphere collisions", &mut values.collisions);
            ui.checkbox("VSync", &mut values.vsync);
            ui.separator();

            ui.text("Post-processing");
            ui.slider("Exposure", 0.0, 4.0, &mut values.exposure);
            ui.slider("Vignette", 0.0, 1.0, &mut values.vignette);
            ui.checkbox("Grayscale", &mut values.grayscale);
            ui.separator();

            let label = if paused { "Resume" } else { "Pause" };
            pause_clicked = ui.button(label);
            ui.separator();

            ui.text(format!("Frame: {}", stats.frame));
            ui.text(format!("Nodes: {}", stats.nodes));
            ui.text(format!("Draws: {} (+{} shadow)", stats.draws, stats.shadow_draws));
        });

    values.write(input, config);
    if pause_clicked {
        input.click_button(controls::PAUSE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_default_until_edited() {
        let input = InputState::new();
        let config = DemoConfig::default().with_collision_mode(CollisionMode::Spheres);
        let values = PanelValues::read(&input, &config);
        assert!(values.shadows);
        assert!(values.collisions);
        assert!(values.vsync);
        assert_eq!(values.exposure, 1.0);
        assert_eq!(values.vignette, 0.0);
        assert!(!values.grayscale);
        assert_eq!(values.collision_mode(), CollisionMode::Spheres);
    }

    #[test]
    fn test_only_edited_values_are_stored() {
        let config = DemoConfig::default().with_shadows(false);
        let mut input = InputState::new();
        let mut values = PanelValues::read(&input, &config);
        values.vignette = 0.4;
        values.write(&mut input, &config);

        assert_eq!(input.slider(controls::VIGNETTE), Some(0.4));
        assert_eq!(input.slider(controls::EXPOSURE), None);
        assert_eq!(input.toggle(controls::SHADOWS), None);
        assert_eq!(PanelValues::read(&input, &config), values);
    }

    #[test]
    fn test_collision_and_vsync_toggles_override_config() {
        let config = DemoConfig::default();
        let mut input = InputState::new();
        let mut values = PanelValues::read(&input, &config);
        assert_eq!(values.collision_mode(), CollisionMode::Disabled);

        values.collisions = true;
        values.vsync = false;
        values.write(&mut input, &config);

        let reread = PanelValues::read(&input, &config);
        assert_eq!(reread.collision_mode(), CollisionMode::Spheres);
        assert!(!reread.vsync);
        assert_eq!(input.toggle(controls::VSYNC), Some(false));
    }
}
