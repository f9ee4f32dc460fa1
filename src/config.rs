//! Runtime configuration for the demo
//!
//! [`DemoConfig`] carries everything that can change between runs without a
//! rebuild. Defaults reproduce the stock scene; `SCENIC_*` environment
//! variables override individual fields.

use std::path::PathBuf;

use crate::{constants::MAX_TEXTURE_DIMENSION, error::ConfigError};

/// How the scene graph resolves overlaps while integrating movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMode {
    /// Overlap test never reports contact. Nodes move freely.
    #[default]
    Disabled,
    /// Bounding-sphere test: contact when the centre distance is below the
    /// sum of both radii.
    Spheres,
}

/// Top-level demo configuration
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    pub asset_root: PathBuf,
    pub models: Vec<String>,
    pub planets: Vec<String>,
    pub orrery_seed: u64,
    pub shadows_enabled: bool,
    pub shadow_map_size: u32,
    pub collision_mode: CollisionMode,
    pub ambient_light: [f32; 3],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 800,
            vsync: true,
            asset_root: PathBuf::from("assets"),
            models: crate::constants::MODELS.iter().map(|m| m.to_string()).collect(),
            planets: crate::constants::PLANETS.iter().map(|p| p.to_string()).collect(),
            orrery_seed: 4257,
            shadows_enabled: true,
            shadow_map_size: 1024,
            collision_mode: CollisionMode::Disabled,
            ambient_light: [0.3, 0.3, 0.3],
        }
    }
}

impl DemoConfig {
    /// Default configuration with `SCENIC_*` overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(root) = lookup("SCENIC_ASSETS") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(value) = lookup("SCENIC_SEED") {
            self.orrery_seed = parse_number("SCENIC_SEED", &value)?;
        }
        if let Some(value) = lookup("SCENIC_SHADOWS") {
            self.shadows_enabled = parse_flag("SCENIC_SHADOWS", &value)?;
        }
        if let Some(value) = lookup("SCENIC_SHADOW_SIZE") {
            let size: u32 = parse_number("SCENIC_SHADOW_SIZE", &value)?;
            if size == 0 || size > MAX_TEXTURE_DIMENSION {
                return Err(ConfigError::InvalidValue {
                    name: "SCENIC_SHADOW_SIZE",
                    value,
                    expected: "a shadow map size between 1 and 4096",
                });
            }
            self.shadow_map_size = size;
        }
        if let Some(value) = lookup("SCENIC_WIDTH") {
            self.window_width = parse_number("SCENIC_WIDTH", &value)?;
        }
        if let Some(value) = lookup("SCENIC_HEIGHT") {
            self.window_height = parse_number("SCENIC_HEIGHT", &value)?;
        }
        if let Some(value) = lookup("SCENIC_VSYNC") {
            self.vsync = parse_flag("SCENIC_VSYNC", &value)?;
        }
        if let Some(value) = lookup("SCENIC_COLLISIONS") {
            self.collision_mode = match value.trim().to_ascii_lowercase().as_str() {
                "off" | "none" | "disabled" => CollisionMode::Disabled,
                "spheres" | "sphere" => CollisionMode::Spheres,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "SCENIC_COLLISIONS",
                        value,
                        expected: "'off' or 'spheres'",
                    })
                }
            };
        }
        Ok(self)
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.orrery_seed = seed;
        self
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }

    pub fn with_collision_mode(mut self, mode: CollisionMode) -> Self {
        self.collision_mode = mode;
        self
    }

    /// Directory holding the `.obj`/`.mtl`/`.cfg` of a static model.
    pub fn model_dir(&self, name: &str) -> PathBuf {
        self.asset_root.join("Models").join("Static").join(name)
    }

    /// Directory holding the files of an orrery body.
    pub fn planet_dir(&self, name: &str) -> PathBuf {
        self.asset_root.join("Models").join("Planet").join(name)
    }

    pub fn texture_dir(&self) -> PathBuf {
        self.asset_root.join("Textures")
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            expected: "a boolean (0/1, true/false)",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_stock_scene() {
        let config = DemoConfig::default();
        assert_eq!(config.orrery_seed, 4257);
        assert!(config.shadows_enabled);
        assert_eq!(config.collision_mode, CollisionMode::Disabled);
        assert_eq!(config.models, vec!["Chappy", "Strawberry"]);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = DemoConfig::default()
            .with_overrides(lookup_from(&[
                ("SCENIC_SEED", "99"),
                ("SCENIC_SHADOWS", "off"),
                ("SCENIC_COLLISIONS", "spheres"),
                ("SCENIC_ASSETS", "/tmp/scenic"),
            ]))
            .unwrap();
        assert_eq!(config.orrery_seed, 99);
        assert!(!config.shadows_enabled);
        assert_eq!(config.collision_mode, CollisionMode::Spheres);
        assert_eq!(
            config.model_dir("Chappy"),
            PathBuf::from("/tmp/scenic/Models/Static/Chappy")
        );
    }

    #[test]
    fn test_shadow_size_outside_device_limit_is_rejected() {
        for bad in ["0", "4097", "65536"] {
            let result = DemoConfig::default().with_overrides(lookup_from(&[("SCENIC_SHADOW_SIZE", bad)]));
            assert!(
                matches!(
                    result,
                    Err(ConfigError::InvalidValue { name: "SCENIC_SHADOW_SIZE", .. })
                ),
                "{bad} was accepted"
            );
        }

        let config = DemoConfig::default()
            .with_overrides(lookup_from(&[("SCENIC_SHADOW_SIZE", "4096")]))
            .unwrap();
        assert_eq!(config.shadow_map_size, MAX_TEXTURE_DIMENSION);
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = DemoConfig::default()
            .with_seed(1)
            .with_shadows(false)
            .with_collision_mode(CollisionMode::Spheres);
        assert_eq!(config.orrery_seed, 1);
        assert!(!config.shadows_enabled);
        assert_eq!(config.collision_mode, CollisionMode::Spheres);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = DemoConfig::default().with_overrides(lookup_from(&[("SCENIC_SEED", "abc")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "SCENIC_SEED", .. })
        ));
    }
}
