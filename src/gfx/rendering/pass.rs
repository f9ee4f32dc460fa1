//! Pass context threaded through the render traversal

use crate::constants::max_lights;

/// Light whose cube map a shadow pass renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowCaster {
    /// Point light slot 0.
    Point,
    /// Spot light slot 0.
    Spot,
}

impl ShadowCaster {
    pub const ALL: [ShadowCaster; max_lights::SHADOWED_POINT + max_lights::SHADOWED_SPOT] =
        [ShadowCaster::Point, ShadowCaster::Spot];

    pub fn label(&self) -> &'static str {
        match self {
            ShadowCaster::Point => "point",
            ShadowCaster::Spot => "spot",
        }
    }
}

/// Which pass a traversal is drawing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Depth-only draw into one face (0..6) of a caster's cube map.
    Shadow { caster: ShadowCaster, face: usize },
    /// Shaded draw into the scene color target.
    Render,
}

impl PassKind {
    pub fn is_shadow(&self) -> bool {
        matches!(self, PassKind::Shadow { .. })
    }
}
