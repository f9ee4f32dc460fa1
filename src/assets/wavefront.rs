//! Wavefront `.obj`/`.mtl` import
//!
//! Parsing is delegated to `tobj`. This module turns its output into
//! non-indexed vertex streams, Phong materials and texture references, and
//! merges in the per-object overrides of the model's optional `.cfg`.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use super::placement::{Placement, PlacementTable};
use crate::{
    error::ImportError,
    gfx::{
        resources::material::{Material, TextureSet},
        scene::Vertex,
    },
};

/// Geometry and surface description of one imported object.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub material: Material,
    pub textures: TextureSet,
}

impl Mesh {
    /// A named mesh with no geometry and the default material.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertices: Vec::new(),
            material: Material::default(),
            textures: TextureSet::default(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// One named object of a model file, ready to become a scene node.
#[derive(Debug, Clone)]
pub struct ImportedObject {
    pub name: String,
    pub mesh: Rc<Mesh>,
    pub placement: Placement,
    /// Name of the node this object should be parented under.
    pub parent: Option<String>,
}

/// Paths of model `name`'s `.obj` and `.cfg` inside `dir`. The `.mtl` is
/// whatever the `.obj` references through `mtllib`.
pub fn model_files(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (dir.join(format!("{name}.obj")), dir.join(format!("{name}.cfg")))
}

/// Imports `<dir>/<name>.obj` (with the `.mtl` it references) and applies
/// `<dir>/<name>.cfg` when present.
pub fn import_model(dir: &Path, name: &str) -> Result<Vec<ImportedObject>, ImportError> {
    let (obj_path, cfg_path) = model_files(dir, name);
    let (models, materials) = tobj::load_obj(
        &obj_path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ignore_points: true,
            ignore_lines: true,
        },
    )
    .map_err(|source| ImportError::Obj {
        path: obj_path.clone(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable material library for {} ({}), using defaults", obj_path.display(), e);
        Vec::new()
    });
    let placements = PlacementTable::load(&cfg_path)?;

    let objects: Vec<ImportedObject> = models
        .iter()
        .map(|model| {
            let name = if model.name.is_empty() {
                name.to_string()
            } else {
                model.name.clone()
            };
            let (material, textures) = match model.mesh.material_id.and_then(|id| materials.get(id)) {
                Some(source) => convert_material(source),
                None => {
                    log::warn!("Object '{}' has no material, using the default", name);
                    (Material::default(), TextureSet::default())
                }
            };
            let overrides = placements.resolve(&name);
            ImportedObject {
                mesh: Rc::new(Mesh {
                    name: name.clone(),
                    vertices: expand_vertices(&model.mesh),
                    material,
                    textures,
                }),
                name,
                placement: overrides.placement,
                parent: overrides.parent,
            }
        })
        .collect();

    log::info!("Imported {} object(s) from {}", objects.len(), obj_path.display());
    Ok(objects)
}

/// Expands indexed faces into a flat triangle list. Missing normals or
/// texture coordinates become zeros.
pub fn expand_vertices(mesh: &tobj::Mesh) -> Vec<Vertex> {
    mesh.indices
        .iter()
        .enumerate()
        .map(|(corner, &position_index)| {
            let position = triple(&mesh.positions, position_index as usize).unwrap_or_default();
            let normal = mesh
                .normal_indices
                .get(corner)
                .or_else(|| (mesh.normals.len() == mesh.positions.len()).then_some(&position_index))
                .and_then(|&i| triple(&mesh.normals, i as usize))
                .unwrap_or_default();
            let uv = mesh
                .texcoord_indices
                .get(corner)
                .or_else(|| (mesh.texcoords.len() / 2 == mesh.positions.len() / 3).then_some(&position_index))
                .and_then(|&i| pair(&mesh.texcoords, i as usize))
                .unwrap_or_default();
            Vertex {
                position,
                normal,
                uv,
            }
        })
        .collect()
}

fn triple(values: &[f32], index: usize) -> Option<[f32; 3]> {
    values.get(index * 3..index * 3 + 3).map(|s| [s[0], s[1], s[2]])
}

fn pair(values: &[f32], index: usize) -> Option<[f32; 2]> {
    values.get(index * 2..index * 2 + 2).map(|s| [s[0], s[1]])
}

fn convert_material(source: &tobj::Material) -> (Material, TextureSet) {
    let defaults = Material::default();
    let material = Material {
        name: source.name.clone(),
        ambient: source.ambient.unwrap_or(defaults.ambient),
        diffuse: source.diffuse.unwrap_or(defaults.diffuse),
        specular: source.specular.unwrap_or(defaults.specular),
        shininess: source.shininess.unwrap_or(defaults.shininess),
    };
    let textures = TextureSet {
        ambient: source.ambient_texture.clone(),
        diffuse: source.diffuse_texture.clone(),
        specular: source.specular_texture.clone(),
        normal: source
            .normal_texture
            .clone()
            .or_else(|| source.unknown_param.get("map_bump").cloned()),
    };
    (material, textures)
}
