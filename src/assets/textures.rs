//! Texture file loading with a checkerboard fallback

use std::{collections::HashMap, path::PathBuf, rc::Rc};

use image::{Rgba, RgbaImage};

use crate::constants::MISSING_TEXTURE_SIZE;

const MISSING_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);
const EMPTY_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Placeholder bound for any texture that cannot be read: magenta in the
/// top-left and bottom-right quadrants, transparent black elsewhere.
pub fn checkerboard(size: u32) -> RgbaImage {
    let half = size / 2;
    RgbaImage::from_fn(size, size, |x, y| {
        if (x < half) == (y < half) {
            MISSING_COLOR
        } else {
            EMPTY_COLOR
        }
    })
}

/// Decoded textures keyed by the file name a material references.
///
/// Each name is decoded once. Names that fail to load are cached as the
/// checkerboard so the warning is not repeated every frame.
pub struct TextureLibrary {
    roots: Vec<PathBuf>,
    loaded: HashMap<String, Rc<RgbaImage>>,
    missing: Rc<RgbaImage>,
}

impl TextureLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            loaded: HashMap::new(),
            missing: Rc::new(checkerboard(MISSING_TEXTURE_SIZE)),
        }
    }

    /// Adds another directory to search, after the existing ones.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roots.push(dir.into());
        self
    }

    pub fn missing(&self) -> Rc<RgbaImage> {
        Rc::clone(&self.missing)
    }

    pub fn is_missing(&self, image: &Rc<RgbaImage>) -> bool {
        Rc::ptr_eq(image, &self.missing)
    }

    /// Decoded RGBA image for `name`, or the checkerboard.
    pub fn get(&mut self, name: &str) -> Rc<RgbaImage> {
        if let Some(image) = self.loaded.get(name) {
            return Rc::clone(image);
        }
        let image = match self.decode(name) {
            Some(image) => Rc::new(image),
            None => Rc::clone(&self.missing),
        };
        self.loaded.insert(name.to_string(), Rc::clone(&image));
        image
    }

    fn decode(&self, name: &str) -> Option<RgbaImage> {
        let Some(path) = self.roots.iter().map(|root| root.join(name)).find(|p| p.is_file()) else {
            log::warn!("Texture '{}' not found, using placeholder", name);
            return None;
        };
        match image::open(&path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                log::debug!("Loaded texture {} ({}x{})", path.display(), rgba.width(), rgba.height());
                Some(rgba)
            }
            Err(e) => {
                log::warn!("Texture {} could not be decoded ({}), using placeholder", path.display(), e);
                None
            }
        }
    }
}
