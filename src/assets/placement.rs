//! Per-object placement overrides read from a model's `.cfg`
//!
//! One directive per line:
//!
//! ```text
//! # comment
//! Hat loc 0 1.5 0
//! Hat rot 0 3.14159 0
//! Hat scl 0.5 0.5 0.5
//! Hat parent Chappy
//! ```
//!
//! A malformed line is logged and dropped; the rest of the file still
//! applies.

use std::{collections::HashMap, path::Path};

use cgmath::Vector3;

use crate::error::ImportError;

/// Local transform an imported object starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub loc: Vector3<f32>,
    pub rot: Vector3<f32>,
    pub scl: Vector3<f32>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            loc: Vector3::new(0.0, 0.0, 0.0),
            rot: Vector3::new(0.0, 0.0, 0.0),
            scl: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Overrides collected for one object name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPlacement {
    pub placement: Placement,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Directive {
    Loc(Vector3<f32>),
    Rot(Vector3<f32>),
    Scl(Vector3<f32>),
    Parent(String),
}

#[derive(Debug, Clone, Default)]
pub struct PlacementTable {
    entries: HashMap<String, ObjectPlacement>,
}

impl PlacementTable {
    /// Parses `.cfg` text, logging and skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for (index, line) in text.lines().enumerate() {
            match parse_line(index + 1, line) {
                Ok(Some((name, directive))) => table.apply(name, directive),
                Ok(None) => {}
                Err(e) => log::error!("{}, override dropped", e),
            }
        }
        table
    }

    /// Reads `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            log::debug!("No placement file at {}", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, name: &str) -> Option<&ObjectPlacement> {
        self.entries.get(name)
    }

    /// Overrides for `name`, or the identity placement.
    pub fn resolve(&self, name: &str) -> ObjectPlacement {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply(&mut self, name: String, directive: Directive) {
        let entry = self.entries.entry(name).or_default();
        match directive {
            Directive::Loc(v) => entry.placement.loc = v,
            Directive::Rot(v) => entry.placement.rot = v,
            Directive::Scl(v) => entry.placement.scl = v,
            Directive::Parent(parent) => entry.parent = Some(parent),
        }
    }
}

fn parse_line(line: usize, text: &str) -> Result<Option<(String, Directive)>, ImportError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut tokens = trimmed.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let key = tokens.next().ok_or(ImportError::MissingKey { line })?;
    let values: Vec<&str> = tokens.collect();

    let directive = match key {
        "loc" => Directive::Loc(parse_vec3(line, key, &values)?),
        "rot" => Directive::Rot(parse_vec3(line, key, &values)?),
        "scl" => Directive::Scl(parse_vec3(line, key, &values)?),
        "parent" => match values.as_slice() {
            [parent] => Directive::Parent(parent.to_string()),
            _ => {
                return Err(ImportError::Arity {
                    line,
                    key: key.to_string(),
                    expected: 1,
                    found: values.len(),
                })
            }
        },
        _ => {
            return Err(ImportError::UnknownKey {
                line,
                key: key.to_string(),
            })
        }
    };
    Ok(Some((name.to_string(), directive)))
}

fn parse_vec3(line: usize, key: &str, values: &[&str]) -> Result<Vector3<f32>, ImportError> {
    if values.len() != 3 {
        return Err(ImportError::Arity {
            line,
            key: key.to_string(),
            expected: 3,
            found: values.len(),
        });
    }
    let mut out = [0.0f32; 3];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.parse().map_err(|_| ImportError::NotANumber {
            line,
            value: value.to_string(),
        })?;
    }
    Ok(Vector3::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_accumulate_per_object() {
        let table = PlacementTable::parse(
            "# hat sits on the head\n\
             Hat loc 0 1.5 0\n\
             Hat scl 0.5 0.5 0.5\n\
             \n\
             Hat parent Chappy\n\
             Chappy rot 0 3.5 0\n",
        );
        assert_eq!(table.len(), 2);
        let hat = table.get("Hat").unwrap();
        assert_eq!(hat.placement.loc, Vector3::new(0.0, 1.5, 0.0));
        assert_eq!(hat.placement.rot, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(hat.placement.scl, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(hat.parent.as_deref(), Some("Chappy"));
        assert_eq!(table.resolve("Chappy").placement.rot.y, 3.5);
    }

    #[test]
    fn test_wrong_arity_drops_only_that_line() {
        let table = PlacementTable::parse("Hat loc 1 2\nHat rot 0 1 0\n");
        let hat = table.get("Hat").unwrap();
        assert_eq!(hat.placement.loc, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(hat.placement.rot, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_line_errors() {
        assert!(matches!(
            parse_line(3, "Hat loc 1 2 3 4"),
            Err(ImportError::Arity { line: 3, expected: 3, found: 4, .. })
        ));
        assert!(matches!(
            parse_line(1, "Hat scl 1 x 1"),
            Err(ImportError::NotANumber { line: 1, .. })
        ));
        assert!(matches!(
            parse_line(2, "Hat colour 1 1 1"),
            Err(ImportError::UnknownKey { line: 2, .. })
        ));
        assert!(matches!(parse_line(4, "Hat"), Err(ImportError::MissingKey { line: 4 })));
        assert!(matches!(
            parse_line(5, "Hat parent"),
            Err(ImportError::Arity { expected: 1, found: 0, .. })
        ));
        assert!(parse_line(6, "   # nothing").unwrap().is_none());
    }

    #[test]
    fn test_unknown_object_resolves_to_identity() {
        let table = PlacementTable::default();
        assert!(table.is_empty());
        assert_eq!(table.resolve("Nope"), ObjectPlacement::default());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = std::env::temp_dir().join("scenic-placement-does-not-exist.cfg");
        assert!(PlacementTable::load(&path).unwrap().is_empty());
    }
}
