//! OBJ mesh import
//!
//! Only vertex records (`v x y z`) matter: every vertex becomes one point.
//! Faces, normals, texture coordinates, groups and materials are ignored.
//!
//! Axis mapping: the mesh's `x` and `-z` become the scene's horizontal
//! `(x, z)` and the mesh's `y` becomes the element's vertical offset, all
//! multiplied by the import scale.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{FxError, Result};
use crate::scene::{Element, ElementKind, ElementSource, Layer};

/// Keep one vertex in this many when importing in performance mode.
pub const PERFORMANCE_STRIDE: usize = 4;

/// Vertices of a parsed OBJ file, ready to be turned into elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjImport {
    vertices: Vec<[f64; 3]>,
    scale: f64,
    performance: bool,
    label: String,
}

impl ObjImport {
    /// Read and parse an OBJ file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|e| FxError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut import = Self::parse(&contents)?;
        if let Some(name) = path.file_name() {
            import.label = format!("Import {}", name.to_string_lossy());
        }
        debug!(path = %path.display(), vertices = import.vertices.len(), "OBJ parsed");
        Ok(import)
    }

    /// Parse OBJ text. Malformed vertex records fail with their line number.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut vertices = Vec::new();

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts[0] != "v" {
                continue;
            }
            if parts.len() < 4 {
                return Err(FxError::ObjParse {
                    line: line_num + 1,
                    reason: "vertex needs 3 coordinates".to_string(),
                });
            }

            let x = parse_coord(parts[1], line_num)?;
            let y = parse_coord(parts[2], line_num)?;
            let z = parse_coord(parts[3], line_num)?;
            vertices.push([x, y, z]);
        }

        Ok(Self {
            vertices,
            scale: 1.0,
            performance: false,
            label: "Import OBJ".to_string(),
        })
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_performance(mut self, performance: bool) -> Self {
        self.performance = performance;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

fn parse_coord(raw: &str, line_num: usize) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FxError::ObjParse {
            line: line_num + 1,
            reason: format!("invalid coordinate '{}'", raw),
        }),
    }
}

impl ElementSource for ObjImport {
    fn elements(&self, layer: &Layer) -> Result<Vec<Element>> {
        let stride = if self.performance { PERFORMANCE_STRIDE } else { 1 };
        let s = self.scale;

        Ok(self
            .vertices
            .iter()
            .step_by(stride)
            .map(|&[x, y, z]| {
                Element::new(ElementKind::Obj, (x * s, -z * s))
                    .with_y_offset(y * s)
                    .with_ticks(layer.tick_start, layer.tick_end)
            })
            .collect())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
