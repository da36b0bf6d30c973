use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{IndexedMesh, MeshError, ModelVertex};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("glTF import failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("invalid glTF mesh: {0}")]
    InvalidGltf(String),
    #[error(transparent)]
    InvalidMesh(#[from] MeshError),
}

/// Non-fatal diagnostic produced while parsing. Loading continues with the
/// default attribute policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: Option<usize>,
    pub message: String,
}

impl ParseWarning {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn general(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug)]
pub struct LoadedMesh {
    pub mesh: IndexedMesh,
    pub warnings: Vec<ParseWarning>,
}

fn parse_error(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    vertices: Vec<ModelVertex>,
    warnings: Vec<ParseWarning>,
    face_count: usize,
}

impl ObjData {
    fn parse_floats(line: usize, what: &str, tokens: &[&str]) -> Result<Vec<f32>, LoadError> {
        tokens
            .iter()
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|_| {
                        parse_error(line, format!("invalid {} component '{}'", what, token))
                    })
            })
            .collect()
    }

    fn process_position(&mut self, line: usize, args: &[&str]) -> Result<(), LoadError> {
        if args.len() < 3 {
            return Err(parse_error(line, "vertex position needs 3 components"));
        }
        // Anything past xyz (w, vertex colors) is not part of the vertex format.
        let v = Self::parse_floats(line, "position", &args[..3])?;
        self.positions.push([v[0], v[1], v[2]]);
        Ok(())
    }

    fn process_tex_coord(&mut self, line: usize, args: &[&str]) -> Result<(), LoadError> {
        if args.is_empty() {
            return Err(parse_error(line, "texture coordinate needs at least 1 component"));
        }
        let vt = Self::parse_floats(line, "texture coordinate", &args[..args.len().min(2)])?;
        let v = match vt.get(1) {
            Some(&v) => v,
            None => {
                self.warnings
                    .push(ParseWarning::at(line, "texture coordinate has no v component, using 0"));
                0.0
            }
        };
        self.tex_coords.push([vt[0], v]);
        Ok(())
    }

    fn process_normal(&mut self, line: usize, args: &[&str]) -> Result<(), LoadError> {
        if args.len() < 3 {
            return Err(parse_error(line, "normal needs 3 components"));
        }
        let n = Self::parse_floats(line, "normal", &args[..3])?;
        self.normals.push([n[0], n[1], n[2]]);
        Ok(())
    }

    /// Maps a 1-based (or negative, end-relative) OBJ reference to a 0-based slot.
    fn resolve_index(line: usize, what: &str, raw: &str, len: usize) -> Result<usize, LoadError> {
        let value: i64 = raw
            .parse()
            .map_err(|_| parse_error(line, format!("invalid {} index '{}'", what, raw)))?;
        let resolved = match value {
            0 => {
                return Err(parse_error(
                    line,
                    format!("{} index 0 is invalid, indices start at 1", what),
                ))
            }
            v if v > 0 => v - 1,
            v => len as i64 + v,
        };
        if resolved < 0 || resolved as usize >= len {
            return Err(parse_error(
                line,
                format!("{} index {} is out of range ({} defined)", what, value, len),
            ));
        }
        Ok(resolved as usize)
    }

    fn resolve_corner(
        &self,
        line: usize,
        reference: &str,
    ) -> Result<(ModelVertex, bool, bool), LoadError> {
        let mut parts = reference.split('/');

        let position_idx = match parts.next() {
            Some(raw) if !raw.is_empty() => {
                Self::resolve_index(line, "position", raw, self.positions.len())?
            }
            _ => {
                return Err(parse_error(
                    line,
                    format!("face reference '{}' has no position", reference),
                ))
            }
        };

        let tex_coords = match parts.next() {
            Some(raw) if !raw.is_empty() => {
                let idx =
                    Self::resolve_index(line, "texture coordinate", raw, self.tex_coords.len())?;
                Some(self.tex_coords[idx])
            }
            _ => None,
        };

        let normal = match parts.next() {
            Some(raw) if !raw.is_empty() => {
                let idx = Self::resolve_index(line, "normal", raw, self.normals.len())?;
                Some(self.normals[idx])
            }
            _ => None,
        };

        if parts.next().is_some() {
            return Err(parse_error(
                line,
                format!("face reference '{}' has too many components", reference),
            ));
        }

        let missing_tex = tex_coords.is_none() && !self.tex_coords.is_empty();
        let missing_normal = normal.is_none() && !self.normals.is_empty();
        Ok((
            ModelVertex::new(self.positions[position_idx], tex_coords, normal),
            missing_tex,
            missing_normal,
        ))
    }

    fn process_face(&mut self, line: usize, references: &[&str]) -> Result<(), LoadError> {
        if references.len() < 3 {
            return Err(parse_error(
                line,
                format!("face needs at least 3 vertices, found {}", references.len()),
            ));
        }

        let mut corners = Vec::with_capacity(references.len());
        let mut missing_tex = false;
        let mut missing_normal = false;
        for reference in references {
            let (vertex, no_tex, no_normal) = self.resolve_corner(line, reference)?;
            missing_tex |= no_tex;
            missing_normal |= no_normal;
            corners.push(vertex);
        }

        if missing_tex {
            self.warnings.push(ParseWarning::at(
                line,
                "face vertex without texture coordinate, defaulting to (0, 0)",
            ));
        }
        if missing_normal {
            self.warnings.push(ParseWarning::at(
                line,
                "face vertex without normal, defaulting to (0, 0, 1)",
            ));
        }
        if corners.len() > 3 {
            self.warnings.push(ParseWarning::at(
                line,
                format!("{}-sided face fan-triangulated", corners.len()),
            ));
        }

        // Every triangle corner becomes its own vertex; nothing is shared.
        for i in 1..corners.len() - 1 {
            self.vertices.push(corners[0]);
            self.vertices.push(corners[i]);
            self.vertices.push(corners[i + 1]);
        }
        self.face_count += 1;

        Ok(())
    }

    fn process_line(&mut self, line: usize, text: &str) -> Result<(), LoadError> {
        let text = match text.find('#') {
            Some(comment) => &text[..comment],
            None => text,
        };
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((&directive, args)) = tokens.split_first() else {
            return Ok(());
        };

        match directive {
            "v" => self.process_position(line, args),
            "vt" => self.process_tex_coord(line, args),
            "vn" => self.process_normal(line, args),
            "f" => self.process_face(line, args),
            "o" | "g" | "s" | "mtllib" | "usemtl" => Ok(()),
            other => {
                self.warnings.push(ParseWarning::at(
                    line,
                    format!("ignoring unsupported directive '{}'", other),
                ));
                Ok(())
            }
        }
    }
}

/// Turns mesh description files into [`IndexedMesh`] values.
pub struct ModelLoader;

impl ModelLoader {
    /// Loads a mesh, logging any parse warnings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<IndexedMesh, LoadError> {
        let path = path.as_ref();
        let loaded = Self::load_with_warnings(path)?;
        for warning in &loaded.warnings {
            log::warn!("{}: {}", path.display(), warning);
        }
        log::info!(
            "Loaded {}: {} vertices, {} triangles",
            path.display(),
            loaded.mesh.vertices().len(),
            loaded.mesh.triangle_count()
        );
        if let Some((min, max)) = loaded.mesh.bounds() {
            log::debug!("{} bounds: {:?} to {:?}", path.display(), min, max);
        }
        Ok(loaded.mesh)
    }

    pub fn load_with_warnings<P: AsRef<Path>>(path: P) -> Result<LoadedMesh, LoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "obj" => {
                let bytes = fs::read(path).map_err(|source| LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                // Names and comments are often Latin-1; only the numeric data has to be ASCII.
                let source = String::from_utf8_lossy(&bytes);
                let mut loaded = Self::parse_obj(&source)?;
                if let Cow::Owned(_) = source {
                    loaded.warnings.insert(
                        0,
                        ParseWarning::general(
                            "file is not valid UTF-8, invalid bytes were replaced",
                        ),
                    );
                }
                Ok(loaded)
            }
            "glb" | "gltf" => Self::load_gltf(path),
            _ => Err(LoadError::UnsupportedFormat(extension.to_string())),
        }
    }

    pub fn parse_obj(source: &str) -> Result<LoadedMesh, LoadError> {
        let mut obj_data = ObjData::default();
        let mut line_count = 0;

        for (number, text) in source.lines().enumerate() {
            line_count = number + 1;
            obj_data.process_line(line_count, text)?;
        }

        if obj_data.face_count == 0 {
            return Err(parse_error(line_count, "file contains no faces"));
        }

        Ok(LoadedMesh {
            mesh: IndexedMesh::from_unshared(obj_data.vertices)?,
            warnings: obj_data.warnings,
        })
    }

    fn load_gltf(path: &Path) -> Result<LoadedMesh, LoadError> {
        let (document, buffers, _images) = gltf::import(path)?;
        let mut vertices = Vec::new();
        let mut warnings = Vec::new();

        for mesh in document.meshes() {
            let name = mesh.name().unwrap_or("unnamed");
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    warnings.push(ParseWarning::general(format!(
                        "skipping {:?} primitive in mesh '{}'",
                        primitive.mode(),
                        name
                    )));
                    continue;
                }

                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        LoadError::InvalidGltf(format!("mesh '{}' has no position data", name))
                    })?
                    .collect();
                let tex_coords: Option<Vec<[f32; 2]>> =
                    reader.read_tex_coords(0).map(|iter| iter.into_f32().collect());
                let normals: Option<Vec<[f32; 3]>> =
                    reader.read_normals().map(|iter| iter.collect());
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|iter| iter.into_u32().collect())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());

                if indices.len() % 3 != 0 {
                    return Err(LoadError::InvalidGltf(format!(
                        "mesh '{}' has {} indices, not a whole number of triangles",
                        name,
                        indices.len()
                    )));
                }

                // Expand the index buffer so each corner is a fresh vertex, as for OBJ.
                for index in indices {
                    let i = index as usize;
                    let position = *positions.get(i).ok_or_else(|| {
                        LoadError::InvalidGltf(format!(
                            "mesh '{}' references vertex {} of {}",
                            name,
                            i,
                            positions.len()
                        ))
                    })?;
                    vertices.push(ModelVertex::new(
                        position,
                        tex_coords.as_ref().and_then(|t| t.get(i).copied()),
                        normals.as_ref().and_then(|n| n.get(i).copied()),
                    ));
                }
            }
        }

        if vertices.is_empty() {
            return Err(LoadError::InvalidGltf("no triangle primitives found".to_string()));
        }

        Ok(LoadedMesh {
            mesh: IndexedMesh::from_unshared(vertices)?,
            warnings,
        })
    }
}
