use thiserror::Error;

use super::ModelVertex;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MeshError {
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

/// CPU-side triangle list: vertices plus indices into them, three per triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedMesh {
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn new(vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(indices.len()));
        }
        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= vertices.len())
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                index,
                vertex_count: vertices.len(),
            });
        }

        Ok(Self { vertices, indices })
    }

    /// Builds a mesh where every vertex is used exactly once, in order.
    pub fn from_unshared(vertices: Vec<ModelVertex>) -> Result<Self, MeshError> {
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices)
    }

    /// Unit cube centred on the origin, positions only.
    pub fn cube() -> Self {
        const CORNERS: [[f32; 3]; 8] = [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];
        const INDICES: [u32; 36] = [
            0, 1, 2, 2, 3, 0, // back
            4, 5, 6, 6, 7, 4, // front
            3, 2, 6, 6, 7, 3, // top
            4, 5, 1, 1, 0, 4, // bottom
            4, 0, 3, 3, 7, 4, // left
            1, 5, 6, 6, 2, 1, // right
        ];

        Self {
            vertices: CORNERS
                .iter()
                .map(|&position| ModelVertex::new(position, None, None))
                .collect(),
            indices: INDICES.to_vec(),
        }
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as interleaved floats, matching [`ModelVertex::layout`].
    pub fn vertex_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        let bounds = self.vertices.iter().fold((first, first), |(mut min, mut max), vertex| {
            for i in 0..3 {
                min[i] = min[i].min(vertex.position[i]);
                max[i] = max[i].max(vertex.position[i]);
            }
            (min, max)
        });
        Some(bounds)
    }
}
