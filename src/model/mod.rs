mod indexed;
mod loader;
mod mesh;
mod texture;
mod vertex;

pub use indexed::{IndexedMesh, MeshError};
pub use loader::{LoadError, LoadedMesh, ModelLoader, ParseWarning};
pub use mesh::Mesh;
pub use texture::{Texture, TextureOptions};
pub use vertex::{ModelVertex, VertexAttribute, VertexLayout};

#[cfg(test)]
mod tests;
