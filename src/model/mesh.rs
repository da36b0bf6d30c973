use wgpu::util::DeviceExt;

use super::{IndexedMesh, ModelVertex, VertexLayout};

/// Immutable vertex/index buffer pair on the GPU.
///
/// The layout must match the vertex inputs of whatever pipeline is bound when
/// [`Mesh::draw`] runs; nothing here checks that.
pub struct Mesh {
    layout: VertexLayout,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        layout: &VertexLayout,
        vertex_data: &[f32],
        indices: &[u32],
    ) -> Self {
        debug_assert_eq!(
            vertex_data.len() % layout.floats_per_vertex().max(1),
            0,
            "vertex data does not divide into whole vertices"
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertex_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            layout: layout.clone(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
        }
    }

    /// Uploads `mesh` with the [`ModelVertex`] layout. The CPU copy is dropped afterwards.
    pub fn from_indexed(device: &wgpu::Device, name: &str, mesh: IndexedMesh) -> Self {
        log::info!(
            "Uploading mesh '{}': {} vertices, {} triangles",
            name,
            mesh.vertices().len(),
            mesh.triangle_count()
        );
        Self::new(device, name, &ModelVertex::layout(), mesh.vertex_data(), mesh.indices())
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn num_elements(&self) -> u32 {
        self.num_elements
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}
