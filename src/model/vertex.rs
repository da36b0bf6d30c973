#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl ModelVertex {
    /// Texture coordinate given to vertices whose source has none.
    pub const DEFAULT_TEX_COORDS: [f32; 2] = [0.0, 0.0];
    /// Forward-facing normal given to vertices whose source has none.
    pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

    pub fn new(position: [f32; 3], tex_coords: Option<[f32; 2]>, normal: Option<[f32; 3]>) -> Self {
        Self {
            position,
            tex_coords: tex_coords.unwrap_or(Self::DEFAULT_TEX_COORDS),
            normal: normal.unwrap_or(Self::DEFAULT_NORMAL),
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            VertexAttribute::Position3D(0),
            VertexAttribute::TexCoord(1),
            VertexAttribute::Normal3D(2),
        ])
    }
}

/// One float attribute inside an interleaved vertex, tagged with its shader location.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexAttribute {
    Position2D(u32),
    Position3D(u32),
    TexCoord(u32),
    Normal3D(u32),
}

impl VertexAttribute {
    pub fn location(&self) -> u32 {
        match *self {
            Self::Position2D(location)
            | Self::Position3D(location)
            | Self::TexCoord(location)
            | Self::Normal3D(location) => location,
        }
    }

    pub fn float_count(&self) -> usize {
        match self {
            Self::Position2D(_) | Self::TexCoord(_) => 2,
            Self::Position3D(_) | Self::Normal3D(_) => 3,
        }
    }

    fn format(&self) -> wgpu::VertexFormat {
        match self.float_count() {
            2 => wgpu::VertexFormat::Float32x2,
            _ => wgpu::VertexFormat::Float32x3,
        }
    }
}

/// Interleaved `f32` vertex layout. Attributes are packed in the order given.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexLayout {
    attributes: Vec<wgpu::VertexAttribute>,
    floats_per_vertex: usize,
}

impl VertexLayout {
    pub fn new(attributes: &[VertexAttribute]) -> Self {
        let mut offset = 0usize;
        let attributes = attributes
            .iter()
            .map(|attribute| {
                let wgpu_attribute = wgpu::VertexAttribute {
                    format: attribute.format(),
                    offset: (offset * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                    shader_location: attribute.location(),
                };
                offset += attribute.float_count();
                wgpu_attribute
            })
            .collect();

        Self {
            attributes,
            floats_per_vertex: offset,
        }
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.floats_per_vertex
    }

    pub fn stride(&self) -> wgpu::BufferAddress {
        (self.floats_per_vertex * std::mem::size_of::<f32>()) as wgpu::BufferAddress
    }

    pub fn attributes(&self) -> &[wgpu::VertexAttribute] {
        &self.attributes
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}
