use std::num::NonZeroU32;

use thiserror::Error;

use crate::frame::{Destination, Frame, TargetId};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderTargetError {
    #[error("render target size {width}x{height} has a zero dimension")]
    ZeroSize { width: u32, height: u32 },
    #[error("render target needs at least one color attachment")]
    NoColorAttachments,
}

/// Pixel size with both dimensions non-zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetSize {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width(),
            height: self.height(),
            depth_or_array_layers: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorAttachmentDescriptor {
    pub format: wgpu::TextureFormat,
    pub filter: wgpu::FilterMode,
    pub wrap: wgpu::AddressMode,
    pub clear_color: wgpu::Color,
}

impl Default for ColorAttachmentDescriptor {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            filter: wgpu::FilterMode::Linear,
            wrap: wgpu::AddressMode::ClampToEdge,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepthAttachmentDescriptor {
    pub format: wgpu::TextureFormat,
    pub clear_depth: f32,
}

impl Default for DepthAttachmentDescriptor {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Depth24PlusStencil8,
            clear_depth: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderTargetDescriptor {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub color: Vec<ColorAttachmentDescriptor>,
    pub depth: DepthAttachmentDescriptor,
}

impl RenderTargetDescriptor {
    /// One default color attachment plus a depth/stencil attachment.
    pub fn new(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            color: vec![ColorAttachmentDescriptor::default()],
            depth: DepthAttachmentDescriptor::default(),
        }
    }

    pub fn validate(&self) -> Result<TargetSize, RenderTargetError> {
        if self.color.is_empty() {
            return Err(RenderTargetError::NoColorAttachments);
        }
        TargetSize::new(self.width, self.height).ok_or(RenderTargetError::ZeroSize {
            width: self.width,
            height: self.height,
        })
    }
}

/// Read-only handle to one color output, for sampling in a later pass.
pub struct ColorAttachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl ColorAttachment {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

struct DepthAttachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Every attachment of a target at one size. Replaced as a whole on resize.
struct Attachments {
    size: TargetSize,
    generation: u64,
    colors: Vec<ColorAttachment>,
    depth: DepthAttachment,
}

impl Attachments {
    fn create(
        device: &wgpu::Device,
        descriptor: &RenderTargetDescriptor,
        size: TargetSize,
        generation: u64,
    ) -> Self {
        let colors = descriptor
            .color
            .iter()
            .enumerate()
            .map(|(index, color)| {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("{} Color {}", descriptor.label, index)),
                    size: size.extent(),
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: color.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some(&format!("{} Sampler {}", descriptor.label, index)),
                    address_mode_u: color.wrap,
                    address_mode_v: color.wrap,
                    address_mode_w: color.wrap,
                    mag_filter: color.filter,
                    min_filter: color.filter,
                    mipmap_filter: wgpu::FilterMode::Nearest,
                    ..Default::default()
                });
                ColorAttachment {
                    texture,
                    view,
                    sampler,
                }
            })
            .collect();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} Depth", descriptor.label)),
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.depth.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            size,
            generation,
            colors,
            depth: DepthAttachment { texture, view },
        }
    }
}

/// Offscreen surface with color and depth/stencil attachments.
///
/// The scene is drawn into it with [`RenderTarget::render`]; afterwards the
/// color output can be sampled through [`RenderTarget::color_attachment`].
/// `render` takes `&mut self`, so no attachment can be borrowed for sampling
/// while the target is still being drawn into.
pub struct RenderTarget {
    id: TargetId,
    descriptor: RenderTargetDescriptor,
    attachments: Attachments,
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<Self, RenderTargetError> {
        let size = descriptor.validate()?;
        log::debug!(
            "Creating render target '{}' at {}x{}",
            descriptor.label,
            size.width(),
            size.height()
        );

        Ok(Self {
            id: TargetId::next(),
            descriptor: descriptor.clone(),
            attachments: Attachments::create(device, descriptor, size, 0),
        })
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn size(&self) -> TargetSize {
        self.attachments.size
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.attachments.size.aspect_ratio()
    }

    /// Number of times the attachments have been (re)allocated after construction.
    pub fn generation(&self) -> u64 {
        self.attachments.generation
    }

    pub fn descriptor(&self) -> &RenderTargetDescriptor {
        &self.descriptor
    }

    /// Reallocates every attachment at `width` x `height`.
    ///
    /// A zero dimension cannot back a texture, so such requests leave the
    /// target untouched and return `false`.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let Some(size) = TargetSize::new(width, height) else {
            log::debug!(
                "Ignoring degenerate resize of '{}' to {}x{}",
                self.descriptor.label,
                width,
                height
            );
            return false;
        };

        let generation = self.attachments.generation + 1;
        self.attachments = Attachments::create(device, &self.descriptor, size, generation);
        self.descriptor.width = width;
        self.descriptor.height = height;
        log::debug!("Resized '{}' to {}x{}", self.descriptor.label, width, height);
        true
    }

    /// Records `body` into a render pass targeting this surface.
    ///
    /// The target is the frame's active destination for exactly the duration
    /// of the call; the previous destination is restored however `body` exits.
    pub fn render<R, E>(
        &mut self,
        frame: &mut Frame,
        body: impl FnOnce(&mut wgpu::RenderPass<'_>) -> Result<R, E>,
    ) -> Result<R, E> {
        let (encoder, _scope) = frame.bind(Destination::Offscreen(self.id));

        let color_attachments: Vec<_> = self
            .attachments
            .colors
            .iter()
            .zip(&self.descriptor.color)
            .map(|(attachment, descriptor)| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &attachment.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(descriptor.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })
            })
            .collect();

        let depth = &self.descriptor.depth;
        let stencil_ops = depth.format.has_stencil_aspect().then_some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(0),
            store: wgpu::StoreOp::Store,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.descriptor.label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.attachments.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(depth.clear_depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let result = body(&mut render_pass);
        drop(render_pass);
        result
    }

    pub fn color_attachment(&self, index: usize) -> Option<&ColorAttachment> {
        self.attachments.colors.get(index)
    }

    pub fn depth_size(&self) -> (u32, u32) {
        let texture = &self.attachments.depth.texture;
        (texture.width(), texture.height())
    }
}
