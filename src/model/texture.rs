use std::path::Path;

use anyhow::{Context, Result};

/// How an image is decoded and sampled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureOptions {
    /// Flip rows on load so that v = 0 is the bottom of the image, as OBJ texture
    /// coordinates expect.
    pub flip_y: bool,
    pub format: wgpu::TextureFormat,
    pub filter: wgpu::FilterMode,
    pub wrap: wgpu::AddressMode,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_y: true,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            filter: wgpu::FilterMode::Linear,
            wrap: wgpu::AddressMode::Repeat,
        }
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        options: &TextureOptions,
    ) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?;
        let img = if options.flip_y { img.flipv() } else { img };
        let rgba = img.to_rgba8();
        log::info!("Loaded texture {} ({}x{})", path.display(), rgba.width(), rgba.height());

        let label = path.file_name().and_then(|name| name.to_str());
        Ok(Self::from_rgba8(
            device,
            queue,
            label,
            rgba.width(),
            rgba.height(),
            rgba.as_raw(),
            options,
        ))
    }

    /// 1x1 opaque white texture, used when a scene has no image bound.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(
            device,
            queue,
            Some("Default Texture"),
            1,
            1,
            &[255, 255, 255, 255],
            &TextureOptions::default(),
        )
    }

    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: Option<&str>,
        width: u32,
        height: u32,
        pixels: &[u8],
        options: &TextureOptions,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: options.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: options.wrap,
            address_mode_v: options.wrap,
            address_mode_w: options.wrap,
            mag_filter: options.filter,
            min_filter: options.filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
