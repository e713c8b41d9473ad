use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image '{label}': {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image '{label}' is {width}x{height}, limit is {max}")]
    TooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("image '{label}' has zero size")]
    Empty { label: String },
    #[error("image '{label}' has {actual} bytes, expected {expected}")]
    DataSize {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// A sampled 2D RGBA texture. Sampling is nearest-neighbour so pixel art
/// stays crisp under camera zoom.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

impl Texture {
    /// Decode an encoded image (PNG) and upload it.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            label: label.to_string(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(device, queue, &rgba, width, height, label)
    }

    /// Upload tightly packed RGBA8 pixels. Sizes the device cannot hold are
    /// rejected before any GPU object is created.

    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Result<Self, TextureError> {
        let max = device.limits().max_texture_dimension_2d;
        check_upload(rgba.len(), width, height, max, label)?;
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            size: (width, height),
        })
    }
}

fn check_upload(
    len: usize,
    width: u32,
    height: u32,
    max: u32,
    label: &str,
) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::Empty {
            label: label.to_string(),
        });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge {
            label: label.to_string(),
            width,
            height,
            max,
        });
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(TextureError::DataSize {
            label: label.to_string(),
            expected,
            actual: len,
        });
    }
    Ok(())
}
