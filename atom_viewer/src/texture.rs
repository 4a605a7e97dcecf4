//! Cube textures loaded from image files, cached by name

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Size in texels of the generated fallback texture
pub const FALLBACK_SIZE: u32 = 64;
const FALLBACK_CELLS: u32 = 8;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Texture names must be bare file names inside the textures directory
pub fn is_bare_file_name(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}

/// `name` resolved inside `textures_dir`, `None` when it would escape it
pub fn texture_path(textures_dir: &Path, name: &str) -> Option<PathBuf> {
    is_bare_file_name(name).then(|| textures_dir.join(name))
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let label = path.display().to_string();
        Ok(Self::from_rgba(device, queue, &label, width, height, &image))
    }

    /// Two-tone checkerboard for textures that could not be loaded
    pub fn fallback(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let pixels = checkerboard(FALLBACK_SIZE, FALLBACK_CELLS);
        Self::from_rgba(device, queue, "Fallback Texture", FALLBACK_SIZE, FALLBACK_SIZE, &pixels)
    }

    /// `pixels` is tightly packed RGBA8
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
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
            label: Some("Cube Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
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

/// RGBA8 checkerboard of `size` x `size` texels split into `cells` squares per side
pub fn checkerboard(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let shade = if light { [200, 200, 210, 255] } else { [60, 60, 80, 255] };
            pixels.extend_from_slice(&shade);
        }
    }
    pixels
}

/// Bind groups for textures under one directory, loaded on first use
pub struct TextureCache {
    layout: wgpu::BindGroupLayout,
    textures_dir: PathBuf,
    bind_groups: HashMap<String, wgpu::BindGroup>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, textures_dir: impl Into<PathBuf>) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            layout,
            textures_dir: textures_dir.into(),
            bind_groups: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// A missing file is logged once and cached as the fallback texture
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
    ) -> &wgpu::BindGroup {
        if !self.bind_groups.contains_key(name) {
            let texture = match texture_path(&self.textures_dir, name) {
                Some(path) => match Texture::from_file(device, queue, &path) {
                    Ok(texture) => {
                        log::info!("Loaded texture {}", path.display());
                        texture
                    }
                    Err(err) => {
                        log::warn!("{}, using fallback", err);
                        Texture::fallback(device, queue)
                    }
                },
                None => {
                    log::warn!(
                        "texture `{}` is outside {}, using fallback",
                        name,
                        self.textures_dir.display()
                    );
                    Texture::fallback(device, queue)
                }
            };
            let bind_group = self.bind_group(device, name, &texture);
            self.bind_groups.insert(name.to_string(), bind_group);
        }
        &self.bind_groups[name]
    }

    fn bind_group(&self, device: &wgpu::Device, name: &str, texture: &Texture) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}
