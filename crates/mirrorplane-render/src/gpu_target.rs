//! wgpu-backed reflection render targets.

use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};
use crate::mip_chain::MipChainPass;
use crate::render_target::{TargetAllocator, TargetDescriptor};

/// Color format of the reflection texture.
pub const REFLECTION_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Depth format of the reflection target.
pub const REFLECTION_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU resources of one reflection target.
pub struct GpuRenderTarget {
    /// Color texture the reflection camera renders into.
    pub color_texture: wgpu::Texture,
    /// View over the full mip chain, for sampling.
    pub color_view: wgpu::TextureView,
    /// View over mip 0, for use as a render attachment.
    pub attachment_view: wgpu::TextureView,
    /// Optional depth buffer.
    pub depth_texture: Option<wgpu::Texture>,
    /// View of the depth buffer.
    pub depth_view: Option<wgpu::TextureView>,
    /// Clamp-to-edge linear sampler consumers sample the reflection with.
    pub sampler: wgpu::Sampler,
}

/// Allocates reflection targets on a wgpu device.
pub struct WgpuTargetAllocator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    mip_chain: MipChainPass,
    label: String,
}

impl WgpuTargetAllocator {
    /// Creates an allocator; `label` prefixes every GPU object it creates.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, label: impl Into<String>) -> Self {
        let mip_chain = MipChainPass::new(&device, REFLECTION_COLOR_FORMAT);
        Self {
            device,
            queue,
            mip_chain,
            label: label.into(),
        }
    }

    /// Returns the device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns the queue mip generation is submitted on.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Records downsampling passes that fill every mip level below the base.
    ///
    /// Targets allocated without mipmaps record nothing.
    pub fn generate_mipmaps(&self, target: &GpuRenderTarget, encoder: &mut wgpu::CommandEncoder) {
        self.mip_chain
            .generate(&self.device, encoder, &target.color_texture);
    }

    fn create_color(&self, descriptor: &TargetDescriptor) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{}:PlanarReflection Color", self.label)),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: descriptor.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
    }

    fn create_depth(&self, descriptor: &TargetDescriptor) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{}:PlanarReflection Depth", self.label)),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    fn create_sampler(&self, descriptor: &TargetDescriptor) -> wgpu::Sampler {
        // Mirrored content must never wrap at the texture edges.
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{}:PlanarReflection Sampler", self.label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: if descriptor.mipmaps {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            ..Default::default()
        })
    }
}

impl TargetAllocator for WgpuTargetAllocator {
    type Target = GpuRenderTarget;

    fn allocate(&mut self, descriptor: &TargetDescriptor) -> RenderResult<GpuRenderTarget> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let color_texture = self.create_color(descriptor);
        let depth_texture = descriptor.depth.then(|| self.create_depth(descriptor));

        let validation = self.device.pop_error_scope().block_on();
        let out_of_memory = self.device.pop_error_scope().block_on();

        if out_of_memory.is_some() || validation.is_some() {
            color_texture.destroy();
            if let Some(depth) = &depth_texture {
                depth.destroy();
            }
            return Err(match validation {
                Some(err) if out_of_memory.is_none() => {
                    RenderError::TextureCreationFailed(err.to_string())
                }
                _ => RenderError::OutOfMemory,
            });
        }

        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let attachment_view = color_texture.create_view(&wgpu::TextureViewDescriptor {
            base_mip_level: 0,
            mip_level_count: Some(1),
            ..Default::default()
        });
        let depth_view = depth_texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));
        let sampler = self.create_sampler(descriptor);

        Ok(GpuRenderTarget {
            color_texture,
            color_view,
            attachment_view,
            depth_texture,
            depth_view,
            sampler,
        })
    }

    fn release(&mut self, target: GpuRenderTarget) {
        target.color_texture.destroy();
        if let Some(depth) = target.depth_texture {
            depth.destroy();
        }
    }

    fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn finish_frame(&mut self, descriptor: &TargetDescriptor, target: &GpuRenderTarget) {
        if !descriptor.mipmaps {
            return;
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("{}:PlanarReflection Mipmaps", self.label)),
            });
        self.generate_mipmaps(target, &mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
