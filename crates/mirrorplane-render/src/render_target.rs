//! Offscreen render target sizing and lifetime.
//!
//! The manager owns at most one target at a time. It reallocates only when
//! the clamped dimensions or the mip/depth flags change. The old target is
//! released as soon as its replacement exists, and stays untouched if the
//! replacement fails to allocate.

use std::sync::atomic::{AtomicU64, Ordering};

use mirrorplane_core::TextureHandle;

use crate::error::{RenderError, RenderResult};

/// Source of unique texture ids, shared by every manager so handles never
/// collide after a target migrates between managers.
static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Shape of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Whether the color buffer carries a full mip chain.
    pub mipmaps: bool,
    /// Whether a depth buffer is attached.
    pub depth: bool,
}

impl TargetDescriptor {
    /// Number of mip levels the color buffer needs.
    pub fn mip_level_count(&self) -> u32 {
        if self.mipmaps {
            32 - self.width.max(self.height).max(1).leading_zeros()
        } else {
            1
        }
    }
}

/// Inputs of a sizing decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRequest {
    /// Width of the source camera's output.
    pub source_width: u32,
    /// Height of the source camera's output.
    pub source_height: u32,
    /// Resolution scale relative to the source.
    pub scale: f32,
    /// Configured resolution cap.
    pub max_resolution: u32,
    /// Hardware texture-size ceiling.
    pub hardware_max: u32,
    /// Generate mipmaps.
    pub mipmaps: bool,
    /// Attach a depth buffer.
    pub depth: bool,
}

impl TargetRequest {
    /// Resolves the request into a concrete descriptor.
    pub fn descriptor(&self) -> TargetDescriptor {
        let (width, height) = target_dimensions(
            self.source_width,
            self.source_height,
            self.scale,
            self.max_resolution,
            self.hardware_max,
        );
        TargetDescriptor {
            width,
            height,
            mipmaps: self.mipmaps,
            depth: self.depth,
        }
    }
}

/// Computes `clamp(floor(source * scale), 1, min(max_resolution, hardware_max))`
/// for both axes.
pub fn target_dimensions(
    source_width: u32,
    source_height: u32,
    scale: f32,
    max_resolution: u32,
    hardware_max: u32,
) -> (u32, u32) {
    let ceiling = max_resolution.min(hardware_max).max(1);
    (
        scaled_extent(source_width, scale, ceiling),
        scaled_extent(source_height, scale, ceiling),
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn scaled_extent(source: u32, scale: f32, ceiling: u32) -> u32 {
    // Single precision, so decimal scales like 0.7 land on the whole texel.
    let scaled = (source as f32 * scale).floor();
    // Float-to-int casts saturate, and NaN maps to 0.
    (scaled as u32).clamp(1, ceiling)
}

/// Backend that creates and destroys the GPU objects behind a target.
pub trait TargetAllocator {
    /// Backend-specific resources (textures, views, sampler).
    type Target;

    /// Allocates resources for `descriptor`.
    fn allocate(&mut self, descriptor: &TargetDescriptor) -> RenderResult<Self::Target>;

    /// Destroys resources immediately.
    fn release(&mut self, target: Self::Target);

    /// Largest supported 2D texture dimension.
    fn max_texture_size(&self) -> u32;

    /// Called once the reflection camera has finished rendering into `target`.
    ///
    /// Backends fill derived data here, e.g. the lower mip levels.
    fn finish_frame(&mut self, _descriptor: &TargetDescriptor, _target: &Self::Target) {}
}

/// A live render target.
#[derive(Debug)]
pub struct RenderTarget<T> {
    descriptor: TargetDescriptor,
    handle: TextureHandle,
    resources: T,
}

impl<T> RenderTarget<T> {
    /// Returns the target's shape.
    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.descriptor
    }

    /// Returns the handle consumers sample through.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Returns the backend resources.
    pub fn resources(&self) -> &T {
        &self.resources
    }
}

/// Owns the reflection render target and decides when to reallocate it.
pub struct RenderTargetManager<A: TargetAllocator> {
    allocator: A,
    current: Option<RenderTarget<A::Target>>,
    allocations: u64,
}

impl<A: TargetAllocator> RenderTargetManager<A> {
    /// Creates a manager with no target.
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            current: None,
            allocations: 0,
        }
    }

    /// Returns the allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Returns the allocator mutably.
    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    /// Returns the current target, if any.
    pub fn current(&self) -> Option<&RenderTarget<A::Target>> {
        self.current.as_ref()
    }

    /// Returns the handle of the current target, if any.
    pub fn handle(&self) -> Option<TextureHandle> {
        self.current.as_ref().map(RenderTarget::handle)
    }

    /// Number of successful allocations made by this manager.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Makes sure a target matching `request` exists.
    ///
    /// Returns the existing target untouched when its shape already matches.
    /// On allocation failure the previous target stays in place.
    pub fn ensure_target(
        &mut self,
        request: &TargetRequest,
    ) -> RenderResult<&RenderTarget<A::Target>> {
        let descriptor = request.descriptor();
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: descriptor.width,
                height: descriptor.height,
            });
        }

        let matches = self
            .current
            .as_ref()
            .is_some_and(|target| target.descriptor == descriptor);
        if !matches {
            self.reallocate(descriptor, request)?;
        }

        self.current
            .as_ref()
            .ok_or_else(|| RenderError::TextureCreationFailed("no target after allocation".into()))
    }

    fn reallocate(
        &mut self,
        descriptor: TargetDescriptor,
        request: &TargetRequest,
    ) -> RenderResult<()> {
        // Allocate before releasing so a failure leaves the previous target intact.
        let resources = self.allocator.allocate(&descriptor)?;
        self.release();

        let handle = TextureHandle {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            width: descriptor.width,
            height: descriptor.height,
        };
        self.current = Some(RenderTarget {
            descriptor,
            handle,
            resources,
        });
        self.allocations += 1;
        log::info!(
            "reflection target {}x{} (source {}x{}, scale {}, cap {}, mipmaps {}, depth {})",
            descriptor.width,
            descriptor.height,
            request.source_width,
            request.source_height,
            request.scale,
            request.max_resolution,
            descriptor.mipmaps,
            descriptor.depth,
        );
        Ok(())
    }

    /// Lets the allocator post-process the current target after a render.
    ///
    /// Does nothing when no target exists.
    pub fn finish_frame(&mut self) {
        if let Some(target) = &self.current {
            self.allocator
                .finish_frame(&target.descriptor, &target.resources);
        }
    }

    /// Releases the current target immediately.
    pub fn release(&mut self) {
        if let Some(target) = self.current.take() {
            log::debug!(
                "releasing reflection target {}x{}",
                target.descriptor.width,
                target.descriptor.height
            );
            self.allocator.release(target.resources);
        }
    }

    /// Removes the current target without releasing it.
    pub fn take(&mut self) -> Option<RenderTarget<A::Target>> {
        self.current.take()
    }

    /// Installs a target taken from another manager, releasing any current one.
    pub fn install(&mut self, target: RenderTarget<A::Target>) {
        self.release();
        self.current = Some(target);
    }
}

impl<A: TargetAllocator> Drop for RenderTargetManager<A> {
    fn drop(&mut self) {
        self.release();
    }
}
