//! Headless GPU tests for the wgpu reflection targets and shaders.
//!
//! These tests need a GPU adapter (real or software fallback). Without one
//! they print a note and return early; skip them explicitly with
//! `cargo test -- --skip headless`.

use mirrorplane_render::*;
use pollster::FutureExt;

fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let Some(adapter) = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .block_on()
    else {
        eprintln!("Skipping headless tests: no GPU adapter available");
        return None;
    };

    let device = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("mirrorplane device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        )
        .block_on();
    match device {
        Ok(pair) => Some(pair),
        Err(e) => {
            eprintln!("Skipping headless tests: device request failed ({e})");
            None
        }
    }
}

fn allocator() -> Option<WgpuTargetAllocator> {
    let (device, queue) = headless_device()?;
    Some(WgpuTargetAllocator::new(device, queue, "headless"))
}

#[test]
fn headless_allocates_mipmapped_target_with_depth() {
    let Some(mut allocator) = allocator() else {
        return;
    };
    let descriptor = TargetDescriptor {
        width: 256,
        height: 128,
        mipmaps: true,
        depth: true,
    };

    let target = allocator.allocate(&descriptor).unwrap();
    assert_eq!(target.color_texture.format(), REFLECTION_COLOR_FORMAT);
    assert_eq!(target.color_texture.width(), 256);
    assert_eq!(target.color_texture.height(), 128);
    assert_eq!(target.color_texture.mip_level_count(), 9);
    let usage = target.color_texture.usage();
    assert!(usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
    assert!(usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));

    let depth = target.depth_texture.as_ref().expect("depth requested");
    assert_eq!(depth.format(), REFLECTION_DEPTH_FORMAT);
    assert_eq!((depth.width(), depth.height()), (256, 128));
    assert!(target.depth_view.is_some());

    allocator.release(target);
}

#[test]
fn headless_allocates_plain_target_without_depth() {
    let Some(mut allocator) = allocator() else {
        return;
    };
    let descriptor = TargetDescriptor {
        width: 300,
        height: 200,
        mipmaps: false,
        depth: false,
    };

    let target = allocator.allocate(&descriptor).unwrap();
    assert_eq!(target.color_texture.mip_level_count(), 1);
    assert!(target.depth_texture.is_none());
    assert!(target.depth_view.is_none());
    allocator.release(target);
}

#[test]
fn headless_mip_chain_generation_is_valid() {
    let Some(allocator) = allocator() else {
        return;
    };
    let hardware_max = allocator.max_texture_size();
    let mut manager = RenderTargetManager::new(allocator);
    let request = TargetRequest {
        source_width: 640,
        source_height: 480,
        scale: 0.5,
        max_resolution: 1024,
        hardware_max,
        mipmaps: true,
        depth: true,
    };

    manager
        .allocator()
        .device()
        .push_error_scope(wgpu::ErrorFilter::Validation);
    let target = manager.ensure_target(&request).unwrap();
    assert_eq!(
        (target.descriptor().width, target.descriptor().height),
        (320, 240)
    );
    assert_eq!(target.resources().color_texture.mip_level_count(), 9);

    manager.finish_frame();
    let device = manager.allocator().device();
    let _ = device.poll(wgpu::Maintain::Wait);
    let error = device.pop_error_scope().block_on();
    assert!(error.is_none(), "mip generation failed: {error:?}");

    manager.release();
    assert!(manager.current().is_none());
}

#[test]
fn headless_shaders_compile() {
    let Some((device, _queue)) = headless_device() else {
        return;
    };

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let _ocean = create_ocean_shader_module(&device);
    let _mip_chain = MipChainPass::new(&device, REFLECTION_COLOR_FORMAT);
    let error = device.pop_error_scope().block_on();
    assert!(error.is_none(), "shader validation failed: {error:?}");
}
