//! Drives an ocean system against a small in-memory scene for a few frames.
//!
//! Run with `RUST_LOG=debug cargo run --example ocean_demo` to see the
//! lifecycle and resize logging.

use std::collections::HashMap;

use mirrorplane::*;

#[derive(Default)]
struct DemoScene {
    names: HashMap<String, EntityId>,
    cameras: HashMap<EntityId, (SourceCameraState, Vec<LayerId>)>,
    layers: Vec<(String, LayerId)>,
    surface_layers: HashMap<EntityId, Vec<LayerId>>,
    subscriptions: Vec<(SubscriptionId, EntityId)>,
    next_id: u32,
}

impl DemoScene {
    fn entity(&mut self, name: &str) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.names.insert(name.to_string(), id);
        id
    }

    fn camera(&mut self, name: &str, state: SourceCameraState) -> EntityId {
        let id = self.entity(name);
        self.cameras.insert(id, (state, Vec::new()));
        id
    }

    fn new_layer(&mut self, name: &str) -> (String, LayerId) {
        self.next_id += 1;
        (name.to_string(), LayerId(self.next_id))
    }

    /// Cameras subscribed to render-complete, in render order.
    fn render_order(&self) -> Vec<EntityId> {
        self.subscriptions
            .iter()
            .map(|(_, camera)| *camera)
            .collect()
    }
}

impl CameraHost for DemoScene {
    fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    fn has_camera(&self, entity: EntityId) -> bool {
        self.cameras.contains_key(&entity)
    }

    fn camera_state(&self, entity: EntityId) -> Option<SourceCameraState> {
        self.cameras.get(&entity).map(|(state, _)| *state)
    }

    fn camera_enabled(&self, entity: EntityId) -> bool {
        self.cameras.contains_key(&entity)
    }

    fn apply_reflection_camera(&mut self, entity: EntityId, state: &ReflectionCameraState) {
        println!(
            "  camera {entity:?}: position {:.2}, forward {:.2}, target {:?}",
            state.position,
            state.forward(),
            state.target.map(|t| (t.width, t.height))
        );
    }

    fn camera_layers(&self, entity: EntityId) -> Vec<LayerId> {
        self.cameras
            .get(&entity)
            .map(|(_, layers)| layers.clone())
            .unwrap_or_default()
    }

    fn set_camera_layers(&mut self, entity: EntityId, layers: &[LayerId]) {
        if let Some((_, current)) = self.cameras.get_mut(&entity) {
            *current = layers.to_vec();
        }
    }

    fn subscribe_render_complete(&mut self, camera: EntityId) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(u64::from(self.next_id));
        self.subscriptions.push((id, camera));
        id
    }

    fn unsubscribe_render_complete(&mut self, subscription: SubscriptionId) {
        self.subscriptions.retain(|(id, _)| *id != subscription);
    }
}

impl LayerRegistry for DemoScene {
    fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    fn transparent_index(&self, layer: LayerId) -> Option<usize> {
        self.layers.iter().position(|(_, id)| *id == layer)
    }

    fn insert_layer(&mut self, name: &str, index: usize) -> LayerId {
        let layer = self.new_layer(name);
        let id = layer.1;
        self.layers.insert(index.min(self.layers.len()), layer);
        id
    }

    fn push_layer(&mut self, name: &str) -> LayerId {
        let layer = self.new_layer(name);
        let id = layer.1;
        self.layers.push(layer);
        id
    }
}

impl MaterialHost for DemoScene {
    fn surface_layers(&self, surface: EntityId) -> Vec<LayerId> {
        self.surface_layers
            .get(&surface)
            .cloned()
            .unwrap_or_default()
    }

    fn set_surface_layers(&mut self, surface: EntityId, layers: &[LayerId]) {
        self.surface_layers.insert(surface, layers.to_vec());
    }

    fn set_material_parameter(&mut self, surface: EntityId, name: &str, value: ParameterValue) {
        if name == "uDiffuseMap" {
            println!("  surface {surface:?}: {name} = {value:?}");
        }
    }
}

/// Stands in for GPU memory.
struct MemoryAllocator;

impl TargetAllocator for MemoryAllocator {
    type Target = Vec<u8>;

    fn allocate(&mut self, descriptor: &TargetDescriptor) -> RenderResult<Vec<u8>> {
        let len = descriptor.width as usize * descriptor.height as usize * 4;
        Ok(vec![0; len])
    }

    fn release(&mut self, _target: Vec<u8>) {}

    fn max_texture_size(&self) -> u32 {
        8192
    }
}

fn main() -> Result<()> {
    init_logging();

    let mut scene = DemoScene::default();
    for name in ["World", "Depth", "Skybox", "UI"] {
        scene.push_layer(name);
    }
    let main_camera = scene.camera(
        "Camera",
        SourceCameraState::looking_at(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::ZERO,
            UVec2::new(1920, 1080),
        ),
    );
    let all_layers: Vec<LayerId> = scene.layers.iter().map(|(_, id)| *id).collect();
    scene.set_camera_layers(main_camera, &all_layers);
    let reflection_camera = scene.camera(
        "Reflection",
        SourceCameraState::looking_at(Vec3::ZERO, Vec3::NEG_Z, UVec2::ONE),
    );
    let water = scene.entity("Ocean");

    let options = OceanSystemOptions {
        material: OceanMaterialOptions {
            wave_speed: 1.5,
            wave_scale: 0.02,
            vertex_wave_height: 0.3,
            ..OceanMaterialOptions::default()
        },
        ..OceanSystemOptions::default()
    };
    let mut ocean = OceanSystem::new(options, reflection_camera, MemoryAllocator);
    ocean.add_consumer(&mut scene, water)?;
    ocean.setup(&mut scene)?;
    ocean.renderer_mut().subscribe_post_render(|texture| {
        println!("  reflection pass done: {texture:?}");
    });

    let layer_names: Vec<&str> = scene.layers.iter().map(|(n, _)| n.as_str()).collect();
    println!("layers: {layer_names:?}");

    for frame in 0..4 {
        println!("frame {frame}");
        if frame == 2 {
            // Move the camera and shrink the reflection.
            if let Some((state, _)) = scene.cameras.get_mut(&main_camera) {
                *state = SourceCameraState::looking_at(
                    Vec3::new(3.0, 2.0, 6.0),
                    Vec3::new(0.0, 0.5, 0.0),
                    UVec2::new(1280, 720),
                );
            }
            ocean.update_reflection_settings(&mut scene, 0.25, "World,Skybox", Vec3::ZERO)?;
        }
        ocean.tick(&mut scene, 1.0 / 60.0);
        for camera in scene.render_order() {
            ocean.on_camera_rendered(camera);
        }
    }

    ocean.teardown(&mut scene);
    Ok(())
}
