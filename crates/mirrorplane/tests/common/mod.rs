//! In-memory host and allocator shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mirrorplane::*;

pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct MockCamera {
    pub state: SourceCameraState,
    pub enabled: bool,
    pub layers: Vec<LayerId>,
    pub applied: Option<ReflectionCameraState>,
    pub applied_count: usize,
}

/// Scene with named entities, cameras, ordered layers and surface materials.
#[derive(Debug, Default)]
pub struct MockScene {
    names: HashMap<String, EntityId>,
    next_entity: u32,
    pub cameras: HashMap<EntityId, MockCamera>,
    layers: Vec<(String, LayerId)>,
    next_layer: u32,
    pub subscriptions: HashMap<SubscriptionId, EntityId>,
    next_subscription: u64,
    pub surface_layers: HashMap<EntityId, Vec<LayerId>>,
    pub params: HashMap<(EntityId, String), ParameterValue>,
}

impl MockScene {
    /// Scene with "World", "Depth", "Skybox" and "UI" layers.
    pub fn with_default_layers() -> Self {
        let mut scene = Self::default();
        for name in ["World", "Depth", "Skybox", "UI"] {
            scene.push_layer(name);
        }
        scene
    }

    pub fn add_entity(&mut self, name: &str) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn add_camera(&mut self, name: &str, state: SourceCameraState) -> EntityId {
        let id = self.add_entity(name);
        self.cameras.insert(
            id,
            MockCamera {
                state,
                enabled: true,
                layers: Vec::new(),
                applied: None,
                applied_count: 0,
            },
        );
        id
    }

    /// Main camera at (0, 5, 0) looking down -Z, rendering 1920x1080.
    pub fn add_main_camera(&mut self) -> EntityId {
        let state = SourceCameraState::looking_at(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 5.0, -1.0),
            UVec2::new(1920, 1080),
        );
        let id = self.add_camera("Camera", state);
        let layers: Vec<LayerId> = ["World", "Depth", "Skybox", "UI"]
            .iter()
            .filter_map(|name| self.layer_by_name(name))
            .collect();
        self.set_camera_layers(id, &layers);
        id
    }

    pub fn add_surface(&mut self, name: &str) -> EntityId {
        let id = self.add_entity(name);
        let world = self.layer_by_name("World").into_iter().collect();
        self.surface_layers.insert(id, world);
        id
    }

    pub fn camera_mut(&mut self, entity: EntityId) -> &mut MockCamera {
        self.cameras.get_mut(&entity).expect("no such camera")
    }

    pub fn applied(&self, entity: EntityId) -> &ReflectionCameraState {
        self.cameras[&entity].applied.as_ref().expect("nothing applied")
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn param(&self, surface: EntityId, name: &str) -> Option<&ParameterValue> {
        self.params.get(&(surface, name.to_string()))
    }

    pub fn subscribers_of(&self, camera: EntityId) -> usize {
        self.subscriptions
            .values()
            .filter(|c| **c == camera)
            .count()
    }

    fn new_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        id
    }
}

impl CameraHost for MockScene {
    fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    fn has_camera(&self, entity: EntityId) -> bool {
        self.cameras.contains_key(&entity)
    }

    fn camera_state(&self, entity: EntityId) -> Option<SourceCameraState> {
        self.cameras.get(&entity).map(|c| c.state)
    }

    fn camera_enabled(&self, entity: EntityId) -> bool {
        self.cameras.get(&entity).is_some_and(|c| c.enabled)
    }

    fn apply_reflection_camera(&mut self, entity: EntityId, state: &ReflectionCameraState) {
        if let Some(camera) = self.cameras.get_mut(&entity) {
            camera.applied = Some(state.clone());
            camera.applied_count += 1;
        }
    }

    fn camera_layers(&self, entity: EntityId) -> Vec<LayerId> {
        self.cameras
            .get(&entity)
            .map(|c| c.layers.clone())
            .unwrap_or_default()
    }

    fn set_camera_layers(&mut self, entity: EntityId, layers: &[LayerId]) {
        if let Some(camera) = self.cameras.get_mut(&entity) {
            camera.layers = layers.to_vec();
        }
    }

    fn subscribe_render_complete(&mut self, camera: EntityId) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, camera);
        id
    }

    fn unsubscribe_render_complete(&mut self, subscription: SubscriptionId) {
        self.subscriptions.remove(&subscription);
    }
}

impl LayerRegistry for MockScene {
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
        let id = self.new_layer();
        let index = index.min(self.layers.len());
        self.layers.insert(index, (name.to_string(), id));
        id
    }

    fn push_layer(&mut self, name: &str) -> LayerId {
        let id = self.new_layer();
        self.layers.push((name.to_string(), id));
        id
    }
}

impl MaterialHost for MockScene {
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
        self.params.insert((surface, name.to_string()), value);
    }
}

#[derive(Debug, Default)]
pub struct AllocStats {
    pub attempts: u32,
    pub allocations: u32,
    pub releases: u32,
    pub fail: bool,
    pub fail_next: bool,
    pub last: Option<TargetDescriptor>,
    pub finished_frames: Vec<TargetDescriptor>,
}

impl AllocStats {
    pub fn live(&self) -> u32 {
        self.allocations - self.releases
    }
}

/// Allocator that counts calls through shared stats and can be told to fail.
#[derive(Debug, Clone)]
pub struct CountingAllocator {
    pub stats: Rc<RefCell<AllocStats>>,
    pub max_texture_size: u32,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::with_stats(Rc::default())
    }

    pub fn with_stats(stats: Rc<RefCell<AllocStats>>) -> Self {
        Self {
            stats,
            max_texture_size: 8192,
        }
    }
}

impl TargetAllocator for CountingAllocator {
    type Target = TargetDescriptor;

    fn allocate(&mut self, descriptor: &TargetDescriptor) -> RenderResult<TargetDescriptor> {
        let mut stats = self.stats.borrow_mut();
        stats.attempts += 1;
        if stats.fail_next {
            stats.fail_next = false;
            return Err(RenderError::OutOfMemory);
        }
        if stats.fail {
            return Err(RenderError::OutOfMemory);
        }
        stats.allocations += 1;
        stats.last = Some(*descriptor);
        Ok(*descriptor)
    }

    fn release(&mut self, _target: TargetDescriptor) {
        self.stats.borrow_mut().releases += 1;
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn finish_frame(&mut self, descriptor: &TargetDescriptor, _target: &TargetDescriptor) {
        self.stats.borrow_mut().finished_frames.push(*descriptor);
    }
}
