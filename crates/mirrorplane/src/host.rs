//! Boundary with the host engine.
//!
//! The reflection subsystem never owns the scene graph, the layer registry or
//! materials. It talks to them through these traits, which a host implements
//! on top of its own object model.

use mirrorplane_core::{
    EntityId, LayerId, ReflectionCameraState, SourceCameraState, SubscriptionId,
};
use mirrorplane_render::{MaterialParameterSink, ParameterValue};

/// Camera parameter surface and render-complete notification.
pub trait CameraHost {
    /// Looks an entity up by name.
    fn find_entity(&self, name: &str) -> Option<EntityId>;

    /// Returns true if `entity` has a camera component.
    fn has_camera(&self, entity: EntityId) -> bool;

    /// Per-frame snapshot of a camera, `None` if `entity` has no camera.
    fn camera_state(&self, entity: EntityId) -> Option<SourceCameraState>;

    /// Returns true if the camera on `entity` is enabled.
    fn camera_enabled(&self, entity: EntityId) -> bool;

    /// Writes pose, optics, layers, priority and output target to the camera
    /// on `entity`.
    fn apply_reflection_camera(&mut self, entity: EntityId, state: &ReflectionCameraState);

    /// Layers the camera on `entity` renders.
    fn camera_layers(&self, entity: EntityId) -> Vec<LayerId>;

    /// Replaces the layers the camera on `entity` renders.
    fn set_camera_layers(&mut self, entity: EntityId, layers: &[LayerId]);

    /// Subscribes to "camera finished rendering" for `camera`. The host then
    /// reports completion through the subscriber's `on_camera_rendered`.
    fn subscribe_render_complete(&mut self, camera: EntityId) -> SubscriptionId;

    /// Drops a subscription made with [`Self::subscribe_render_complete`].
    fn unsubscribe_render_complete(&mut self, subscription: SubscriptionId);
}

/// Named visibility layers.
pub trait LayerRegistry {
    /// Looks a layer up by name.
    fn layer_by_name(&self, name: &str) -> Option<LayerId>;

    /// Position of the layer's transparent sub-layer in render order.
    fn transparent_index(&self, layer: LayerId) -> Option<usize>;

    /// Creates a layer at `index` in render order.
    fn insert_layer(&mut self, name: &str, index: usize) -> LayerId;

    /// Creates a layer at the end of the render order.
    fn push_layer(&mut self, name: &str) -> LayerId;
}

/// Renderable surfaces and their materials.
pub trait MaterialHost {
    /// Layers a surface renders in.
    fn surface_layers(&self, surface: EntityId) -> Vec<LayerId>;

    /// Replaces the layers a surface renders in.
    fn set_surface_layers(&mut self, surface: EntityId, layers: &[LayerId]);

    /// Writes a named parameter into the surface's material.
    fn set_material_parameter(&mut self, surface: EntityId, name: &str, value: ParameterValue);
}

/// Everything the ocean system needs from the host.
pub trait SceneHost: CameraHost + LayerRegistry + MaterialHost {}

impl<T: CameraHost + LayerRegistry + MaterialHost + ?Sized> SceneHost for T {}

/// Adapts one surface of a [`MaterialHost`] into a [`MaterialParameterSink`].
pub struct SurfaceSink<'a, H: MaterialHost + ?Sized> {
    host: &'a mut H,
    surface: EntityId,
}

impl<'a, H: MaterialHost + ?Sized> SurfaceSink<'a, H> {
    /// Creates a sink writing into `surface`'s material.
    pub fn new(host: &'a mut H, surface: EntityId) -> Self {
        Self { host, surface }
    }
}

impl<H: MaterialHost + ?Sized> MaterialParameterSink for SurfaceSink<'_, H> {
    fn set_parameter(&mut self, name: &str, value: ParameterValue) {
        self.host.set_material_parameter(self.surface, name, value);
    }
}
