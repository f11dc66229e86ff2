//! Planar mirror reflection renderer.
//!
//! A [`PlanarRenderer`] drives a secondary camera that sees the scene mirrored
//! across a plane, keeps its offscreen target sized relative to the source
//! camera, and hands the resulting texture to consumers.
//!
//! # Lifecycle
//!
//! `Uninitialized -> Ready -> Disposed`. [`PlanarRenderer::initialize`] moves
//! to `Ready` once the source camera, the camera on the reflection entity and
//! the plane all check out. [`PlanarRenderer::dispose`] is terminal.
//!
//! # Frame ordering
//!
//! With `auto_update` the host calls [`PlanarRenderer::update`] once per tick
//! before the reflection camera renders, and the reflection camera renders
//! before any surface that samples its texture (it runs at priority -1).
//! Consumers read [`PlanarRenderer::reflection_texture`] or the value returned
//! by the update every tick and never keep a handle across ticks: a resize
//! replaces the texture.

use mirrorplane_core::{
    CameraRef, EntityId, ListenerId, Plane, PostRenderListeners, ReflectionCameraState,
    ReflectionError, ReflectionOptions, Result, SourceCameraState, SubscriptionId, TextureHandle,
    Vec3,
};
use mirrorplane_render::{mirror_pose, RenderTargetManager, TargetAllocator, TargetRequest};

use crate::host::{CameraHost, LayerRegistry};

/// Render priority of the reflection camera; it must render before the main camera.
pub const REFLECTION_CAMERA_PRIORITY: i32 = -1;

/// Host capabilities a renderer needs.
pub trait RendererHost: CameraHost + LayerRegistry {}

impl<T: CameraHost + LayerRegistry + ?Sized> RendererHost for T {}

/// Lifecycle state of a [`PlanarRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Preconditions not met; updates are no-ops.
    Uninitialized,
    /// Updating and publishing.
    Ready,
    /// Resources released; terminal.
    Disposed,
}

/// Renders the scene mirrored across a plane into an offscreen texture.
pub struct PlanarRenderer<A: TargetAllocator> {
    entity: EntityId,
    options: ReflectionOptions,
    state: RendererState,
    source: Option<EntityId>,
    plane: Plane,
    camera: ReflectionCameraState,
    targets: RenderTargetManager<A>,
    listeners: PostRenderListeners,
    subscription: Option<SubscriptionId>,
    /// Set after an allocation failure; cleared by an explicit resize trigger.
    resize_blocked: bool,
    dropped_layers: Vec<String>,
}

impl<A: TargetAllocator> PlanarRenderer<A> {
    /// Creates an uninitialized renderer driving the camera on `entity`.
    pub fn new(entity: EntityId, options: ReflectionOptions, allocator: A) -> Self {
        let plane = options.plane().unwrap_or_default();
        Self {
            entity,
            options,
            state: RendererState::Uninitialized,
            source: None,
            plane,
            camera: ReflectionCameraState::default(),
            targets: RenderTargetManager::new(allocator),
            listeners: PostRenderListeners::new(),
            subscription: None,
            resize_blocked: false,
            dropped_layers: Vec::new(),
        }
    }

    /// Entity carrying the reflection camera.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Current options.
    pub fn options(&self) -> &ReflectionOptions {
        &self.options
    }

    /// Lifecycle state.
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Returns true when updates produce a texture.
    pub fn is_ready(&self) -> bool {
        self.state == RendererState::Ready
    }

    /// Resolved source camera entity.
    pub fn source_camera(&self) -> Option<EntityId> {
        self.source
    }

    /// Plane currently in effect.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// State last written to the reflection camera.
    pub fn reflection_camera(&self) -> &ReflectionCameraState {
        &self.camera
    }

    /// Current reflection texture. `None` unless `Ready` with a live target.
    pub fn reflection_texture(&self) -> Option<TextureHandle> {
        match self.state {
            RendererState::Ready => self.targets.handle(),
            _ => None,
        }
    }

    /// Layer names that the host did not know at the last layer update.
    pub fn dropped_layers(&self) -> &[String] {
        &self.dropped_layers
    }

    /// The render target manager.
    pub fn targets(&self) -> &RenderTargetManager<A> {
        &self.targets
    }

    /// Validates dependencies and moves to `Ready`.
    ///
    /// On failure the renderer stays `Uninitialized`, the problem is logged
    /// once, and later updates return `None` until the configuration is
    /// corrected through [`Self::reconfigure`] or this is called again.
    pub fn initialize<H: RendererHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if self.state == RendererState::Disposed {
            return Err(ReflectionError::Disposed);
        }
        self.detach(host);
        self.state = RendererState::Uninitialized;
        self.source = None;

        match self.try_initialize(host) {
            Ok(()) => {
                self.state = RendererState::Ready;
                log::info!(
                    "planar renderer on {:?} ready (source {:?}, layers {:?})",
                    self.entity,
                    self.source,
                    self.camera.layers
                );
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "planar renderer on {:?} not initialized: {err}",
                    self.entity
                );
                Err(err)
            }
        }
    }

    fn try_initialize<H: RendererHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        self.options.validate()?;
        let plane = self.options.plane()?;

        let source = self.resolve_source(host)?;
        if !host.has_camera(source) {
            return Err(ReflectionError::MissingDependency(format!(
                "source camera entity {source:?} has no camera component"
            )));
        }
        if !host.has_camera(self.entity) {
            return Err(ReflectionError::MissingDependency(format!(
                "reflection entity {:?} has no camera component",
                self.entity
            )));
        }

        self.plane = plane;
        self.source = Some(source);
        self.camera.priority = REFLECTION_CAMERA_PRIORITY;
        if let Err(err) = self.setup_camera_layers(host) {
            log::debug!("continuing with partial layer set: {err}");
        }
        self.subscription = Some(host.subscribe_render_complete(self.entity));
        host.apply_reflection_camera(self.entity, &self.camera);
        Ok(())
    }

    fn resolve_source<H: RendererHost + ?Sized>(&self, host: &H) -> Result<EntityId> {
        match &self.options.source_camera {
            CameraRef::Entity(entity) => Ok(*entity),
            CameraRef::Named(name) => {
                let entity = host.find_entity(name).ok_or_else(|| {
                    ReflectionError::MissingDependency(format!(
                        "no source camera set and no entity named '{name}'"
                    ))
                })?;
                log::debug!("found source camera '{name}' as {entity:?}");
                Ok(entity)
            }
        }
    }

    /// Restricts the reflection camera to the configured layers.
    ///
    /// Unknown names are skipped and returned in `LayerNotFound`. If no name
    /// resolves, the previous layer set stays in effect.
    pub fn setup_camera_layers<H: RendererHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let selection = self.options.layer_selection();
        if selection.is_empty() {
            log::warn!("no reflection layer names configured");
            self.dropped_layers.clear();
            return Ok(());
        }

        let resolved = selection.resolve(|name| host.layer_by_name(name));
        for name in &resolved.missing {
            log::warn!("reflection layer '{name}' not found");
        }

        if resolved.ids.is_empty() {
            log::error!("no valid reflection layers in '{selection}', keeping previous layers");
        } else {
            self.camera.layers = resolved.ids;
            host.set_camera_layers(self.entity, &self.camera.layers);
            log::debug!("reflection camera layers set to {:?}", self.camera.layers);
        }

        self.dropped_layers.clone_from(&resolved.missing);
        if resolved.missing.is_empty() {
            Ok(())
        } else {
            Err(ReflectionError::LayerNotFound(resolved.missing))
        }
    }

    /// Resizes the target, mirrors the source camera, copies its optics and
    /// returns the current texture.
    ///
    /// Returns `None` when not `Ready`, when the source camera is gone, or
    /// when the reflection camera is disabled.
    pub fn frame_update<H: RendererHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Option<TextureHandle> {
        if self.state != RendererState::Ready {
            log::trace!(
                "frame_update on {:?} skipped: {:?}",
                self.entity,
                self.state
            );
            return None;
        }
        let source = self.source?;
        let Some(snapshot) = host.camera_state(source) else {
            log::warn!("source camera {source:?} no longer has a camera component");
            return None;
        };

        self.update_render_target(&snapshot);

        if !host.camera_enabled(self.entity) {
            log::debug!("reflection camera {:?} disabled", self.entity);
            return None;
        }

        let pose = mirror_pose(&self.plane, snapshot.position, snapshot.forward);
        self.camera.position = pose.position;
        self.camera.orientation = pose.orientation;
        // Same lens as the primary view.
        self.camera.optics = snapshot.optics;
        self.camera.target = self.targets.handle();
        host.apply_reflection_camera(self.entity, &self.camera);

        log::trace!(
            "reflection camera at {} (source at {}), texture {:?}",
            pose.position,
            snapshot.position,
            self.camera.target
        );
        self.camera.target
    }

    /// Per-tick entry point: runs [`Self::frame_update`] when `auto_update` is set.
    pub fn update<H: RendererHost + ?Sized>(&mut self, host: &mut H) -> Option<TextureHandle> {
        if self.options.auto_update {
            self.frame_update(host)
        } else {
            None
        }
    }

    /// Manual update, for hosts that drive the reflection on their own cadence.
    pub fn update_reflection<H: RendererHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Option<TextureHandle> {
        self.frame_update(host)
    }

    fn update_render_target(&mut self, snapshot: &SourceCameraState) {
        if self.resize_blocked {
            return;
        }
        if let Err(err) = self.resize_target(snapshot) {
            self.resize_blocked = true;
            log::error!("{err}; keeping previous reflection target until a resize is requested");
        }
    }

    fn resize_target(&mut self, snapshot: &SourceCameraState) -> Result<TextureHandle> {
        let request = TargetRequest {
            source_width: snapshot.resolution.x,
            source_height: snapshot.resolution.y,
            scale: self.options.scale,
            max_resolution: self.options.max_resolution,
            hardware_max: self.targets.allocator().max_texture_size(),
            mipmaps: self.options.mipmaps,
            depth: self.options.depth,
        };
        Ok(self.targets.ensure_target(&request)?.handle())
    }

    /// Clears a pending allocation back-off so the next update retries.
    pub fn request_resize(&mut self) {
        self.resize_blocked = false;
    }

    /// Applies new options live.
    ///
    /// Invalid options (range or plane geometry) are rejected and the previous
    /// ones stay in effect. A different source camera, or a renderer that is
    /// still `Uninitialized`, triggers a full re-initialization. Layer changes
    /// update the camera mask; scale, cap, mipmap and depth changes resize the
    /// target immediately.
    pub fn reconfigure<H: RendererHost + ?Sized>(
        &mut self,
        host: &mut H,
        options: ReflectionOptions,
    ) -> Result<()> {
        if self.state == RendererState::Disposed {
            return Err(ReflectionError::Disposed);
        }
        if let Err(err) = options.validate() {
            log::error!("rejected reflection options: {err}");
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.options, options);
        if previous.source_camera != self.options.source_camera
            || self.state == RendererState::Uninitialized
        {
            return self.initialize(host);
        }

        self.plane = self.options.plane()?;

        if previous.layer_names != self.options.layer_names {
            if let Err(err) = self.setup_camera_layers(host) {
                log::debug!("layer update incomplete: {err}");
            }
        }

        if previous.target_differs(&self.options) {
            self.resize_blocked = false;
            if let Some(snapshot) = self.source.and_then(|source| host.camera_state(source)) {
                self.update_render_target(&snapshot);
            }
        }
        Ok(())
    }

    /// Moves the reflection plane. A degenerate normal is rejected and the
    /// previous plane kept.
    pub fn set_plane(&mut self, point: Vec3, normal: Vec3) -> Result<()> {
        let plane = Plane::from_point_normal(point, normal).map_err(|err| {
            log::error!("rejected reflection plane: {err}");
            err
        })?;
        self.plane = plane;
        self.options.plane_point = point;
        self.options.plane_normal = normal;
        Ok(())
    }

    /// Host notification that `camera` finished rendering. When it is this
    /// renderer's camera, finishes the target (mip chain) and publishes the
    /// texture to post-render listeners.
    pub fn on_camera_rendered(&mut self, camera: EntityId) {
        if self.state == RendererState::Ready && camera == self.entity {
            self.targets.finish_frame();
            self.listeners.notify(self.targets.handle());
        }
    }

    /// Registers a callback run after each reflection pass.
    pub fn subscribe_post_render(
        &mut self,
        listener: impl FnMut(Option<TextureHandle>) + 'static,
    ) -> ListenerId {
        self.listeners.register(listener)
    }

    /// Removes a post-render callback.
    pub fn unsubscribe_post_render(&mut self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    /// Takes over the live target and listeners of a previous instance (hot
    /// reload), then disposes it. The texture handle survives unchanged.
    pub fn adopt<H: RendererHost + ?Sized>(
        &mut self,
        host: &mut H,
        mut previous: Self,
    ) -> Result<()> {
        if self.state == RendererState::Disposed {
            return Err(ReflectionError::Disposed);
        }

        let target = previous.targets.take();
        self.listeners.absorb(&mut previous.listeners);
        previous.dispose(host);

        if let Some(target) = target {
            self.targets.install(target);
        }
        self.camera.target = self.targets.handle();
        log::info!(
            "planar renderer on {:?} adopted target {:?}",
            self.entity,
            self.camera.target
        );

        if self.state == RendererState::Ready {
            host.apply_reflection_camera(self.entity, &self.camera);
            Ok(())
        } else {
            self.initialize(host)
        }
    }

    /// Releases the target and detaches from the host. Terminal.
    pub fn dispose<H: RendererHost + ?Sized>(&mut self, host: &mut H) {
        if self.state == RendererState::Disposed {
            return;
        }
        self.targets.release();
        self.detach(host);
        self.listeners.clear();
        self.camera.target = None;
        if host.has_camera(self.entity) {
            host.apply_reflection_camera(self.entity, &self.camera);
        }
        self.state = RendererState::Disposed;
        log::info!("planar renderer on {:?} disposed", self.entity);
    }

    fn detach<H: RendererHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe_render_complete(subscription);
        }
    }
}

impl<A: TargetAllocator> std::fmt::Debug for PlanarRenderer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanarRenderer")
            .field("entity", &self.entity)
            .field("state", &self.state)
            .field("source", &self.source)
            .field("plane", &self.plane)
            .field("texture", &self.targets.handle())
            .finish_non_exhaustive()
    }
}
