//! Ocean orchestrator: one planar reflection shared by any number of water
//! surfaces.

use mirrorplane_core::{
    CameraRef, EntityId, LayerId, OceanMaterialOptions, OceanSystemOptions, ReflectionError,
    Result, TextureHandle, Vec3,
};
use mirrorplane_render::{OceanMaterial, TargetAllocator};

use crate::host::{SceneHost, SurfaceSink};
use crate::planar_renderer::PlanarRenderer;

/// Layer that holds reflective surfaces so they never appear in their own reflection.
pub const EXCLUDED_LAYER_NAME: &str = "Excluded";

/// Layer the excluded layer is placed after.
pub const WORLD_LAYER_NAME: &str = "World";

/// A water surface sampling the shared reflection.
#[derive(Debug, Clone)]
pub struct OceanSurface {
    entity: EntityId,
    material: OceanMaterial,
}

impl OceanSurface {
    /// Entity carrying the surface's render component.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The surface's material state.
    pub fn material(&self) -> &OceanMaterial {
        &self.material
    }
}

/// Wires a [`PlanarRenderer`] into a set of ocean surfaces.
#[derive(Debug)]
pub struct OceanSystem<A: TargetAllocator> {
    options: OceanSystemOptions,
    main_camera: Option<EntityId>,
    excluded_layer: Option<LayerId>,
    renderer: PlanarRenderer<A>,
    surfaces: Vec<OceanSurface>,
}

impl<A: TargetAllocator> OceanSystem<A> {
    /// Creates the system. Nothing touches the host until [`Self::setup`].
    pub fn new(options: OceanSystemOptions, reflection_entity: EntityId, allocator: A) -> Self {
        let renderer = PlanarRenderer::new(
            reflection_entity,
            options.reflection_options(),
            allocator,
        );
        Self {
            options,
            main_camera: None,
            excluded_layer: None,
            renderer,
            surfaces: Vec::new(),
        }
    }

    /// Returns the current system options.
    pub fn options(&self) -> &OceanSystemOptions {
        &self.options
    }

    /// Returns the shared reflection renderer.
    pub fn renderer(&self) -> &PlanarRenderer<A> {
        &self.renderer
    }

    /// Returns the shared reflection renderer mutably, e.g. to subscribe
    /// post-render listeners.
    pub fn renderer_mut(&mut self) -> &mut PlanarRenderer<A> {
        &mut self.renderer
    }

    /// Surfaces currently sampling the reflection, in insertion order.
    pub fn surfaces(&self) -> &[OceanSurface] {
        &self.surfaces
    }

    /// Main camera resolved by the last successful setup.
    pub fn main_camera(&self) -> Option<EntityId> {
        self.main_camera
    }

    /// The "Excluded" layer, once setup has looked it up or created it.
    pub fn excluded_layer(&self) -> Option<LayerId> {
        self.excluded_layer
    }

    /// Texture consumers sample this tick, if the reflection is ready.
    pub fn reflection_texture(&self) -> Option<TextureHandle> {
        self.renderer.reflection_texture()
    }

    /// Resolves the main camera, manages the excluded layer and initializes
    /// the reflection renderer with the ocean plane.
    pub fn setup<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if let Err(err) = self.options.validate() {
            log::error!("rejected ocean options: {err}");
            return Err(err);
        }

        let main_camera = resolve_camera(host, &self.options.main_camera).ok_or_else(|| {
            let err = ReflectionError::MissingDependency(format!(
                "main camera {:?} not found",
                self.options.main_camera
            ));
            log::error!("ocean setup failed: {err}");
            err
        })?;
        self.main_camera = Some(main_camera);

        if self.options.exclude_ocean_from_reflection {
            let layer = self.ensure_excluded_layer(host);
            for surface in &self.surfaces {
                host.set_surface_layers(surface.entity, &[layer]);
            }
        }

        let mut reflection = self.options.reflection_options();
        reflection.source_camera = CameraRef::Entity(main_camera);
        self.renderer.reconfigure(host, reflection)?;
        log::info!(
            "ocean system ready: main camera {main_camera:?}, {} surface(s)",
            self.surfaces.len()
        );
        Ok(())
    }

    /// Finds or creates the excluded layer and makes sure the main camera renders it.
    pub fn ensure_excluded_layer<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> LayerId {
        let layer = if let Some(layer) = host.layer_by_name(EXCLUDED_LAYER_NAME) {
            layer
        } else {
            let world = host
                .layer_by_name(WORLD_LAYER_NAME)
                .and_then(|world| host.transparent_index(world));
            let layer = match world {
                Some(index) => host.insert_layer(EXCLUDED_LAYER_NAME, index + 1),
                None => host.push_layer(EXCLUDED_LAYER_NAME),
            };
            log::info!("created '{EXCLUDED_LAYER_NAME}' layer {layer:?}");
            layer
        };

        if let Some(camera) = self.main_camera {
            let mut layers = host.camera_layers(camera);
            if !layers.contains(&layer) {
                layers.push(layer);
                host.set_camera_layers(camera, &layers);
                log::debug!("added '{EXCLUDED_LAYER_NAME}' to main camera {camera:?}");
            }
        }

        self.excluded_layer = Some(layer);
        layer
    }

    /// Adds a surface that samples the shared reflection.
    pub fn add_consumer<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        surface: EntityId,
    ) -> Result<()> {
        if self.surfaces.iter().any(|s| s.entity == surface) {
            log::debug!("surface {surface:?} already consumes the reflection");
            return Ok(());
        }

        let mut material = OceanMaterial::new(self.options.material.clone())?;
        if self.options.exclude_ocean_from_reflection {
            if let Some(layer) = self.excluded_layer {
                host.set_surface_layers(surface, &[layer]);
            }
        }
        material.set_reflection_texture(self.renderer.reflection_texture());
        material.publish(&mut SurfaceSink::new(&mut *host, surface));

        self.surfaces.push(OceanSurface {
            entity: surface,
            material,
        });
        Ok(())
    }

    /// Removes a consumer surface.
    pub fn remove_consumer(&mut self, surface: EntityId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.entity != surface);
        self.surfaces.len() != before
    }

    /// Runs the reflection update, then hands the current texture to every
    /// surface and publishes its material parameters.
    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> Option<TextureHandle> {
        self.renderer.update(host);
        // Fetched fresh every tick; a resize replaces the texture.
        let texture = self.renderer.reflection_texture();
        for surface in &mut self.surfaces {
            surface.material.set_reflection_texture(texture);
            surface
                .material
                .update(dt, &mut SurfaceSink::new(&mut *host, surface.entity));
        }
        texture
    }

    /// Manual reflection update for hosts running with `auto_update` off.
    pub fn update_reflection<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Option<TextureHandle> {
        self.renderer.update_reflection(host)
    }

    /// Forwards a completed camera render to the reflection renderer.
    pub fn on_camera_rendered(&mut self, camera: EntityId) {
        self.renderer.on_camera_rendered(camera);
    }

    /// Applies new reflection scale, layers and plane height live.
    pub fn update_reflection_settings<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        scale: f32,
        layers: &str,
        ocean_position: Vec3,
    ) -> Result<()> {
        let mut options = self.options.clone();
        options.reflection_scale = scale;
        options.reflection_layers = layers.to_string();
        options.ocean_position = ocean_position;
        if let Err(err) = options.validate() {
            log::error!("rejected reflection settings: {err}");
            return Err(err);
        }

        let mut reflection = options.reflection_options();
        if let Some(camera) = self.main_camera {
            reflection.source_camera = CameraRef::Entity(camera);
        }
        self.renderer.reconfigure(host, reflection)?;
        self.options = options;
        Ok(())
    }

    /// Points the system at a different main camera and runs setup again.
    pub fn set_main_camera<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        camera: CameraRef,
    ) -> Result<()> {
        if camera == self.options.main_camera && self.main_camera.is_some() {
            return Ok(());
        }
        log::info!("main camera changed to {camera:?}");
        self.options.main_camera = camera;
        self.setup(host)
    }

    /// Replaces the shading options of every surface.
    pub fn set_material_options(&mut self, options: OceanMaterialOptions) -> Result<()> {
        options.validate()?;
        for surface in &mut self.surfaces {
            surface.material.set_options(options.clone())?;
        }
        self.options.material = options;
        Ok(())
    }

    /// Takes over the renderer resources and surface clocks of a reloaded instance.
    pub fn adopt<H: SceneHost + ?Sized>(&mut self, host: &mut H, previous: Self) -> Result<()> {
        let OceanSystem {
            renderer,
            surfaces,
            main_camera,
            excluded_layer,
            ..
        } = previous;

        for old in surfaces {
            match self.surfaces.iter_mut().find(|s| s.entity == old.entity) {
                Some(surface) => surface.material.adopt(&old.material),
                None => self.surfaces.push(old),
            }
        }
        self.main_camera = self.main_camera.or(main_camera);
        self.excluded_layer = self.excluded_layer.or(excluded_layer);

        self.renderer.adopt(host, renderer)
    }

    /// Disposes the renderer and drops every consumer.
    pub fn teardown<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        self.renderer.dispose(host);
        self.surfaces.clear();
        self.main_camera = None;
        log::info!("ocean system torn down");
    }
}

fn resolve_camera<H: SceneHost + ?Sized>(host: &H, camera: &CameraRef) -> Option<EntityId> {
    let entity = match camera {
        CameraRef::Entity(entity) => Some(*entity),
        CameraRef::Named(name) => host.find_entity(name),
    }?;
    host.has_camera(entity).then_some(entity)
}
