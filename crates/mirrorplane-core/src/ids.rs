//! Opaque identifiers shared between the reflection subsystem and its host.

use serde::{Deserialize, Serialize};

/// An entity in the host scene graph (cameras, surfaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A visibility layer known to the host's layer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

/// A post-render listener registered on a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A host-side render-complete subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Read-only handle to the color buffer of a reflection render target.
///
/// Every allocation gets a fresh `id`, so two handles compare equal only when
/// they refer to the same live texture. Consumers must re-fetch the handle
/// every tick rather than keep one across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    /// Unique allocation id.
    pub id: u64,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl TextureHandle {
    /// Returns the texel size `(1/width, 1/height)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn texel_size(&self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }
}
