//! Handle types for arena-owned resources
//!
//! Shaders, textures, renderables and cameras live in slot maps owned by their
//! registries. Everything else refers to them through these copyable keys, so an
//! entity never owns the GPU-side resources it draws with.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a shader program owned by the asset cache
    pub struct ShaderId;

    /// Handle to a texture owned by the asset cache
    pub struct TextureId;

    /// Handle to a renderable owned by the renderable store
    pub struct RenderableId;

    /// Handle to a camera owned by the camera registry
    pub struct CameraId;
}
