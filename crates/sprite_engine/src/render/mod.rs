//! Rendering kernel
//!
//! Cameras, shared renderables and the seam to the GPU collaborator. The
//! kernel never talks to a graphics API directly: everything that touches
//! buffers or issues draws goes through [`RenderBackend`].

pub mod backend;
pub mod camera;
pub mod renderable;
pub mod shader;

pub use backend::{DrawCall, GpuBinding, RecordingBackend, RenderBackend, UploadRequest};
pub use camera::{Camera2D, CameraRegistry, MAIN_CAMERA};
pub use renderable::{Geometry, InstanceData, InstanceUniforms, RenderContext, Renderable, RenderableStore};
pub use shader::{ShaderProgram, ShaderSource};

use thiserror::Error;

use crate::foundation::collections::{RenderableId, ShaderId, TextureId};

/// Rendering errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Draw requested before the renderable was uploaded
    #[error("Renderable {0:?} drawn before finalize")]
    NotFinalized(RenderableId),

    /// Shader lacks a uniform or attribute the sprite pipeline writes
    #[error("Shader '{shader}' does not declare required {kind} '{name}'")]
    MissingShaderInput {
        /// Shader alias
        shader: String,
        /// "uniform" or "attribute"
        kind: &'static str,
        /// Missing identifier
        name: String,
    },

    /// Renderable id not present in the store
    #[error("Unknown renderable {0:?}")]
    UnknownRenderable(RenderableId),

    /// Shader id not present in the asset cache
    #[error("Unknown shader {0:?}")]
    UnknownShader(ShaderId),

    /// Texture id not present in the asset cache
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// Failure reported by the backend itself
    #[error("Backend error: {0}")]
    Backend(String),
}
