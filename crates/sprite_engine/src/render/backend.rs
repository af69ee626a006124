//! Backend abstraction for the rendering collaborator
//!
//! The kernel hands the backend two kinds of work: a one-time upload per
//! renderable at finalize, and one draw call per visible entity per frame.
//! Buffer management and API submission stay on the backend side.

use crate::assets::TextureImage;
use crate::foundation::collections::{RenderableId, ShaderId, TextureId};

use super::renderable::{Geometry, InstanceData};
use super::shader::ShaderProgram;
use super::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Opaque handle to uploaded GPU state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBinding {
    /// Backend-defined resource handle
    pub handle: u64,
    /// Number of indices to draw
    pub index_count: u32,
}

/// Everything a backend needs to upload one renderable
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Renderable being finalized
    pub renderable: RenderableId,
    /// Shader program and its declared inputs
    pub shader: &'a ShaderProgram,
    /// Decoded texture, if the renderable is textured
    pub texture: Option<&'a TextureImage>,
    /// Vertex and index data
    pub geometry: &'a Geometry,
}

/// A single draw submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Renderable being drawn
    pub renderable: RenderableId,
    /// Shader to bind
    pub shader: ShaderId,
    /// Texture to bind
    pub texture: Option<TextureId>,
    /// Uploaded buffers
    pub binding: GpuBinding,
    /// Per-instance uniforms, ready to copy into a uniform buffer
    pub instance: InstanceData,
}

/// Rendering collaborator
///
/// Calls must happen on the thread that owns the graphics context.
pub trait RenderBackend {
    /// Upload geometry and texture, returning a handle for later draws
    fn upload(&mut self, request: &UploadRequest<'_>) -> BackendResult<GpuBinding>;

    /// Issue one draw
    fn draw(&mut self, call: &DrawCall) -> BackendResult<()>;

    /// Called once after the last draw of a frame
    fn end_frame(&mut self) -> BackendResult<()> {
        Ok(())
    }
}

/// Record of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Renderable that was uploaded
    pub renderable: RenderableId,
    /// Shader alias
    pub shader: String,
    /// Texture dimensions, if textured
    pub texture_size: Option<(u32, u32)>,
    /// Handle returned to the caller
    pub binding: GpuBinding,
}

/// Backend that records work instead of submitting it
///
/// Used headless and in tests. Uploads are validated the way a real backend
/// would fail when binding uniforms: a shader missing a required input is
/// rejected with [`RenderError::MissingShaderInput`]. Only the draw calls of
/// the latest frame are kept; earlier frames survive as counts.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    uploads: Vec<UploadRecord>,
    draws: Vec<DrawCall>,
    frame_open: bool,
    frames: u64,
    total_draws: u64,
    next_handle: u64,
}

impl RecordingBackend {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads so far
    pub fn uploads(&self) -> &[UploadRecord] {
        &self.uploads
    }

    /// Draw calls of the current frame, or of the last completed one
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draw calls over every frame
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }

    /// Number of completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for RecordingBackend {
    fn upload(&mut self, request: &UploadRequest<'_>) -> BackendResult<GpuBinding> {
        request.shader.validate()?;

        let index_count = u32::try_from(request.geometry.indices.len())
            .map_err(|_| RenderError::Backend("index buffer too large".to_owned()))?;

        self.next_handle += 1;
        let binding = GpuBinding {
            handle: self.next_handle,
            index_count,
        };

        self.uploads.push(UploadRecord {
            renderable: request.renderable,
            shader: request.shader.alias().to_owned(),
            texture_size: request.texture.map(|t| (t.width, t.height)),
            binding,
        });
        Ok(binding)
    }

    fn draw(&mut self, call: &DrawCall) -> BackendResult<()> {
        if !self.frame_open {
            self.draws.clear();
            self.frame_open = true;
        }
        self.draws.push(*call);
        self.total_draws += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.frame_open = false;
        self.frames += 1;
        Ok(())
    }
}
