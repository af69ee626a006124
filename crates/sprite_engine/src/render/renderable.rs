//! Shared renderables and per-instance uniforms
//!
//! A [`Renderable`] owns nothing on the GPU by itself; it names a shader, an
//! optional texture and some geometry, and after finalize carries the handle
//! the backend returned. Entities refer to renderables by [`RenderableId`] and
//! each draw pushes the entity's own [`InstanceUniforms`].

// The Pod/Zeroable derives expand to unsafe impls.
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use crate::assets::AssetCache;
use crate::foundation::collections::{CameraId, RenderableId, ShaderId, SlotMap, TextureId};
use crate::foundation::math::{Mat3, Vec4};

use super::backend::{DrawCall, GpuBinding, RenderBackend, UploadRequest};
use super::camera::CameraRegistry;
use super::RenderError;

/// Vertex data for a renderable
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Positions in local space
    pub vertices: Vec<[f32; 2]>,
    /// Texture coordinates, one per vertex
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle list indices
    pub indices: Vec<u16>,
}

impl Geometry {
    /// Unit quad centered on the origin, so scale equals size in world units
    pub fn unit_quad() -> Self {
        Self {
            vertices: vec![[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]],
            tex_coords: vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }
}

/// Values pushed for each draw of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceUniforms {
    /// Tint color (RGBA)
    pub color: Vec4,
    /// 0 shows the texture, 1 shows the flat tint
    pub color_mix: f32,
    /// Atlas UV rectangle `[u0, v0, u1, v1]`
    pub sub_rect: Vec4,
}

impl Default for InstanceUniforms {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            color_mix: 0.0,
            sub_rect: Vec4::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

/// GPU-layout instance block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Camera * model matrix, column-major
    pub transformation: [[f32; 3]; 3],
    /// Tint color
    pub color: [f32; 4],
    /// Atlas UV rectangle
    pub sub_rect: [f32; 4],
    /// Texture/tint mix ratio
    pub color_mix: f32,
    _padding: [f32; 3],
}

impl InstanceData {
    /// Pack a matrix and uniforms
    pub fn new(transformation: &Mat3, uniforms: &InstanceUniforms) -> Self {
        Self {
            transformation: (*transformation).into(),
            color: uniforms.color.into(),
            sub_rect: uniforms.sub_rect.into(),
            color_mix: uniforms.color_mix,
            _padding: [0.0; 3],
        }
    }

    /// Matrix back in nalgebra form
    pub fn matrix(&self) -> Mat3 {
        Mat3::from(self.transformation)
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Shader, texture and geometry shared by many entities
#[derive(Debug, Clone)]
pub struct Renderable {
    shader: ShaderId,
    texture: Option<TextureId>,
    geometry: Geometry,
    defaults: InstanceUniforms,
    binding: Option<GpuBinding>,
}

impl Renderable {
    /// Textured unit quad
    pub fn sprite(shader: ShaderId, texture: TextureId) -> Self {
        Self::new(shader, Some(texture), Geometry::unit_quad())
    }

    /// Untextured unit quad drawn in its tint color
    pub fn flat(shader: ShaderId) -> Self {
        let mut renderable = Self::new(shader, None, Geometry::unit_quad());
        renderable.defaults.color_mix = 1.0;
        renderable
    }

    /// Renderable with explicit geometry
    pub fn new(shader: ShaderId, texture: Option<TextureId>, geometry: Geometry) -> Self {
        Self {
            shader,
            texture,
            geometry,
            defaults: InstanceUniforms::default(),
            binding: None,
        }
    }

    /// Builder pattern: set default instance uniforms
    #[must_use]
    pub fn with_defaults(mut self, defaults: InstanceUniforms) -> Self {
        self.defaults = defaults;
        self
    }

    /// Shader id
    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    /// Texture id, if textured
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Uniforms new entities start with
    pub fn defaults(&self) -> &InstanceUniforms {
        &self.defaults
    }

    /// Whether the backend has uploaded this renderable
    pub fn is_finalized(&self) -> bool {
        self.binding.is_some()
    }

    /// Draw once with the given matrix and uniforms
    pub fn draw(
        &self,
        id: RenderableId,
        transformation: &Mat3,
        uniforms: &InstanceUniforms,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), RenderError> {
        let binding = self.binding.ok_or(RenderError::NotFinalized(id))?;
        backend.draw(&DrawCall {
            renderable: id,
            shader: self.shader,
            texture: self.texture,
            binding,
            instance: InstanceData::new(transformation, uniforms),
        })
    }
}

/// Arena owning every renderable; entities hold [`RenderableId`]s into it
#[derive(Debug, Default)]
pub struct RenderableStore {
    renderables: SlotMap<RenderableId, Renderable>,
}

impl RenderableStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a renderable
    pub fn add(&mut self, renderable: Renderable) -> RenderableId {
        self.renderables.insert(renderable)
    }

    /// Renderable by id
    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.renderables.get(id)
    }

    /// Number of renderables
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Upload every renderable that has not been uploaded yet
    ///
    /// Returns how many were uploaded. Stops at the first failure.
    pub fn finalize_all(&mut self, assets: &AssetCache, backend: &mut dyn RenderBackend) -> Result<usize, RenderError> {
        let mut uploaded = 0;

        for (id, renderable) in &mut self.renderables {
            if renderable.binding.is_some() {
                continue;
            }

            let shader = assets
                .shader_program(renderable.shader)
                .ok_or(RenderError::UnknownShader(renderable.shader))?;
            let texture = match renderable.texture {
                Some(texture) => Some(assets.texture_image(texture).ok_or(RenderError::UnknownTexture(texture))?),
                None => None,
            };

            let binding = backend.upload(&UploadRequest {
                renderable: id,
                shader,
                texture,
                geometry: &renderable.geometry,
            })?;
            renderable.binding = Some(binding);
            uploaded += 1;
            log::debug!("Finalized renderable {id:?} with shader '{}'", shader.alias());
        }

        Ok(uploaded)
    }

    /// Draw `id` once
    pub fn draw(
        &self,
        id: RenderableId,
        transformation: &Mat3,
        uniforms: &InstanceUniforms,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), RenderError> {
        self.get(id)
            .ok_or(RenderError::UnknownRenderable(id))?
            .draw(id, transformation, uniforms, backend)
    }
}

/// What drawing an entity needs
pub struct RenderContext<'a> {
    /// Cameras to view through
    pub cameras: &'a mut CameraRegistry,
    /// Renderables entities point at
    pub renderables: &'a RenderableStore,
    /// Rendering collaborator
    pub backend: &'a mut dyn RenderBackend,
}

impl RenderContext<'_> {
    /// Matrix of `camera`, or of the main camera when `None` or unknown
    pub fn view_matrix(&mut self, camera: Option<CameraId>) -> Mat3 {
        match camera.and_then(|id| self.cameras.get_mut(id)) {
            Some(camera) => camera.matrix(),
            None => self.cameras.main_matrix(),
        }
    }

    /// Submit one draw of `renderable`
    pub fn submit(
        &mut self,
        renderable: RenderableId,
        transformation: &Mat3,
        uniforms: &InstanceUniforms,
    ) -> Result<(), RenderError> {
        self.renderables
            .draw(renderable, transformation, uniforms, &mut *self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_data_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 84);
        let data = InstanceData::new(&Mat3::identity(), &InstanceUniforms::default());
        assert_eq!(data.as_bytes().len(), 84);
        assert_eq!(data.matrix(), Mat3::identity());
        assert_eq!(data.sub_rect, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_draw_before_finalize_is_an_error() {
        let mut store = RenderableStore::new();
        let id = store.add(Renderable::flat(ShaderId::default()));
        let mut backend = crate::render::RecordingBackend::new();
        let result = store.draw(id, &Mat3::identity(), &InstanceUniforms::default(), &mut backend);
        assert_eq!(result, Err(RenderError::NotFinalized(id)));
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn test_flat_renderable_defaults_to_tint() {
        let renderable = Renderable::flat(ShaderId::default());
        assert_eq!(renderable.defaults().color_mix, 1.0);
        assert!(renderable.texture().is_none());
        assert_eq!(renderable.geometry().indices.len(), 6);
    }
}
