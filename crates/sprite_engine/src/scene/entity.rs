//! Entity: transform + renderable reference + behavior

use crate::foundation::collections::{CameraId, RenderableId};
use crate::foundation::math::Vec4;
use crate::render::{InstanceUniforms, RenderContext, RenderError, Renderable};

use super::behavior::{Behavior, UpdateContext};
use super::transform::Transform;

/// A live simulation object
///
/// Cloning copies the transform, uniforms and behavior; the renderable and
/// camera are ids and stay shared. This is how templates are stamped out.
#[derive(Debug, Clone)]
pub struct Entity {
    transform: Transform,
    renderable: RenderableId,
    camera: Option<CameraId>,
    uniforms: InstanceUniforms,
    behavior: Behavior,
    // Set by `set_behavior`; lets `update` tell a replacement from its own placeholder
    behavior_replaced: bool,
    deleted: bool,
}

impl Entity {
    /// Entity drawn with `renderable` and default uniforms
    pub fn new(renderable: RenderableId) -> Self {
        Self {
            transform: Transform::default(),
            renderable,
            camera: None,
            uniforms: InstanceUniforms::default(),
            behavior: Behavior::default(),
            behavior_replaced: false,
            deleted: false,
        }
    }

    /// Entity starting from the renderable's default uniforms
    pub fn from_renderable(id: RenderableId, renderable: &Renderable) -> Self {
        let mut entity = Self::new(id);
        entity.uniforms = *renderable.defaults();
        entity
    }

    /// Builder pattern: set transform
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: set behavior
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Builder pattern: draw through a specific camera
    #[must_use]
    pub fn with_camera(mut self, camera: CameraId) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Builder pattern: set tint color
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.uniforms.color = color;
        self
    }

    /// Builder pattern: set atlas UV rectangle
    #[must_use]
    pub fn with_sub_rect(mut self, sub_rect: Vec4) -> Self {
        self.uniforms.sub_rect = sub_rect;
        self
    }

    /// Builder pattern: set texture/tint mix
    #[must_use]
    pub fn with_color_mix(mut self, color_mix: f32) -> Self {
        self.uniforms.color_mix = color_mix;
        self
    }

    /// Transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable transform
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Renderable this entity is drawn with
    pub fn renderable(&self) -> RenderableId {
        self.renderable
    }

    /// Camera override; `None` draws through the main camera
    pub fn camera(&self) -> Option<CameraId> {
        self.camera
    }

    /// Instance uniforms
    pub fn uniforms(&self) -> &InstanceUniforms {
        &self.uniforms
    }

    /// Mutable instance uniforms
    pub fn uniforms_mut(&mut self) -> &mut InstanceUniforms {
        &mut self.uniforms
    }

    /// Attached behavior
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Mutable attached behavior
    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// Replace the behavior
    ///
    /// Called from inside the running behavior, the replacement takes effect
    /// from the next update.
    pub fn set_behavior(&mut self, behavior: Behavior) {
        self.behavior = behavior;
        self.behavior_replaced = true;
    }

    /// Whether the entity has been logically deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Logically delete; the pool reclaims the slot on a later insert
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Run the behavior for one tick; deleted entities are skipped
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.deleted {
            return;
        }

        // The behavior gets the entity mutably, so it is detached while it runs
        let mut behavior = std::mem::take(&mut self.behavior);
        self.behavior_replaced = false;
        behavior.run(self, ctx);
        if !self.behavior_replaced {
            self.behavior = behavior;
        }
    }

    /// Submit one draw; returns `false` for deleted entities
    pub fn draw(&mut self, ctx: &mut RenderContext<'_>) -> Result<bool, RenderError> {
        if self.deleted {
            return Ok(false);
        }

        let transformation = ctx.view_matrix(self.camera) * self.transform.matrix();
        ctx.submit(self.renderable, &transformation, &self.uniforms)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::CountingLoader;
    use crate::assets::AssetCache;
    use crate::foundation::math::{Mat3, Point2, Vec2};
    use crate::input::InputState;
    use crate::render::{CameraRegistry, RecordingBackend, RenderableStore};
    use approx::assert_relative_eq;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn test_clone_is_independent_but_shares_renderable() {
        let template = Entity::new(RenderableId::default())
            .with_transform(Transform::at(1.0, 1.0))
            .with_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
        let mut copy = template.clone();
        copy.transform_mut().move_by(5.0, 0.0);
        copy.uniforms_mut().color_mix = 0.5;

        assert_eq!(copy.renderable(), template.renderable());
        assert_eq!(template.transform().position(), Vec2::new(1.0, 1.0));
        assert_eq!(template.uniforms().color_mix, 0.0);
    }

    #[test]
    fn test_deleted_entity_does_not_update() {
        let mut entity = Entity::new(RenderableId::default()).with_behavior(Behavior::custom(|e, _| {
            e.transform_mut().move_by(1.0, 0.0);
        }));
        let input = InputState::new();

        let mut ctx = UpdateContext::new(0.0, 0.016, &input);
        entity.update(&mut ctx);
        assert_eq!(entity.transform().x(), 1.0);

        entity.mark_deleted();
        entity.update(&mut ctx);
        assert_eq!(entity.transform().x(), 1.0);
    }

    #[test]
    fn test_behavior_survives_update_unless_replaced() {
        let mut entity = Entity::new(RenderableId::default()).with_behavior(Behavior::custom(|e, _| {
            if e.transform().x() >= 2.0 {
                e.set_behavior(Behavior::custom(|e, _| e.mark_deleted()));
            } else {
                e.transform_mut().move_by(1.0, 0.0);
            }
        }));
        let input = InputState::new();
        let mut ctx = UpdateContext::new(0.0, 0.016, &input);

        for _ in 0..3 {
            entity.update(&mut ctx);
        }
        assert_eq!(entity.transform().x(), 2.0);
        assert!(!entity.is_deleted());

        entity.update(&mut ctx);
        assert!(entity.is_deleted());
    }

    #[test]
    fn test_behavior_can_switch_itself_to_passive() {
        let mut entity = Entity::new(RenderableId::default()).with_behavior(Behavior::custom(|e, _| {
            e.transform_mut().move_by(1.0, 0.0);
            e.set_behavior(Behavior::Passive);
        }));
        let input = InputState::new();
        let mut ctx = UpdateContext::new(0.0, 0.016, &input);

        entity.update(&mut ctx);
        entity.update(&mut ctx);
        assert_eq!(entity.transform().x(), 1.0);
        assert!(matches!(entity.behavior(), Behavior::Passive));
    }

    #[test]
    fn test_draw_composes_camera_and_model() {
        let root = Path::new("assets");
        let mut assets = AssetCache::new(root, Box::new(CountingLoader::with_sprite_shader(root)));
        let shader = assets.shader("shaders/sprite").unwrap();

        let mut store = RenderableStore::new();
        let id = store.add(Renderable::flat(shader));
        let mut backend = RecordingBackend::new();
        store.finalize_all(&assets, &mut backend).unwrap();

        let mut cameras = CameraRegistry::new(Vec2::new(20.0, 20.0));
        let (main, _) = cameras.get_or_create("main");
        cameras.get_mut(main).unwrap().set_position(5.0, 0.0);

        let mut entity = Entity::from_renderable(id, store.get(id).unwrap())
            .with_transform(Transform::at(5.0, 0.0).with_scale(2.0, 2.0));
        let mut ctx = RenderContext {
            cameras: &mut cameras,
            renderables: &store,
            backend: &mut backend,
        };
        assert!(entity.draw(&mut ctx).unwrap());

        entity.mark_deleted();
        assert!(!entity.draw(&mut ctx).unwrap());

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].instance.color_mix, 1.0);
        let origin = draws[0].instance.matrix().transform_point(&Point2::origin());
        assert_relative_eq!(origin, Point2::origin(), epsilon = 1e-5);
        assert_ne!(draws[0].instance.matrix(), Mat3::identity());
    }

    #[test]
    fn test_custom_behavior_is_shared_between_clones() {
        let behavior = Behavior::custom(|e, ctx| e.transform_mut().move_by(ctx.dt, 0.0));
        let a = Entity::new(RenderableId::default()).with_behavior(behavior);
        let b = a.clone();
        match (a.behavior(), b.behavior()) {
            (Behavior::Custom(f), Behavior::Custom(g)) => assert!(Arc::ptr_eq(f, g)),
            _ => panic!("expected custom behaviors"),
        }
    }
}
