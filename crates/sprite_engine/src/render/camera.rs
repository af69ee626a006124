//! # 2D Camera
//!
//! A camera is the inverse of a model placement: moving the camera to the
//! right moves the whole world to the left. [`Camera2D`] therefore stores the
//! negated position and rotation and composes its matrix in reversed order:
//!
//! ```text
//! M = Scale(2 / frame_w, 2 / frame_h) * Rotate(angle) * Translate(position)
//! ```
//!
//! The result maps world units into normalized device coordinates where the
//! visible frame spans `[-1, 1]` on both axes. Caching follows the same rules
//! as [`Transform`](crate::scene::Transform): only a changed value invalidates.

use std::collections::HashMap;

use crate::foundation::collections::{CameraId, SlotMap};
use crate::foundation::math::{utils, Mat3, Mat3Ext, Point2, Vec2};

/// Name of the camera the engine draws through by default
pub const MAIN_CAMERA: &str = "main";

/// View/projection camera with a cached matrix
#[derive(Debug, Clone)]
pub struct Camera2D {
    // Both stored negated
    position: Vec2,
    angle: f32,
    frame: Vec2,
    cached: Mat3,
    dirty: bool,
    recomputes: u64,
}

impl Camera2D {
    /// Camera at the origin showing `width` x `height` world units
    ///
    /// # Panics
    /// Panics when either dimension is not positive.
    pub fn new(width: f32, height: f32) -> Self {
        check_frame(width, height);
        Self {
            position: Vec2::zeros(),
            angle: 0.0,
            frame: Vec2::new(width, height),
            cached: Mat3::identity(),
            dirty: true,
            recomputes: 0,
        }
    }

    /// Position of the viewer in world units
    pub fn position(&self) -> Vec2 {
        -self.position
    }

    /// Rotation of the viewer, normalized into `[0, 2π)`
    pub fn rotation(&self) -> f32 {
        utils::normalize_angle(-self.angle)
    }

    /// Visible span in world units
    pub fn frame_size(&self) -> Vec2 {
        self.frame
    }

    /// Whether the next matrix request will recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the matrix has been recomputed
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Center the view on `(x, y)`
    pub fn set_position(&mut self, x: f32, y: f32) {
        let next = Vec2::new(-x, -y);
        if next != self.position {
            self.position = next;
            self.dirty = true;
        }
    }

    /// Pan the view by `(dx, dy)`
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        let current = self.position();
        self.set_position(current.x + dx, current.y + dy);
    }

    /// Rotate the view to `radians`
    pub fn set_rotation(&mut self, radians: f32) {
        let next = utils::normalize_angle(-radians);
        if next != self.angle {
            self.angle = next;
            self.dirty = true;
        }
    }

    /// Rotate the view by `radians`
    pub fn rotate(&mut self, radians: f32) {
        self.set_rotation(self.rotation() + radians);
    }

    /// Set the visible span in world units
    ///
    /// # Panics
    /// Panics when either dimension is not positive.
    pub fn set_frame_size(&mut self, width: f32, height: f32) {
        check_frame(width, height);
        let next = Vec2::new(width, height);
        if next != self.frame {
            self.frame = next;
            self.dirty = true;
        }
    }

    /// Divide the frame by `factor`; values above 1 zoom in
    ///
    /// # Panics
    /// Panics when `factor` is not positive.
    pub fn zoom(&mut self, factor: f32) {
        assert!(factor > 0.0, "camera zoom factor must be > 0, got {factor}");
        self.set_frame_size(self.frame.x / factor, self.frame.y / factor);
    }

    /// View/projection matrix, recomputed only when something changed
    pub fn matrix(&mut self) -> Mat3 {
        if self.dirty {
            self.cached = Mat3::scaling_2d(2.0 / self.frame.x, 2.0 / self.frame.y)
                * Mat3::rotation_2d(self.angle)
                * Mat3::translation_2d(self.position.x, self.position.y);
            self.dirty = false;
            self.recomputes += 1;
        }
        self.cached
    }

    /// Map a world point into normalized device coordinates
    pub fn project(&mut self, world: Point2) -> Point2 {
        self.matrix().transform_point(&world)
    }
}

fn check_frame(width: f32, height: f32) {
    assert!(
        width > 0.0 && height > 0.0,
        "camera frame size must be > 0, got [{width:.2}, {height:.2}]"
    );
}

/// Named cameras
///
/// The first camera created becomes the main camera until one named
/// [`MAIN_CAMERA`] is created.
#[derive(Debug)]
pub struct CameraRegistry {
    cameras: SlotMap<CameraId, Camera2D>,
    names: HashMap<String, CameraId>,
    main: Option<CameraId>,
    default_frame: Vec2,
}

impl CameraRegistry {
    /// Empty registry; new cameras start with `default_frame`
    pub fn new(default_frame: Vec2) -> Self {
        Self {
            cameras: SlotMap::with_key(),
            names: HashMap::new(),
            main: None,
            default_frame,
        }
    }

    /// Look up a camera by name, creating it when missing
    ///
    /// Returns the id and whether the camera already existed.
    pub fn get_or_create(&mut self, name: &str) -> (CameraId, bool) {
        if let Some(&id) = self.names.get(name) {
            return (id, true);
        }

        let id = self
            .cameras
            .insert(Camera2D::new(self.default_frame.x, self.default_frame.y));
        self.names.insert(name.to_owned(), id);
        if self.main.is_none() || name == MAIN_CAMERA {
            self.main = Some(id);
        }
        log::debug!("Created camera '{name}'");
        (id, false)
    }

    /// Id registered under `name`
    pub fn id(&self, name: &str) -> Option<CameraId> {
        self.names.get(name).copied()
    }

    /// Camera by id
    pub fn get(&self, id: CameraId) -> Option<&Camera2D> {
        self.cameras.get(id)
    }

    /// Mutable camera by id
    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut Camera2D> {
        self.cameras.get_mut(id)
    }

    /// Id of the main camera
    pub fn main_id(&self) -> Option<CameraId> {
        self.main
    }

    /// Mutable main camera
    pub fn main_mut(&mut self) -> Option<&mut Camera2D> {
        self.main.and_then(|id| self.cameras.get_mut(id))
    }

    /// Matrix of the main camera, identity when there is none
    pub fn main_matrix(&mut self) -> Mat3 {
        self.main_mut().map_or_else(Mat3::identity, Camera2D::matrix)
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Whether no camera exists
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_position_maps_to_origin() {
        let mut camera = Camera2D::new(20.0, 20.0);
        camera.set_position(5.0, 0.0);
        let ndc = camera.project(Point2::new(5.0, 0.0));
        assert_relative_eq!(ndc, Point2::origin(), epsilon = 1e-5);
    }

    #[test]
    fn test_setters_store_negated_values() {
        let mut camera = Camera2D::new(20.0, 20.0);
        camera.set_position(3.0, -2.0);
        camera.set_rotation(HALF_PI);
        assert_eq!(camera.position(), Vec2::new(3.0, -2.0));
        assert_relative_eq!(camera.rotation(), HALF_PI, epsilon = 1e-6);
    }

    #[test]
    fn test_frame_edge_maps_to_ndc_edge() {
        let mut camera = Camera2D::new(20.0, 10.0);
        let ndc = camera.project(Point2::new(10.0, 5.0));
        assert_relative_eq!(ndc, Point2::new(1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_is_inverse_of_model_rotation() {
        let mut camera = Camera2D::new(2.0, 2.0);
        camera.set_rotation(HALF_PI);
        // a point straight "up" the viewer's rotated axis lands on +X
        let ndc = camera.project(Point2::new(0.0, 1.0));
        assert_relative_eq!(ndc, Point2::new(1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_divides_frame() {
        let mut camera = Camera2D::new(20.0, 10.0);
        camera.zoom(2.0);
        assert_eq!(camera.frame_size(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_camera_cache_matches_transform_rules() {
        let mut camera = Camera2D::new(20.0, 20.0);
        camera.set_position(1.0, 1.0);
        camera.matrix();
        camera.set_position(1.0, 1.0);
        camera.move_by(0.0, 0.0);
        camera.matrix();
        assert_eq!(camera.recompute_count(), 1);

        camera.move_by(1.0, 0.0);
        camera.matrix();
        assert_eq!(camera.recompute_count(), 2);
    }

    #[test]
    #[should_panic(expected = "zoom factor must be > 0")]
    fn test_zero_zoom_panics() {
        Camera2D::new(20.0, 20.0).zoom(0.0);
    }

    #[test]
    #[should_panic(expected = "frame size must be > 0")]
    fn test_negative_frame_panics() {
        Camera2D::new(20.0, 20.0).set_frame_size(-1.0, 5.0);
    }

    #[test]
    fn test_registry_get_or_create() {
        let mut registry = CameraRegistry::new(Vec2::new(20.0, 20.0));
        let (hud, existed) = registry.get_or_create("hud");
        assert!(!existed);
        assert_eq!(registry.main_id(), Some(hud));

        let (again, existed) = registry.get_or_create("hud");
        assert!(existed);
        assert_eq!(again, hud);

        let (main, _) = registry.get_or_create(MAIN_CAMERA);
        assert_eq!(registry.main_id(), Some(main));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_main_matrix_without_cameras_is_identity() {
        let mut registry = CameraRegistry::new(Vec2::new(20.0, 20.0));
        assert_eq!(registry.main_matrix(), Mat3::identity());
    }
}
