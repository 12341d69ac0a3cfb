use glam::{Affine3A, Mat4, Vec3};
use std::f32::consts::{FRAC_PI_4, PI};

/// Radians of rotation per pixel of pointer motion.
pub const ROTATE_SENSITIVITY: f32 = 0.01;
/// World units of pan per pixel of pointer motion.
pub const PAN_SENSITIVITY: f32 = 0.01;
/// World units per wheel notch.
pub const DOLLY_STEP: f32 = 0.15;
/// Touchpad scroll pixels that add up to one wheel notch.
pub const PIXELS_PER_NOTCH: f32 = 100.0;

/// Perspective projection with a fixed vertical field of view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view (radians), in (0, PI).
    pub fov_y: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(FRAC_PI_4, 1.0, 0.125, 8192.0)
    }
}

impl Projection {
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        debug_assert!(fov_y > 0.0 && fov_y < PI);
        debug_assert!(near > 0.0 && near < far);
        Self {
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// Keep the vertical extent, let the horizontal one follow `aspect`.
    pub fn fit_height_to_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Horizontal field of view implied by `fov_y` and the aspect ratio.
    pub fn fov_x(&self) -> f32 {
        2.0 * ((self.fov_y * 0.5).tan() * self.aspect).atan()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Free camera stored as its inverse world transform (the view transform).
///
/// "World" operations pre-multiply the view transform, so they act along the
/// camera's own axes; "local" operations post-multiply and act in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub inv_world: Affine3A,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            inv_world: Affine3A::from_translation(Vec3::new(0.0, -1.0, -8.0)),
            projection: Projection::default(),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotate_about_world_x(&mut self, angle: f32) {
        self.inv_world = Affine3A::from_rotation_x(angle) * self.inv_world;
    }

    pub fn rotate_about_local_y(&mut self, angle: f32) {
        self.inv_world = self.inv_world * Affine3A::from_rotation_y(angle);
    }

    pub fn translate_world(&mut self, offset: Vec3) {
        self.inv_world = Affine3A::from_translation(offset) * self.inv_world;
    }

    /// Pitch about the view x axis first, then yaw about the world y axis.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.rotate_about_world_x(-ROTATE_SENSITIVITY * delta_y);
        self.rotate_about_local_y(ROTATE_SENSITIVITY * delta_x);
    }

    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.translate_world(Vec3::new(
            PAN_SENSITIVITY * delta_x,
            -PAN_SENSITIVITY * delta_y,
            0.0,
        ));
    }

    /// Move along the viewing axis. Positive `direction` moves toward the scene.
    pub fn dolly(&mut self, direction: f32) {
        self.translate_world(Vec3::new(0.0, 0.0, DOLLY_STEP * direction.signum()));
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from(self.inv_world)
    }

    pub fn model_view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix()
    }

    /// Camera position in world space.
    pub fn eye_position(&self) -> Vec3 {
        Vec3::from(self.inv_world.inverse().translation)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.projection.fit_height_to_aspect(aspect);
    }
}

/// Mouse buttons the camera reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    /// Extra button that dollies toward the scene.
    Forward,
    /// Extra button that dollies away from the scene.
    Back,
    Other,
}

/// Maps raw pointer input onto camera operations.
#[derive(Clone, Debug, Default)]
pub struct CameraController {
    pub mouse_left: bool,
    pub mouse_right: bool,
    /// Last cursor position, tracked on every motion event.
    pub last_cursor: (f32, f32),
    /// Touchpad scroll not yet worth a full notch.
    pub scroll_pixels: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a button press or release. Returns true if the camera moved.
    pub fn on_button(&mut self, button: PointerButton, pressed: bool, camera: &mut Camera) -> bool {
        match (button, pressed) {
            (PointerButton::Left, _) => self.mouse_left = pressed,
            (PointerButton::Right, _) => self.mouse_right = pressed,
            (PointerButton::Forward, true) => {
                camera.dolly(1.0);
                return true;
            }
            (PointerButton::Back, true) => {
                camera.dolly(-1.0);
                return true;
            }
            _ => {}
        }
        false
    }

    /// Record the cursor position without moving the camera.
    pub fn track_cursor(&mut self, x: f32, y: f32) {
        self.last_cursor = (x, y);
    }

    /// Handle cursor motion. Returns true if the camera moved.
    pub fn on_cursor_moved(&mut self, x: f32, y: f32, camera: &mut Camera) -> bool {
        let delta_x = x - self.last_cursor.0;
        let delta_y = y - self.last_cursor.1;
        self.last_cursor = (x, y);

        if self.mouse_left {
            camera.orbit(delta_x, delta_y);
        }
        if self.mouse_right {
            camera.pan(delta_x, delta_y);
        }
        self.mouse_left || self.mouse_right
    }

    /// Handle a wheel step. Returns true if the camera moved.
    pub fn on_wheel(&mut self, delta: f32, camera: &mut Camera) -> bool {
        if delta == 0.0 {
            return false;
        }
        camera.dolly(delta);
        true
    }

    /// Handle pixel-precise scrolling. Dollies once per [`PIXELS_PER_NOTCH`]
    /// accumulated in one direction. Returns true if the camera moved.
    pub fn on_scroll_pixels(&mut self, delta: f32, camera: &mut Camera) -> bool {
        if !delta.is_finite() {
            return false;
        }
        if delta.signum() != self.scroll_pixels.signum() {
            self.scroll_pixels = 0.0;
        }
        self.scroll_pixels += delta;

        let mut moved = false;
        while self.scroll_pixels.abs() >= PIXELS_PER_NOTCH {
            camera.dolly(self.scroll_pixels);
            self.scroll_pixels -= PIXELS_PER_NOTCH.copysign(self.scroll_pixels);
            moved = true;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_left_drag_is_pure_yaw() {
        let mut camera = Camera::new();
        let start = camera.inv_world;
        let mut controller = CameraController::new();
        controller.on_button(PointerButton::Left, true, &mut camera);
        controller.on_cursor_moved(10.0, 0.0, &mut camera);

        let expected = Affine3A::from_rotation_x(0.0) * start * Affine3A::from_rotation_y(0.1);
        assert!(camera.inv_world.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn test_orbit_order() {
        let mut camera = Camera::new();
        let start = camera.inv_world;
        camera.orbit(5.0, 20.0);

        let expected = Affine3A::from_rotation_x(-0.2) * start * Affine3A::from_rotation_y(0.05);
        assert!(camera.inv_world.abs_diff_eq(expected, EPS));

        // Pitch lives on the view side: applying it on the world side instead differs.
        let world_side = start * Affine3A::from_rotation_x(-0.2) * Affine3A::from_rotation_y(0.05);
        assert!(!camera.inv_world.abs_diff_eq(world_side, EPS));
    }

    #[test]
    fn test_motion_without_buttons_only_tracks_cursor() {
        let mut camera = Camera::new();
        let start = camera;
        let mut controller = CameraController::new();
        assert!(!controller.on_cursor_moved(40.0, 30.0, &mut camera));
        assert_eq!(camera, start);
        assert_eq!(controller.last_cursor, (40.0, 30.0));

        // First drag delta is measured from the tracked position, not the origin.
        controller.on_button(PointerButton::Right, true, &mut camera);
        controller.on_cursor_moved(50.0, 30.0, &mut camera);
        let eye_shift = camera.eye_position() - start.eye_position();
        assert!(eye_shift.abs_diff_eq(Vec3::new(-0.1, 0.0, 0.0), EPS), "{:?}", eye_shift);
    }

    #[test]
    fn test_release_clears_flags() {
        let mut camera = Camera::new();
        let mut controller = CameraController::new();
        controller.on_button(PointerButton::Left, true, &mut camera);
        controller.on_button(PointerButton::Right, true, &mut camera);
        controller.on_button(PointerButton::Left, false, &mut camera);
        assert!(!controller.mouse_left);
        assert!(controller.mouse_right);
        controller.on_button(PointerButton::Right, false, &mut camera);
        assert!(!controller.mouse_right);
    }

    #[test]
    fn test_dolly_moves_along_view_axis() {
        let mut camera = Camera::new();
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 1.0, 8.0), EPS));

        let mut controller = CameraController::new();
        controller.on_wheel(1.0, &mut camera);
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 1.0, 7.85), EPS));

        controller.on_button(PointerButton::Back, true, &mut camera);
        controller.on_button(PointerButton::Back, true, &mut camera);
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 1.0, 8.15), EPS));
    }

    #[test]
    fn test_pixel_scroll_accumulates_into_notches() {
        let mut camera = Camera::new();
        let start = camera;
        let mut controller = CameraController::new();

        for _ in 0..9 {
            assert!(!controller.on_scroll_pixels(10.0, &mut camera));
        }
        assert_eq!(camera, start);

        assert!(controller.on_scroll_pixels(10.0, &mut camera));
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 1.0, 7.85), EPS));

        // Reversing direction drops the partial notch.
        controller.on_scroll_pixels(60.0, &mut camera);
        assert!(!controller.on_scroll_pixels(-60.0, &mut camera));
        assert!(controller.on_scroll_pixels(-40.0, &mut camera));
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 1.0, 8.0), EPS));
    }

    #[test]
    fn test_default_projection_is_valid() {
        let projection = Projection::default();
        assert_eq!(
            projection,
            Projection::perspective(FRAC_PI_4, 1.0, 0.125, 8192.0)
        );
        assert!(projection.near < projection.far);
        assert!(projection.fov_y > 0.0 && projection.fov_y < PI);
    }

    #[test]
    fn test_fit_height_to_aspect() {
        let mut projection = Projection::default();
        projection.fit_height_to_aspect(1024.0 / 768.0);

        assert_eq!(projection.fov_y, FRAC_PI_4);
        let expected = 2.0 * ((FRAC_PI_4 * 0.5).tan() * (1024.0 / 768.0)).atan();
        assert!((projection.fov_x() - expected).abs() < EPS);

        // Matrix x/y scale ratio equals the aspect ratio.
        let m = projection.matrix();
        assert!((m.y_axis.y / m.x_axis.x - 1024.0 / 768.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_aspect_is_ignored() {
        let mut projection = Projection::default();
        projection.fit_height_to_aspect(2.0);
        projection.fit_height_to_aspect(0.0);
        projection.fit_height_to_aspect(f32::NAN);
        assert_eq!(projection.aspect, 2.0);
    }
}
