//! Pointer routing: the overlay sees every event before the camera.

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use fbm_terrain::render::{Camera, CameraController, PointerButton};

use super::overlay::Overlay;

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Forward => PointerButton::Forward,
        MouseButton::Back => PointerButton::Back,
        _ => PointerButton::Other,
    }
}

/// Offer `event` to the overlay, then drive the camera with whatever it left.
/// Returns true if the overlay consumed the event.
pub fn route_event(
    overlay: Option<&mut (dyn Overlay + 'static)>,
    event: &WindowEvent,
    controller: &mut CameraController,
    camera: &mut Camera,
) -> bool {
    let consumed = match overlay {
        Some(overlay) => overlay.on_window_event(event),
        None => false,
    };

    match *event {
        // Releases always get through so a drag never outlives its button.
        WindowEvent::MouseInput { state, button, .. }
            if !consumed || state == ElementState::Released =>
        {
            controller.on_button(
                pointer_button(button),
                state == ElementState::Pressed,
                camera,
            );
        }
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = (position.x as f32, position.y as f32);
            if consumed {
                controller.track_cursor(x, y);
            } else {
                controller.on_cursor_moved(x, y, camera);
            }
        }
        WindowEvent::MouseWheel { delta, .. } if !consumed => match delta {
            MouseScrollDelta::LineDelta(_, y) => {
                controller.on_wheel(y, camera);
            }
            MouseScrollDelta::PixelDelta(pos) => {
                controller.on_scroll_pixels(pos.y as f32, camera);
            }
        },
        _ => {}
    }

    consumed
}
