//! Keyboard polling for the frame loop.

use macroquad::input::{is_key_pressed, is_quit_requested, KeyCode};
use shared::Direction;

/// Most recent directional key pressed this frame, if any. Arrows and
/// WASD are equivalent.
pub fn poll_direction() -> Option<Direction> {
    if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
        Some(Direction::Up)
    } else if is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S) {
        Some(Direction::Down)
    } else if is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A) {
        Some(Direction::Left)
    } else if is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D) {
        Some(Direction::Right)
    } else {
        None
    }
}

/// True on Escape or a window close request. Close requests are only
/// observable after `prevent_quit()` has been called at startup.
pub fn quit_requested() -> bool {
    is_key_pressed(KeyCode::Escape) || is_quit_requested()
}
