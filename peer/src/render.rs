//! Tile rendering of a simulation snapshot.

use macroquad::prelude::*;
use shared::{Coord, GRID_HEIGHT, GRID_WIDTH};

use crate::game::Snapshot;

const TILE_PIXELS: i32 = 10;
pub const TILE_SIZE: f32 = TILE_PIXELS as f32;
pub const WINDOW_WIDTH: i32 = GRID_WIDTH * TILE_PIXELS;
pub const WINDOW_HEIGHT: i32 = GRID_HEIGHT * TILE_PIXELS;

/// Draws one frame. Remote bodies first so the local snake stays visible
/// when bodies overlap; the food is drawn last.
pub fn draw(snapshot: &Snapshot) {
    clear_background(BLACK);

    for body in &snapshot.remote {
        for cell in body {
            draw_cell(*cell, SKYBLUE);
        }
    }
    for cell in &snapshot.local {
        draw_cell(*cell, GREEN);
    }
    draw_cell(snapshot.food, RED);

    draw_text(
        &format!("Length: {}", snapshot.local.len()),
        8.0,
        16.0,
        20.0,
        WHITE,
    );
}

fn draw_cell(cell: Coord, color: Color) {
    draw_rectangle(
        cell.x as f32 * TILE_SIZE,
        cell.y as f32 * TILE_SIZE,
        TILE_SIZE - 1.0,
        TILE_SIZE - 1.0,
        color,
    );
}
