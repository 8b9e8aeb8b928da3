//! Snake grid projection
//!
//! Turns a `SnakeState` into a flat list of 2D draw commands. The platform
//! replays them on a Canvas2D context; tests inspect them directly.

use glam::Vec2;

use crate::sim::SnakeState;

pub const BACKGROUND: &str = "white";
pub const GRID_LINE: &str = "#f0f0f0";
pub const SNAKE: &str = "#ff4d6d";
pub const FOOD_GLYPH: &str = "\u{2764}\u{fe0f}";

/// Gap between a segment and its cell edge (px)
const CELL_PADDING: f32 = 1.0;
const CELL_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { size: f32, color: &'static str },
    Line { from: Vec2, to: Vec2, color: &'static str },
    RoundRect { origin: Vec2, size: f32, radius: f32, color: &'static str },
    /// Text centered on `center`
    Glyph { text: &'static str, center: Vec2, px: f32 },
}

/// Project the grid onto a square canvas of `canvas_px` pixels
pub fn project(state: &SnakeState, canvas_px: f32) -> Vec<DrawCommand> {
    let cells = state.grid_size.max(1);
    let block = canvas_px / cells as f32;
    let mut commands = Vec::with_capacity(2 + 2 * cells as usize + state.len() + 1);

    commands.push(DrawCommand::Clear {
        size: canvas_px,
        color: BACKGROUND,
    });

    for i in 0..cells {
        let offset = i as f32 * block;
        commands.push(DrawCommand::Line {
            from: Vec2::new(offset, 0.0),
            to: Vec2::new(offset, canvas_px),
            color: GRID_LINE,
        });
        commands.push(DrawCommand::Line {
            from: Vec2::new(0.0, offset),
            to: Vec2::new(canvas_px, offset),
            color: GRID_LINE,
        });
    }

    let cell = (block - 2.0 * CELL_PADDING).max(0.0);
    for segment in &state.body {
        commands.push(DrawCommand::RoundRect {
            origin: Vec2::new(segment.x as f32, segment.y as f32) * block + Vec2::splat(CELL_PADDING),
            size: cell,
            radius: CELL_RADIUS,
            color: SNAKE,
        });
    }

    let food = Vec2::new(state.food.x as f32, state.food.y as f32);
    commands.push(DrawCommand::Glyph {
        text: FOOD_GLYPH,
        center: (food + Vec2::splat(0.5)) * block,
        px: (block * 0.8).floor(),
    });

    commands
}
