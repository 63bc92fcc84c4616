//! Rendering: draws one tick of the scene onto a 2D [`Surface`].
//!
//! This module receives read-only views of the current frame, the camera, and
//! the layer toggles, and produces pixels. It owns no state and mutates
//! nothing; the same inputs always produce the same draw calls.
//!
//! World geometry is drawn under a single transform: translate by the camera
//! offset, then scale by `(scale, -scale)` so world Y points up. Text and
//! fixed-size glyphs undo that locally with `(1/scale, -1/scale)` so labels
//! keep their pixel size and read upright.
//!
//! All fallible surface calls propagate errors via `Result<(), S::Error>`.
//! The top-level caller ([`crate::engine::EngineCore::tick`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use frames::{Entity, EntityId, Facing, Frame, Player};

use crate::camera::{Camera, Viewport};
use crate::consts::{
    AXIS_COLOR, AXIS_LINE_PX, BACKGROUND_COLOR, FACING_COLOR, FACING_HALF_WIDTH, FACING_TIP, FOLLOW_TARGET_COLOR,
    GRID_COLOR, GRID_HALF_EXTENT, GRID_LINE_PX, GRID_STEP, LABEL_COLOR, MONSTER_COLOR, MONSTER_LABEL_FONT,
    MONSTER_LABEL_MIN_SCALE, MONSTER_LABEL_RISE_PX, MONSTER_RADIUS, PLAYER_COLOR, PLAYER_LABEL_FONT,
    PLAYER_LABEL_RISE_PX, PLAYER_RADIUS, PROJECTILE_COLOR, PROJECTILE_RADIUS, WAITING_COLOR, WAITING_FONT,
    WAITING_TEXT,
};
use crate::input::LayerToggles;

/// The 2D drawing primitives the renderer needs.
///
/// Mirrors the browser's `CanvasRenderingContext2d`; infallible operations
/// return `()` and the rest return the surface's own error type.
pub trait Surface {
    type Error;

    /// Replace the current transform with the identity.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the surface rejects the transform.
    fn reset_transform(&self) -> Result<(), Self::Error>;
    fn save(&self);
    fn restore(&self);
    /// # Errors
    ///
    /// Returns `Err` if the surface rejects the transform.
    fn translate(&self, x: f64, y: f64) -> Result<(), Self::Error>;
    /// # Errors
    ///
    /// Returns `Err` if the surface rejects the transform.
    fn scale(&self, x: f64, y: f64) -> Result<(), Self::Error>;

    fn set_fill_style(&self, color: &str);
    fn set_stroke_style(&self, color: &str);
    fn set_line_width(&self, width: f64);
    fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64);

    fn begin_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn close_path(&self);
    /// # Errors
    ///
    /// Returns `Err` for a negative radius.
    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;
    fn fill(&self);
    fn stroke(&self);

    fn set_font(&self, font: &str);
    fn set_text_align(&self, align: &str);
    fn set_text_baseline(&self, baseline: &str);
    /// # Errors
    ///
    /// Returns `Err` if the surface cannot draw the text.
    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

/// Draw the full scene for one tick.
///
/// `frame` is `None` until the first frame is accepted; a "waiting" message
/// replaces the entity layers in that case. `follow_target` is highlighted.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw<S: Surface>(
    ctx: &S,
    frame: Option<&Frame>,
    camera: &Camera,
    follow_target: Option<&EntityId>,
    layers: &LayerToggles,
    viewport: Viewport,
) -> Result<(), S::Error> {
    // Layer 0: clear in screen space.
    ctx.reset_transform()?;
    ctx.set_fill_style(BACKGROUND_COLOR);
    ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);

    // Every save is matched by a restore, even when a layer fails.
    ctx.save();
    let drawn = draw_world(ctx, frame, camera, follow_target, layers);
    ctx.restore();
    drawn?;

    if frame.is_none() {
        draw_waiting(ctx, viewport)?;
    }

    Ok(())
}

/// Layers 1 to 4 under the camera transform. The caller owns save/restore.
fn draw_world<S: Surface>(
    ctx: &S,
    frame: Option<&Frame>,
    camera: &Camera,
    follow_target: Option<&EntityId>,
    layers: &LayerToggles,
) -> Result<(), S::Error> {
    ctx.translate(camera.offset_x, camera.offset_y)?;
    ctx.scale(camera.scale, -camera.scale)?;

    // Layer 1: background grid.
    if layers.grid {
        draw_grid(ctx, camera.scale);
    }

    let Some(frame) = frame else {
        return Ok(());
    };
    // Layer 2: monsters.
    if let Some(monsters) = frame.monsters.as_deref().filter(|_| layers.monsters) {
        draw_monsters(ctx, monsters, camera.scale)?;
    }
    // Layer 3: projectiles.
    if let Some(projectiles) = frame.projectiles.as_deref().filter(|_| layers.projectiles) {
        draw_projectiles(ctx, projectiles)?;
    }
    // Layer 4: players.
    if let Some(players) = frame.players.as_deref().filter(|_| layers.players) {
        draw_players(ctx, players, follow_target, camera.scale)?;
    }
    Ok(())
}

// =============================================================
// Grid
// =============================================================

fn draw_grid<S: Surface>(ctx: &S, scale: f64) {
    ctx.set_stroke_style(GRID_COLOR);
    ctx.set_line_width(GRID_LINE_PX / scale);
    ctx.begin_path();
    for v in grid_lines() {
        ctx.move_to(v, -GRID_HALF_EXTENT);
        ctx.line_to(v, GRID_HALF_EXTENT);
        ctx.move_to(-GRID_HALF_EXTENT, v);
        ctx.line_to(GRID_HALF_EXTENT, v);
    }
    ctx.stroke();

    ctx.set_stroke_style(AXIS_COLOR);
    ctx.set_line_width(AXIS_LINE_PX / scale);
    ctx.begin_path();
    ctx.move_to(-GRID_HALF_EXTENT, 0.0);
    ctx.line_to(GRID_HALF_EXTENT, 0.0);
    ctx.move_to(0.0, -GRID_HALF_EXTENT);
    ctx.line_to(0.0, GRID_HALF_EXTENT);
    ctx.stroke();
}

/// Lattice coordinates from `-GRID_HALF_EXTENT` to `GRID_HALF_EXTENT` inclusive.
fn grid_lines() -> impl Iterator<Item = f64> {
    #[allow(clippy::cast_possible_truncation)]
    let steps = (2.0 * GRID_HALF_EXTENT / GRID_STEP).round() as i32;
    (0..=steps).map(|i| f64::from(i).mul_add(GRID_STEP, -GRID_HALF_EXTENT))
}

// =============================================================
// Entity layers
// =============================================================

fn draw_monsters<S: Surface>(ctx: &S, monsters: &[Entity], scale: f64) -> Result<(), S::Error> {
    ctx.set_fill_style(MONSTER_COLOR);
    for m in monsters {
        fill_circle(ctx, m.x, m.y, MONSTER_RADIUS)?;
    }

    if scale > MONSTER_LABEL_MIN_SCALE {
        for m in monsters {
            if let Some(id) = &m.id {
                draw_label(ctx, m.x, m.y, &id.to_string(), MONSTER_LABEL_FONT, MONSTER_LABEL_RISE_PX, scale)?;
            }
        }
    }
    Ok(())
}

fn draw_projectiles<S: Surface>(ctx: &S, projectiles: &[Entity]) -> Result<(), S::Error> {
    ctx.set_fill_style(PROJECTILE_COLOR);
    for p in projectiles {
        fill_circle(ctx, p.x, p.y, PROJECTILE_RADIUS)?;
    }
    Ok(())
}

fn draw_players<S: Surface>(
    ctx: &S,
    players: &[Player],
    follow_target: Option<&EntityId>,
    scale: f64,
) -> Result<(), S::Error> {
    for p in players {
        let color = if follow_target == Some(&p.id) { FOLLOW_TARGET_COLOR } else { PLAYER_COLOR };
        ctx.set_fill_style(color);
        fill_circle(ctx, p.x, p.y, PLAYER_RADIUS)?;
        draw_facing(ctx, p);
        draw_label(ctx, p.x, p.y, &format!("P{}", p.id), PLAYER_LABEL_FONT, PLAYER_LABEL_RISE_PX, scale)?;
    }
    Ok(())
}

/// Small triangle pointing the way the player faces. Skipped when unknown.
fn draw_facing<S: Surface>(ctx: &S, player: &Player) {
    let dir = match player.facing {
        Facing::Left => -1.0,
        Facing::Right => 1.0,
        Facing::Unknown => return,
    };
    let base_x = player.x + dir * PLAYER_RADIUS;
    let tip_x = player.x + dir * FACING_TIP;

    ctx.set_fill_style(FACING_COLOR);
    ctx.begin_path();
    ctx.move_to(tip_x, player.y);
    ctx.line_to(base_x, player.y + FACING_HALF_WIDTH);
    ctx.line_to(base_x, player.y - FACING_HALF_WIDTH);
    ctx.close_path();
    ctx.fill();
}

// =============================================================
// Text
// =============================================================

/// Draw `text` centered `rise_px` screen pixels above the world point.
fn draw_label<S: Surface>(
    ctx: &S,
    x: f64,
    y: f64,
    text: &str,
    font: &str,
    rise_px: f64,
    scale: f64,
) -> Result<(), S::Error> {
    ctx.save();
    let result = ctx.translate(x, y).and_then(|()| ctx.scale(1.0 / scale, -1.0 / scale)).and_then(|()| {
        ctx.set_fill_style(LABEL_COLOR);
        ctx.set_font(font);
        ctx.set_text_align("center");
        ctx.set_text_baseline("alphabetic");
        ctx.fill_text(text, 0.0, -rise_px)
    });
    ctx.restore();
    result
}

fn draw_waiting<S: Surface>(ctx: &S, viewport: Viewport) -> Result<(), S::Error> {
    let center = viewport.center();
    ctx.save();
    ctx.set_fill_style(WAITING_COLOR);
    ctx.set_font(WAITING_FONT);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let result = ctx.fill_text(WAITING_TEXT, center.x, center.y);
    ctx.restore();
    result
}

// =============================================================
// Helpers
// =============================================================

fn fill_circle<S: Surface>(ctx: &S, x: f64, y: f64, radius: f64) -> Result<(), S::Error> {
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, 2.0 * PI)?;
    ctx.fill();
    Ok(())
}
