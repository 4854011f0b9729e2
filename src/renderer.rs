use rayon::prelude::*;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::framebuffer::{FrameBuffer, shade};
use crate::raycaster::{RayCaster, RayHit};
use crate::texture::{Texture, TextureBank, texel_alpha};
use crate::vector::Vec2;
use crate::world::{BOUNDARY, TileMap};

/// Sprite texels at or below this alpha are cut out
const ALPHA_CUTOFF: u8 = 200;

/// Sprites nearer than this (perpendicular) are skipped
const MIN_SPRITE_DISTANCE: f32 = 0.2;

/// Lowest ceiling size reported; keeps `height - 2 * ceiling` inside i32
/// when the eye touches a wall face.
const MIN_CEILING: f32 = -(1 << 28) as f32;

/// Rows of empty space above (and, mirrored, below) a wall at `distance`.
/// Negative when the wall is taller than the screen.
#[inline]
pub fn ceiling_size(height: usize, d_screen: f32, distance: f32) -> i32 {
    let rows = (height as f32 * (1.0 - d_screen / distance) / 2.0).round();
    rows.clamp(MIN_CEILING, height as f32) as i32
}

/// Casts one ray per column, in parallel. Columns are independent and only
/// read the map and camera.
pub fn cast_columns(map: &TileMap, camera: &Camera, width: usize) -> Vec<RayHit> {
    let caster = RayCaster::new(map, camera, width);
    (0..width).into_par_iter().map(|x| caster.cast(x)).collect()
}

/// Renders one complete frame: walls, then floor and ceiling, then sprites.
/// Returns the per-column hits it drew from.
pub fn render_frame(
    buf: &mut FrameBuffer,
    map: &TileMap,
    textures: &TextureBank,
    camera: &Camera,
) -> Result<Vec<RayHit>, RenderError> {
    buf.clear();

    let width = buf.width();
    let height = buf.height();
    let d_screen = camera.screen_distance(width, height);

    let hits = cast_columns(map, camera, width);

    let mut ceiling_sizes = vec![0i32; width];
    for (x, hit) in hits.iter().enumerate() {
        let ceiling = ceiling_size(height, d_screen, hit.distance);
        ceiling_sizes[x] = ceiling;

        match hit.wall {
            Some(code) if code != BOUNDARY => {
                let texture = textures.wall(code).ok_or(RenderError::UnknownWall(code))?;
                let brightness = camera.brightness(hit.distance);
                draw_wall_column(buf, x, ceiling, hit.distance, brightness, texture, hit.texture_u);
            }
            // Past the black distance or off the map: void
            _ => draw_void_column(buf, x, ceiling, hit.distance),
        }
    }

    draw_floor_and_ceiling(buf, textures, camera, &ceiling_sizes, d_screen);
    draw_sprites(buf, map, textures, camera, d_screen)?;

    Ok(hits)
}

fn draw_wall_column(
    buf: &mut FrameBuffer,
    x: usize,
    ceiling: i32,
    distance: f32,
    brightness: f32,
    texture: &Texture,
    texture_u: f32,
) {
    let height = buf.height() as i32;
    let start = ceiling.max(0);
    let wall_height = height as f32 - 2.0 * ceiling as f32;

    for y in start..height - start {
        let v = (y as f32 - ceiling as f32) / wall_height;
        let color = shade(texture.sample(texture_u, v), brightness);
        buf.set_pixel(x, y as usize, distance, color);
    }
}

fn draw_void_column(buf: &mut FrameBuffer, x: usize, ceiling: i32, distance: f32) {
    let height = buf.height() as i32;
    let start = ceiling.max(0);
    for y in start..height - start {
        buf.set_pixel(x, y as usize, distance, 0);
    }
}

/// Floor and ceiling are mirror images about the horizon (eye at half a wall),
/// so each ground distance is computed once and sampled for both rows.
fn draw_floor_and_ceiling(
    buf: &mut FrameBuffer,
    textures: &TextureBank,
    camera: &Camera,
    ceiling_sizes: &[i32],
    d_screen: f32,
) {
    let width = buf.width();
    let height = buf.height();

    let tallest = ceiling_sizes.iter().copied().max().unwrap_or(0);
    let horizon_limit = ceiling_size(height, d_screen, camera.black_distance());
    let rows = tallest.min(horizon_limit);
    if rows <= 0 {
        return;
    }

    let ceiling_tex = textures.ceiling();
    let floor_tex = textures.floor();

    for y in 0..rows as usize {
        let sy = 0.5 - y as f32 / height as f32;
        let d_ground = 0.5 * d_screen / sy;
        let brightness = camera.brightness(d_ground);

        for (x, &column_ceiling) in ceiling_sizes.iter().enumerate() {
            if (y as i32) >= column_ceiling || d_ground >= buf.depth(x, y) {
                continue;
            }
            let world = camera.pos + camera.ray_direction(x, width) * d_ground;

            let color = shade(ceiling_tex.sample(world.x, world.y), brightness);
            buf.set_pixel(x, y, d_ground, color);
            let color = shade(floor_tex.sample(world.x, world.y), brightness);
            buf.set_pixel(x, height - 1 - y, d_ground, color);
        }
    }
}

/// Wraps an angle difference into (-pi, pi].
#[inline]
fn wrap_angle(mut a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while a <= -PI {
        a += TAU;
    }
    while a > PI {
        a -= TAU;
    }
    a
}

/// Camera-facing billboards standing on the floor, depth tested per texel.
fn draw_sprites(
    buf: &mut FrameBuffer,
    map: &TileMap,
    textures: &TextureBank,
    camera: &Camera,
    d_screen: f32,
) -> Result<(), RenderError> {
    let width = buf.width();
    let height = buf.height() as i32;
    let half_fov_tan = (0.5 * camera.fov()).tan();
    let view_cone = camera.fov() / 1.4;
    let facing = camera.angle();

    for ((mx, my), kind) in map.sprites() {
        let center = Vec2::new(mx as f32 + 0.5, my as f32 + 0.5);
        let offset = center - camera.pos;
        let distance = offset.magnitude();
        // Positive means right of the view axis
        let view_angle = wrap_angle(facing - offset.angle());

        if distance >= camera.black_distance() || view_angle.abs() >= view_cone {
            continue;
        }
        let perp = distance * view_angle.cos();
        if perp < MIN_SPRITE_DISTANCE {
            continue;
        }

        let texture = textures.sprite(kind).ok_or(RenderError::MissingSprite(kind))?;
        let brightness = camera.brightness(perp);

        // Same tangent projection as the ray fan
        let middle = (1.0 + view_angle.tan() / half_fov_tan) * 0.5 * width as f32;

        let ceiling = ceiling_size(height as usize, d_screen, perp);
        let full_height = height - 2 * ceiling;
        let size = (kind.scale() * full_height as f32) as i32;
        if size <= 0 {
            continue;
        }

        // Feet on the floor line
        let mut y_offset = ((1.0 - kind.scale()) * full_height as f32) as i32 + ceiling;
        let mut tex_y_offset = 0;
        if y_offset < 0 {
            tex_y_offset = -y_offset;
            y_offset = 0;
        }

        let left = middle - size as f32 / 2.0;
        let x_start = left.max(0.0) as usize;
        let x_end = ((middle + size as f32 / 2.0).max(0.0) as usize).min(width);
        let rows = (size - tex_y_offset).min(height - y_offset);

        for y in 0..rows {
            let v = (y + tex_y_offset) as f32 / size as f32;
            let screen_y = (y + y_offset) as usize;
            for x in x_start..x_end {
                let u = (x as f32 - left) / size as f32;
                let texel = texture.sample(u, v);
                if texel_alpha(texel) > ALPHA_CUTOFF {
                    buf.set_pixel(x, screen_y, perp, shade(texel, brightness));
                }
            }
        }
    }

    Ok(())
}
