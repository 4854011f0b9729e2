use log::debug;

use crate::config::{check_black_distance, check_field_of_view};
use crate::error::ConfigError;
use crate::vector::Vec2;
use crate::world::TileMap;

/// How close the player may get to a wall face
const WALL_MARGIN: f32 = 0.1;

#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub pos: Vec2,   // continuous map position, never inside a wall cell
    pub dir: Vec2,   // unit facing direction
    pub plane: Vec2, // perpendicular to dir, |plane| = tan(fov / 2)
    fov: f32,
    black_distance: f32,
}

impl Camera {
    pub fn new(pos: Vec2, angle: f32, fov: f32, black_distance: f32) -> Self {
        let mut camera = Self {
            pos,
            dir: Vec2::new(1.0, 0.0),
            plane: Vec2::ZERO,
            fov,
            black_distance,
        };
        camera.rotate_to(angle);
        camera
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[inline]
    pub fn black_distance(&self) -> f32 {
        self.black_distance
    }

    /// Facing angle in (-pi, pi]
    #[inline]
    pub fn angle(&self) -> f32 {
        self.dir.angle()
    }

    /// Projection constant relating world distance to on-screen size.
    /// Shared by walls, floor, ceiling and sprites so the horizon stays level.
    #[inline]
    pub fn screen_distance(&self, width: usize, height: usize) -> f32 {
        0.5 / ((0.5 * self.fov).tan() * height as f32 / width as f32)
    }

    /// Ray direction through screen column `x` of `width`.
    #[inline]
    pub fn ray_direction(&self, x: usize, width: usize) -> Vec2 {
        let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
        self.dir + self.plane * camera_x
    }

    /// Linear fade: 1 at the eye, 0 at the black distance and beyond.
    #[inline]
    pub fn brightness(&self, distance: f32) -> f32 {
        (1.0 - distance / self.black_distance).max(0.0)
    }

    pub fn rotate(&mut self, delta: f32) {
        self.rotate_to(self.angle() + delta);
    }

    pub fn rotate_to(&mut self, angle: f32) {
        self.dir = Vec2::from_angle(angle);
        self.plane = self.dir.perpendicular() * (0.5 * self.fov).tan();
    }

    pub fn set_fov(&mut self, fov: f32) -> Result<(), ConfigError> {
        check_field_of_view(fov)?;
        self.fov = fov;
        self.rotate(0.0);
        debug!("field of view set to {:.1} degrees", fov.to_degrees());
        Ok(())
    }

    pub fn set_black_distance(&mut self, distance: f32) -> Result<(), ConfigError> {
        check_black_distance(distance)?;
        self.black_distance = distance;
        debug!("black distance set to {}", distance);
        Ok(())
    }

    /// Moves along the facing direction; negative goes backwards.
    pub fn move_forward(&mut self, map: &TileMap, amount: f32) -> bool {
        let target = self.pos + self.dir.normalized() * amount;
        self.move_to(map, target)
    }

    /// Sidesteps; positive goes right.
    pub fn strafe(&mut self, map: &TileMap, amount: f32) -> bool {
        let target = self.pos + self.dir.normalized().perpendicular() * amount;
        self.move_to(map, target)
    }

    /// Rejects targets inside walls and keeps a margin from nearby wall faces.
    fn move_to(&mut self, map: &TileMap, target: Vec2) -> bool {
        let (mut x, mut y) = (target.x, target.y);
        if map.wall_at_point(x, y) != 0 {
            return false;
        }

        if map.wall_at_point(x + WALL_MARGIN, y) != 0 {
            x = x.floor() + 1.0 - WALL_MARGIN;
        }
        if map.wall_at_point(x - WALL_MARGIN, y) != 0 {
            x = x.floor() + WALL_MARGIN;
        }
        if map.wall_at_point(x, y + WALL_MARGIN) != 0 {
            y = y.floor() + 1.0 - WALL_MARGIN;
        }
        if map.wall_at_point(x, y - WALL_MARGIN) != 0 {
            y = y.floor() + WALL_MARGIN;
        }

        self.pos = Vec2::new(x, y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn corridor() -> TileMap {
        TileMap::parse(&["11111", "1...1", "1...1", "1...1", "11111"]).unwrap()
    }

    fn camera_at(x: f32, y: f32, angle: f32) -> Camera {
        Camera::new(Vec2::new(x, y), angle, 60f32.to_radians(), 4.5)
    }

    #[test]
    fn plane_tracks_direction_and_fov() {
        let mut cam = camera_at(2.5, 2.5, FRAC_PI_2);
        assert!((cam.dir.x).abs() < 1e-6 && (cam.dir.y - 1.0).abs() < 1e-6);
        let half = (30f32).to_radians().tan();
        assert!((cam.plane.x - half).abs() < 1e-6);
        assert!(cam.plane.dot(cam.dir).abs() < 1e-6);

        cam.set_fov(90f32.to_radians()).unwrap();
        assert!((cam.plane.magnitude() - 1.0).abs() < 1e-5);
        assert!(cam.set_fov(0.0).is_err());
        assert!(cam.set_black_distance(-1.0).is_err());
    }

    #[test]
    fn rotation_relative_and_absolute() {
        let mut cam = camera_at(2.5, 2.5, 0.0);
        cam.rotate(FRAC_PI_2);
        assert!((cam.angle() - FRAC_PI_2).abs() < 1e-5);
        cam.rotate_to(PI);
        assert!((cam.dir.x + 1.0).abs() < 1e-6);
        assert!((cam.dir.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn walking_into_a_wall_stays_outside() {
        let map = corridor();
        // Facing east toward the wall at x = 4
        let mut cam = camera_at(3.5, 2.5, 0.0);
        assert!(!cam.move_forward(&map, 1.0));
        assert_eq!(cam.pos, Vec2::new(3.5, 2.5));

        assert!(cam.move_forward(&map, 0.45));
        assert_eq!(map.wall_at_point(cam.pos.x, cam.pos.y), 0);
        assert!((cam.pos.x - 3.9).abs() < 1e-5);
    }

    #[test]
    fn strafing_keeps_margin() {
        let map = corridor();
        // Facing north; strafing right heads east
        let mut cam = camera_at(2.5, 2.5, FRAC_PI_2);
        assert!(cam.strafe(&map, 1.48));
        assert!(cam.pos.x <= 3.9 + 1e-5);
        assert_eq!(map.wall_at_point(cam.pos.x, cam.pos.y), 0);

        // Lands at x = 1.05, within the margin of the west wall
        assert!(cam.strafe(&map, -2.85));
        assert!((cam.pos.x - 1.1).abs() < 1e-4);
    }

    #[test]
    fn brightness_fades_linearly() {
        let cam = camera_at(2.5, 2.5, 0.0);
        assert_eq!(cam.brightness(0.0), 1.0);
        assert!((cam.brightness(2.25) - 0.5).abs() < 1e-6);
        assert_eq!(cam.brightness(10.0), 0.0);
    }
}
