use crate::camera::Camera;
use crate::vector::Vec2;
use crate::world::TileMap;

/// Which family of grid lines the ray crossed last
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// An x = const line; the wall face runs along Y
    Vertical,
    /// A y = const line; the wall face runs along X
    Horizontal,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// `None` when nothing was hit before the black distance
    pub wall: Option<u8>,
    /// Perpendicular distance to the camera plane. The black distance on a miss.
    pub distance: f32,
    /// Position along the hit wall face, in [0, 1)
    pub texture_u: f32,
    pub side: Side,
}

/// Grid DDA traversal for one frame's camera.
#[derive(Copy, Clone)]
pub struct RayCaster<'a> {
    map: &'a TileMap,
    camera: &'a Camera,
    width: usize,
}

impl<'a> RayCaster<'a> {
    pub fn new(map: &'a TileMap, camera: &'a Camera, width: usize) -> Self {
        Self { map, camera, width }
    }

    /// Casts the ray for screen column `x` in `[0, width)`.
    #[inline]
    pub fn cast(&self, x: usize) -> RayHit {
        self.cast_ray(self.camera.ray_direction(x, self.width))
    }

    /// Casts an arbitrary (not necessarily unit) ray from the camera position.
    /// Distances are in units of the ray's projection on the camera direction,
    /// so rays built as `dir + k * plane` yield fisheye-free distances.
    pub fn cast_ray(&self, ray: Vec2) -> RayHit {
        let pos = self.camera.pos;
        let black = self.camera.black_distance();

        // Cell containing the camera
        let mut map_x = pos.x.floor() as i32;
        let mut map_y = pos.y.floor() as i32;

        // Ray length between successive grid lines per axis
        let delta_x = if ray.x == 0.0 {
            f32::INFINITY
        } else {
            (1.0 / ray.x).abs()
        };
        let delta_y = if ray.y == 0.0 {
            f32::INFINITY
        } else {
            (1.0 / ray.y).abs()
        };

        // A zero component takes the positive branch, so inf never meets a 0 factor
        let (step_x, mut side_x) = if ray.x < 0.0 {
            (-1, (pos.x - map_x as f32) * delta_x)
        } else {
            (1, (map_x as f32 + 1.0 - pos.x) * delta_x)
        };
        let (step_y, mut side_y) = if ray.y < 0.0 {
            (-1, (pos.y - map_y as f32) * delta_y)
        } else {
            (1, (map_y as f32 + 1.0 - pos.y) * delta_y)
        };

        let miss = |side| RayHit {
            wall: None,
            distance: black,
            texture_u: 0.0,
            side,
        };

        let (wall, side) = loop {
            // Ties step in X
            let side = if side_x <= side_y {
                if side_x >= black {
                    return miss(Side::Vertical);
                }
                side_x += delta_x;
                map_x += step_x;
                Side::Vertical
            } else {
                if side_y >= black {
                    return miss(Side::Horizontal);
                }
                side_y += delta_y;
                map_y += step_y;
                Side::Horizontal
            };

            // Out-of-grid cells come back as BOUNDARY, which ends the walk
            let wall = self.map.wall_at(map_x, map_y);
            if wall != 0 {
                break (wall, side);
            }
        };

        let distance = match side {
            Side::Vertical => (map_x as f32 - pos.x + (1 - step_x) as f32 / 2.0) / ray.x,
            Side::Horizontal => (map_y as f32 - pos.y + (1 - step_y) as f32 / 2.0) / ray.y,
        };

        if !(distance > 0.0 && distance < black) {
            return miss(side);
        }

        let along = match side {
            Side::Vertical => pos.y + distance * ray.y,
            Side::Horizontal => pos.x + distance * ray.x,
        };

        RayHit {
            wall: Some(wall),
            distance,
            texture_u: wall_fraction(along),
            side,
        }
    }
}

/// Fractional part in [0, 1). A tiny negative input would otherwise round up to 1.
#[inline]
fn wall_fraction(along: f32) -> f32 {
    (along - along.floor()).min(1.0 - f32::EPSILON)
}
