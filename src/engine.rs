use std::time::Instant;

use log::{info, trace};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::{ConfigError, RenderError};
use crate::framebuffer::FrameBuffer;
use crate::raycaster::RayHit;
use crate::renderer;
use crate::texture::TextureBank;
use crate::world::TileMap;

/// Player commands issued by the surrounding driver between ticks
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// Positive forward, negative back
    MoveForward(f32),
    /// Positive right, negative left
    Strafe(f32),
    /// Relative turn in radians, counter-clockwise positive
    Rotate(f32),
    /// Absolute facing in radians
    RotateTo(f32),
    SetFieldOfView(f32),
    SetBlackDistance(f32),
}

/// Owns the level, its textures and the player camera, and renders one frame
/// per `tick` into a double-buffered frame.
pub struct Engine {
    map: TileMap,
    textures: TextureBank,
    camera: Camera,
    front: FrameBuffer,
    back: FrameBuffer,
    hits: Vec<RayHit>,
    frame_count: u64,
    walltime_ms: f64,
}

impl Engine {
    /// Validates config and content; the player starts at the map's start
    /// cell facing north.
    pub fn new(
        config: RenderConfig,
        map: TileMap,
        textures: TextureBank,
    ) -> Result<Self, RenderError> {
        config.validate()?;

        for code in map.wall_codes() {
            if textures.wall(code).is_none() {
                return Err(RenderError::UnknownWall(code));
            }
        }
        for kind in map.sprite_kinds() {
            if textures.sprite(kind).is_none() {
                return Err(RenderError::MissingSprite(kind));
            }
        }

        let camera = Camera::new(
            map.start_position(),
            std::f32::consts::FRAC_PI_2,
            config.field_of_view,
            config.black_distance,
        );

        info!(
            "engine ready: {}x{} map, {}x{} screen, start {}",
            map.width(),
            map.height(),
            config.width,
            config.height,
            camera.pos
        );

        Ok(Self {
            map,
            textures,
            camera,
            front: FrameBuffer::new(config.width, config.height),
            back: FrameBuffer::new(config.width, config.height),
            hits: Vec::new(),
            frame_count: 0,
            walltime_ms: 0.0,
        })
    }

    pub fn apply(&mut self, command: Command) -> Result<(), ConfigError> {
        match command {
            Command::MoveForward(amount) => {
                self.camera.move_forward(&self.map, amount);
            }
            Command::Strafe(amount) => {
                self.camera.strafe(&self.map, amount);
            }
            Command::Rotate(delta) => self.camera.rotate(delta),
            Command::RotateTo(angle) => self.camera.rotate_to(angle),
            Command::SetFieldOfView(fov) => self.camera.set_fov(fov)?,
            Command::SetBlackDistance(distance) => self.camera.set_black_distance(distance)?,
        }
        Ok(())
    }

    /// Renders a frame. On error the previously completed frame stays visible.
    pub fn tick(&mut self, walltime_ms: f64) -> Result<(), RenderError> {
        let started = Instant::now();

        let hits = renderer::render_frame(&mut self.back, &self.map, &self.textures, &self.camera)?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.hits = hits;
        self.frame_count += 1;
        self.walltime_ms = walltime_ms;

        trace!(
            "frame {} at {:.0} ms rendered in {:.2} ms",
            self.frame_count,
            walltime_ms,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Last completed frame
    pub fn frame(&self) -> &FrameBuffer {
        &self.front
    }

    /// Per-column ray results of the last completed frame
    pub fn last_hits(&self) -> &[RayHit] {
        &self.hits
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Wall-clock time passed to the last successful tick
    pub fn walltime_ms(&self) -> f64 {
        self.walltime_ms
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::SpriteKind;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 40,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn rejects_missing_content() {
        let map = TileMap::parse(&["111", "1g1", "111"]).unwrap();
        let full = TextureBank::procedural();
        let mut no_sprites = TextureBank::new(full.floor().clone(), full.ceiling().clone()).unwrap();
        no_sprites.set_wall(1, full.wall(1).unwrap().clone()).unwrap();
        assert_eq!(
            Engine::new(small_config(), map.clone(), no_sprites).err(),
            Some(RenderError::MissingSprite(SpriteKind::Gargoyle))
        );

        let bare = TextureBank::new(full.floor().clone(), full.ceiling().clone()).unwrap();
        assert_eq!(
            Engine::new(small_config(), map, bare).err(),
            Some(RenderError::UnknownWall(1))
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = RenderConfig {
            height: 0,
            ..small_config()
        };
        assert!(matches!(
            Engine::new(bad, TileMap::demo(), TextureBank::procedural()),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn tick_swaps_in_a_new_frame() {
        let mut engine =
            Engine::new(small_config(), TileMap::demo(), TextureBank::procedural()).unwrap();
        assert_eq!(engine.frame_count(), 0);
        assert!(engine.frame().pixels().iter().all(|&p| p == 0));

        engine.tick(16.0).unwrap();
        assert_eq!(engine.frame_count(), 1);
        assert_eq!(engine.last_hits().len(), 64);
        assert_eq!(engine.walltime_ms(), 16.0);
        assert!(engine.frame().pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn commands_drive_the_camera() {
        let mut engine =
            Engine::new(small_config(), TileMap::demo(), TextureBank::procedural()).unwrap();
        let start = engine.camera().pos;

        engine.apply(Command::RotateTo(0.0)).unwrap();
        engine.apply(Command::MoveForward(0.5)).unwrap();
        assert!((engine.camera().pos.x - (start.x + 0.5)).abs() < 1e-5);

        engine.apply(Command::SetFieldOfView(90f32.to_radians())).unwrap();
        assert!((engine.camera().plane.magnitude() - 1.0).abs() < 1e-5);
        assert!(engine.apply(Command::SetBlackDistance(0.0)).is_err());
        engine.apply(Command::SetBlackDistance(8.0)).unwrap();
        assert_eq!(engine.camera().black_distance(), 8.0);
    }
}
