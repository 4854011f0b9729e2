//! Software ray-casting renderer for grid dungeons: per-column DDA traversal,
//! textured walls, mirrored floor/ceiling, billboard sprites and a z-buffer,
//! all drawn into a packed `u32` frame buffer.

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod raycaster;
pub mod renderer;
pub mod texture;
pub mod vector;
pub mod world;

pub use camera::Camera;
pub use config::{RenderConfig, TEXTURE_SIZE};
pub use engine::{Command, Engine};
pub use error::{AssetError, ConfigError, MapError, RenderError};
pub use framebuffer::FrameBuffer;
pub use raycaster::{RayCaster, RayHit, Side};
pub use texture::{ChannelLayout, Texture, TextureBank};
pub use vector::Vec2;
pub use world::{SpriteKind, TileMap};
