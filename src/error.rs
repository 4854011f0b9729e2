use std::path::PathBuf;

use crate::world::SpriteKind;

/// Map text that cannot become a `TileMap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    Empty,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    DuplicateStart {
        first: (i32, i32),
        second: (i32, i32),
    },
    /// The player start is a wall or lies outside the grid
    StartNotWalkable((i32, i32)),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Empty => write!(f, "map has no rows"),
            MapError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {} is {} cells wide, expected {}",
                row, found, expected
            ),
            MapError::DuplicateStart { first, second } => write!(
                f,
                "map has more than one player start: {:?} and {:?}",
                first, second
            ),
            MapError::StartNotWalkable(cell) => {
                write!(f, "player start {:?} is not an empty floor cell", cell)
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Texture loading failures. All of these are fatal at startup.
#[derive(Debug)]
pub enum AssetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Decode(png::DecodingError),
    Size {
        width: u32,
        height: u32,
        expected: usize,
    },
    Layout {
        found: String,
        expected: String,
    },
    Missing(String),
    WallCode(u8),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            AssetError::Decode(e) => write!(f, "cannot decode texture: {}", e),
            AssetError::Size {
                width,
                height,
                expected,
            } => write!(
                f,
                "texture is {}x{}, expected {}x{}",
                width, height, expected, expected
            ),
            AssetError::Layout { found, expected } => {
                write!(f, "texture has {} pixels, expected {}", found, expected)
            }
            AssetError::Missing(name) => write!(f, "required texture '{}' is missing", name),
            AssetError::WallCode(code) => {
                write!(f, "wall code {} cannot carry a texture (valid: 1..=9)", code)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<png::DecodingError> for AssetError {
    fn from(e: png::DecodingError) -> Self {
        AssetError::Decode(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroDimension { width: usize, height: usize },
    FieldOfView(f32),
    BlackDistance(f32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroDimension { width, height } => {
                write!(f, "screen size {}x{} has a zero dimension", width, height)
            }
            ConfigError::FieldOfView(fov) => write!(
                f,
                "field of view {:.1} degrees is outside (0, 180)",
                fov.to_degrees()
            ),
            ConfigError::BlackDistance(d) => {
                write!(f, "black distance {} must be positive and finite", d)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Content or configuration errors surfaced by the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    UnknownWall(u8),
    MissingSprite(SpriteKind),
    Config(ConfigError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::UnknownWall(code) => {
                write!(f, "map references wall code {} which has no texture", code)
            }
            RenderError::MissingSprite(kind) => {
                write!(f, "map places a {:?} sprite which has no texture", kind)
            }
            RenderError::Config(e) => write!(f, "invalid render config: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        RenderError::Config(e)
    }
}
