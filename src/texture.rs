use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;

use crate::config::TEXTURE_SIZE;
use crate::error::AssetError;
use crate::world::SpriteKind;

/// Highest wall code that can carry a texture
pub const MAX_WALL_CODE: u8 = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl ChannelLayout {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ChannelLayout::Rgb => "RGB",
            ChannelLayout::Rgba => "RGBA",
        }
    }
}

#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16) | ((a as u32) << 24)
}

#[inline]
pub fn texel_alpha(texel: u32) -> u8 {
    (texel >> 24) as u8
}

/// Square `TEXTURE_SIZE` texel grid, stored row-major as packed ARGB.
#[derive(Clone, Debug)]
pub struct Texture {
    pixels: Vec<u32>,
    layout: ChannelLayout,
}

impl Texture {
    /// Wraps raw interleaved 8-bit channel data.
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: &[u8],
    ) -> Result<Self, AssetError> {
        check_size(width, height)?;
        let channels = layout.channels();
        let expected_len = TEXTURE_SIZE * TEXTURE_SIZE * channels;
        if data.len() != expected_len {
            return Err(AssetError::Layout {
                found: format!("{} bytes", data.len()),
                expected: format!("{} bytes of {}", expected_len, layout.name()),
            });
        }

        let pixels = data
            .chunks_exact(channels)
            .map(|px| {
                let alpha = if channels == 4 { px[3] } else { 0xFF };
                pack_argb(px[0], px[1], px[2], alpha)
            })
            .collect();

        Ok(Self { pixels, layout })
    }

    /// Builds a texture from a per-texel generator taking (x, y).
    pub fn from_fn(layout: ChannelLayout, f: impl Fn(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(TEXTURE_SIZE * TEXTURE_SIZE);
        for y in 0..TEXTURE_SIZE {
            for x in 0..TEXTURE_SIZE {
                let texel = f(x, y);
                pixels.push(match layout {
                    ChannelLayout::Rgb => texel | 0xFF00_0000,
                    ChannelLayout::Rgba => texel,
                });
            }
        }
        Self { pixels, layout }
    }

    /// Decodes an 8-bit RGB or RGBA PNG stream. Other bit depths are rejected.
    pub fn from_png<R: Read>(reader: R) -> Result<Self, AssetError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;

        let (width, height, bit_depth) = {
            let info = reader.info();
            (info.width, info.height, info.bit_depth)
        };
        check_size(width, height)?;
        if bit_depth != png::BitDepth::Eight {
            return Err(AssetError::Layout {
                found: format!("{} bits per sample", bit_depth as u8),
                expected: "8 bits per sample".into(),
            });
        }

        let mut buf = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf)?;
        let layout = match frame.color_type {
            png::ColorType::Rgb => ChannelLayout::Rgb,
            png::ColorType::Rgba => ChannelLayout::Rgba,
            other => {
                return Err(AssetError::Layout {
                    found: format!("{:?}", other),
                    expected: "RGB or RGBA".into(),
                });
            }
        };

        Self::from_raw(width, height, layout, &buf[..frame.buffer_size()])
    }

    pub fn from_png_file(path: &Path) -> Result<Self, AssetError> {
        let file = File::open(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_png(BufReader::new(file))
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        self.pixels[(y & (TEXTURE_SIZE - 1)) * TEXTURE_SIZE + (x & (TEXTURE_SIZE - 1))]
    }

    /// Samples at normalized coordinates, wrapping outside [0, 1) so textures tile.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        self.texel(wrap_coord(u), wrap_coord(v))
    }

    fn expect_layout(self, expected: ChannelLayout) -> Result<Self, AssetError> {
        if self.layout == expected {
            Ok(self)
        } else {
            Err(AssetError::Layout {
                found: self.layout.name().into(),
                expected: expected.name().into(),
            })
        }
    }
}

#[inline]
fn wrap_coord(t: f32) -> usize {
    let frac = t - t.floor();
    // frac * SIZE can round up to SIZE; the mask folds it back to 0
    ((frac * TEXTURE_SIZE as f32) as usize) & (TEXTURE_SIZE - 1)
}

fn check_size(width: u32, height: u32) -> Result<(), AssetError> {
    if width as usize != TEXTURE_SIZE || height as usize != TEXTURE_SIZE {
        return Err(AssetError::Size {
            width,
            height,
            expected: TEXTURE_SIZE,
        });
    }
    Ok(())
}

fn sprite_file_stem(kind: SpriteKind) -> &'static str {
    match kind {
        SpriteKind::Gargoyle => "gargoyle",
        SpriteKind::Hero => "hero",
        SpriteKind::Treasure => "treasure",
    }
}

/// All textures used by one renderer. Wall and sprite lookups are plain
/// array indexing by wall code and sprite kind.
#[derive(Clone, Debug)]
pub struct TextureBank {
    walls: Vec<Option<Texture>>, // index = wall code, slot 0 unused
    sprites: Vec<Option<Texture>>,
    floor: Texture,
    ceiling: Texture,
}

impl TextureBank {
    pub fn new(floor: Texture, ceiling: Texture) -> Result<Self, AssetError> {
        Ok(Self {
            walls: vec![None; MAX_WALL_CODE as usize + 1],
            sprites: vec![None; SpriteKind::ALL.len()],
            floor: floor.expect_layout(ChannelLayout::Rgb)?,
            ceiling: ceiling.expect_layout(ChannelLayout::Rgb)?,
        })
    }

    pub fn set_wall(&mut self, code: u8, texture: Texture) -> Result<(), AssetError> {
        if code == 0 || code > MAX_WALL_CODE {
            return Err(AssetError::WallCode(code));
        }
        self.walls[code as usize] = Some(texture.expect_layout(ChannelLayout::Rgb)?);
        Ok(())
    }

    pub fn set_sprite(&mut self, kind: SpriteKind, texture: Texture) -> Result<(), AssetError> {
        self.sprites[kind.index()] = Some(texture.expect_layout(ChannelLayout::Rgba)?);
        Ok(())
    }

    #[inline]
    pub fn wall(&self, code: u8) -> Option<&Texture> {
        self.walls.get(code as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn sprite(&self, kind: SpriteKind) -> Option<&Texture> {
        self.sprites[kind.index()].as_ref()
    }

    #[inline]
    pub fn floor(&self) -> &Texture {
        &self.floor
    }

    #[inline]
    pub fn ceiling(&self) -> &Texture {
        &self.ceiling
    }

    /// Loads `floor.png` and `ceiling.png` (required), `wall-<code>.png` for
    /// codes 1..=9 and `<sprite>.png` for each sprite kind (all optional).
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let required = |name: &str| -> Result<Texture, AssetError> {
            load_optional(&dir.join(format!("{name}.png")))?
                .ok_or_else(|| AssetError::Missing(format!("{name}.png")))
        };

        let mut bank = Self::new(required("floor")?, required("ceiling")?)?;

        let mut wall_count = 0;
        for code in 1..=MAX_WALL_CODE {
            if let Some(texture) = load_optional(&dir.join(format!("wall-{code}.png")))? {
                bank.set_wall(code, texture)?;
                wall_count += 1;
            }
        }

        let mut sprite_count = 0;
        for kind in SpriteKind::ALL {
            let path = dir.join(format!("{}.png", sprite_file_stem(kind)));
            if let Some(texture) = load_optional(&path)? {
                bank.set_sprite(kind, texture)?;
                sprite_count += 1;
            }
        }

        info!(
            "loaded textures from {}: {} walls, {} sprites",
            dir.display(),
            wall_count,
            sprite_count
        );
        Ok(bank)
    }

    /// Complete bank drawn in code: bricks for every wall code, a checker
    /// floor, a plank ceiling and cut-out sprite silhouettes.
    pub fn procedural() -> Self {
        let mut walls = vec![None; MAX_WALL_CODE as usize + 1];
        for code in 1..=MAX_WALL_CODE {
            walls[code as usize] = Some(brick_texture(WALL_TINTS[code as usize - 1]));
        }

        let sprites = SpriteKind::ALL
            .iter()
            .map(|&kind| Some(sprite_texture(kind)))
            .collect();

        Self {
            walls,
            sprites,
            floor: Texture::from_fn(ChannelLayout::Rgb, |x, y| {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    pack_argb(110, 105, 100, 0xFF)
                } else {
                    pack_argb(70, 66, 62, 0xFF)
                }
            }),
            ceiling: Texture::from_fn(ChannelLayout::Rgb, |x, y| {
                let seam = y % 16 == 0 || (x + (y / 16) * 24) % 64 == 0;
                if seam {
                    pack_argb(60, 40, 25, 0xFF)
                } else {
                    pack_argb(120, 85, 50, 0xFF)
                }
            }),
        }
    }
}

fn load_optional(path: &Path) -> Result<Option<Texture>, AssetError> {
    if !path.is_file() {
        return Ok(None);
    }
    Texture::from_png_file(path).map(Some)
}

const WALL_TINTS: [[u8; 3]; MAX_WALL_CODE as usize] = [
    [150, 150, 150],
    [160, 70, 50],
    [90, 110, 160],
    [80, 140, 80],
    [150, 90, 150],
    [190, 170, 80],
    [200, 140, 160],
    [210, 130, 60],
    [90, 170, 170],
];

fn brick_texture(tint: [u8; 3]) -> Texture {
    Texture::from_fn(ChannelLayout::Rgb, move |x, y| {
        let course = y / 16;
        let shift = if course % 2 == 0 { 0 } else { 16 };
        let mortar = y % 16 == 0 || (x + shift) % 32 == 0;
        if mortar {
            pack_argb(200, 200, 190, 0xFF)
        } else {
            // Slight per-brick shading so adjacent bricks read apart
            let shade = 0.85 + 0.15 * (((x + shift) / 32 + course) % 2) as f32;
            pack_argb(
                (tint[0] as f32 * shade) as u8,
                (tint[1] as f32 * shade) as u8,
                (tint[2] as f32 * shade) as u8,
                0xFF,
            )
        }
    })
}

fn sprite_texture(kind: SpriteKind) -> Texture {
    let half = TEXTURE_SIZE as f32 / 2.0;
    Texture::from_fn(ChannelLayout::Rgba, move |x, y| {
        let (fx, fy) = (x as f32 + 0.5 - half, y as f32 + 0.5 - half);
        let inside = match kind {
            // Hunched round body
            SpriteKind::Gargoyle => (fx / 26.0).powi(2) + ((fy - 6.0) / 24.0).powi(2) <= 1.0,
            // Head over a narrow body
            SpriteKind::Hero => {
                fx * fx + (fy + 20.0) * (fy + 20.0) <= 81.0
                    || (fx.abs() <= 10.0 && fy >= -11.0)
            }
            // Chest on the floor
            SpriteKind::Treasure => fx.abs() <= 24.0 && fy >= 4.0,
        };
        if !inside {
            return 0;
        }
        match kind {
            SpriteKind::Gargoyle => pack_argb(90, 95, 100, 0xFF),
            SpriteKind::Hero => pack_argb(40, 90, 200, 0xFF),
            SpriteKind::Treasure => pack_argb(220, 180, 40, 0xFF),
        }
    })
}
