use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::MapError;
use crate::vector::Vec2;

/// Wall code reported for any cell outside the grid
pub const BOUNDARY: u8 = 255;

/// Billboard actors and decorations that can stand in a map cell
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpriteKind {
    Gargoyle,
    Hero,
    Treasure,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 3] = [SpriteKind::Gargoyle, SpriteKind::Hero, SpriteKind::Treasure];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'g' => Some(SpriteKind::Gargoyle),
            'h' => Some(SpriteKind::Hero),
            't' => Some(SpriteKind::Treasure),
            _ => None,
        }
    }

    /// Billboard height as a fraction of a full wall
    pub fn scale(self) -> f32 {
        match self {
            SpriteKind::Gargoyle => 0.8,
            SpriteKind::Hero => 0.7,
            SpriteKind::Treasure => 0.6,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

const START_MARK: char = 's';

/// Static level geometry. Cell (0, 0) is bottom-left.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: usize,
    height: usize,
    cells: Vec<u8>, // row-major, row 0 = bottom
    sprites: BTreeMap<(i32, i32), SpriteKind>,
    start: (i32, i32),
}

impl TileMap {
    /// Builds a map from rows listed top row first.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::Empty);
        }
        let height = rows.len();

        let mut cells = vec![0u8; width * height];
        let mut sprites = BTreeMap::new();
        let mut start: Option<(i32, i32)> = None;

        // Flip so that row 0 is the bottom of the map
        for (y, line) in rows.iter().rev().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: height - 1 - y,
                    expected: width,
                    found,
                });
            }

            for (x, c) in line.chars().enumerate() {
                let cell = (x as i32, y as i32);
                if let Some(code) = c.to_digit(10) {
                    cells[y * width + x] = code as u8;
                } else if c == START_MARK {
                    if let Some(first) = start {
                        return Err(MapError::DuplicateStart {
                            first,
                            second: cell,
                        });
                    }
                    start = Some(cell);
                } else if let Some(kind) = SpriteKind::from_char(c) {
                    sprites.insert(cell, kind);
                }
            }
        }

        let map = Self {
            width,
            height,
            cells,
            sprites,
            start: start.unwrap_or((1, 1)),
        };
        if map.wall_at(map.start.0, map.start.1) != 0 {
            return Err(MapError::StartNotWalkable(map.start));
        }
        Ok(map)
    }

    /// The stock 20x10 dungeon with two wall materials and a few actors.
    pub fn demo() -> Self {
        // Static content; parse cannot fail on it
        match Self::parse(&DEMO_MAP) {
            Ok(map) => map,
            Err(e) => unreachable!("demo map is malformed: {e}"),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Wall code at an integer cell; `BOUNDARY` outside the grid.
    #[inline]
    pub fn wall_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return BOUNDARY;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// Wall code of the cell containing a continuous point.
    #[inline]
    pub fn wall_at_point(&self, x: f32, y: f32) -> u8 {
        self.wall_at(x.floor() as i32, y.floor() as i32)
    }

    pub fn sprite_at(&self, x: i32, y: i32) -> Option<SpriteKind> {
        self.sprites.get(&(x, y)).copied()
    }

    pub fn sprites(&self) -> impl Iterator<Item = ((i32, i32), SpriteKind)> + '_ {
        self.sprites.iter().map(|(&cell, &kind)| (cell, kind))
    }

    #[inline]
    pub fn start(&self) -> (i32, i32) {
        self.start
    }

    /// Center of the start cell
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(self.start.0 as f32 + 0.5, self.start.1 as f32 + 0.5)
    }

    /// Every non-empty wall code present in the grid
    pub fn wall_codes(&self) -> BTreeSet<u8> {
        self.cells.iter().copied().filter(|&c| c != 0).collect()
    }

    pub fn sprite_kinds(&self) -> BTreeSet<SpriteKind> {
        self.sprites.values().copied().collect()
    }
}

impl FromStr for TileMap {
    type Err = MapError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::parse(&rows)
    }
}

const DEMO_MAP: [&str; 10] = [
    "11111111111111111111",
    "1..................1",
    "1..111111222222.2221",
    "1.....1.....2.....t1",
    "1.g...1.gh..2..h...1",
    "1...111t....2222...1",
    "1....t1222..2......1",
    "1....g.222..2.1.2.11",
    "1.h.......s........1",
    "11111111111111111111",
];
