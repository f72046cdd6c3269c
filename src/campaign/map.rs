//! Campaign map - hex geometry and explored terrain
//!
//! Hexes use "even-r" offset coordinates: even rows are shifted half a hex
//! to the right, so the neighbour offsets depend on row parity. Coordinates
//! are absolute, centred on a large fixed offset (see `MapConfig::center`).

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Offset hex coordinate (col, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub col: i64,
    pub row: i64,
}

/// Neighbour offsets for even rows, indexed by `Direction`
const EVEN_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (1, 1), (0, 1), (-1, 0), (0, -1), (1, -1)];

/// Neighbour offsets for odd rows, indexed by `Direction`
const ODD_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1)];

impl HexCoord {
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }

    /// Coordinate relative to the grid centre
    pub fn normalized(&self, center: i64) -> HexCoord {
        HexCoord::new(self.col - center, self.row - center)
    }

    /// Absolute coordinate of a centre-relative one
    pub fn from_normalized(col: i64, row: i64, center: i64) -> HexCoord {
        HexCoord::new(col + center, row + center)
    }

    fn offsets(&self) -> &'static [(i64, i64); 6] {
        if self.row & 1 == 0 {
            &EVEN_ROW_OFFSETS
        } else {
            &ODD_ROW_OFFSETS
        }
    }

    /// The adjacent hex in a given direction
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        let (dc, dr) = self.offsets()[direction as usize];
        HexCoord::new(self.col + dc, self.row + dr)
    }

    /// All 6 adjacent hexes, in `Direction` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Direction leading from this hex to an adjacent one
    ///
    /// Returns `None` when `other` is not a neighbour.
    pub fn direction_to(&self, other: &HexCoord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.neighbor(*d) == *other)
    }

    /// Convert to cube coordinates for distance calculations
    pub fn to_cube(&self) -> (i64, i64, i64) {
        let x = self.col - (self.row + (self.row & 1)) / 2;
        let z = self.row;
        let y = -x - z;
        (x, y, z)
    }

    /// Distance in hex steps
    pub fn distance(&self, other: &HexCoord) -> u64 {
        let (ax, ay, az) = self.to_cube();
        let (bx, by, bz) = other.to_cube();
        (ax - bx)
            .unsigned_abs()
            .max((ay - by).unsigned_abs())
            .max((az - bz).unsigned_abs())
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// The six hex directions, numbered the way the backend expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    East = 0,
    NorthEast = 1,
    NorthWest = 2,
    West = 3,
    SouthWest = 4,
    SouthEast = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Self::East,
        Self::NorthEast,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::SouthEast,
    ];

    pub fn opposite(&self) -> Direction {
        Self::ALL[(*self as usize + 3) % 6]
    }
}

/// Terrain tag assigned to a hex the first time it is explored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    DeepOcean,
    Ocean,
    Beach,
    Scorched,
    Bare,
    Tundra,
    Snow,
    TemperateDesert,
    Shrubland,
    Taiga,
    Grassland,
    TemperateDeciduousForest,
    TemperateRainForest,
    SubtropicalDesert,
    TropicalSeasonalForest,
    TropicalRainForest,
}

impl Biome {
    pub const ALL: [Biome; 16] = [
        Self::DeepOcean,
        Self::Ocean,
        Self::Beach,
        Self::Scorched,
        Self::Bare,
        Self::Tundra,
        Self::Snow,
        Self::TemperateDesert,
        Self::Shrubland,
        Self::Taiga,
        Self::Grassland,
        Self::TemperateDeciduousForest,
        Self::TemperateRainForest,
        Self::SubtropicalDesert,
        Self::TropicalSeasonalForest,
        Self::TropicalRainForest,
    ];
}

/// Explored hexes and their biomes
///
/// Biomes are write-once: the first recorded biome for a hex wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExploredMap {
    biomes: AHashMap<HexCoord, Biome>,
}

impl ExploredMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the biome of a freshly explored hex
    ///
    /// Returns `false` (and keeps the existing biome) if the hex was already explored.
    pub fn record(&mut self, coord: HexCoord, biome: Biome) -> bool {
        if self.biomes.contains_key(&coord) {
            return false;
        }
        self.biomes.insert(coord, biome);
        true
    }

    pub fn biome(&self, coord: &HexCoord) -> Option<Biome> {
        self.biomes.get(coord).copied()
    }

    pub fn is_explored(&self, coord: &HexCoord) -> bool {
        self.biomes.contains_key(coord)
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HexCoord, &Biome)> {
        self.biomes.iter()
    }

    /// Generate an explored disc of pseudo-random terrain
    ///
    /// Every hex within `radius` of `origin` is explored. Used by the demo
    /// binary and the benches.
    pub fn generate_simple(origin: HexCoord, radius: i64, seed: u64) -> Self {
        let mut map = Self::new();

        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let coord = HexCoord::new(origin.col + dc, origin.row + dr);
                if origin.distance(&coord) > radius.unsigned_abs() {
                    continue;
                }
                let hash = Self::simple_hash(coord.col, coord.row, seed);
                let biome = Biome::ALL[(hash % Biome::ALL.len() as u64) as usize];
                map.record(coord, biome);
            }
        }

        map
    }

    fn simple_hash(col: i64, row: i64, seed: u64) -> u64 {
        let mut h = seed;
        h = h.wrapping_mul(31).wrapping_add(col as u64);
        h = h.wrapping_mul(31).wrapping_add(row as u64);
        h ^ (h >> 16)
    }
}

impl FromIterator<(HexCoord, Biome)> for ExploredMap {
    fn from_iter<I: IntoIterator<Item = (HexCoord, Biome)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (coord, biome) in iter {
            map.record(coord, biome);
        }
        map
    }
}
