//! Map identity and tile-based terrain obstruction.

use ahash::{AHashMap, AHashSet};
use emberfall_common::{PlayerId, TileCoord, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Size of a placed tile in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Which map the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapId {
    /// Non-combat hub with player-placed tiles
    Village,
    /// Open hunting grounds
    #[default]
    Wilderness,
    /// Enclosed combat area
    Dungeon,
}

impl MapId {
    /// Whether attacks and skills are allowed.
    #[must_use]
    pub fn allows_combat(self) -> bool {
        !matches!(self, Self::Village)
    }

    /// Whether movement is checked against placed tiles.
    #[must_use]
    pub fn uses_tile_occupancy(self) -> bool {
        matches!(self, Self::Village)
    }
}

/// Answers whether a world position is obstructed.
pub trait TileOccupancy {
    /// Whether `position` lies on a blocking tile.
    fn is_blocked(&self, position: Vec2) -> bool;
}

/// Read-only access to the external placed-tile store.
pub trait TileStore {
    /// Placed tiles for `player`, `None` if the store has no record.
    fn placed_tiles(&self, player: &PlayerId) -> Option<Vec<TileCoord>>;
}

/// Occupancy built from a list of placed tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacedTiles {
    tiles: AHashSet<TileCoord>,
}

impl PlacedTiles {
    /// Build from tile coordinates.
    #[must_use]
    pub fn new(tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
        }
    }

    /// Load the tiles `player` placed. `None` when the store has nothing.
    pub fn load(store: &dyn TileStore, player: &PlayerId) -> Option<Self> {
        match store.placed_tiles(player) {
            Some(tiles) => {
                debug!("Loaded {} placed tiles for {}", tiles.len(), player);
                Some(Self::new(tiles))
            },
            None => {
                warn!("No placed tiles for {player}, village movement will be blocked");
                None
            },
        }
    }

    /// Number of placed tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tiles are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileOccupancy for PlacedTiles {
    fn is_blocked(&self, position: Vec2) -> bool {
        self.tiles
            .contains(&TileCoord::from_world(position, TILE_SIZE))
    }
}

/// In-memory tile store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileStore {
    records: AHashMap<PlayerId, Vec<TileCoord>>,
}

impl MemoryTileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tiles recorded for `player`.
    pub fn insert(&mut self, player: PlayerId, tiles: Vec<TileCoord>) {
        self.records.insert(player, tiles);
    }
}

impl TileStore for MemoryTileStore {
    fn placed_tiles(&self, player: &PlayerId) -> Option<Vec<TileCoord>> {
        self.records.get(player).cloned()
    }
}

/// Everything the frame loop needs to know about the current map.
#[derive(Clone, Copy, Default)]
pub struct MapContext<'a> {
    /// Current map
    pub map: MapId,
    /// Terrain obstruction source, if one was loaded
    pub occupancy: Option<&'a dyn TileOccupancy>,
}

impl std::fmt::Debug for MapContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapContext")
            .field("map", &self.map)
            .field("occupancy", &self.occupancy.is_some())
            .finish()
    }
}

impl<'a> MapContext<'a> {
    /// Context for a map without terrain obstruction.
    #[must_use]
    pub fn open(map: MapId) -> Self {
        Self {
            map,
            occupancy: None,
        }
    }

    /// Context with an occupancy source.
    #[must_use]
    pub fn with_occupancy(map: MapId, occupancy: &'a dyn TileOccupancy) -> Self {
        Self {
            map,
            occupancy: Some(occupancy),
        }
    }

    /// Whether the player may stand at `position`.
    ///
    /// A map that needs occupancy but has none blocks all movement.
    #[must_use]
    pub fn is_walkable(&self, position: Vec2) -> bool {
        if !self.map.uses_tile_occupancy() {
            return true;
        }
        match self.occupancy {
            Some(occupancy) => !occupancy.is_blocked(position),
            None => {
                debug!("No occupancy source for {:?}, blocking movement", self.map);
                false
            },
        }
    }
}
