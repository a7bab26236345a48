//! The fixed neighbour graph over tile positions.
//!
//! Tiles live in an arena and are addressed by [`TileId`]. Each id maps to at
//! most four neighbours. The graph is built once and never rewired.

use thiserror::Error;

/// Index of a tile in the grid arena, top-left to bottom-right.
pub type TileId = usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Neighbors {
    pub up: Option<TileId>,
    pub down: Option<TileId>,
    pub left: Option<TileId>,
    pub right: Option<TileId>,
}

impl Neighbors {
    /// The neighbours that exist, in up/down/left/right order.
    pub fn iter(&self) -> impl Iterator<Item = TileId> {
        [self.up, self.down, self.left, self.right]
            .into_iter()
            .flatten()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TopologyError {
    #[error("A board needs at least two positions, got {0}")]
    TooSmall(usize),

    #[error("Row width {width} does not divide {len} positions")]
    RaggedRows { width: usize, len: usize },

    #[error("Tile {tile} links to {neighbor}, which is outside the board")]
    DanglingLink { tile: TileId, neighbor: TileId },

    #[error("Tile {tile} links to itself")]
    SelfLink { tile: TileId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    width: usize,
    links: Vec<Neighbors>,
}

impl Topology {
    /// Wires a `width` x `height` board in row-major order.
    pub fn rectangular(width: usize, height: usize) -> Self {
        let links = (0..width * height)
            .map(|i| {
                let x = i % width;
                let y = i / width;
                Neighbors {
                    up: i.checked_sub(width),
                    down: (y + 1 < height).then(|| i + width),
                    left: (x > 0).then(|| i - 1),
                    right: (x + 1 < width).then(|| i + 1),
                }
            })
            .collect();
        Self { width, links }
    }

    /// Builds a hand-wired board. `width` only drives layout and printing.
    pub fn from_links(width: usize, links: Vec<Neighbors>) -> Result<Self, TopologyError> {
        let len = links.len();
        if len < 2 {
            return Err(TopologyError::TooSmall(len));
        }
        if width == 0 || len % width != 0 {
            return Err(TopologyError::RaggedRows { width, len });
        }
        for (tile, neighbors) in links.iter().enumerate() {
            for neighbor in neighbors.iter() {
                if neighbor >= len {
                    return Err(TopologyError::DanglingLink { tile, neighbor });
                }
                if neighbor == tile {
                    return Err(TopologyError::SelfLink { tile });
                }
            }
        }
        Ok(Self { width, links })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.links.len() / self.width.max(1)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Neighbours of `tile`. Unknown ids have none.
    pub fn neighbors(&self, tile: TileId) -> Neighbors {
        self.links.get(tile).copied().unwrap_or_default()
    }
}
