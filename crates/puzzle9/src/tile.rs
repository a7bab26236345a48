use std::fmt::{self, Display, Formatter};

use bevy::math::Vec2;

use crate::topology::TileId;

/// What occupies a board position. Pieces are numbered by their home position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Content {
    Empty,
    Piece(u8),
}

impl Content {
    /// The piece that belongs at `position` on a solved board.
    pub const fn home_of(position: TileId) -> Self {
        Self::Piece(position as u8)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn piece(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::Piece(piece) => Some(piece),
        }
    }
}

impl Display for Content {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "  "),
            Self::Piece(piece) => write!(f, "{:>02}", *piece as u16 + 1),
        }
    }
}

/// A change the presentation layer has to mirror.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TileEvent {
    /// Redraw the tile for its new content.
    Content { tile: TileId, content: Content },
    /// Show a translucent piece on the tile, or clear the preview with `None`.
    Hover { tile: TileId, preview: Option<u8> },
}

/// One board cell. Neighbours live in the [`Topology`](crate::topology::Topology).
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    content: Content,
    hover: Option<u8>,
    anchor: Vec2,
}

impl Tile {
    pub const fn new(anchor: Vec2) -> Self {
        Self {
            content: Content::Empty,
            hover: None,
            anchor,
        }
    }

    pub const fn content(&self) -> Content {
        self.content
    }

    pub const fn hover(&self) -> Option<u8> {
        self.hover
    }

    /// World-space centre of the cell.
    pub const fn anchor(&self) -> Vec2 {
        self.anchor
    }

    // Redrawing the content drops any preview.
    pub(crate) const fn set_content(&mut self, content: Content) {
        self.content = content;
        self.hover = None;
    }

    pub(crate) const fn set_hover_preview(&mut self, preview: Option<u8>) {
        self.hover = preview;
    }
}
