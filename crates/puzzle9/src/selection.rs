//! Pick up, drag and drop of a single tile.
//!
//! A tile can only be picked up when [`GridEngine::can_move`] holds, and it can
//! only be dropped on the empty tile or back on itself, so an illegal move
//! never reaches the board.

use bevy::math::Vec2;
use tracing::{debug, info};

use crate::flow::GameFlow;
use crate::grid::GridEngine;
use crate::input::InputSample;
use crate::tile::{Content, Tile};
use crate::topology::TileId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionController {
    selected: Option<TileId>,
    target: Option<TileId>,
    base_position: Vec2,
    proxy: Option<Vec2>,
}

impl SelectionController {
    pub const fn selected(&self) -> Option<TileId> {
        self.selected
    }

    pub const fn target(&self) -> Option<TileId> {
        self.target
    }

    pub const fn is_dragging(&self) -> bool {
        self.selected.is_some()
    }

    /// The dragged tile and where its proxy is drawn.
    pub fn drag_proxy(&self) -> Option<(TileId, Vec2)> {
        self.selected.zip(self.proxy)
    }

    /// Starts dragging `tile` from `pointer`.
    pub fn select_tile(
        &mut self,
        grid: &GridEngine,
        flow: &GameFlow,
        tile: TileId,
        pointer: Option<Vec2>,
    ) -> bool {
        if !flow.is_active() || self.selected.is_some() || !grid.can_move(tile) {
            return false;
        }
        let (Some(position), Some(anchor)) = (pointer, grid.tile(tile).map(Tile::anchor)) else {
            return false;
        };

        self.selected = Some(tile);
        self.base_position = position;
        self.proxy = Some(anchor);
        debug!("picked up tile {tile}");
        true
    }

    /// Offers `tile` as the drop target. Only the empty tile or the dragged
    /// tile itself are accepted; the latter cancels the move on release.
    pub fn set_target(&mut self, grid: &mut GridEngine, tile: TileId) -> bool {
        let Some(selected) = self.selected else {
            return false;
        };
        if self.target == Some(tile) {
            return false;
        }
        if tile != selected && !grid.content(tile).is_some_and(Content::is_empty) {
            return false;
        }

        if let Some(previous) = self.target {
            grid.set_hover_preview(previous, None);
        }
        self.target = Some(tile);
        let preview = grid.content(selected).and_then(Content::piece);
        grid.set_hover_preview(tile, preview);
        true
    }

    /// Per-frame update. Returns `Some(moved)` on the frame the tile is released.
    pub fn tick(&mut self, grid: &mut GridEngine, sample: &InputSample) -> Option<bool> {
        let selected = self.selected?;
        let position = sample.position?;

        let delta = position - self.base_position;
        if let Some(anchor) = grid.tile(selected).map(Tile::anchor) {
            self.proxy = Some(anchor + delta);
        }

        sample.released.then(|| self.release_tile(grid))
    }

    /// Drops the dragged tile. Returns whether a piece actually moved.
    pub fn release_tile(&mut self, grid: &mut GridEngine) -> bool {
        let Some(selected) = self.selected.take() else {
            return false;
        };
        let target = self.target.take();
        self.proxy = None;
        let content = grid.content(selected).unwrap_or(Content::Empty);

        match target {
            Some(target) if target != selected => {
                grid.set_content(target, content);
                grid.set_content(selected, Content::Empty);
                info!("moved tile {selected} to {target}");
                true
            }
            _ => {
                grid.set_content(selected, content);
                debug!("dropped tile {selected} back in place");
                false
            }
        }
    }
}
