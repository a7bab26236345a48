use std::fmt::{self, Display, Formatter};

use bevy::math::{Rect, Vec2};
use fastrand::Rng;
use tracing::{debug, info};

use crate::flow::{GameFlow, GameState};
use crate::tile::{Content, Tile, TileEvent};
use crate::topology::{Neighbors, TileId, Topology};

/// Column/row of a tile on a rectangular layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn from_index(index: TileId, width: usize) -> Self {
        Self {
            x: index % width,
            y: index / width,
        }
    }

    /// Centre of the cell in world space, with the board centred on the origin
    /// and row 0 at the top.
    pub fn to_world(self, width: usize, height: usize, cell_size: f32) -> Vec2 {
        let offset_x = -(width.saturating_sub(1) as f32) * cell_size / 2.;
        let offset_y = -(height.saturating_sub(1) as f32) * cell_size / 2.;
        Vec2::new(
            (self.x as f32).mul_add(cell_size, offset_x),
            -(self.y as f32).mul_add(cell_size, offset_y),
        )
    }
}

/// Owns the tiles and the rules over their contents.
#[derive(Debug, Clone)]
pub struct GridEngine {
    topology: Topology,
    tiles: Vec<Tile>,
    empty_position: TileId,
    cell_size: f32,
    events: Vec<TileEvent>,
}

impl GridEngine {
    /// `empty_position` is 0-based and must lie inside the topology.
    pub fn new(topology: Topology, empty_position: TileId, cell_size: f32) -> Self {
        let width = topology.width().max(1);
        let height = topology.height();
        let tiles = (0..topology.len())
            .map(|i| Tile::new(GridPos::from_index(i, width).to_world(width, height, cell_size)))
            .collect();
        Self {
            topology,
            tiles,
            empty_position,
            cell_size,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub const fn empty_position(&self) -> TileId {
        self.empty_position
    }

    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn tile(&self, tile: TileId) -> Option<&Tile> {
        self.tiles.get(tile)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().enumerate()
    }

    pub fn content(&self, tile: TileId) -> Option<Content> {
        self.tiles.get(tile).map(Tile::content)
    }

    pub fn contents(&self) -> Vec<Content> {
        self.tiles.iter().map(Tile::content).collect()
    }

    pub fn neighbors(&self, tile: TileId) -> Neighbors {
        self.topology.neighbors(tile)
    }

    /// A tile can be picked up when it holds a piece next to the empty slot.
    pub fn can_move(&self, tile: TileId) -> bool {
        self.content(tile).is_some_and(|content| !content.is_empty())
            && self
                .neighbors(tile)
                .iter()
                .any(|neighbor| self.content(neighbor).is_some_and(Content::is_empty))
    }

    /// The tile whose cell contains `point`.
    pub fn tile_at(&self, point: Vec2) -> Option<TileId> {
        let size = Vec2::splat(self.cell_size);
        self.tiles
            .iter()
            .position(|tile| Rect::from_center_size(tile.anchor(), size).contains(point))
    }

    pub(crate) fn set_content(&mut self, tile: TileId, content: Content) {
        if let Some(t) = self.tiles.get_mut(tile) {
            t.set_content(content);
            self.events.push(TileEvent::Content { tile, content });
        }
    }

    pub(crate) fn set_hover_preview(&mut self, tile: TileId, preview: Option<u8>) {
        if let Some(t) = self.tiles.get_mut(tile) {
            t.set_hover_preview(preview);
            self.events.push(TileEvent::Hover { tile, preview });
        }
    }

    /// Presentation changes since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<TileEvent> {
        std::mem::take(&mut self.events)
    }

    /// Puts every piece home.
    pub fn deal(&mut self) {
        let positions = self.initial_positions();
        self.apply(positions);
    }

    /// Overwrites the board. Fails when the length does not match.
    pub fn load(&mut self, contents: &[Content]) -> bool {
        if contents.len() != self.tiles.len() {
            return false;
        }
        self.apply(contents.to_vec());
        true
    }

    fn apply(&mut self, positions: Vec<Content>) {
        for (tile, content) in positions.into_iter().enumerate() {
            self.set_content(tile, content);
        }
    }

    /// The solved arrangement: piece `i` at position `i`, empty at its slot.
    pub fn initial_positions(&self) -> Vec<Content> {
        (0..self.tiles.len())
            .map(|i| {
                if i == self.empty_position {
                    Content::Empty
                } else {
                    Content::home_of(i)
                }
            })
            .collect()
    }

    /// Deals a random solvable board and starts the game.
    pub fn shuffle(&mut self, rng: &mut Rng, flow: &mut GameFlow) {
        let mut positions = self.initial_positions();
        let len = positions.len();
        for i in 0..len.saturating_sub(1) {
            let swap_with = rng.usize(i + 1..len);
            positions.swap(i, swap_with);
        }

        if !self.is_solvable(&positions) {
            debug!("shuffle produced an unsolvable board, repairing");
            self.make_solvable(&mut positions);
        }

        self.apply(positions);
        info!("shuffled board\n{self}");
        flow.set_state(GameState::Going);
    }

    /// Parity test on a candidate arrangement. Does not touch the board.
    ///
    /// The empty marker is moved home by removal and reinsertion, a rotation
    /// worth `empty_distance` transpositions. The remaining pieces are then
    /// sorted by swaps. The arrangement is solvable when its total parity
    /// matches the parity of the empty marker's displacement. Displacement is
    /// the linear index distance, which has the parity of the taxicab distance
    /// on boards of odd width.
    pub fn is_solvable(&self, positions: &[Content]) -> bool {
        let Some(empty_index) = positions.iter().position(|c| c.is_empty()) else {
            return false;
        };
        let empty_distance = self.empty_position.abs_diff(empty_index);

        let mut copy = positions.to_vec();
        copy.remove(empty_index);
        copy.insert(self.empty_position.min(copy.len()), Content::Empty);

        let mut transpositions = 0;
        for i in (0..copy.len()).rev() {
            let home = Content::home_of(i);
            if i == self.empty_position || copy.get(i) == Some(&home) {
                continue;
            }
            let Some(current) = copy.iter().position(|&c| c == home) else {
                continue;
            };
            copy.swap(i, current);
            transpositions += 1;
        }

        let arrangement_parity = (transpositions + empty_distance) % 2;
        let displacement_parity = empty_distance % 2;
        arrangement_parity == displacement_parity
    }

    /// Flips the parity of an unsolvable arrangement with a single piece swap.
    ///
    /// Only call this after [`Self::is_solvable`] returned `false`; on a
    /// solvable board it produces an unsolvable one.
    pub fn make_solvable(&self, positions: &mut [Content]) {
        let mut fallback = None;
        for i in 0..positions.len() {
            if i == self.empty_position || positions.get(i).is_none_or(|c| c.is_empty()) {
                continue;
            }
            let Some(current) = positions.iter().position(|&c| c == Content::home_of(i)) else {
                continue;
            };
            if current == i {
                continue;
            }
            // Swapping a 2-cycle would put both pieces home.
            if positions.get(i) == Some(&Content::home_of(current)) {
                fallback.get_or_insert((current, i));
                continue;
            }
            positions.swap(current, i);
            return;
        }

        let fallback = fallback.or_else(|| {
            let mut pieces = positions
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_empty())
                .map(|(i, _)| i);
            Some((pieces.next()?, pieces.next()?))
        });
        if let Some((a, b)) = fallback {
            positions.swap(a, b);
        }
    }

    /// Every piece at home, regardless of game state.
    pub fn is_solved(&self) -> bool {
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, tile)| i == self.empty_position || tile.content() == Content::home_of(i))
    }

    /// Declares the game won once the board is solved. No-op unless the game is going.
    pub fn check_victory(&self, flow: &mut GameFlow) -> bool {
        if !flow.is_active() || !self.is_solved() {
            return false;
        }
        flow.set_state(GameState::Won);
        true
    }
}

impl Display for GridEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = self.topology.width().max(1);
        for row in self.tiles.chunks(width) {
            for tile in row {
                write!(f, "{} ", tile.content())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;

    const E: Content = Content::Empty;

    fn p(piece: u8) -> Content {
        Content::Piece(piece)
    }

    fn grid(empty_position: TileId) -> GridEngine {
        let mut grid = GridEngine::new(Topology::rectangular(3, 3), empty_position, 100.);
        grid.deal();
        grid
    }

    fn going() -> GameFlow {
        let mut flow = GameFlow::default();
        flow.set_state(GameState::Going);
        flow
    }

    fn empty_count(contents: &[Content]) -> usize {
        contents.iter().filter(|c| c.is_empty()).count()
    }

    #[test]
    fn deal_puts_every_piece_home() {
        let grid = grid(4);
        assert_eq!(
            grid.contents(),
            vec![p(0), p(1), p(2), p(3), E, p(5), p(6), p(7), p(8)],
            "identity with the gap in the centre"
        );
        assert!(grid.is_solved(), "dealt board is solved");
    }

    #[test]
    fn solved_board_is_solvable() {
        let grid = grid(8);
        assert!(
            grid.is_solvable(&grid.initial_positions()),
            "zero transpositions, zero displacement"
        );
    }

    #[test]
    fn single_swap_is_unsolvable() {
        let grid = grid(8);
        let board = [p(0), p(1), p(2), p(3), p(4), p(5), p(7), p(6), E];
        assert!(!grid.is_solvable(&board), "one transposition from solved");
    }

    #[test]
    fn sliding_the_gap_keeps_solvability() {
        let grid = grid(8);
        // One slide left, then one slide up.
        let left = [p(0), p(1), p(2), p(3), p(4), p(5), p(6), E, p(7)];
        let up = [p(0), p(1), p(2), p(3), E, p(5), p(6), p(4), p(7)];
        assert!(grid.is_solvable(&left), "horizontal slide");
        assert!(grid.is_solvable(&up), "vertical slide");
    }

    #[test]
    fn is_solvable_does_not_touch_the_board() {
        let grid = grid(8);
        let before = grid.contents();
        let board = [p(1), p(0), p(2), p(3), p(4), p(5), p(6), p(7), E];
        assert!(!grid.is_solvable(&board), "swapped first pair");
        assert_eq!(grid.contents(), before, "board untouched");
    }

    #[test]
    fn make_solvable_fixes_a_two_cycle() {
        let grid = grid(8);
        let mut board = vec![p(0), p(1), p(2), p(3), p(4), p(5), p(7), p(6), E];
        grid.make_solvable(&mut board);
        assert!(grid.is_solvable(&board), "repaired");
        assert_eq!(empty_count(&board), 1, "gap untouched");
    }

    #[test]
    fn make_solvable_places_exactly_one_piece() {
        let grid = grid(8);
        // A 4-cycle over the first row and a half is odd.
        let mut board = vec![p(1), p(2), p(3), p(0), p(4), p(5), p(6), p(7), E];
        assert!(!grid.is_solvable(&board), "odd cycle");
        grid.make_solvable(&mut board);
        assert_eq!(
            board,
            vec![p(0), p(2), p(3), p(1), p(4), p(5), p(6), p(7), E],
            "piece 0 moved home, piece 1 did not"
        );
        assert!(grid.is_solvable(&board), "repaired");
    }

    #[test]
    fn make_solvable_when_only_the_gap_is_misplaced() {
        let grid = grid(8);
        let mut board = vec![p(0), p(1), p(2), p(3), p(4), p(5), E, p(7), p(6)];
        assert!(!grid.is_solvable(&board), "gap two steps from home");
        grid.make_solvable(&mut board);
        assert!(grid.is_solvable(&board), "repaired by swapping two pieces");
        assert_eq!(board.get(6), Some(&E), "gap stays put");
    }

    #[test]
    fn make_solvable_repairs_random_unsolvable_boards() {
        let mut rng = Rng::with_seed(7);
        for empty_position in 0..9 {
            let grid = grid(empty_position);
            for _ in 0..200 {
                let mut board = grid.initial_positions();
                rng.shuffle(&mut board);
                if grid.is_solvable(&board) {
                    continue;
                }
                grid.make_solvable(&mut board);
                assert!(grid.is_solvable(&board), "unrepaired board {board:?}");
                assert_eq!(empty_count(&board), 1, "single gap");
            }
        }
    }

    #[test]
    fn shuffle_always_deals_a_solvable_board() {
        for seed in 0..200 {
            let mut rng = Rng::with_seed(seed);
            let mut grid = grid((seed % 9) as usize);
            let mut flow = GameFlow::default();
            grid.shuffle(&mut rng, &mut flow);
            let contents = grid.contents();
            assert!(grid.is_solvable(&contents), "seed {seed} dealt {contents:?}");
            assert_eq!(empty_count(&contents), 1, "seed {seed} single gap");
            assert_eq!(flow.state(), GameState::Going, "shuffle starts the game");
        }
    }

    /// Every board the gap can reach by sliding, starting from solved.
    fn reachable(grid: &GridEngine) -> HashSet<Vec<Content>> {
        let solved = grid.contents();
        let mut seen = HashSet::from([solved.clone()]);
        let mut queue = VecDeque::from([solved]);
        while let Some(board) = queue.pop_front() {
            let gap = board.iter().position(|c| c.is_empty()).expect("one gap");
            for neighbor in grid.neighbors(gap).iter() {
                let mut next = board.clone();
                next.swap(gap, neighbor);
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn shuffled_boards_are_reachable_by_sliding() {
        for empty_position in [8, 4] {
            let mut grid = grid(empty_position);
            let boards = reachable(&grid);
            assert_eq!(boards.len(), 181_440, "half of 9! for gap {empty_position}");

            for seed in 0..300 {
                let mut rng = Rng::with_seed(seed);
                let mut flow = GameFlow::default();
                grid.shuffle(&mut rng, &mut flow);
                let contents = grid.contents();
                assert!(
                    boards.contains(&contents),
                    "seed {seed} dealt an unreachable board {contents:?}"
                );
            }
        }
    }

    #[test]
    fn is_solvable_matches_reachability() {
        let grid = grid(8);
        let boards = reachable(&grid);
        for board in &boards {
            assert!(grid.is_solvable(board), "reachable {board:?}");
            let mut swapped = board.clone();
            let pieces = swapped
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_empty())
                .map(|(i, _)| i)
                .take(2)
                .collect::<Vec<_>>();
            if let [a, b] = *pieces.as_slice() {
                swapped.swap(a, b);
            }
            assert!(!boards.contains(&swapped), "one swap leaves the class");
            assert!(!grid.is_solvable(&swapped), "unreachable {swapped:?}");
        }
    }

    #[test]
    fn same_seed_same_board() {
        let mut first = grid(4);
        let mut second = grid(4);
        first.shuffle(&mut Rng::with_seed(9), &mut GameFlow::default());
        second.shuffle(&mut Rng::with_seed(9), &mut GameFlow::default());
        assert_eq!(first.contents(), second.contents(), "deterministic with a seed");
    }

    #[test]
    fn can_move_only_next_to_the_gap() {
        let grid = grid(4);
        let movable: Vec<_> = (0..9).filter(|&t| grid.can_move(t)).collect();
        assert_eq!(movable, vec![1, 3, 5, 7], "orthogonal neighbours of the centre");
        assert!(!grid.can_move(4), "the gap itself never moves");
        assert!(!grid.can_move(99), "unknown tile");
    }

    #[test]
    fn can_move_tracks_every_board() {
        let mut rng = Rng::with_seed(3);
        let mut grid = grid(2);
        for _ in 0..50 {
            grid.shuffle(&mut rng, &mut GameFlow::default());
            for tile in 0..grid.len() {
                let expected = !grid.tile(tile).is_some_and(|t| t.content().is_empty())
                    && grid
                        .neighbors(tile)
                        .iter()
                        .any(|n| grid.content(n) == Some(E));
                assert_eq!(grid.can_move(tile), expected, "tile {tile}");
            }
        }
    }

    #[test]
    fn victory_only_while_going() {
        let grid = grid(8);

        let mut ready = GameFlow::default();
        assert!(!grid.check_victory(&mut ready), "ready game cannot be won");
        assert_eq!(ready.state(), GameState::Ready, "state unchanged");

        let mut flow = going();
        assert!(grid.check_victory(&mut flow), "solved while going");
        assert_eq!(flow.state(), GameState::Won, "won");
    }

    #[test]
    fn unsolved_board_is_not_a_victory() {
        let mut grid = grid(8);
        assert!(
            grid.load(&[p(0), p(1), p(2), p(3), p(4), p(5), p(6), E, p(7)]),
            "same length"
        );
        let mut flow = going();
        assert!(!grid.check_victory(&mut flow), "one slide away");
        assert_eq!(flow.state(), GameState::Going, "still going");
    }

    #[test]
    fn load_rejects_wrong_length() {
        let mut grid = grid(8);
        assert!(!grid.load(&[E, p(0)]), "too short");
        assert!(grid.is_solved(), "board untouched");
    }

    #[test]
    fn mutations_queue_presentation_events() {
        let mut grid = grid(8);
        grid.drain_events();
        grid.set_hover_preview(8, Some(7));
        grid.set_content(8, p(7));
        assert_eq!(
            grid.drain_events(),
            vec![
                TileEvent::Hover {
                    tile: 8,
                    preview: Some(7)
                },
                TileEvent::Content {
                    tile: 8,
                    content: p(7)
                },
            ],
            "in order"
        );
        assert!(grid.drain_events().is_empty(), "drained");
    }

    #[test]
    fn anchors_and_hit_testing() {
        let grid = grid(8);
        assert_eq!(
            grid.tile(0).map(Tile::anchor),
            Some(Vec2::new(-100., 100.)),
            "top-left"
        );
        assert_eq!(grid.tile(4).map(Tile::anchor), Some(Vec2::ZERO), "centre");
        assert_eq!(grid.tile_at(Vec2::new(95., -120.)), Some(8), "bottom-right");
        assert_eq!(grid.tile_at(Vec2::new(400., 0.)), None, "off the board");
    }

    #[test]
    fn prints_rows() {
        let grid = grid(8);
        assert_eq!(
            grid.to_string(),
            "01 02 03 \n04 05 06 \n07 08    \n",
            "three rows"
        );
    }
}
