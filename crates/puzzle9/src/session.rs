use bevy::prelude::Resource;
use fastrand::Rng;
use tracing::{info, warn};

use crate::config::{ConfigError, PuzzleConfig};
use crate::flow::{FlowEvent, GameFlow, GameState};
use crate::grid::GridEngine;
use crate::input::InputSample;
use crate::selection::SelectionController;
use crate::tile::TileEvent;
use crate::timer::Countdown;
use crate::topology::Topology;

/// What a frame did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub moved: bool,
    pub state: GameState,
}

/// One game: the board, the drag in progress, the state and the clock.
#[derive(Resource, Debug)]
pub struct Session {
    grid: GridEngine,
    selection: SelectionController,
    flow: GameFlow,
    countdown: Countdown,
    rng: Rng,
    seed: Option<u64>,
}

impl Session {
    /// Builds the board with every piece home. The game starts on [`Self::shuffle`].
    pub fn new(config: &PuzzleConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let topology = Topology::rectangular(config.width, config.height);
        let mut grid = GridEngine::new(topology, config.empty_index(), config.cell_size);
        grid.deal();

        let seed = config.seed();
        let rng = seed.map_or_else(Rng::new, Rng::with_seed);

        Ok(Self {
            grid,
            selection: SelectionController::default(),
            flow: GameFlow::default(),
            countdown: Countdown::new(config.allotted_time),
            rng,
            seed,
        })
    }

    pub const fn grid(&self) -> &GridEngine {
        &self.grid
    }

    pub const fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub const fn state(&self) -> GameState {
        self.flow.state()
    }

    pub fn time_score(&self) -> f32 {
        self.countdown.time_score()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(FlowEvent) + Send + Sync + 'static) {
        self.flow.subscribe(observer);
    }

    pub fn drain_tile_events(&mut self) -> Vec<TileEvent> {
        self.grid.drain_events()
    }

    /// Deals a new solvable board and starts the clock. Ignored mid-drag.
    pub fn shuffle(&mut self) -> bool {
        if self.selection.is_dragging() {
            warn!("shuffle ignored while a tile is being dragged");
            return false;
        }
        // A seeded game deals the same board every time.
        if let Some(seed) = self.seed {
            self.rng.seed(seed);
        }
        self.grid.shuffle(&mut self.rng, &mut self.flow);
        self.countdown.start();
        info!("new game, {}s on the clock", self.countdown.allotted());
        true
    }

    /// Advances one frame.
    pub fn tick(&mut self, sample: &InputSample, delta: f32) -> TickOutcome {
        self.countdown.tick(delta, &mut self.flow);

        if sample.pressed && !self.selection.is_dragging() {
            if let Some(tile) = sample.position.and_then(|p| self.grid.tile_at(p)) {
                self.selection
                    .select_tile(&self.grid, &self.flow, tile, sample.position);
            }
        }

        if self.selection.is_dragging() {
            if let Some(tile) = sample.position.and_then(|p| self.grid.tile_at(p)) {
                self.selection.set_target(&mut self.grid, tile);
            }
        }

        let moved = self.selection.tick(&mut self.grid, sample) == Some(true);
        if moved {
            self.flow.tile_moved();
            self.grid.check_victory(&mut self.flow);
        }

        TickOutcome {
            moved,
            state: self.flow.state(),
        }
    }
}
