use std::fmt;

use strum::Display;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum GameState {
    #[default]
    Ready,
    Going,
    Won,
    Lost,
}

/// Notifications delivered to observers right after the mutation that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEvent {
    Started,
    Won,
    Lost,
    TileMoved,
}

pub type Observer = Box<dyn FnMut(FlowEvent) + Send + Sync>;

/// Owns the game state and the observers listening to it.
#[derive(Default)]
pub struct GameFlow {
    state: GameState,
    observers: Vec<Observer>,
}

impl GameFlow {
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Shuffling, victory checks and picking up tiles only happen while this holds.
    pub fn is_active(&self) -> bool {
        self.state == GameState::Going
    }

    pub fn set_state(&mut self, state: GameState) {
        info!("game state {} -> {state}", self.state);
        self.state = state;
        match state {
            GameState::Going => self.notify(FlowEvent::Started),
            GameState::Won => self.notify(FlowEvent::Won),
            GameState::Lost => self.notify(FlowEvent::Lost),
            GameState::Ready => {}
        }
    }

    pub fn tile_moved(&mut self) {
        self.notify(FlowEvent::TileMoved);
    }

    pub fn subscribe(&mut self, observer: impl FnMut(FlowEvent) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: FlowEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

impl fmt::Debug for GameFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameFlow")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
