use tracing::info;

use crate::flow::{GameFlow, GameState};

/// Time left before the game is lost.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    allotted: f32,
    remaining: f32,
    running: bool,
}

impl Countdown {
    pub const fn new(allotted: f32) -> Self {
        Self {
            allotted,
            remaining: allotted,
            running: false,
        }
    }

    pub const fn start(&mut self) {
        self.remaining = self.allotted;
        self.running = true;
    }

    pub const fn allotted(&self) -> f32 {
        self.allotted
    }

    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Counts down while the game is going and declares it lost at zero.
    pub fn tick(&mut self, delta: f32, flow: &mut GameFlow) {
        if !self.running {
            return;
        }
        if !flow.is_active() {
            self.running = false;
            return;
        }

        self.remaining -= delta;
        if self.remaining <= 0. {
            self.remaining = 0.;
            info!("out of time");
            flow.set_state(GameState::Lost);
        }
    }

    /// Seconds spent on the last game.
    pub fn time_score(&self) -> f32 {
        self.allotted - self.remaining
    }

    pub fn display(&self) -> String {
        format!("{:06.2}", self.remaining)
    }
}
