//! Snake engine lifecycle
//!
//! Owns the state, the seeded RNG and the bookkeeping for the platform tick
//! timer and input listeners. The platform keeps the real interval; the
//! engine decides when it should exist.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::food::place_food;
use super::state::{Direction, Rules, SnakeState};
use super::tick::{TickEvent, tick};
use crate::error::Result;

/// Tick timer bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    /// Armed; `generation` increases on every re-arm
    Running { generation: u64 },
}

pub struct SnakeEngine {
    state: SnakeState,
    rules: Rules,
    rng: Pcg32,
    timer: TimerState,
    generation: u64,
    /// Keyboard / swipe listeners attached
    listening: bool,
    won: bool,
}

impl SnakeEngine {
    pub fn new(rules: Rules, seed: u64) -> Self {
        Self {
            state: SnakeState::new(rules.grid_size),
            rules,
            rng: Pcg32::seed_from_u64(seed),
            timer: TimerState::Stopped,
            generation: 0,
            listening: false,
            won: false,
        }
    }

    /// Reset the game and arm the timer
    ///
    /// Safe to call while running: the old timer generation is cancelled
    /// before the new one starts.
    pub fn start(&mut self) -> Result<TimerState> {
        if self.is_running() {
            log::debug!("Re-arming snake timer (generation {})", self.generation);
        }
        self.timer = TimerState::Stopped;

        self.state = SnakeState::new(self.rules.grid_size);
        place_food(&mut self.state, &mut self.rng, self.rules.max_food_attempts)?;
        self.won = false;
        self.listening = true;

        self.generation += 1;
        self.timer = TimerState::Running {
            generation: self.generation,
        };
        log::info!(
            "Snake started on a {0}x{0} grid, win at {1}",
            self.rules.grid_size,
            self.rules.win_score
        );
        Ok(self.timer)
    }

    /// Cancel the timer and detach input
    pub fn stop(&mut self) {
        self.timer = TimerState::Stopped;
        self.listening = false;
    }

    /// Input entry point; returns whether the heading changed
    pub fn set_direction(&mut self, dir: Direction) -> bool {
        if !self.listening {
            return false;
        }
        self.state.set_heading(dir.heading())
    }

    /// Timer callback. `None` when the timer is not armed.
    pub fn step(&mut self) -> Result<Option<TickEvent>> {
        if !self.is_running() {
            return Ok(None);
        }

        let event = match tick(&mut self.state, &self.rules, &mut self.rng) {
            Ok(event) => event,
            Err(e) => {
                self.stop();
                return Err(e);
            }
        };

        if let TickEvent::Won { score } = event {
            self.stop();
            self.won = true;
            log::info!("Snake won with score {}", score);
        }
        Ok(Some(event))
    }

    pub fn state(&self) -> &SnakeState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SnakeState {
        &mut self.state
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn is_running(&self) -> bool {
        matches!(self.timer, TimerState::Running { .. })
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn has_won(&self) -> bool {
        self.won
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GridPos, Heading};

    #[test]
    fn test_start_arms_and_rearm_bumps_generation() {
        let mut engine = SnakeEngine::new(Rules::default(), 1);
        assert_eq!(engine.timer(), TimerState::Stopped);

        assert_eq!(engine.start().unwrap(), TimerState::Running { generation: 1 });
        assert_eq!(engine.start().unwrap(), TimerState::Running { generation: 2 });
        assert!(engine.is_listening());
        assert!(!engine.state().occupies(engine.state().food));
    }

    #[test]
    fn test_step_before_start_is_noop() {
        let mut engine = SnakeEngine::new(Rules::default(), 1);
        assert_eq!(engine.step().unwrap(), None);
        assert_eq!(engine.state().time_ticks, 0);
    }

    #[test]
    fn test_direction_ignored_when_detached() {
        let mut engine = SnakeEngine::new(Rules::default(), 1);
        assert!(!engine.set_direction(Direction::Up));
        engine.start().unwrap();
        assert!(engine.set_direction(Direction::Up));
        assert!(!engine.set_direction(Direction::Down));
        engine.stop();
        assert!(!engine.set_direction(Direction::Left));
        assert_eq!(engine.state().heading, Direction::Up.heading());
    }

    #[test]
    fn test_win_stops_timer_and_freezes_state() {
        let rules = Rules::default();
        let mut engine = SnakeEngine::new(rules, 3);
        engine.start().unwrap();
        {
            let state = engine.state_mut();
            *state = SnakeState::with_body(15, [GridPos::new(2, 2)], Heading::new(1, 0));
            state.food = GridPos::new(3, 2);
            state.score = rules.win_score - 1;
        }

        assert_eq!(
            engine.step().unwrap(),
            Some(TickEvent::Won { score: rules.win_score })
        );
        assert!(engine.has_won());
        assert!(!engine.is_running());
        assert!(!engine.is_listening());

        let frozen = engine.state().clone();
        for _ in 0..5 {
            assert_eq!(engine.step().unwrap(), None);
        }
        assert_eq!(engine.state(), &frozen);
    }
}
