//! Stage sequencer
//!
//! Exactly one stage is active at a time. A transition is a two-phase affair:
//! `transition` hands the platform a plan to animate, and the platform reports
//! back with `complete` once the animation finished. Only then does the active
//! stage change and the entry hook fire.

use std::collections::HashMap;

use super::Stage;
use crate::error::{Error, Result};

/// Work to run right after a stage becomes active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryHook {
    /// Game: reset and re-arm the snake
    StartSnake,
    /// Quiz: show the current question
    RenderQuestion,
    /// Certificate: card flip, then a delayed spark burst
    RevealCertificate,
    /// Choice: nothing to prepare
    InitChoice,
    /// Letter: scatter the parallax hearts
    ScatterHearts,
}

impl EntryHook {
    /// The hook table used by the experience
    pub fn defaults() -> HashMap<Stage, EntryHook> {
        HashMap::from([
            (Stage::Game, EntryHook::StartSnake),
            (Stage::Quiz, EntryHook::RenderQuestion),
            (Stage::Cert, EntryHook::RevealCertificate),
            (Stage::Choice, EntryHook::InitChoice),
            (Stage::Letter, EntryHook::ScatterHearts),
        ])
    }
}

/// A transition the platform has to animate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Completion token
    pub id: u64,
    pub outgoing: Stage,
    pub incoming: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Transitioning(TransitionPlan),
}

/// Result of a finished transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub left: Stage,
    pub entered: Stage,
    pub hook: Option<EntryHook>,
    /// A queued request that started right away
    pub next: Option<TransitionPlan>,
}

pub struct Sequencer {
    active: Stage,
    state: SequencerState,
    /// Latest request made while a transition was in flight
    queued: Option<Stage>,
    hooks: HashMap<Stage, EntryHook>,
    next_id: u64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Starts on the game stage with the default hooks
    pub fn new() -> Self {
        Self::with_hooks(Stage::Game, EntryHook::defaults())
    }

    pub fn with_hooks(initial: Stage, hooks: HashMap<Stage, EntryHook>) -> Self {
        Self {
            active: initial,
            state: SequencerState::Idle,
            queued: None,
            hooks,
            next_id: 1,
        }
    }

    pub fn active(&self) -> Stage {
        self.active
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn queued(&self) -> Option<Stage> {
        self.queued
    }

    pub fn is_idle(&self) -> bool {
        self.state == SequencerState::Idle
    }

    /// Request a move to `target`
    ///
    /// Returns the plan to animate, or `None` when the request was queued
    /// behind the transition in flight.
    pub fn transition(&mut self, target: Stage) -> Result<Option<TransitionPlan>> {
        match self.state {
            SequencerState::Idle => {
                if target == self.active {
                    return Err(Error::AlreadyActive(target));
                }
                Ok(Some(self.begin(target)))
            }
            SequencerState::Transitioning(plan) => {
                if target == plan.incoming && self.queued.is_none() {
                    log::debug!("Already entering '{}', ignoring repeat request", target);
                    return Ok(None);
                }
                if let Some(previous) = self.queued.replace(target) {
                    log::warn!("Queued transition to '{}' replaced by '{}'", previous, target);
                } else {
                    log::warn!(
                        "Transition {} -> {} in flight, queueing '{}'",
                        plan.outgoing,
                        plan.incoming,
                        target
                    );
                }
                Ok(None)
            }
        }
    }

    /// The platform finished animating transition `id`
    pub fn complete(&mut self, id: u64) -> Result<Completion> {
        let plan = match self.state {
            SequencerState::Idle => return Err(Error::NoTransitionInFlight),
            SequencerState::Transitioning(plan) if plan.id != id => {
                return Err(Error::StaleTransition { id });
            }
            SequencerState::Transitioning(plan) => plan,
        };

        self.active = plan.incoming;
        self.state = SequencerState::Idle;
        log::info!("Entered stage '{}'", plan.incoming);

        let next = match self.queued.take() {
            Some(target) if target != self.active => Some(self.begin(target)),
            _ => None,
        };

        Ok(Completion {
            left: plan.outgoing,
            entered: plan.incoming,
            hook: self.hooks.get(&plan.incoming).copied(),
            next,
        })
    }

    fn begin(&mut self, target: Stage) -> TransitionPlan {
        let plan = TransitionPlan {
            id: self.next_id,
            outgoing: self.active,
            incoming: target,
        };
        self.next_id += 1;
        self.state = SequencerState::Transitioning(plan);
        log::debug!("Transition {} started: {} -> {}", plan.id, plan.outgoing, plan.incoming);
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_game() {
        let seq = Sequencer::new();
        assert_eq!(seq.active(), Stage::Game);
        assert!(seq.is_idle());
        assert_eq!(seq.queued(), None);
    }

    #[test]
    fn test_active_changes_only_on_completion() {
        let mut seq = Sequencer::new();
        let plan = seq.transition(Stage::Quiz).unwrap().unwrap();
        assert_eq!(plan.outgoing, Stage::Game);
        assert_eq!(plan.incoming, Stage::Quiz);

        // mid-flight: still on game
        assert_eq!(seq.active(), Stage::Game);
        assert_eq!(seq.state(), SequencerState::Transitioning(plan));

        let done = seq.complete(plan.id).unwrap();
        assert_eq!(seq.active(), Stage::Quiz);
        assert_eq!(done.entered, Stage::Quiz);
        assert_eq!(done.left, Stage::Game);
        assert_eq!(done.hook, Some(EntryHook::RenderQuestion));
        assert_eq!(done.next, None);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_stages_without_hook() {
        let mut seq = Sequencer::with_hooks(Stage::Choice, EntryHook::defaults());
        let plan = seq.transition(Stage::Loading).unwrap().unwrap();
        assert_eq!(seq.complete(plan.id).unwrap().hook, None);
    }

    #[test]
    fn test_any_target_is_allowed() {
        let mut seq = Sequencer::new();
        let plan = seq.transition(Stage::Letter).unwrap().unwrap();
        let done = seq.complete(plan.id).unwrap();
        assert_eq!(done.hook, Some(EntryHook::ScatterHearts));
        assert_eq!(seq.active(), Stage::Letter);
    }

    #[test]
    fn test_returning_to_game_restarts_snake() {
        let mut seq = Sequencer::new();
        let plan = seq.transition(Stage::Quiz).unwrap().unwrap();
        seq.complete(plan.id).unwrap();
        let back = seq.transition(Stage::Game).unwrap().unwrap();
        assert_eq!(seq.complete(back.id).unwrap().hook, Some(EntryHook::StartSnake));
    }

    #[test]
    fn test_same_stage_is_rejected() {
        let mut seq = Sequencer::new();
        assert!(matches!(seq.transition(Stage::Game), Err(Error::AlreadyActive(Stage::Game))));
        assert!(seq.is_idle());
    }

    #[test]
    fn test_request_during_flight_is_queued_latest_wins() {
        let mut seq = Sequencer::new();
        let first = seq.transition(Stage::Quiz).unwrap().unwrap();

        assert_eq!(seq.transition(Stage::Code).unwrap(), None);
        assert_eq!(seq.transition(Stage::Choice).unwrap(), None);
        assert_eq!(seq.queued(), Some(Stage::Choice));

        let done = seq.complete(first.id).unwrap();
        let next = done.next.unwrap();
        assert_eq!(next.outgoing, Stage::Quiz);
        assert_eq!(next.incoming, Stage::Choice);
        assert_ne!(next.id, first.id);
        assert_eq!(seq.state(), SequencerState::Transitioning(next));
    }

    #[test]
    fn test_repeat_request_for_incoming_is_dropped() {
        let mut seq = Sequencer::new();
        let plan = seq.transition(Stage::Quiz).unwrap().unwrap();
        assert_eq!(seq.transition(Stage::Quiz).unwrap(), None);
        assert_eq!(seq.queued(), None);
        assert_eq!(seq.complete(plan.id).unwrap().next, None);
    }

    #[test]
    fn test_queued_request_for_new_active_is_dropped() {
        let mut seq = Sequencer::new();
        let plan = seq.transition(Stage::Quiz).unwrap().unwrap();
        seq.transition(Stage::Code).unwrap();
        seq.transition(Stage::Quiz).unwrap();
        let done = seq.complete(plan.id).unwrap();
        assert_eq!(done.next, None);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_bad_completion_tokens() {
        let mut seq = Sequencer::new();
        assert!(matches!(seq.complete(1), Err(Error::NoTransitionInFlight)));

        let plan = seq.transition(Stage::Quiz).unwrap().unwrap();
        assert!(matches!(seq.complete(plan.id + 7), Err(Error::StaleTransition { .. })));
        // state untouched
        assert_eq!(seq.active(), Stage::Game);
        assert!(seq.complete(plan.id).is_ok());
        assert!(matches!(seq.complete(plan.id), Err(Error::NoTransitionInFlight)));
    }
}
