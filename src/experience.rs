//! The experience: one snake engine, one stage sequencer, and the content of
//! every stage, wired together explicitly.
//!
//! Handlers never touch the browser. Each returns the `Effect`s the platform
//! has to carry out (arm a timer, animate a stage, play a cue, ...), which
//! keeps the whole flow testable without a display.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::Result;
use crate::render::{DrawCommand, project};
use crate::settings::Settings;
use crate::sim::{Direction, SnakeEngine, SwipeTracker, TickEvent, TimerState, direction_for_key};
use crate::stage::{
    AnswerFeedback, CodeVerdict, EntryHook, Heart, QuizProgress, QuizState, Sequencer, Spark,
    Stage, TransitionPlan, check_code, code::SOLUTION, dodge_position, parallax_hearts,
    spark_burst,
};

/// Sound / visual feedback cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Collision, wrong answer, dodged "no"
    Chuss,
    Eat,
    Win,
    /// A new stage became active
    Advance,
}

/// Work scheduled for later by a `Schedule` effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    GoTo(Stage),
    SparkBurst,
}

/// Something the platform must do
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the snake interval; any previous one must be cleared first.
    /// The interval reports back through `on_timer(generation)`.
    ArmTimer { period_ms: u32, generation: u64 },
    CancelTimer,
    AttachInput,
    DetachInput,
    /// Repaint the grid from `Experience::frame`
    Redraw,
    Score(u32),
    Cue(Cue),
    /// The "chuss" popup
    Popup,
    /// Animate a stage transition, then call `on_transition_complete(plan.id)`
    AnimateStage {
        plan: TransitionPlan,
        exit_ms: u32,
        enter_ms: u32,
    },
    ShowQuestion { index: usize },
    QuizFeedback(AnswerFeedback),
    CodeFeedback(CodeVerdict),
    ChoiceAccepted,
    /// Move the "no" button (container-relative px) and tilt it (degrees)
    DodgeNo { pos: Vec2, tilt: f32 },
    RevealCard,
    /// Sparks relative to the certificate center
    Sparks(Vec<Spark>),
    Hearts(Vec<Heart>),
    FillProgress { duration_ms: u32 },
    OpenEnvelope,
    /// Call `on_deferred(then)` after `delay_ms`
    Schedule { delay_ms: u32, then: Deferred },
}

pub struct Experience {
    settings: Settings,
    engine: SnakeEngine,
    sequencer: Sequencer,
    quiz: QuizState,
    swipe: SwipeTracker,
    /// Randomness for decoration only; the engine has its own stream
    fx_rng: Pcg32,
    choice_made: bool,
    envelope_opened: bool,
    loading_started: bool,
}

impl Experience {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        Self {
            engine: SnakeEngine::new(settings.rules(), seed),
            sequencer: Sequencer::new(),
            quiz: QuizState::default(),
            swipe: SwipeTracker::new(settings.swipe_threshold),
            fx_rng: Pcg32::seed_from_u64(seed.rotate_left(17) ^ 0x5eed),
            choice_made: false,
            envelope_opened: false,
            loading_started: false,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &SnakeEngine {
        &self.engine
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    /// Draw commands for the current grid
    pub fn frame(&self, canvas_px: f32) -> Vec<DrawCommand> {
        project(self.engine.state(), canvas_px)
    }

    fn on_stage(&self, stage: Stage) -> bool {
        self.sequencer.active() == stage && self.sequencer.is_idle()
    }

    // === Snake ===

    /// Start (or restart) the snake game
    pub fn start(&mut self) -> Vec<Effect> {
        match self.engine.start() {
            Ok(TimerState::Running { generation }) => vec![
                Effect::ArmTimer {
                    period_ms: self.settings.tick_ms,
                    generation,
                },
                Effect::AttachInput,
                Effect::Score(0),
                Effect::Redraw,
            ],
            Ok(TimerState::Stopped) => {
                log::error!("Snake engine did not arm its timer");
                vec![Effect::CancelTimer, Effect::DetachInput]
            }
            Err(e) => {
                log::error!("Snake failed to start: {}", e);
                vec![Effect::CancelTimer, Effect::DetachInput]
            }
        }
    }

    /// Returns whether the key steered the snake
    pub fn on_key(&mut self, key: &str) -> bool {
        match direction_for_key(key) {
            Some(dir) => {
                self.on_direction(dir);
                true
            }
            None => false,
        }
    }

    pub fn on_direction(&mut self, dir: Direction) -> bool {
        self.engine.set_direction(dir)
    }

    pub fn on_touch_start(&mut self, pos: Vec2) {
        if self.engine.is_listening() {
            self.swipe.begin(pos);
        }
    }

    pub fn on_touch_move(&mut self, pos: Vec2) -> bool {
        match self.swipe.moved(pos) {
            Some(dir) => self.on_direction(dir),
            None => false,
        }
    }

    pub fn on_touch_end(&mut self) {
        self.swipe.end();
    }

    /// Callback of the interval armed with `generation`
    ///
    /// Ticks from an interval that a restart has already replaced are dropped.
    pub fn on_timer(&mut self, generation: u64) -> Vec<Effect> {
        if self.engine.timer() != (TimerState::Running { generation }) {
            log::debug!("Dropping tick from stale timer generation {}", generation);
            return Vec::new();
        }
        self.on_tick()
    }

    /// Advance the snake one tick
    pub fn on_tick(&mut self) -> Vec<Effect> {
        let event = match self.engine.step() {
            Ok(Some(event)) => event,
            // A leftover interval; make sure it goes away
            Ok(None) => return vec![Effect::CancelTimer],
            Err(e) => {
                log::error!("Snake halted: {}", e);
                return vec![Effect::CancelTimer, Effect::DetachInput];
            }
        };

        match event {
            TickEvent::Idle | TickEvent::Moved => vec![Effect::Redraw],
            TickEvent::Ate { score } => vec![Effect::Score(score), Effect::Cue(Cue::Eat), Effect::Redraw],
            TickEvent::Collided { score, .. } => vec![
                Effect::Score(score),
                Effect::Cue(Cue::Chuss),
                Effect::Popup,
                Effect::Redraw,
            ],
            TickEvent::Won { score } => {
                let mut effects = vec![
                    Effect::Score(score),
                    Effect::Redraw,
                    Effect::Cue(Cue::Win),
                    Effect::CancelTimer,
                    Effect::DetachInput,
                ];
                effects.extend(self.go_to(Stage::Quiz));
                effects
            }
        }
    }

    // === Sequencing ===

    /// Ask the sequencer for `target`
    pub fn go_to(&mut self, target: Stage) -> Vec<Effect> {
        let plan = match self.sequencer.transition(target) {
            Ok(Some(plan)) => plan,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Transition refused: {}", e);
                return Vec::new();
            }
        };
        self.animate(plan)
    }

    fn animate(&mut self, plan: TransitionPlan) -> Vec<Effect> {
        let mut effects = Vec::new();
        // Leaving the game tears the snake down even before the win
        if plan.outgoing == Stage::Game && self.engine.is_running() {
            self.engine.stop();
            effects.extend([Effect::CancelTimer, Effect::DetachInput]);
        }
        let (exit_ms, enter_ms) = self.settings.stage_durations_ms();
        effects.push(Effect::AnimateStage {
            plan,
            exit_ms,
            enter_ms,
        });
        effects
    }

    /// The platform finished animating transition `id`
    pub fn on_transition_complete(&mut self, id: u64) -> Result<Vec<Effect>> {
        let done = self.sequencer.complete(id)?;
        let mut effects = vec![Effect::Cue(Cue::Advance)];

        if let Some(hook) = done.hook {
            effects.extend(self.run_hook(hook));
        }
        if let Some(next) = done.next {
            effects.extend(self.animate(next));
        }
        Ok(effects)
    }

    fn run_hook(&mut self, hook: EntryHook) -> Vec<Effect> {
        let decorate = !self.settings.reduced_motion;
        match hook {
            EntryHook::StartSnake => self.start(),
            EntryHook::RenderQuestion => vec![Effect::ShowQuestion {
                index: self.quiz.index(),
            }],
            EntryHook::RevealCertificate => {
                let mut effects = vec![Effect::RevealCard];
                if decorate {
                    effects.push(Effect::Schedule {
                        delay_ms: CERT_SPARK_DELAY_MS,
                        then: Deferred::SparkBurst,
                    });
                }
                effects
            }
            EntryHook::InitChoice => Vec::new(),
            EntryHook::ScatterHearts if decorate => {
                vec![Effect::Hearts(parallax_hearts(&mut self.fx_rng, PARALLAX_HEART_COUNT))]
            }
            EntryHook::ScatterHearts => Vec::new(),
        }
    }

    /// A `Schedule` effect came due
    pub fn on_deferred(&mut self, deferred: Deferred) -> Vec<Effect> {
        match deferred {
            Deferred::GoTo(stage) => self.go_to(stage),
            Deferred::SparkBurst => {
                vec![Effect::Sparks(spark_burst(&mut self.fx_rng, Vec2::ZERO, SPARK_COUNT))]
            }
        }
    }

    // === Quiz ===

    pub fn on_quiz_answer(&mut self, choice: usize) -> Vec<Effect> {
        if !self.on_stage(Stage::Quiz) {
            return Vec::new();
        }
        let Some(feedback) = self.quiz.answer(choice) else {
            return Vec::new();
        };
        let wrong = !feedback.is_correct;
        let mut effects = vec![Effect::QuizFeedback(feedback)];
        if wrong {
            effects.extend([Effect::Cue(Cue::Chuss), Effect::Popup]);
        }
        effects
    }

    pub fn on_quiz_next(&mut self) -> Vec<Effect> {
        if !self.on_stage(Stage::Quiz) || self.quiz.answered().is_none() {
            return Vec::new();
        }
        match self.quiz.advance() {
            QuizProgress::Question(index) => vec![Effect::ShowQuestion { index }],
            QuizProgress::Finished => self.go_to(Stage::Code),
        }
    }

    // === Code ===

    pub fn on_code_submit(&mut self, src: &str) -> Vec<Effect> {
        if !self.on_stage(Stage::Code) {
            return Vec::new();
        }
        let verdict = check_code(src, SOLUTION);
        let mut effects = vec![Effect::CodeFeedback(verdict)];
        if verdict == CodeVerdict::Accepted {
            effects.extend(self.go_to(Stage::Choice));
        } else {
            effects.extend([Effect::Cue(Cue::Chuss), Effect::Popup]);
        }
        effects
    }

    // === Choice ===

    pub fn on_choice_yes(&mut self) -> Vec<Effect> {
        if !self.on_stage(Stage::Choice) || self.choice_made {
            return Vec::new();
        }
        self.choice_made = true;
        vec![
            Effect::ChoiceAccepted,
            Effect::Schedule {
                delay_ms: CHOICE_TO_CERT_MS,
                then: Deferred::GoTo(Stage::Cert),
            },
        ]
    }

    /// The "no" button runs away from `container` sized pointer attempts
    pub fn on_choice_no(&mut self, container: Vec2, button: Vec2) -> Vec<Effect> {
        if !self.on_stage(Stage::Choice) || self.choice_made {
            return Vec::new();
        }
        let (pos, tilt) = dodge_position(&mut self.fx_rng, container, button, DODGE_PADDING);
        vec![Effect::DodgeNo { pos, tilt }, Effect::Cue(Cue::Chuss), Effect::Popup]
    }

    // === Loading / envelope ===

    pub fn on_start_loading(&mut self) -> Vec<Effect> {
        if !self.on_stage(Stage::Cert) || self.loading_started {
            return Vec::new();
        }
        self.loading_started = true;
        let mut effects = self.go_to(Stage::Loading);
        effects.extend([
            Effect::FillProgress {
                duration_ms: LOADING_MS,
            },
            Effect::Schedule {
                delay_ms: LOADING_MS,
                then: Deferred::GoTo(Stage::Envelope),
            },
        ]);
        effects
    }

    pub fn on_open_envelope(&mut self) -> Vec<Effect> {
        if !self.on_stage(Stage::Envelope) || self.envelope_opened {
            return Vec::new();
        }
        self.envelope_opened = true;
        vec![
            Effect::OpenEnvelope,
            Effect::Schedule {
                delay_ms: ENVELOPE_OPEN_MS,
                then: Deferred::GoTo(Stage::Letter),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::choose_direction;

    fn plan_in(effects: &[Effect]) -> Option<TransitionPlan> {
        effects.iter().find_map(|e| match e {
            Effect::AnimateStage { plan, .. } => Some(*plan),
            _ => None,
        })
    }

    fn deferred_in(effects: &[Effect]) -> Option<(u32, Deferred)> {
        effects.iter().find_map(|e| match e {
            Effect::Schedule { delay_ms, then } => Some((*delay_ms, *then)),
            _ => None,
        })
    }

    /// Finish the transition found in `effects`
    fn finish(exp: &mut Experience, effects: &[Effect]) -> Vec<Effect> {
        let plan = plan_in(effects).expect("a stage animation");
        exp.on_transition_complete(plan.id).unwrap()
    }

    fn win_snake(exp: &mut Experience) -> Vec<Effect> {
        for _ in 0..5_000 {
            if let Some(dir) = choose_direction(exp.engine().state()) {
                exp.on_direction(dir);
            }
            let effects = exp.on_tick();
            if plan_in(&effects).is_some() {
                return effects;
            }
        }
        panic!("snake never won");
    }

    #[test]
    fn test_start_arms_timer_and_input() {
        let mut exp = Experience::new(Settings::default(), 42);
        let effects = exp.start();
        assert_eq!(
            effects[0],
            Effect::ArmTimer {
                period_ms: TICK_MS,
                generation: 1
            }
        );
        assert!(effects.contains(&Effect::AttachInput));
        assert!(exp.engine().is_running());
    }

    #[test]
    fn test_keys_and_swipes_steer() {
        let mut exp = Experience::new(Settings::default(), 42);
        exp.start();
        assert!(exp.on_key("ArrowUp"));
        assert!(!exp.on_key("Enter"));
        assert_eq!(exp.engine().state().heading, Direction::Up.heading());

        exp.on_touch_start(Vec2::new(100.0, 100.0));
        assert!(exp.on_touch_move(Vec2::new(60.0, 100.0)));
        assert_eq!(exp.engine().state().heading, Direction::Left.heading());
        // gesture consumed
        assert!(!exp.on_touch_move(Vec2::new(60.0, 20.0)));
    }

    #[test]
    fn test_win_transitions_to_quiz_exactly_once() {
        let mut exp = Experience::new(Settings::default(), 7);
        exp.start();
        let effects = win_snake(&mut exp);

        assert!(effects.contains(&Effect::CancelTimer));
        assert!(effects.contains(&Effect::DetachInput));
        let plan = plan_in(&effects).unwrap();
        assert_eq!((plan.outgoing, plan.incoming), (Stage::Game, Stage::Quiz));

        // late ticks from a not-yet-cleared interval change nothing
        let frozen = exp.engine().state().clone();
        for _ in 0..3 {
            assert_eq!(exp.on_tick(), vec![Effect::CancelTimer]);
        }
        assert_eq!(exp.engine().state(), &frozen);

        let entered = exp.on_transition_complete(plan.id).unwrap();
        assert!(entered.contains(&Effect::ShowQuestion { index: 0 }));
        assert_eq!(exp.sequencer().active(), Stage::Quiz);
    }

    #[test]
    fn test_stale_timer_generation_is_dropped() {
        let mut exp = Experience::new(Settings::default(), 42);
        exp.start();
        exp.start();
        exp.on_direction(Direction::Up);

        assert!(exp.on_timer(1).is_empty());
        assert_eq!(exp.engine().state().time_ticks, 0);
        assert!(exp.on_timer(2).contains(&Effect::Redraw));
        assert_eq!(exp.engine().state().time_ticks, 1);
    }

    #[test]
    fn test_returning_to_game_restarts_snake() {
        let mut exp = Experience::new(Settings::default(), 5);
        exp.start();
        let effects = exp.go_to(Stage::Quiz);
        finish(&mut exp, &effects);
        assert!(!exp.engine().is_running());

        let effects = exp.go_to(Stage::Game);
        let entered = finish(&mut exp, &effects);
        assert!(entered.contains(&Effect::ArmTimer {
            period_ms: TICK_MS,
            generation: 2
        }));
        assert!(entered.contains(&Effect::AttachInput));
        assert!(exp.engine().is_running());
        assert_eq!(exp.engine().state().score, 0);
    }

    #[test]
    fn test_oversized_win_score_still_reaches_quiz() {
        let settings = Settings::from_json(r#"{"grid_size": 5, "win_score": 40}"#).unwrap();
        let mut exp = Experience::new(settings, 11);
        exp.start();
        let win = exp.engine().rules().win_score;
        assert_eq!(win, 12);

        {
            let state = exp.engine.state_mut();
            let body = [(0, 2), (0, 1), (1, 1), (2, 1), (3, 1), (4, 1), (4, 0), (3, 0), (2, 0), (1, 0), (0, 0), (1, 2)];
            *state = crate::sim::SnakeState::with_body(
                5,
                body.map(|(x, y)| crate::sim::GridPos::new(x, y)),
                Direction::Down.heading(),
            );
            state.food = crate::sim::GridPos::new(0, 3);
            state.score = win - 1;
        }

        let effects = exp.on_tick();
        assert!(effects.contains(&Effect::Score(win)));
        let plan = plan_in(&effects).expect("a transition to the quiz");
        assert_eq!(plan.incoming, Stage::Quiz);
        assert!(exp.engine().has_won());
    }

    #[test]
    fn test_leaving_game_early_stops_snake() {
        let mut exp = Experience::new(Settings::default(), 7);
        exp.start();
        let effects = exp.go_to(Stage::Letter);
        assert!(effects.contains(&Effect::CancelTimer));
        assert!(!exp.engine().is_running());
    }

    #[test]
    fn test_handlers_ignored_off_stage() {
        let mut exp = Experience::new(Settings::default(), 7);
        exp.start();
        assert!(exp.on_quiz_answer(1).is_empty());
        assert!(exp.on_code_submit("System.out.println(\"Hamster I Like You\")").is_empty());
        assert!(exp.on_choice_yes().is_empty());
        assert!(exp.on_open_envelope().is_empty());
    }

    #[test]
    fn test_wrong_answers_trigger_cue() {
        let mut exp = Experience::new(Settings::default(), 7);
        exp.start();
        let effects = exp.go_to(Stage::Quiz);
        finish(&mut exp, &effects);

        let effects = exp.on_quiz_answer(0);
        assert!(effects.contains(&Effect::Popup));
        // next only once answered, answer only once
        assert!(exp.on_quiz_answer(1).is_empty());
        assert_eq!(exp.on_quiz_next(), vec![Effect::ShowQuestion { index: 1 }]);
        assert!(exp.on_quiz_next().is_empty());
    }

    #[test]
    fn test_full_flow_reaches_letter() {
        let mut exp = Experience::new(Settings::default(), 99);
        exp.start();

        let effects = win_snake(&mut exp);
        finish(&mut exp, &effects);

        // quiz
        let mut last = Vec::new();
        for q in crate::stage::QUIZ {
            let fb = exp.on_quiz_answer(q.correct);
            assert!(matches!(&fb[0], Effect::QuizFeedback(f) if f.is_correct));
            last = exp.on_quiz_next();
        }
        finish(&mut exp, &last);
        assert_eq!(exp.sequencer().active(), Stage::Code);

        // code
        let bad = exp.on_code_submit("print('hi')");
        assert_eq!(bad[0], Effect::CodeFeedback(CodeVerdict::MissingPrint));
        let good = exp.on_code_submit("System.out.println(\"Hamster I Like You\");");
        finish(&mut exp, &good);
        assert_eq!(exp.sequencer().active(), Stage::Choice);

        // choice
        let dodge = exp.on_choice_no(Vec2::new(300.0, 400.0), Vec2::new(80.0, 40.0));
        assert!(matches!(dodge[0], Effect::DodgeNo { .. }));
        let yes = exp.on_choice_yes();
        assert_eq!(deferred_in(&yes), Some((CHOICE_TO_CERT_MS, Deferred::GoTo(Stage::Cert))));
        assert!(exp.on_choice_yes().is_empty());
        let to_cert = exp.on_deferred(Deferred::GoTo(Stage::Cert));
        let entered = finish(&mut exp, &to_cert);
        assert!(entered.contains(&Effect::RevealCard));
        assert_eq!(deferred_in(&entered), Some((CERT_SPARK_DELAY_MS, Deferred::SparkBurst)));
        match &exp.on_deferred(Deferred::SparkBurst)[0] {
            Effect::Sparks(sparks) => assert_eq!(sparks.len(), SPARK_COUNT),
            other => panic!("expected sparks, got {other:?}"),
        }

        // loading -> envelope -> letter
        let loading = exp.on_start_loading();
        assert!(loading.contains(&Effect::FillProgress { duration_ms: LOADING_MS }));
        let (_, then) = deferred_in(&loading).unwrap();
        finish(&mut exp, &loading);
        let to_envelope = exp.on_deferred(then);
        finish(&mut exp, &to_envelope);
        assert_eq!(exp.sequencer().active(), Stage::Envelope);

        let open = exp.on_open_envelope();
        let (_, then) = deferred_in(&open).unwrap();
        let to_letter = exp.on_deferred(then);
        let entered = finish(&mut exp, &to_letter);
        assert!(entered.iter().any(|e| matches!(e, Effect::Hearts(h) if h.len() == PARALLAX_HEART_COUNT)));
        assert_eq!(exp.sequencer().active(), Stage::Letter);
    }

    #[test]
    fn test_reduced_motion_drops_decoration() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let mut exp = Experience::new(settings, 3);
        exp.start();
        let effects = exp.go_to(Stage::Cert);
        assert!(matches!(
            effects.last(),
            Some(Effect::AnimateStage { exit_ms: 0, enter_ms: 0, .. })
        ));
        let entered = finish(&mut exp, &effects);
        assert_eq!(deferred_in(&entered), None);
    }

    #[test]
    fn test_double_transition_is_queued_not_lost() {
        let mut exp = Experience::new(Settings::default(), 3);
        exp.start();
        let first = exp.go_to(Stage::Quiz);
        assert!(exp.go_to(Stage::Code).is_empty());
        let after = finish(&mut exp, &first);
        let next = plan_in(&after).unwrap();
        assert_eq!((next.outgoing, next.incoming), (Stage::Quiz, Stage::Code));
    }
}
