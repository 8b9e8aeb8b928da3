//! Stages of the experience and the sequencer that moves between them

pub mod code;
pub mod effects;
pub mod quiz;
pub mod sequencer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use code::{CodeVerdict, check_code};
pub use effects::{Heart, Spark, dodge_position, parallax_hearts, spark_burst};
pub use quiz::{AnswerFeedback, QUIZ, QuizProgress, QuizQuestion, QuizState};
pub use sequencer::{Completion, EntryHook, Sequencer, SequencerState, TransitionPlan};

/// One full-panel view, in the order the experience visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Game,
    Quiz,
    Code,
    Choice,
    Cert,
    Loading,
    Envelope,
    Letter,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Game,
        Stage::Quiz,
        Stage::Code,
        Stage::Choice,
        Stage::Cert,
        Stage::Loading,
        Stage::Envelope,
        Stage::Letter,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Stage::Game => "game",
            Stage::Quiz => "quiz",
            Stage::Code => "code",
            Stage::Choice => "choice",
            Stage::Cert => "cert",
            Stage::Loading => "loading",
            Stage::Envelope => "envelope",
            Stage::Letter => "letter",
        }
    }

    /// DOM id of the stage panel
    pub fn element_id(&self) -> String {
        format!("stage-{}", self.id())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        let id = id.strip_prefix("stage-").unwrap_or(&id);
        Stage::ALL
            .into_iter()
            .find(|stage| stage.id() == id)
            .ok_or_else(|| Error::UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_from_str() {
        for stage in Stage::ALL {
            assert_eq!(stage.id().parse::<Stage>().unwrap(), stage);
            assert_eq!(stage.element_id().parse::<Stage>().unwrap(), stage);
        }
        assert!(matches!("prologue".parse::<Stage>(), Err(Error::UnknownStage(_))));
    }
}
