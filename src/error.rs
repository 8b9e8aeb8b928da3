//! Crate error type
//!
//! Only conditions the game cannot absorb on its own end up here. Reversal
//! attempts, self-collisions and food resampling are ordinary gameplay.

use std::fmt::{self, Display, Formatter};

use crate::stage::Stage;

#[derive(Debug)]
pub enum Error {
    /// Food placement ran out of attempts (grid nearly full)
    GridSaturated { attempts: u32, occupied: usize },
    /// A stage id that is not part of the experience
    UnknownStage(String),
    /// Transition requested to the stage that is already showing
    AlreadyActive(Stage),
    /// Completion token does not match the in-flight transition
    StaleTransition { id: u64 },
    /// Completion reported while no transition was running
    NoTransitionInFlight,
    Json(serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::GridSaturated { attempts, occupied } => write!(
                f,
                "no free cell found for food after {attempts} attempts ({occupied} cells occupied)"
            ),
            Error::UnknownStage(id) => write!(f, "unknown stage '{id}'"),
            Error::AlreadyActive(stage) => write!(f, "stage '{}' is already active", stage.id()),
            Error::StaleTransition { id } => write!(f, "transition {id} is not the one in flight"),
            Error::NoTransitionInFlight => write!(f, "no stage transition in flight"),
            Error::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T = ()> = std::result::Result<T, Error>;
