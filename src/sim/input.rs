//! Input mapping: keyboard keys and swipe gestures to directions

use glam::Vec2;

use super::state::Direction;
use crate::consts::SWIPE_THRESHOLD;

/// Map a `KeyboardEvent.key` value to a direction
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    }
}

/// Recognizes one direction per touch drag
///
/// The displacement is measured from the touch start. Once a direction is
/// recognized the gesture is consumed, so a long drag cannot turn the snake
/// twice; small jitter below the threshold leaves the gesture open.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    start: Option<Vec2>,
    threshold: f32,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            start: None,
            threshold,
        }
    }

    /// Touch started
    pub fn begin(&mut self, pos: Vec2) {
        self.start = Some(pos);
    }

    /// Touch moved; returns the recognized direction, if any
    pub fn moved(&mut self, pos: Vec2) -> Option<Direction> {
        let start = self.start?;
        let delta = start - pos;

        let dir = if delta.x.abs() > delta.y.abs() {
            if delta.x > self.threshold {
                Some(Direction::Left)
            } else if delta.x < -self.threshold {
                Some(Direction::Right)
            } else {
                None
            }
        } else if delta.y > self.threshold {
            Some(Direction::Up)
        } else if delta.y < -self.threshold {
            Some(Direction::Down)
        } else {
            None
        };

        if dir.is_some() {
            self.start = None;
        }
        dir
    }

    /// Touch ended or was cancelled
    pub fn end(&mut self) {
        self.start = None;
    }

    pub fn in_progress(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(direction_for_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(direction_for_key("ArrowRight"), Some(Direction::Right));
        assert_eq!(direction_for_key("w"), None);
    }

    #[test]
    fn test_swipe_largest_axis_wins() {
        let mut swipe = SwipeTracker::new(10.0);
        swipe.begin(Vec2::new(100.0, 100.0));
        // moved 30 left and 12 down: horizontal dominates
        assert_eq!(swipe.moved(Vec2::new(70.0, 112.0)), Some(Direction::Left));

        swipe.begin(Vec2::new(100.0, 100.0));
        assert_eq!(swipe.moved(Vec2::new(105.0, 60.0)), Some(Direction::Up));

        swipe.begin(Vec2::new(100.0, 100.0));
        assert_eq!(swipe.moved(Vec2::new(100.0, 125.0)), Some(Direction::Down));

        swipe.begin(Vec2::new(100.0, 100.0));
        assert_eq!(swipe.moved(Vec2::new(150.0, 100.0)), Some(Direction::Right));
    }

    #[test]
    fn test_swipe_consumed_after_recognition() {
        let mut swipe = SwipeTracker::default();
        swipe.begin(Vec2::new(0.0, 0.0));
        assert_eq!(swipe.moved(Vec2::new(20.0, 0.0)), Some(Direction::Right));
        assert!(!swipe.in_progress());
        // the same drag keeps going but cannot emit again
        assert_eq!(swipe.moved(Vec2::new(0.0, -80.0)), None);
    }

    #[test]
    fn test_jitter_keeps_gesture_open() {
        let mut swipe = SwipeTracker::new(10.0);
        swipe.begin(Vec2::new(50.0, 50.0));
        assert_eq!(swipe.moved(Vec2::new(47.0, 52.0)), None);
        assert!(swipe.in_progress());
        assert_eq!(swipe.moved(Vec2::new(30.0, 52.0)), Some(Direction::Left));
    }

    #[test]
    fn test_move_without_begin_is_ignored() {
        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.moved(Vec2::new(500.0, 0.0)), None);
        swipe.begin(Vec2::ZERO);
        swipe.end();
        assert_eq!(swipe.moved(Vec2::new(500.0, 0.0)), None);
    }
}
