//! Decorative effects of the later stages
//!
//! Only the random parameters are generated here; the platform animates them.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A spark flying out of the certificate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub origin: Vec2,
    /// Final offset from `origin` (px)
    pub travel: Vec2,
    /// Seconds until fully faded
    pub life: f32,
}

impl Spark {
    pub fn target(&self) -> Vec2 {
        self.origin + self.travel
    }
}

/// Sparks in random directions from `center`
pub fn spark_burst(rng: &mut impl Rng, center: Vec2, count: usize) -> Vec<Spark> {
    (0..count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let speed = 100.0 + rng.random::<f32>() * 200.0;
            Spark {
                origin: center,
                travel: Vec2::from_angle(angle) * speed,
                life: 1.0 + rng.random::<f32>(),
            }
        })
        .collect()
}

/// A floating heart behind the letter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    /// Percent of the container
    pub left: f32,
    pub top: f32,
    pub font_px: f32,
    pub opacity: f32,
    /// Vertical drift over a full scroll of the letter (px)
    pub drift: f32,
}

pub fn parallax_hearts(rng: &mut impl Rng, count: usize) -> Vec<Heart> {
    (0..count)
        .map(|_| Heart {
            left: rng.random::<f32>() * 100.0,
            top: rng.random::<f32>() * 100.0,
            font_px: 10.0 + rng.random::<f32>() * 20.0,
            opacity: 0.2 + rng.random::<f32>() * 0.5,
            drift: (rng.random::<f32>() - 0.5) * 400.0,
        })
        .collect()
}

/// New spot for the "no" button, and a tilt in degrees
///
/// Keeps the whole button inside `container` with `padding` on every side.
/// A container smaller than the button pins it to the padding corner.
pub fn dodge_position(rng: &mut impl Rng, container: Vec2, button: Vec2, padding: f32) -> (Vec2, f32) {
    let room = (container - button - Vec2::splat(2.0 * padding)).max(Vec2::ZERO);
    let pos = Vec2::splat(padding) + Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * room;
    let tilt = rng.random::<f32>() * 10.0 - 5.0;
    (pos, tilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spark_burst_ranges() {
        let mut rng = Pcg32::seed_from_u64(5);
        let center = Vec2::new(200.0, 300.0);
        let sparks = spark_burst(&mut rng, center, 40);
        assert_eq!(sparks.len(), 40);
        for s in &sparks {
            assert_eq!(s.origin, center);
            let dist = s.travel.length();
            assert!((99.9..=300.1).contains(&dist), "distance {dist}");
            assert!((1.0..=2.0).contains(&s.life));
        }
    }

    #[test]
    fn test_hearts_ranges() {
        let mut rng = Pcg32::seed_from_u64(9);
        for h in parallax_hearts(&mut rng, 20) {
            assert!((0.0..=100.0).contains(&h.left));
            assert!((0.0..=100.0).contains(&h.top));
            assert!((10.0..=30.0).contains(&h.font_px));
            assert!((0.2..=0.7).contains(&h.opacity));
            assert!((-200.0..=200.0).contains(&h.drift));
        }
    }

    #[test]
    fn test_dodge_stays_inside() {
        let mut rng = Pcg32::seed_from_u64(1);
        let container = Vec2::new(320.0, 480.0);
        let button = Vec2::new(80.0, 40.0);
        for _ in 0..200 {
            let (pos, tilt) = dodge_position(&mut rng, container, button, 15.0);
            assert!(pos.x >= 15.0 && pos.y >= 15.0);
            assert!(pos.x + button.x <= container.x - 15.0 + 0.001);
            assert!(pos.y + button.y <= container.y - 15.0 + 0.001);
            assert!((-5.0..=5.0).contains(&tilt));
        }
    }

    #[test]
    fn test_dodge_in_tiny_container() {
        let mut rng = Pcg32::seed_from_u64(1);
        let (pos, _) = dodge_position(&mut rng, Vec2::new(50.0, 50.0), Vec2::new(80.0, 40.0), 15.0);
        assert_eq!(pos, Vec2::splat(15.0));
    }
}
