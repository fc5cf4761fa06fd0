//! Trailing-stop ratchet.
//!
//! **Core rule:** a trailing stop may tighten, never loosen.
//! - Long: level = max(level, price * (1 - pct))
//! - Short: level = min(level, price * (1 + pct))

use crate::domain::Direction;

/// Percent trailing stop for one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingRatchet {
    direction: Direction,
    /// Distance from price as a fraction (5% → 0.05).
    fraction: f64,
}

impl TrailingRatchet {
    pub fn new(direction: Direction, pct: f64) -> Self {
        Self {
            direction,
            fraction: pct / 100.0,
        }
    }

    /// Level implied by `price` alone.
    pub fn level_at(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => price * (1.0 - self.fraction),
            Direction::Short => price * (1.0 + self.fraction),
        }
    }

    /// Ratchet `current` toward the level implied by `price`.
    pub fn apply(&self, current: f64, price: f64) -> f64 {
        let proposed = self.level_at(price);
        match self.direction {
            Direction::Long => current.max(proposed),
            Direction::Short => current.min(proposed),
        }
    }
}

/// Whether `price` has crossed a protective `level` against a position in
/// `direction`.
pub fn stop_hit(direction: Direction, level: f64, price: f64) -> bool {
    match direction {
        Direction::Long => price <= level,
        Direction::Short => price >= level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn long_tightening_allowed() {
        let r = TrailingRatchet::new(Direction::Long, 5.0);
        assert_approx(r.apply(95.0, 110.0), 104.5, DEFAULT_EPSILON);
    }

    #[test]
    fn long_loosening_blocked() {
        let r = TrailingRatchet::new(Direction::Long, 5.0);
        assert_eq!(r.apply(104.5, 90.0), 104.5);
    }

    #[test]
    fn short_tightening_allowed() {
        let r = TrailingRatchet::new(Direction::Short, 10.0);
        assert_approx(r.apply(110.0, 90.0), 99.0, DEFAULT_EPSILON);
    }

    #[test]
    fn short_loosening_blocked() {
        let r = TrailingRatchet::new(Direction::Short, 10.0);
        assert_eq!(r.apply(99.0, 120.0), 99.0);
    }

    #[test]
    fn hit_detection() {
        assert!(stop_hit(Direction::Long, 95.0, 95.0));
        assert!(!stop_hit(Direction::Long, 95.0, 95.1));
        assert!(stop_hit(Direction::Short, 105.0, 106.0));
        assert!(!stop_hit(Direction::Short, 105.0, 104.0));
    }
}
