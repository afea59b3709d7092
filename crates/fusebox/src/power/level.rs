use tracing::warn;

use crate::config::PowerConfig;

/// A bounded, depleting power quantity.
///
/// `floor <= power() <= start` holds after every operation. This is the
/// power-only half of [`PowerState`](super::PowerState) and can be used on its
/// own wherever light tracking is not needed.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerLevel {
    current: f64,
    start: f64,
    floor: f64,
}

impl PowerLevel {
    /// Create a level at `start`. `floor` is clamped to `start` if it exceeds it.
    pub fn new(start: f64, floor: f64) -> Self {
        let floor = floor.min(start);
        Self {
            current: start,
            start,
            floor,
        }
    }

    pub fn from_config(config: &PowerConfig) -> Self {
        Self::new(config.start, config.floor)
    }

    pub fn power(&self) -> f64 {
        self.current
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Force the level to `value`, clamped into `[floor, start]`.
    ///
    /// Meant for administrative resets, not normal depletion.
    pub fn set(&mut self, value: f64) {
        if value.is_nan() {
            warn!("Ignoring attempt to set power to NaN");
            return;
        }
        self.current = value.clamp(self.floor, self.start);
    }

    /// Whether any power is left. A level exactly at the floor counts as none.
    pub fn has_power(&self) -> bool {
        self.current > self.floor
    }

    /// Soft drain for continuous consumption.
    ///
    /// Succeeds whenever any power remains, absorbing whatever part of
    /// `amount` would undershoot the floor.
    pub fn consume(&mut self, amount: f64) -> bool {
        if !valid_amount(amount) || !self.has_power() {
            return false;
        }
        self.current = (self.current - amount).max(self.floor);
        true
    }

    /// Hard drain for paid actions. Either the full `amount` is taken or
    /// nothing changes.
    pub fn deduct(&mut self, amount: f64) -> bool {
        if !valid_amount(amount) || self.current - amount < self.floor {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn reset(&mut self) {
        self.current = self.start;
    }
}

fn valid_amount(amount: f64) -> bool {
    if amount.is_finite() && amount >= 0.0 {
        true
    } else {
        warn!("Rejecting invalid power amount: {}", amount);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_full() {
        let level = PowerLevel::new(100.0, 0.0);
        assert_eq!(level.power(), 100.0);
        assert!(level.has_power());
    }

    #[test]
    fn test_set_clamps_to_bounds() {
        let mut level = PowerLevel::new(100.0, 0.0);

        level.set(500.0);
        assert_eq!(level.power(), 100.0);

        level.set(-20.0);
        assert_eq!(level.power(), 0.0);

        level.set(37.5);
        assert_eq!(level.power(), 37.5);
    }

    #[test]
    fn test_set_ignores_nan() {
        let mut level = PowerLevel::new(100.0, 0.0);
        level.set(f64::NAN);
        assert_eq!(level.power(), 100.0);
    }

    #[test]
    fn test_has_power_is_strict() {
        let mut level = PowerLevel::new(100.0, 10.0);
        level.set(10.0);
        assert!(!level.has_power());
        level.set(10.5);
        assert!(level.has_power());
    }

    #[test]
    fn test_deduct_exact() {
        let mut level = PowerLevel::new(100.0, 0.0);
        assert!(level.deduct(30.0));
        assert_eq!(level.power(), 70.0);
        assert!(level.deduct(70.0));
        assert_eq!(level.power(), 0.0);
        assert!(!level.has_power());
    }

    #[test]
    fn test_deduct_rejects_overdraw() {
        let mut level = PowerLevel::new(100.0, 0.0);
        assert!(!level.deduct(150.0));
        assert_eq!(level.power(), 100.0);
    }

    #[test]
    fn test_deduct_respects_non_zero_floor() {
        let mut level = PowerLevel::new(100.0, 20.0);
        assert!(!level.deduct(81.0));
        assert!(level.deduct(80.0));
        assert_eq!(level.power(), 20.0);
    }

    #[test]
    fn test_consume_absorbs_excess_at_floor() {
        let mut level = PowerLevel::new(100.0, 0.0);
        level.set(50.0);
        assert!(level.consume(200.0));
        assert_eq!(level.power(), 0.0);
    }

    #[test]
    fn test_consume_fails_once_empty() {
        let mut level = PowerLevel::new(100.0, 0.0);
        level.set(0.0);
        assert!(!level.consume(1.0));
        assert!(!level.consume(0.0));
        assert_eq!(level.power(), 0.0);
    }

    #[test]
    fn test_negative_and_non_finite_amounts_are_rejected() {
        let mut level = PowerLevel::new(100.0, 0.0);
        level.set(50.0);

        assert!(!level.deduct(-10.0));
        assert!(!level.consume(-10.0));
        assert!(!level.deduct(f64::NAN));
        assert!(!level.consume(f64::INFINITY));
        assert_eq!(level.power(), 50.0);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut level = PowerLevel::new(100.0, 0.0);
        level.deduct(60.0);
        level.reset();
        assert_eq!(level.power(), 100.0);
    }

    #[test]
    fn test_floor_above_start_is_clamped() {
        let level = PowerLevel::new(10.0, 20.0);
        assert_eq!(level.floor(), 10.0);
        assert!(!level.has_power());
    }

    #[test]
    fn test_level_never_leaves_bounds() {
        let mut level = PowerLevel::new(100.0, 5.0);
        let amounts = [3.0, 40.0, 0.5, 90.0, 7.25, 200.0, 1.0, 0.0, 12.0];

        for (i, amount) in amounts.iter().enumerate() {
            let before = level.power();
            if i % 2 == 0 {
                let ok = level.deduct(*amount);
                if ok {
                    assert_eq!(level.power(), before - amount);
                } else {
                    assert!(before - amount < level.floor());
                    assert_eq!(level.power(), before);
                }
            } else {
                let had_power = level.has_power();
                assert_eq!(level.consume(*amount), had_power);
            }
            assert!(level.power() >= level.floor());
            assert!(level.power() <= level.start());
            assert_eq!(level.has_power(), level.power() != level.floor());
        }
    }
}
