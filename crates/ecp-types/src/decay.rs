//! Decay primitives.
//!
//! Both functions move a value toward a baseline and never past it: the
//! sign of `value - baseline` is preserved by every step.

/// Move `value` toward `baseline` by at most `amount` (linear decay).
///
/// A non-positive or `NaN` amount leaves the value unchanged.
pub fn linear_toward(value: f64, baseline: f64, amount: f64) -> f64 {
    if amount.is_nan() || amount <= 0.0 {
        return value;
    }
    if value > baseline {
        (value - amount).max(baseline)
    } else if value < baseline {
        (value + amount).min(baseline)
    } else {
        value
    }
}

/// Move `value` toward `baseline` by the factor `(1 - rate)^steps`
/// (exponential decay).
///
/// `rate` is clamped to `[0, 1]` and negative `steps` are treated as zero,
/// so the distance to the baseline can only shrink.
pub fn exponential_toward(value: f64, baseline: f64, rate: f64, steps: f64) -> f64 {
    let rate = crate::clamp_unit(rate);
    let steps = if steps.is_nan() { 0.0 } else { steps.max(0.0) };
    if steps == 0.0 || rate == 0.0 {
        return value;
    }
    let factor = (1.0 - rate).powf(steps);
    baseline + (value - baseline) * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn linear_stops_at_baseline() {
        assert_eq!(linear_toward(0.9, 0.5, 1.0), 0.5);
        assert_eq!(linear_toward(0.1, 0.5, 1.0), 0.5);
        assert!((linear_toward(0.9, 0.0, 0.2) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn linear_ignores_negative_amount() {
        assert_eq!(linear_toward(0.9, 0.0, -0.3), 0.9);
        assert_eq!(linear_toward(0.9, 0.0, f64::NAN), 0.9);
    }

    #[test]
    fn exponential_half_life() {
        let v = exponential_toward(1.0, 0.5, 0.5, 1.0);
        assert!((v - 0.75).abs() < 1e-12);
    }

    #[test]
    fn exponential_zero_steps_is_identity() {
        assert_eq!(exponential_toward(0.8, 0.5, 0.3, 0.0), 0.8);
        assert_eq!(exponential_toward(0.8, 0.5, 0.3, -4.0), 0.8);
    }

    #[test]
    fn exponential_full_rate_snaps_to_baseline() {
        assert_eq!(exponential_toward(0.1, 0.5, 1.0, 2.0), 0.5);
    }

    proptest! {
        #[test]
        fn exponential_never_overshoots(
            value in 0.0f64..=1.0,
            baseline in 0.0f64..=1.0,
            rate in 0.0f64..=1.0,
            steps in 0.0f64..1000.0,
        ) {
            let decayed = exponential_toward(value, baseline, rate, steps);
            let before = (value - baseline).abs();
            let after = (decayed - baseline).abs();
            prop_assert!(after <= before + 1e-12);
            if value >= baseline {
                prop_assert!(decayed >= baseline - 1e-12);
            } else {
                prop_assert!(decayed <= baseline + 1e-12);
            }
        }

        #[test]
        fn linear_never_overshoots(
            value in 0.0f64..=1.0,
            baseline in 0.0f64..=1.0,
            amount in 0.0f64..10.0,
        ) {
            let decayed = linear_toward(value, baseline, amount);
            prop_assert!((decayed - baseline).abs() <= (value - baseline).abs() + 1e-12);
            if value >= baseline {
                prop_assert!(decayed >= baseline);
            } else {
                prop_assert!(decayed <= baseline);
            }
        }
    }
}
