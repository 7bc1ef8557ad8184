//! Easing for the play animation and the hover effects.
//!
//! Built on Bevy's [`EaseFunction`] curves. The only hand-written curve is
//! back-out with a custom overshoot, which `EaseFunction` has no variant for.

use bevy::prelude::*;

/// Back-out curve with a custom overshoot amount.
pub fn back_out_with(t: f32, overshoot: f32) -> f32 {
    let u = t - 1.0;
    1.0 + (overshoot + 1.0) * u.powi(3) + overshoot * u.powi(2)
}

/// Easing a tween can store: one of Bevy's curves, or back-out with a
/// chosen overshoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEase {
    Function(EaseFunction),
    BackOut(f32),
}

impl Curve<f32> for TweenEase {
    fn domain(&self) -> Interval {
        Interval::UNIT
    }

    fn sample_unchecked(&self, t: f32) -> f32 {
        match self {
            TweenEase::Function(function) => function.sample_unchecked(t),
            TweenEase::BackOut(overshoot) => back_out_with(t, *overshoot),
        }
    }
}

/// Sine wave going 0 → 1 → 0 every two units of `t`.
pub fn idle_wave(t: f32) -> f32 {
    EaseFunction::SineInOut
        .ping_pong()
        .ok()
        .and_then(|curve| curve.forever().ok())
        .map_or(0.0, |curve| curve.sample_clamped(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn curves_hit_their_endpoints() {
        for ease in [
            TweenEase::BackOut(1.5),
            TweenEase::BackOut(1.0),
            TweenEase::Function(EaseFunction::QuadraticOut),
            TweenEase::Function(EaseFunction::CubicInOut),
        ] {
            assert!(ease.sample_clamped(0.0).abs() < EPS, "{ease:?} at 0");
            assert!((ease.sample_clamped(1.0) - 1.0).abs() < EPS, "{ease:?} at 1");
        }
    }

    #[test]
    fn larger_overshoot_goes_further_past_the_end() {
        let peak = |overshoot: f32| {
            (1..100)
                .map(|i| back_out_with(i as f32 / 100.0, overshoot))
                .fold(f32::MIN, f32::max)
        };
        assert!(peak(1.0) > 1.0);
        assert!(peak(1.5) > peak(1.0));
    }

    #[test]
    fn sampling_clamps_progress() {
        let ease = TweenEase::Function(EaseFunction::QuadraticOut);
        assert_eq!(ease.sample_clamped(2.0), 1.0);
        assert_eq!(ease.sample_clamped(-1.0), 0.0);
    }

    #[test]
    fn idle_wave_bounces() {
        assert!(idle_wave(0.0).abs() < EPS);
        assert!((idle_wave(0.5) - 0.5).abs() < EPS);
        assert!((idle_wave(1.0) - 1.0).abs() < EPS);
        assert!((idle_wave(1.5) - 0.5).abs() < EPS);
        assert!(idle_wave(2.0).abs() < EPS);
        assert!((idle_wave(3.0) - 1.0).abs() < EPS);
    }
}
