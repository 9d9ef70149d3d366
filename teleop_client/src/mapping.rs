//! Stick state to teleop intents.
//!
//! Left stick drives planar velocity, the bumpers turn at a fixed rate, the
//! right stick drives head rate. Output is always finite and within [-1, 1];
//! an unusable axis reading counts as centered.

use teleop_common::hal::types::{Velocity, clip_norm};

/// Held controller state, axes normalized to [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickState {
    pub lx: f64,
    pub ly: f64,
    pub rx: f64,
    pub ry: f64,
    /// Left bumper (turn left).
    pub lb: bool,
    /// Right bumper (turn right).
    pub rb: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapParams {
    pub deadzone: f64,
    pub max_vx: f64,
    pub max_vy: f64,
    /// Turn rate while one bumper is held.
    pub hold_vw: f64,
    /// Stick up (negative raw Y) means forward / look up.
    pub invert_y: bool,
    pub head_yaw_scale: f64,
    pub head_pitch_scale: f64,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            deadzone: 0.12,
            max_vx: 1.0,
            max_vy: 1.0,
            hold_vw: 0.6,
            invert_y: true,
            head_yaw_scale: 0.8,
            head_pitch_scale: 0.8,
        }
    }
}

fn deadzone(value: f64, dz: f64) -> f64 {
    let value = clip_norm(value);
    if value.abs() < dz { 0.0 } else { value }
}

/// Planar velocity intent.
pub fn map_velocity(stick: &StickState, p: &MapParams) -> Velocity {
    let lx = deadzone(stick.lx, p.deadzone);
    let ly = deadzone(stick.ly, p.deadzone);

    let vy = lx * p.max_vy;
    let vx = (if p.invert_y { -ly } else { ly }) * p.max_vx;
    let vw = match (stick.lb, stick.rb) {
        (true, false) => p.hold_vw.abs(),
        (false, true) => -p.hold_vw.abs(),
        _ => 0.0,
    };
    Velocity::clipped(vx, vy, vw)
}

/// Head rate intent as `(yaw_n, pitch_n)`.
pub fn map_head(stick: &StickState, p: &MapParams) -> (f64, f64) {
    let rx = deadzone(stick.rx, p.deadzone);
    let ry = deadzone(stick.ry, p.deadzone);
    let ry = if p.invert_y { -ry } else { ry };
    (
        clip_norm(rx * p.head_yaw_scale),
        clip_norm(ry * p.head_pitch_scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centered_stick_is_zero() {
        let p = MapParams::default();
        let stick = StickState {
            lx: 0.1,
            ly: -0.11,
            rx: 0.05,
            ..Default::default()
        };
        assert_eq!(map_velocity(&stick, &p), Velocity::ZERO);
        assert_eq!(map_head(&stick, &p), (0.0, 0.0));
    }

    #[test]
    fn stick_up_is_forward() {
        let stick = StickState {
            ly: -1.0,
            lx: 0.5,
            ..Default::default()
        };
        let v = map_velocity(&stick, &MapParams::default());
        assert_eq!(v.vx, 1.0);
        assert_eq!(v.vy, 0.5);
    }

    #[test]
    fn bumpers_turn_and_cancel() {
        let p = MapParams::default();
        let left = StickState {
            lb: true,
            ..Default::default()
        };
        let both = StickState {
            lb: true,
            rb: true,
            ..Default::default()
        };
        let right = StickState {
            rb: true,
            ..Default::default()
        };
        assert_eq!(map_velocity(&left, &p).vw, 0.6);
        assert_eq!(map_velocity(&right, &p).vw, -0.6);
        assert_eq!(map_velocity(&both, &p).vw, 0.0);
    }

    #[test]
    fn head_scaled_and_inverted() {
        let stick = StickState {
            rx: 1.0,
            ry: -0.5,
            ..Default::default()
        };
        let (yaw, pitch) = map_head(&stick, &MapParams::default());
        assert!((yaw - 0.8).abs() < 1e-12);
        assert!((pitch - 0.4).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn output_always_normalized(
            lx in proptest::num::f64::ANY,
            ly in proptest::num::f64::ANY,
            rx in proptest::num::f64::ANY,
            ry in proptest::num::f64::ANY,
            lb in any::<bool>(),
            rb in any::<bool>(),
        ) {
            let stick = StickState { lx, ly, rx, ry, lb, rb };
            let p = MapParams::default();
            let v = map_velocity(&stick, &p);
            let (yaw, pitch) = map_head(&stick, &p);
            for x in [v.vx, v.vy, v.vw, yaw, pitch] {
                prop_assert!(x.is_finite() && (-1.0..=1.0).contains(&x));
            }
        }
    }
}
