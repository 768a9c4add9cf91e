use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{Transform, Vec3};

use super::agent::{AgentState, SteeringBehavior, SteeringContext};

/// Range the per-axis noise offsets are drawn from.
const NOISE_OFFSET_RANGE: f64 = 1000.0;

/// Smooth random turning driven by 1D gradient noise over time.
///
/// Each update, two noise channels in `[-1, 1]` pick a pitch and a yaw rate
/// of at most `turn_strength` degrees per second.
#[derive(Debug, Clone, PartialEq)]
pub struct WanderBehavior {
    /// Maximum turn rate, degrees per second.
    pub turn_strength: f64,
    pub noise_frequency: f64,
    offset_x: f64,
    offset_y: f64,
}

impl WanderBehavior {
    #[must_use]
    pub fn new(turn_strength: f64, noise_frequency: f64, rng: &mut impl Rng) -> Self {
        Self {
            turn_strength,
            noise_frequency,
            offset_x: rng.random_range(0.0..NOISE_OFFSET_RANGE),
            offset_y: rng.random_range(0.0..NOISE_OFFSET_RANGE),
        }
    }

    #[must_use]
    pub fn from_seed(turn_strength: f64, noise_frequency: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(turn_strength, noise_frequency, &mut rng)
    }

    /// Noise values `(yaw, pitch)` in `[-1, 1]` at `time`.
    #[must_use]
    pub fn turn_at(&self, time: f64) -> (f64, f64) {
        let t = time * self.noise_frequency;
        (
            gradient_noise_1d(t + self.offset_x),
            gradient_noise_1d(t + self.offset_y),
        )
    }
}

impl Default for WanderBehavior {
    fn default() -> Self {
        Self::from_seed(45.0, 0.1, 0)
    }
}

impl SteeringBehavior for WanderBehavior {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn steer(&mut self, state: &AgentState, ctx: &SteeringContext) -> Vec3 {
        let (yaw, pitch) = self.turn_at(ctx.time);
        let scale = self.turn_strength * ctx.delta_time;
        let rotation = Transform::from_pitch_yaw_degrees(pitch * scale, yaw * scale);
        rotation.apply_vec(state.direction) - state.direction
    }
}

/// Deterministic 1D gradient noise in `[-1, 1]`; zero at every integer.
#[must_use]
pub fn gradient_noise_1d(x: f64) -> f64 {
    let x0 = x.floor();
    let f = x - x0;
    let i = x0 as i32;

    let d0 = lattice_gradient(i) * f;
    let d1 = lattice_gradient(i.wrapping_add(1)) * (f - 1.0);

    // Quintic fade
    let u = f * f * f * (f * (f * 6.0 - 15.0) + 10.0);
    ((d0 + (d1 - d0) * u) * 2.0).clamp(-1.0, 1.0)
}

/// Pseudo-random gradient in `[-1, 1]` for lattice point `i`.
fn lattice_gradient(i: i32) -> f64 {
    let mut n = i.wrapping_mul(374_761_393_i32).wrapping_add(668_265_263_i32);
    n ^= n >> 13;
    n = n.wrapping_mul(
        n.wrapping_mul(n.wrapping_mul(60_493_i32).wrapping_add(19_990_303_i32))
            .wrapping_add(1_376_312_589_i32),
    );
    let normalized = f64::from(n as u32) / f64::from(u32::MAX);
    normalized * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;

    #[test]
    fn test_noise_range_and_continuity() {
        let mut prev = gradient_noise_1d(0.0);
        for k in 1..2000 {
            let x = k as f64 * 0.013;
            let n = gradient_noise_1d(x);
            assert!((-1.0..=1.0).contains(&n));
            assert!((n - prev).abs() < 0.1, "noise jumped at x={x}");
            prev = n;
        }
        assert!(gradient_noise_1d(7.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_wander() {
        let a = WanderBehavior::from_seed(45.0, 0.1, 42);
        let b = WanderBehavior::from_seed(45.0, 0.1, 42);
        let c = WanderBehavior::from_seed(45.0, 0.1, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.turn_at(12.5), b.turn_at(12.5));
    }

    #[test]
    fn test_force_keeps_heading_unit_length() {
        let mut wander = WanderBehavior::from_seed(45.0, 0.1, 7);
        let state = AgentState::new(Point3::ORIGIN, Vec3::new(0.2, 0.1, 1.0));
        let ctx = SteeringContext {
            time: 3.7,
            delta_time: 1.0 / 30.0,
        };
        let force = wander.steer(&state, &ctx);
        let rotated = state.direction + force;
        assert!((rotated.length() - 1.0).abs() < 1e-9);
        // At most 45 deg/s over 1/30 s on each axis.
        assert!(force.length() < 0.05);
    }

    #[test]
    fn test_zero_delta_time_gives_no_force() {
        let mut wander = WanderBehavior::default();
        let ctx = SteeringContext {
            time: 1.0,
            delta_time: 0.0,
        };
        let force = wander.steer(&AgentState::default(), &ctx);
        assert!(force.length() < 1e-12);
    }
}
