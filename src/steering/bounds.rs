use crate::geom::{BBox, Vec3};

use super::agent::{AgentState, SteeringBehavior, SteeringContext};

/// Pushes the agent back towards an axis-aligned box once it leaves it.
///
/// Every axis on which the agent is outside contributes a unit push towards
/// the box, scaled by `turn_strength * delta_time`. Inside the box the force
/// is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StayInBoundsBehavior {
    pub bounds: BBox,
    pub turn_strength: f64,
}

impl StayInBoundsBehavior {
    #[must_use]
    pub fn new(bounds: BBox, turn_strength: f64) -> Self {
        Self {
            bounds,
            turn_strength,
        }
    }
}

impl SteeringBehavior for StayInBoundsBehavior {
    fn name(&self) -> &'static str {
        "stay_in_bounds"
    }

    fn steer(&mut self, state: &AgentState, ctx: &SteeringContext) -> Vec3 {
        let p = state.position;
        let (min, max) = (self.bounds.min, self.bounds.max);
        let push = |v: f64, lo: f64, hi: f64| {
            if v > hi {
                -1.0
            } else if v < lo {
                1.0
            } else {
                0.0
            }
        };

        let turn = Vec3::new(
            push(p.x, min.x, max.x),
            push(p.y, min.y, max.y),
            push(p.z, min.z, max.z),
        );
        turn * (self.turn_strength * ctx.delta_time)
    }
}
