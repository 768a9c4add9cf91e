//! Agent steering and the spline trail it leaves behind.
//!
//! A [`SteeringAgent`] owns an explicit [`AgentState`] and an ordered list of
//! [`SteeringBehavior`]s. Each update, the behaviours' forces are summed into
//! one accumulator, added to the heading and renormalized; the agent then
//! moves at constant speed. A [`PathFollower`] turns the agent's positions
//! into a [`SplinePath`](crate::geom::SplinePath) a tunnel can be built along.

mod agent;
mod bounds;
mod follower;
mod wander;

pub use agent::{AgentState, SteeringAgent, SteeringBehavior, SteeringContext};
pub use bounds::StayInBoundsBehavior;
pub use follower::{DEFAULT_MAX_KNOTS, DEFAULT_SEGMENT_LENGTH, PathFollower};
pub use wander::{WanderBehavior, gradient_noise_1d};
