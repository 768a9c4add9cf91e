use std::fmt;

use crate::geom::{Point3, Vec3};

/// Position and heading of a steering agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub position: Point3,
    /// Unit heading.
    pub direction: Vec3,
}

impl AgentState {
    /// State at `position` heading along `direction` (+Z if `direction` is zero).
    #[must_use]
    pub fn new(position: Point3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalized().unwrap_or(Vec3::Z),
        }
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(Point3::ORIGIN, Vec3::Z)
    }
}

/// Clock values handed to each behaviour for one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringContext {
    /// Seconds since the agent started, before this update.
    pub time: f64,
    pub delta_time: f64,
}

/// A contributor to an agent's steering force.
pub trait SteeringBehavior: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Force to add to the agent's direction this update.
    fn steer(&mut self, state: &AgentState, ctx: &SteeringContext) -> Vec3;
}

/// Agent that sums the forces of its behaviours each update, in order.
#[derive(Debug)]
pub struct SteeringAgent {
    state: AgentState,
    move_speed: f64,
    time: f64,
    behaviors: Vec<Box<dyn SteeringBehavior>>,
}

impl SteeringAgent {
    #[must_use]
    pub fn new(state: AgentState, move_speed: f64) -> Self {
        Self {
            state,
            move_speed,
            time: 0.0,
            behaviors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: impl SteeringBehavior + 'static) -> Self {
        self.push_behavior(Box::new(behavior));
        self
    }

    pub fn push_behavior(&mut self, behavior: Box<dyn SteeringBehavior>) {
        self.behaviors.push(behavior);
    }

    #[must_use]
    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    #[must_use]
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    #[must_use]
    pub fn position(&self) -> Point3 {
        self.state.position
    }

    #[must_use]
    pub fn move_speed(&self) -> f64 {
        self.move_speed
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances the agent by `delta_time` seconds.
    ///
    /// A zero summed heading (force exactly cancelling the direction) keeps
    /// the previous direction.
    pub fn update(&mut self, delta_time: f64) -> &AgentState {
        let ctx = SteeringContext {
            time: self.time,
            delta_time,
        };

        let state = self.state;
        let force = self
            .behaviors
            .iter_mut()
            .fold(Vec3::ZERO, |acc, behavior| acc + behavior.steer(&state, &ctx));

        let direction = (state.direction + force)
            .normalized()
            .unwrap_or(state.direction);
        self.state.direction = direction;
        self.state.position = state.position + direction * (self.move_speed * delta_time);
        self.time += delta_time;

        &self.state
    }
}
