//! Agent → trail → tunnel, advanced one frame at a time.
//!
//! Each [`TunnelSimulation::step`] runs, in order: the agent update, the
//! follower update with the agent's new position, and a tunnel rebuild if the
//! trail changed. The trail is only borrowed immutably during the rebuild.

use std::sync::Arc;

use crate::config::{ConfigError, SimulationConfig, TunnelConfig};
use crate::geom::{SplinePath, TunnelMesh, Vec3};
use crate::rebuild::{ProceduralTunnel, RebuildOutcome};
use crate::steering::{
    AgentState, PathFollower, StayInBoundsBehavior, SteeringAgent, WanderBehavior,
};

/// What happened during one [`TunnelSimulation::step`].
#[derive(Debug)]
pub struct StepReport {
    pub agent: AgentState,
    pub knot_added: bool,
    /// `None` when the trail did not change this step.
    pub rebuild: Option<RebuildOutcome>,
}

#[derive(Debug)]
pub struct TunnelSimulation {
    agent: SteeringAgent,
    follower: PathFollower,
    tunnel: ProceduralTunnel,
    steps: u64,
}

impl TunnelSimulation {
    /// Agent starts at the centre of the bounds heading along +Z, wandering
    /// and kept inside the bounds.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let bounds = config.bounds.to_bbox();
        let start = AgentState::new(bounds.center(), Vec3::Z);
        let agent = SteeringAgent::new(start, config.move_speed)
            .with_behavior(WanderBehavior::from_seed(
                config.wander_turn_strength,
                config.wander_noise_frequency,
                config.seed,
            ))
            .with_behavior(StayInBoundsBehavior::new(bounds, config.boundary_turn_strength));

        Ok(Self::from_parts(
            agent,
            PathFollower::new(start.position, config.max_knots, config.segment_length),
            ProceduralTunnel::new(config.tunnel)?,
        ))
    }

    #[must_use]
    pub fn from_parts(agent: SteeringAgent, follower: PathFollower, tunnel: ProceduralTunnel) -> Self {
        Self {
            agent,
            follower,
            tunnel,
            steps: 0,
        }
    }

    pub fn step(&mut self, delta_time: f64) -> StepReport {
        let agent = *self.agent.update(delta_time);
        let knot_added = self.follower.update(agent.position);
        let rebuild = knot_added.then(|| self.tunnel.on_path_changed(self.follower.path()));
        self.steps += 1;

        StepReport {
            agent,
            knot_added,
            rebuild,
        }
    }

    /// Applies a new tunnel configuration and rebuilds along the current trail.
    pub fn set_tunnel_config(&mut self, config: TunnelConfig) -> Result<RebuildOutcome, ConfigError> {
        self.tunnel.reconfigure(config, self.follower.path())
    }

    /// Runs `count` steps of `delta_time`; returns how many rebuilt the mesh.
    pub fn run(&mut self, count: usize, delta_time: f64) -> usize {
        (0..count)
            .filter(|_| {
                self.step(delta_time)
                    .rebuild
                    .is_some_and(|outcome| outcome.is_rebuilt())
            })
            .count()
    }

    #[must_use]
    pub fn agent(&self) -> &SteeringAgent {
        &self.agent
    }

    #[must_use]
    pub fn trail(&self) -> &SplinePath {
        self.follower.path()
    }

    #[must_use]
    pub fn tunnel(&self) -> &ProceduralTunnel {
        &self.tunnel
    }

    pub fn tunnel_mut(&mut self) -> &mut ProceduralTunnel {
        &mut self.tunnel
    }

    #[must_use]
    pub fn mesh(&self) -> Arc<TunnelMesh> {
        self.tunnel.mesh()
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
