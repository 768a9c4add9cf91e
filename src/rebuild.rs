//! Rebuild-on-change ownership of a tunnel mesh.
//!
//! [`ProceduralTunnel`] holds the configuration and the latest successfully
//! built mesh. Every path-changed notification triggers a full rebuild into
//! fresh buffers; the published [`Arc`] is only swapped when the build
//! succeeds (or when the insufficient-path policy asks for an empty mesh), so
//! readers always see a complete snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, TunnelConfig};
use crate::geom::{Path, TunnelDiagnostics, TunnelError, TunnelMesh, tunnel_mesh_from_path};

/// What happens to the published mesh when the path is too short to build from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsufficientPathPolicy {
    /// Keep showing the last successfully built mesh.
    #[default]
    RetainPrevious,
    /// Replace the mesh with an empty one.
    Clear,
}

/// Result of one [`ProceduralTunnel::on_path_changed`] call.
#[derive(Debug)]
pub enum RebuildOutcome {
    Rebuilt {
        vertex_count: usize,
        triangle_count: usize,
    },
    /// The build failed and the previous mesh is still published.
    Retained(TunnelError),
    /// The build failed and the published mesh is now empty.
    Cleared(TunnelError),
}

impl RebuildOutcome {
    #[must_use]
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, Self::Rebuilt { .. })
    }

    /// Returns `true` if the published mesh was replaced, by a new build or by
    /// an empty mesh.
    #[must_use]
    pub fn replaced_mesh(&self) -> bool {
        matches!(self, Self::Rebuilt { .. } | Self::Cleared(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&TunnelError> {
        match self {
            Self::Rebuilt { .. } => None,
            Self::Retained(err) | Self::Cleared(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub struct ProceduralTunnel {
    config: TunnelConfig,
    mesh: Arc<TunnelMesh>,
    generation: u64,
    revision: u64,
    last_diagnostics: Option<TunnelDiagnostics>,
}

impl ProceduralTunnel {
    pub fn new(config: TunnelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            mesh: Arc::new(TunnelMesh::empty()),
            generation: 0,
            revision: 0,
            last_diagnostics: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    /// Replaces the configuration. Takes effect on the next rebuild.
    ///
    /// An invalid configuration is rejected and the current one is kept.
    pub fn set_config(&mut self, config: TunnelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Replaces the configuration and rebuilds from `path` right away.
    ///
    /// An invalid configuration is rejected before anything is rebuilt.
    pub fn reconfigure<P: Path + ?Sized>(
        &mut self,
        config: TunnelConfig,
        path: &P,
    ) -> Result<RebuildOutcome, ConfigError> {
        self.set_config(config)?;
        Ok(self.on_path_changed(path))
    }

    /// Snapshot of the current mesh.
    #[must_use]
    pub fn mesh(&self) -> Arc<TunnelMesh> {
        Arc::clone(&self.mesh)
    }

    /// Number of successful rebuilds so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of times the published mesh was replaced, including clears.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Diagnostics of the last successful rebuild.
    #[must_use]
    pub fn last_diagnostics(&self) -> Option<&TunnelDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    /// Rebuilds the whole mesh from `path`.
    pub fn on_path_changed<P: Path + ?Sized>(&mut self, path: &P) -> RebuildOutcome {
        match tunnel_mesh_from_path(path, &self.config) {
            Ok((mesh, diagnostics)) => {
                let vertex_count = mesh.vertex_count();
                let triangle_count = mesh.triangle_count();
                self.mesh = Arc::new(mesh);
                self.generation += 1;
                self.revision += 1;
                log::debug!("tunnel rebuilt (gen {}): {diagnostics}", self.generation);
                self.last_diagnostics = Some(diagnostics);
                RebuildOutcome::Rebuilt {
                    vertex_count,
                    triangle_count,
                }
            }
            Err(err) => self.handle_failure(err),
        }
    }

    fn handle_failure(&mut self, err: TunnelError) -> RebuildOutcome {
        if err.is_insufficient_path() && self.config.insufficient_path == InsufficientPathPolicy::Clear {
            log::debug!("tunnel cleared: {err}");
            self.mesh = Arc::new(TunnelMesh::empty());
            self.revision += 1;
            return RebuildOutcome::Cleared(err);
        }

        if err.is_insufficient_path() {
            log::debug!("tunnel rebuild skipped: {err}");
        } else {
            log::warn!("tunnel rebuild failed, keeping previous mesh: {err}");
        }
        RebuildOutcome::Retained(err)
    }
}

impl Default for ProceduralTunnel {
    fn default() -> Self {
        Self {
            config: TunnelConfig::default(),
            mesh: Arc::new(TunnelMesh::empty()),
            generation: 0,
            revision: 0,
            last_diagnostics: None,
        }
    }
}
