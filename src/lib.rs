#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod geom;
pub mod rebuild;
pub mod simulation;
pub mod steering;

use std::fmt;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use config::{SimulationConfig, TunnelConfig};
use rebuild::RebuildOutcome;
use simulation::TunnelSimulation;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoundsExport {
    min: [f64; 3],
    max: [f64; 3],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshSummary {
    generation: u64,
    revision: u64,
    ring_count: usize,
    sides: usize,
    vertex_count: usize,
    triangle_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<String>,
}

/// Wasm entry point: a wandering agent with a tunnel built along its trail.
#[wasm_bindgen]
pub struct TunnelEngine {
    simulation: TunnelSimulation,
}

#[wasm_bindgen]
impl TunnelEngine {
    /// Engine with the default simulation configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<TunnelEngine, JsValue> {
        Self::with_config(&SimulationConfig::default())
    }

    /// Engine from a JS object shaped like `SimulationConfig` (camelCase keys,
    /// all optional).
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<TunnelEngine, JsValue> {
        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Self::with_config(&config)
    }

    /// Replaces the tunnel configuration and rebuilds along the current trail.
    /// Returns `true` if the published mesh changed.
    #[wasm_bindgen(js_name = setTunnelConfig)]
    pub fn set_tunnel_config(&mut self, config: JsValue) -> Result<bool, JsValue> {
        let config: TunnelConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        self.apply_tunnel_config(config)
    }

    /// Advances the simulation; returns `true` if the published mesh changed
    /// (rebuilt, or cleared for a too-short trail).
    #[wasm_bindgen]
    pub fn step(&mut self, delta_time: f64) -> Result<bool, JsValue> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(js_error("delta_time must be a finite, non-negative number"));
        }
        let report = self.simulation.step(delta_time);
        Ok(report.rebuild.as_ref().is_some_and(RebuildOutcome::replaced_mesh))
    }

    /// Successful rebuilds so far.
    #[wasm_bindgen]
    pub fn generation(&self) -> f64 {
        self.simulation.tunnel().generation() as f64
    }

    /// Bumped every time the published mesh changes, including clears.
    #[wasm_bindgen]
    pub fn revision(&self) -> f64 {
        self.simulation.tunnel().revision() as f64
    }

    /// Packed `[x, y, z, ...]` vertex positions.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f64> {
        self.simulation.mesh().positions_flat().to_vec()
    }

    #[wasm_bindgen]
    pub fn normals(&self) -> Vec<f64> {
        self.simulation.mesh().normals_flat().to_vec()
    }

    #[wasm_bindgen]
    pub fn uvs(&self) -> Vec<f64> {
        self.simulation.mesh().uvs_flat().to_vec()
    }

    #[wasm_bindgen]
    pub fn indices(&self) -> Vec<u32> {
        self.simulation.mesh().indices.clone()
    }

    /// Packed `[x, y, z, ...]` knots of the agent's trail.
    #[wasm_bindgen(js_name = trailKnots)]
    pub fn trail_knots(&self) -> Vec<f64> {
        self.simulation
            .trail()
            .knots()
            .iter()
            .flat_map(|knot| knot.to_array())
            .collect()
    }

    #[wasm_bindgen(js_name = agentPosition)]
    pub fn agent_position(&self) -> Vec<f64> {
        self.simulation.agent().position().to_array().to_vec()
    }

    /// Counts, bounds and diagnostics of the current mesh.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let tunnel = self.simulation.tunnel();
        let mesh = tunnel.mesh();
        let summary = MeshSummary {
            generation: tunnel.generation(),
            revision: tunnel.revision(),
            ring_count: mesh.ring_count,
            sides: mesh.sides,
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            bounds: mesh.bounds.map(|b| BoundsExport {
                min: b.min.to_array(),
                max: b.max.to_array(),
            }),
            diagnostics: tunnel.last_diagnostics().map(ToString::to_string),
        };
        serde_wasm_bindgen::to_value(&summary).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl TunnelEngine {
    fn with_config(config: &SimulationConfig) -> Result<TunnelEngine, JsValue> {
        let simulation = TunnelSimulation::new(config).map_err(to_js_error)?;
        debug_log!("tunnel engine ready: {:?}", config.tunnel);
        Ok(TunnelEngine { simulation })
    }

    fn apply_tunnel_config(&mut self, config: TunnelConfig) -> Result<bool, JsValue> {
        let outcome = self.simulation.set_tunnel_config(config).map_err(to_js_error)?;
        debug_log!("tunnel config applied: {:?}", outcome);
        Ok(outcome.replaced_mesh())
    }

    #[must_use]
    pub fn simulation(&self) -> &TunnelSimulation {
        &self.simulation
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_buffers_match_mesh() {
        let mut engine = TunnelEngine::with_config(&SimulationConfig::default()).unwrap();
        let mut rebuilt = false;
        for _ in 0..120 {
            rebuilt |= engine.step(1.0 / 30.0).unwrap();
        }
        assert!(rebuilt);

        let mesh = engine.simulation().mesh();
        assert_eq!(engine.positions().len(), mesh.vertex_count() * 3);
        assert_eq!(engine.normals().len(), mesh.vertex_count() * 3);
        assert_eq!(engine.uvs().len(), mesh.vertex_count() * 2);
        assert_eq!(engine.indices().len(), mesh.triangle_count() * 3);
        assert_eq!(
            engine.trail_knots().len(),
            engine.simulation().trail().knot_count() * 3
        );
        assert!(engine.generation() >= 1.0);
    }

    #[test]
    fn test_engine_rejects_bad_delta_time() {
        let mut engine = TunnelEngine::with_config(&SimulationConfig::default()).unwrap();
        assert!(engine.step(f64::NAN).is_err());
        assert!(engine.step(-1.0).is_err());
    }

    #[test]
    fn test_engine_reports_cleared_mesh() {
        let config = SimulationConfig {
            tunnel: TunnelConfig::default()
                .with_insufficient_path(rebuild::InsufficientPathPolicy::Clear),
            ..SimulationConfig::default()
        };
        let mut engine = TunnelEngine::with_config(&config).unwrap();
        for _ in 0..120 {
            engine.step(1.0 / 30.0).unwrap();
        }
        assert!(!engine.positions().is_empty());
        let revision = engine.revision();

        // Density this low rounds the current trail to fewer than 2 segments.
        let sparse = config.tunnel.with_segments_per_unit_length(1.0e-6);
        assert!(engine.apply_tunnel_config(sparse).unwrap());
        assert!(engine.positions().is_empty());
        assert!(engine.revision() > revision);
    }

    #[test]
    fn test_engine_config_change_rebuilds_now() {
        let mut engine = TunnelEngine::with_config(&SimulationConfig::default()).unwrap();
        for _ in 0..120 {
            engine.step(1.0 / 30.0).unwrap();
        }
        let generation = engine.simulation().tunnel().generation();
        assert!(engine.apply_tunnel_config(TunnelConfig::default().with_sides(3)).unwrap());
        assert_eq!(engine.simulation().tunnel().generation(), generation + 1);
        assert_eq!(engine.positions().len() % 9, 0);
        assert_eq!(engine.simulation().mesh().sides, 3);
    }
}
